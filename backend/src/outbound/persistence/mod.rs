//! PostgreSQL persistence adapters built on Diesel.
//!
//! Repositories translate between Diesel rows and domain types and map
//! database failures to port errors. Rows (`models`) and table definitions
//! (`schema`) stay private to this module. Connections come from a `bb8`
//! pool through `diesel-async`.
//!
//! ```no_run
//! use anitrack::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/anitrack")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_anime_list_repository;
mod diesel_notification_repository;
mod diesel_relationship_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_anime_list_repository::DieselAnimeListRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_relationship_repository::DieselRelationshipRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
