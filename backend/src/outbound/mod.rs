//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel
//! - **memory**: a single-lock in-memory store for development and tests
//! - **catalog**: reqwest client for the third-party anime catalog
//! - **media**: filesystem store for profile images
//! - **credentials**: Argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod catalog;
pub mod credentials;
pub mod media;
pub mod memory;
pub mod persistence;
