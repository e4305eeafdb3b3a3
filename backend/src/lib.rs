//! Social anime-tracking backend.
//!
//! Layers follow a ports-and-adapters split:
//! - [`domain`]: entities, services and port traits.
//! - [`inbound`]: the actix-web REST adapter.
//! - [`outbound`]: PostgreSQL, in-memory, catalog, media and hashing adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
