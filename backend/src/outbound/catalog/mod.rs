//! Catalog outbound adapters.
//!
//! A thin reqwest implementation of the `CatalogSource` port for a
//! Shikimori-style REST API, plus an optional Kodik-style player search.

mod dto;
mod http_source;

pub use http_source::{CatalogEndpoints, CatalogHttpSource};
