//! Inbound adapters translating external requests into domain service calls.
//!
//! Only HTTP exists today; see [`http`].

pub mod http;
