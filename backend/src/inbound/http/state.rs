//! Shared handler state.
//!
//! Handlers reach domain services only through these port trait objects, so
//! the binary can swap Diesel-backed services for in-memory ones and tests can
//! plug in mocks.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, CatalogQuery, ListDetailsQuery, ListTrackingCommand, ListTrackingQuery,
    NotificationInbox, ProfileCommand, ProfileQuery, RelationshipCommand,
};

/// Dependency bundle injected into every handler via `web::Data`.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub profile_updates: Arc<dyn ProfileCommand>,
    pub relationships: Arc<dyn RelationshipCommand>,
    pub notifications: Arc<dyn NotificationInbox>,
    pub list: Arc<dyn ListTrackingCommand>,
    pub list_query: Arc<dyn ListTrackingQuery>,
    pub list_details: Arc<dyn ListDetailsQuery>,
    pub catalog: Arc<dyn CatalogQuery>,
}
