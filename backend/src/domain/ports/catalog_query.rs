//! Driving port for catalog lookups.
use async_trait::async_trait;

use crate::domain::{PlayerInfo, TitleId, TitleLookup};

/// Catalog reads never fail; upstream trouble degrades the result instead.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Title metadata or an "unavailable" marker.
    async fn title_details(&self, title_id: &TitleId) -> TitleLookup;

    /// Player info, or `None` when missing or unreachable.
    async fn player(&self, title_id: &TitleId) -> Option<PlayerInfo>;
}
