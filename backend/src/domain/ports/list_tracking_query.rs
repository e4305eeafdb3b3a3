//! Driving port for reading lists, history and statistics.
use async_trait::async_trait;

use crate::domain::{
    ActivityDay, AnimeListEntry, DetailedStats, EnrichedTitle, Error, ListStats, UserId,
    WatchEvent,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListTrackingQuery: Send + Sync {
    /// Entries ordered by last update, newest first.
    async fn list(&self, user: &UserId) -> Result<Vec<AnimeListEntry>, Error>;

    /// Entry counts per status.
    async fn stats(&self, user: &UserId) -> Result<ListStats, Error>;

    /// Entries grouped by status.
    async fn detailed_stats(&self, user: &UserId) -> Result<DetailedStats, Error>;

    /// Newest watch events; `limit` defaults and clamps in the service.
    async fn recent(&self, user: &UserId, limit: Option<usize>) -> Result<Vec<WatchEvent>, Error>;

    /// Episodes logged per UTC day over the last `days` days.
    async fn activity(&self, user: &UserId, days: Option<u32>) -> Result<Vec<ActivityDay>, Error>;
}

/// Driving port for catalog-enriched list views.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListDetailsQuery: Send + Sync {
    /// Every list entry joined with catalog details, in list order.
    async fn list_details(&self, user: &UserId) -> Result<Vec<EnrichedTitle>, Error>;
}
