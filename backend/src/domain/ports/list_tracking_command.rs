//! Driving port for mutating a user's list and watch history.
use async_trait::async_trait;

use crate::domain::{AnimeListEntry, Error, TitleId, TitleMetadata, UserId, WatchEvent};

/// Request to add or update a list entry.
///
/// `status` is the raw client label; the service normalises it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertEntryRequest {
    pub user: UserId,
    pub title_id: TitleId,
    pub status: String,
    pub metadata: TitleMetadata,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListTrackingCommand: Send + Sync {
    /// Insert or update an entry and return the full list.
    async fn upsert(&self, request: UpsertEntryRequest) -> Result<Vec<AnimeListEntry>, Error>;

    /// Remove an entry if present and return the full list.
    async fn remove(&self, user: &UserId, title_id: &TitleId)
    -> Result<Vec<AnimeListEntry>, Error>;

    /// Append a watched episode to the history.
    async fn log_episode_watched(
        &self,
        user: &UserId,
        title_id: &TitleId,
        episode: u32,
    ) -> Result<WatchEvent, Error>;
}
