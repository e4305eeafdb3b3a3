//! Port for per-user list entries and watch history.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AnimeListEntry, TitleId, UserId, WatchEvent};

use super::define_port_error;

define_port_error! {
    /// Errors raised by list repository adapters.
    pub enum AnimeListRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "list repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "list repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimeListRepository: Send + Sync {
    /// Every entry in the user's list, in no particular order.
    async fn entries(&self, user: &UserId) -> Result<Vec<AnimeListEntry>, AnimeListRepositoryError>;

    /// The entry for one title, if tracked.
    async fn find_entry(
        &self,
        user: &UserId,
        title_id: &TitleId,
    ) -> Result<Option<AnimeListEntry>, AnimeListRepositoryError>;

    /// Insert or replace the entry keyed by its title id.
    async fn save_entry(
        &self,
        user: &UserId,
        entry: &AnimeListEntry,
    ) -> Result<(), AnimeListRepositoryError>;

    /// Delete the entry for `title_id`; returns whether one existed.
    async fn delete_entry(
        &self,
        user: &UserId,
        title_id: &TitleId,
    ) -> Result<bool, AnimeListRepositoryError>;

    /// Append a watch event and stamp the matching entry's `last_watched_at`.
    async fn record_watch(
        &self,
        user: &UserId,
        event: &WatchEvent,
    ) -> Result<(), AnimeListRepositoryError>;

    /// Newest watch events first, at most `limit`.
    async fn recent_history(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<WatchEvent>, AnimeListRepositoryError>;

    /// Watch events at or after `since`.
    async fn history_since(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<WatchEvent>, AnimeListRepositoryError>;
}
