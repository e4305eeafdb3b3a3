//! List tracking service.
//!
//! Implements the list driving ports over an [`AnimeListRepository`]. Status
//! labels are normalised here so every adapter sees canonical values. Public
//! per-user queries check the user exists first, so an unknown id is a 404
//! rather than an empty result.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveTime};
use mockable::Clock;
use serde_json::json;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    AnimeListRepository, AnimeListRepositoryError, ListTrackingCommand, ListTrackingQuery,
    UpsertEntryRequest, UserRepository,
};
use crate::domain::{
    ActivityDay, AnimeListEntry, DetailedStats, Error, ListStats, StatusNormalization, TitleId,
    UserId, WatchEvent, WatchStatus, activity_by_day, normalize_status, sort_by_recent_update,
};

/// Recent-history page size when the caller gives none.
pub const RECENT_DEFAULT_LIMIT: usize = 20;
/// Largest recent-history page.
pub const RECENT_MAX_LIMIT: usize = 100;
/// Activity window when the caller gives none.
pub const ACTIVITY_DEFAULT_DAYS: u32 = 365;
/// Longest activity window.
pub const ACTIVITY_MAX_DAYS: u32 = 3650;

pub(crate) fn map_list_error(error: AnimeListRepositoryError) -> Error {
    match error {
        AnimeListRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("list repository unavailable: {message}"))
        }
        AnimeListRepositoryError::Query { message } => {
            Error::internal(format!("list repository error: {message}"))
        }
    }
}

/// List tracking service implementing the command and query ports.
#[derive(Clone)]
pub struct ListService<R, U> {
    repo: Arc<R>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, U> ListService<R, U> {
    /// Create a service over `repo`, resolving owners through `users`.
    pub fn new(repo: Arc<R>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, users, clock }
    }
}

impl<R, U> ListService<R, U>
where
    R: AnimeListRepository,
    U: UserRepository,
{
    async fn ensure_user(&self, user: &UserId) -> Result<(), Error> {
        self.users
            .find_by_id(user)
            .await
            .map_err(map_user_error)?
            .map(|_| ())
            .ok_or_else(|| {
                Error::not_found("user not found")
                    .with_details(json!({ "field": "id", "value": user.as_ref() }))
            })
    }

    fn parse_status(raw: &str) -> Result<WatchStatus, Error> {
        match normalize_status(raw) {
            StatusNormalization::Recognised(status) => Ok(status),
            StatusNormalization::Unrecognised(raw) => Err(Error::invalid_request(format!(
                "unrecognised watch status: {raw}"
            ))
            .with_details(json!({
                "field": "status",
                "code": "invalid_status",
                "value": raw,
            }))),
        }
    }

    async fn sorted_entries(&self, user: &UserId) -> Result<Vec<AnimeListEntry>, Error> {
        let mut entries = self.repo.entries(user).await.map_err(map_list_error)?;
        sort_by_recent_update(&mut entries);
        Ok(entries)
    }
}

#[async_trait]
impl<R, U> ListTrackingCommand for ListService<R, U>
where
    R: AnimeListRepository,
    U: UserRepository,
{
    async fn upsert(&self, request: UpsertEntryRequest) -> Result<Vec<AnimeListEntry>, Error> {
        let UpsertEntryRequest {
            user,
            title_id,
            status,
            metadata,
        } = request;
        let status = Self::parse_status(&status)?;
        let metadata = metadata.normalised();
        let now = self.clock.utc();

        let entry = match self
            .repo
            .find_entry(&user, &title_id)
            .await
            .map_err(map_list_error)?
        {
            Some(mut existing) => {
                existing.update(status, metadata, now);
                existing
            }
            None => AnimeListEntry::new(title_id, status, metadata, now),
        };
        self.repo
            .save_entry(&user, &entry)
            .await
            .map_err(map_list_error)?;
        self.sorted_entries(&user).await
    }

    async fn remove(
        &self,
        user: &UserId,
        title_id: &TitleId,
    ) -> Result<Vec<AnimeListEntry>, Error> {
        self.repo
            .delete_entry(user, title_id)
            .await
            .map_err(map_list_error)?;
        self.sorted_entries(user).await
    }

    async fn log_episode_watched(
        &self,
        user: &UserId,
        title_id: &TitleId,
        episode: u32,
    ) -> Result<WatchEvent, Error> {
        if episode == 0 {
            return Err(
                Error::invalid_request("episode must be at least 1").with_details(json!({
                    "field": "episode",
                    "code": "invalid_episode",
                    "value": episode,
                })),
            );
        }
        let title = self
            .repo
            .find_entry(user, title_id)
            .await
            .map_err(map_list_error)?
            .and_then(|entry| entry.title);
        let event = WatchEvent {
            title_id: title_id.clone(),
            title,
            episode,
            watched_at: self.clock.utc(),
        };
        self.repo
            .record_watch(user, &event)
            .await
            .map_err(map_list_error)?;
        Ok(event)
    }
}

#[async_trait]
impl<R, U> ListTrackingQuery for ListService<R, U>
where
    R: AnimeListRepository,
    U: UserRepository,
{
    async fn list(&self, user: &UserId) -> Result<Vec<AnimeListEntry>, Error> {
        self.sorted_entries(user).await
    }

    async fn stats(&self, user: &UserId) -> Result<ListStats, Error> {
        self.ensure_user(user).await?;
        let entries = self.repo.entries(user).await.map_err(map_list_error)?;
        Ok(ListStats::from_entries(&entries))
    }

    async fn detailed_stats(&self, user: &UserId) -> Result<DetailedStats, Error> {
        self.ensure_user(user).await?;
        let entries = self.sorted_entries(user).await?;
        Ok(DetailedStats::from_entries(&entries))
    }

    async fn recent(&self, user: &UserId, limit: Option<usize>) -> Result<Vec<WatchEvent>, Error> {
        self.ensure_user(user).await?;
        let limit = limit
            .unwrap_or(RECENT_DEFAULT_LIMIT)
            .clamp(1, RECENT_MAX_LIMIT);
        self.repo
            .recent_history(user, limit)
            .await
            .map_err(map_list_error)
    }

    async fn activity(&self, user: &UserId, days: Option<u32>) -> Result<Vec<ActivityDay>, Error> {
        self.ensure_user(user).await?;
        let days = days
            .unwrap_or(ACTIVITY_DEFAULT_DAYS)
            .clamp(1, ACTIVITY_MAX_DAYS);
        let now = self.clock.utc();
        let first_day = now.date_naive() - Duration::days(i64::from(days) - 1);
        let since = first_day.and_time(NaiveTime::MIN).and_utc();
        let events = self
            .repo
            .history_since(user, since)
            .await
            .map_err(map_list_error)?;
        Ok(activity_by_day(&events, now, days))
    }
}

#[cfg(test)]
#[path = "list_service_tests.rs"]
mod tests;
