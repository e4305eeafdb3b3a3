//! PostgreSQL-backed `AnimeListRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{AnimeListRepository, AnimeListRepositoryError};
use crate::domain::{AnimeListEntry, TitleId, UserId, WatchEvent};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AnimeListEntryRow, NewWatchEventRow, WatchEventRow};
use super::pool::{DbPool, PoolError};
use super::schema::{anime_list_entries, watch_history};

/// Diesel implementation of [`AnimeListRepository`].
#[derive(Clone)]
pub struct DieselAnimeListRepository {
    pool: DbPool,
}

impl DieselAnimeListRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AnimeListRepositoryError {
    map_pool_error(error, AnimeListRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AnimeListRepositoryError {
    map_diesel_error(
        error,
        AnimeListRepositoryError::query,
        AnimeListRepositoryError::connection,
    )
}

fn convert<R, T>(rows: Vec<R>) -> Result<Vec<T>, AnimeListRepositoryError>
where
    T: TryFrom<R, Error = String>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(AnimeListRepositoryError::query))
        .collect()
}

#[async_trait]
impl AnimeListRepository for DieselAnimeListRepository {
    async fn entries(&self, user: &UserId) -> Result<Vec<AnimeListEntry>, AnimeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<AnimeListEntryRow> = anime_list_entries::table
            .filter(anime_list_entries::user_id.eq(*user.as_uuid()))
            .select(AnimeListEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        convert(rows)
    }

    async fn find_entry(
        &self,
        user: &UserId,
        title_id: &TitleId,
    ) -> Result<Option<AnimeListEntry>, AnimeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        anime_list_entries::table
            .find((*user.as_uuid(), title_id.as_ref()))
            .select(AnimeListEntryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(|row| AnimeListEntry::try_from(row).map_err(AnimeListRepositoryError::query))
            .transpose()
    }

    async fn save_entry(
        &self,
        user: &UserId,
        entry: &AnimeListEntry,
    ) -> Result<(), AnimeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(anime_list_entries::table)
            .values(&AnimeListEntryRow::from_entry(user, entry))
            .on_conflict((anime_list_entries::user_id, anime_list_entries::title_id))
            .do_update()
            .set((
                anime_list_entries::status.eq(excluded(anime_list_entries::status)),
                anime_list_entries::title.eq(excluded(anime_list_entries::title)),
                anime_list_entries::poster_url.eq(excluded(anime_list_entries::poster_url)),
                anime_list_entries::episodes_total
                    .eq(excluded(anime_list_entries::episodes_total)),
                anime_list_entries::last_watched_at
                    .eq(excluded(anime_list_entries::last_watched_at)),
                anime_list_entries::updated_at.eq(excluded(anime_list_entries::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn delete_entry(
        &self,
        user: &UserId,
        title_id: &TitleId,
    ) -> Result<bool, AnimeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            anime_list_entries::table.find((*user.as_uuid(), title_id.as_ref())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn record_watch(
        &self,
        user: &UserId,
        event: &WatchEvent,
    ) -> Result<(), AnimeListRepositoryError> {
        let row = NewWatchEventRow::from_event(user, event).map_err(AnimeListRepositoryError::query)?;
        let user_id = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(watch_history::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::update(anime_list_entries::table.find((user_id, row.title_id)))
                    .set(anime_list_entries::last_watched_at.eq(Some(row.watched_at)))
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)
    }

    async fn recent_history(
        &self,
        user: &UserId,
        limit: usize,
    ) -> Result<Vec<WatchEvent>, AnimeListRepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<WatchEventRow> = watch_history::table
            .filter(watch_history::user_id.eq(*user.as_uuid()))
            .order_by((watch_history::watched_at.desc(), watch_history::id.desc()))
            .limit(limit)
            .select(WatchEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        convert(rows)
    }

    async fn history_since(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<WatchEvent>, AnimeListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<WatchEventRow> = watch_history::table
            .filter(watch_history::user_id.eq(*user.as_uuid()))
            .filter(watch_history::watched_at.ge(since))
            .order_by(watch_history::watched_at.asc())
            .select(WatchEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        convert(rows)
    }
}
