//! PostgreSQL-backed `NotificationRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NotificationRow;
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel implementation of [`NotificationRepository`].
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> NotificationRepositoryError {
    map_pool_error(error, NotificationRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn list_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::recipient_id.eq(*recipient.as_uuid()))
            .order_by((notifications::created_at.asc(), notifications::id.asc()))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| Notification::try_from(row).map_err(NotificationRepositoryError::query))
            .collect()
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<usize, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(
            notifications::table
                .filter(notifications::recipient_id.eq(*recipient.as_uuid()))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)
    }

    async fn unread_count(&self, recipient: &UserId) -> Result<usize, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let count: i64 = notifications::table
            .filter(notifications::recipient_id.eq(*recipient.as_uuid()))
            .filter(notifications::read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        usize::try_from(count).map_err(|_| NotificationRepositoryError::query("negative count"))
    }
}
