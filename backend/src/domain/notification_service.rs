//! Notification inbox service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    NotificationInbox, NotificationRepository, NotificationRepositoryError, UserRepository,
};
use crate::domain::{Error, NotificationView, UserId, dedupe_by_id};

pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

/// Notification inbox over the notification and user repositories.
#[derive(Clone)]
pub struct NotificationService<N, U> {
    notifications: Arc<N>,
    users: Arc<U>,
}

impl<N, U> NotificationService<N, U> {
    /// Create the service.
    pub fn new(notifications: Arc<N>, users: Arc<U>) -> Self {
        Self {
            notifications,
            users,
        }
    }
}

#[async_trait]
impl<N, U> NotificationInbox for NotificationService<N, U>
where
    N: NotificationRepository,
    U: UserRepository,
{
    async fn list_for(&self, recipient: &UserId) -> Result<Vec<NotificationView>, Error> {
        let records = self
            .notifications
            .list_for(recipient)
            .await
            .map_err(map_notification_error)?;
        let records = dedupe_by_id(records);

        let mut actor_ids: Vec<UserId> = records.iter().filter_map(|n| n.actor.clone()).collect();
        actor_ids.sort();
        actor_ids.dedup();
        let actors: HashMap<UserId, _> = if actor_ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_many(&actor_ids)
                .await
                .map_err(map_user_error)?
                .into_iter()
                .map(|user| (user.id().clone(), user.summary()))
                .collect()
        };

        Ok(records
            .into_iter()
            .map(|record| {
                let from = record.actor.as_ref().and_then(|id| actors.get(id).cloned());
                NotificationView::new(record, from)
            })
            .collect())
    }

    async fn mark_all_read(&self, recipient: &UserId) -> Result<usize, Error> {
        self.notifications
            .mark_all_read(recipient)
            .await
            .map_err(map_notification_error)
    }

    async fn unread_count(&self, recipient: &UserId) -> Result<usize, Error> {
        self.notifications
            .unread_count(recipient)
            .await
            .map_err(map_notification_error)
    }
}
