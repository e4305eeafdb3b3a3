//! Driving port for a user's notification inbox.
use async_trait::async_trait;

use crate::domain::{Error, NotificationView, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Notifications for `recipient`, oldest first, without duplicate ids.
    async fn list_for(&self, recipient: &UserId) -> Result<Vec<NotificationView>, Error>;

    /// Mark everything read; returns how many records changed.
    async fn mark_all_read(&self, recipient: &UserId) -> Result<usize, Error>;

    /// Unread badge count.
    async fn unread_count(&self, recipient: &UserId) -> Result<usize, Error>;
}
