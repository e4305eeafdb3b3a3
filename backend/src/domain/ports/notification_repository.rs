//! Port for reading and marking notifications.
//!
//! Notifications are created only as part of a relationship change, through
//! `NotificationChange::Create` inside a `PairCommit`.

use async_trait::async_trait;

use crate::domain::{Notification, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// All notifications for `recipient`, oldest first.
    async fn list_for(&self, recipient: &UserId)
    -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Flip every unread notification to read; returns how many changed.
    async fn mark_all_read(&self, recipient: &UserId) -> Result<usize, NotificationRepositoryError>;

    /// Number of unread notifications.
    async fn unread_count(&self, recipient: &UserId) -> Result<usize, NotificationRepositoryError>;
}
