//! Port for friend and friend-request persistence.
//!
//! Relationship changes always touch two users and, for requests, a
//! notification. Adapters receive the whole change as one [`PairCommit`] and
//! must apply all of it or none of it.

use async_trait::async_trait;

use crate::domain::{NotificationChange, PairState, Relationships, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by relationship repository adapters.
    pub enum RelationshipRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "relationship repository connection failed: {message}",
        /// Query or mutation failed; nothing was written.
        Query { message: String } =>
            "relationship repository query failed: {message}",
        /// The pair no longer held the relation the change was computed from.
        StaleState { message: String } =>
            "relationship changed concurrently: {message}",
    }
}

/// Atomic relationship update for one user pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCommit {
    /// One side of the pair.
    pub first: UserId,
    /// The other side of the pair.
    pub second: UserId,
    /// Relation the pair must still hold when the commit applies.
    pub expected: PairState,
    /// Relation the pair holds once committed.
    pub state: PairState,
    /// Notification written in the same transaction.
    pub notification: Option<NotificationChange>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Load a user's relationship sets; `None` when the user does not exist.
    async fn load(&self, user: &UserId)
    -> Result<Option<Relationships>, RelationshipRepositoryError>;

    /// Replace the pair's relation and apply the notification change together.
    ///
    /// Fails with `StaleState`, writing nothing, when the stored relation
    /// differs from `change.expected`.
    async fn commit(&self, change: &PairCommit) -> Result<(), RelationshipRepositoryError>;
}
