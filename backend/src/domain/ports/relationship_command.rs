//! Driving port for friend requests and friendships.
//!
//! Every operation returns the acting user's flags towards the other user
//! after the change has been committed.

use async_trait::async_trait;

use crate::domain::{Error, RelationshipFlags, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipCommand: Send + Sync {
    /// `requester` asks `target` to become friends.
    async fn send_request(
        &self,
        requester: &UserId,
        target: &UserId,
    ) -> Result<RelationshipFlags, Error>;

    /// `accepter` accepts the pending request from `requester`.
    async fn accept_request(
        &self,
        accepter: &UserId,
        requester: &UserId,
    ) -> Result<RelationshipFlags, Error>;

    /// `accepter` declines the pending request from `requester`.
    async fn reject_request(
        &self,
        accepter: &UserId,
        requester: &UserId,
    ) -> Result<RelationshipFlags, Error>;

    /// End a friendship; succeeds when the users are not friends.
    async fn remove_friend(&self, user: &UserId, friend: &UserId)
    -> Result<RelationshipFlags, Error>;
}
