//! Friend request and friendship service.
//!
//! Each operation loads both users' relationship sets, applies a pure
//! [`RelationshipPair`] transition and hands the resulting pair state plus
//! its notification change to the repository as one [`PairCommit`]. Nothing
//! is written when a transition is refused, and a failed commit leaves both
//! users as they were.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::account_service::map_user_error;
use crate::domain::ports::{
    PairCommit, RelationshipCommand, RelationshipRepository, RelationshipRepositoryError,
    UserRepository,
};
use crate::domain::{
    Error, NewNotification, NotificationChange, NotificationId, NotificationKind, PairState,
    RelationshipError, RelationshipFlags, RelationshipPair, Relationships, Resolution, UserId,
};

fn map_relationship_error(error: RelationshipRepositoryError) -> Error {
    match error {
        RelationshipRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("relationship repository unavailable: {message}"))
        }
        RelationshipRepositoryError::Query { message } => {
            Error::internal(format!("relationship repository error: {message}"))
        }
        RelationshipRepositoryError::StaleState { message } => {
            Error::conflict("relationship changed, please retry")
                .with_details(json!({ "code": "relationship_changed", "reason": message }))
        }
    }
}

fn map_violation(violation: RelationshipError) -> Error {
    let details = json!({ "code": violation.code() });
    let error = match violation {
        RelationshipError::InvalidTarget => Error::invalid_request(violation.to_string()),
        RelationshipError::AlreadyFriends
        | RelationshipError::AlreadyRequested
        | RelationshipError::IncomingRequestPending => Error::conflict(violation.to_string()),
        RelationshipError::NoSuchRequest => Error::not_found(violation.to_string()),
    };
    error.with_details(details)
}

/// Relationship service implementing [`RelationshipCommand`].
#[derive(Clone)]
pub struct RelationshipService<R, U> {
    relationships: Arc<R>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, U> RelationshipService<R, U> {
    /// Create the service.
    pub fn new(relationships: Arc<R>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            relationships,
            users,
            clock,
        }
    }
}

impl<R, U> RelationshipService<R, U>
where
    R: RelationshipRepository,
    U: UserRepository,
{
    async fn load(&self, user: &UserId) -> Result<Relationships, Error> {
        self.relationships
            .load(user)
            .await
            .map_err(map_relationship_error)?
            .ok_or_else(|| {
                Error::not_found("user not found")
                    .with_details(json!({ "field": "id", "value": user.as_ref() }))
            })
    }

    async fn load_pair(&self, actor: &UserId, other: &UserId) -> Result<RelationshipPair, Error> {
        if actor == other {
            return Err(map_violation(RelationshipError::InvalidTarget));
        }
        let actor_sets = self.load(actor).await?;
        let other_sets = self.load(other).await?;
        RelationshipPair::new(actor_sets, other_sets).map_err(map_violation)
    }

    async fn commit(
        &self,
        expected: PairState,
        pair: &RelationshipPair,
        notification: Option<NotificationChange>,
    ) -> Result<RelationshipFlags, Error> {
        let actor = pair.actor().user();
        let other = pair.counterpart().user();
        let change = PairCommit {
            first: actor.clone(),
            second: other.clone(),
            expected,
            state: pair.state(),
            notification,
        };
        self.relationships
            .commit(&change)
            .await
            .map_err(map_relationship_error)?;
        Ok(pair.actor().flags_towards(other))
    }

    async fn request_message(&self, requester: &UserId) -> Result<String, Error> {
        let name = self
            .users
            .find_by_id(requester)
            .await
            .map_err(map_user_error)?
            .map(|user| {
                user.profile
                    .nickname
                    .clone()
                    .unwrap_or_else(|| user.email().as_ref().to_owned())
            })
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(format!("{name} wants to be your friend"))
    }

    async fn resolve_request(
        &self,
        accepter: &UserId,
        requester: &UserId,
        accept: bool,
    ) -> Result<RelationshipFlags, Error> {
        let mut pair = self.load_pair(accepter, requester).await?;
        let expected = pair.state();
        let resolution = if accept {
            pair.accept_request().map_err(map_violation)?;
            Resolution::Accepted
        } else {
            pair.reject_request().map_err(map_violation)?;
            Resolution::Rejected
        };

        let flags = self
            .commit(
                expected,
                &pair,
                Some(NotificationChange::Resolve {
                    recipient: accepter.clone(),
                    actor: requester.clone(),
                    resolution,
                }),
            )
            .await?;
        info!(
            requester = %requester,
            target = %accepter,
            resolution = resolution.as_str(),
            "friend request resolved"
        );
        Ok(flags)
    }
}

#[async_trait]
impl<R, U> RelationshipCommand for RelationshipService<R, U>
where
    R: RelationshipRepository,
    U: UserRepository,
{
    async fn send_request(
        &self,
        requester: &UserId,
        target: &UserId,
    ) -> Result<RelationshipFlags, Error> {
        let mut pair = self.load_pair(requester, target).await?;
        let expected = pair.state();
        pair.send_request().map_err(map_violation)?;

        let message = self.request_message(requester).await?;
        let notification = NewNotification {
            id: NotificationId::random(),
            recipient: target.clone(),
            kind: NotificationKind::FriendRequest,
            actor: Some(requester.clone()),
            message,
            created_at: self.clock.utc(),
        };
        let flags = self
            .commit(expected, &pair, Some(NotificationChange::Create(notification)))
            .await?;
        info!(requester = %requester, target = %target, "friend request sent");
        Ok(flags)
    }

    async fn accept_request(
        &self,
        accepter: &UserId,
        requester: &UserId,
    ) -> Result<RelationshipFlags, Error> {
        self.resolve_request(accepter, requester, true)
            .await
    }

    async fn reject_request(
        &self,
        accepter: &UserId,
        requester: &UserId,
    ) -> Result<RelationshipFlags, Error> {
        self.resolve_request(accepter, requester, false)
            .await
    }

    async fn remove_friend(
        &self,
        user: &UserId,
        friend: &UserId,
    ) -> Result<RelationshipFlags, Error> {
        if user == friend {
            self.load(user).await?;
            return Ok(RelationshipFlags::default());
        }
        let mut pair = self.load_pair(user, friend).await?;
        let expected = pair.state();
        if !pair.remove_friend() {
            return Ok(pair.actor().flags_towards(friend));
        }
        let flags = self.commit(expected, &pair, None).await?;
        info!(requester = %user, target = %friend, "friendship removed");
        Ok(flags)
    }
}

#[cfg(test)]
#[path = "relationship_service_tests.rs"]
mod tests;
