//! Friend and friend-request state for user pairs.
//!
//! Each user owns three sets (`friends`, `sent`, `received`). For any pair
//! of users the sets must agree: B in A.sent iff A in B.received, friendship
//! is symmetric, and a pair appears in at most one of the three relations.
//! [`RelationshipPair`] applies transitions to both sides at once and
//! reduces the result to a [`PairState`] that persistence writes atomically.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;

/// Relationship sets held by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationships {
    user: UserId,
    friends: BTreeSet<UserId>,
    sent: BTreeSet<UserId>,
    received: BTreeSet<UserId>,
}

impl Relationships {
    /// Empty relationship sets for `user`.
    pub fn empty(user: UserId) -> Self {
        Self {
            user,
            friends: BTreeSet::new(),
            sent: BTreeSet::new(),
            received: BTreeSet::new(),
        }
    }

    /// Rebuild from stored sets, dropping self references.
    pub fn from_parts(
        user: UserId,
        friends: impl IntoIterator<Item = UserId>,
        sent: impl IntoIterator<Item = UserId>,
        received: impl IntoIterator<Item = UserId>,
    ) -> Self {
        let keep = |id: &UserId| *id != user;
        Self {
            friends: friends.into_iter().filter(keep).collect(),
            sent: sent.into_iter().filter(keep).collect(),
            received: received.into_iter().filter(keep).collect(),
            user,
        }
    }

    /// Owner of these sets.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Mutual friends.
    pub fn friends(&self) -> &BTreeSet<UserId> {
        &self.friends
    }

    /// Outgoing pending requests.
    pub fn sent(&self) -> &BTreeSet<UserId> {
        &self.sent
    }

    /// Incoming pending requests.
    pub fn received(&self) -> &BTreeSet<UserId> {
        &self.received
    }

    /// Flags describing how this user relates to `other`.
    pub fn flags_towards(&self, other: &UserId) -> RelationshipFlags {
        RelationshipFlags {
            is_friend: self.friends.contains(other),
            request_sent: self.sent.contains(other),
            request_received: self.received.contains(other),
        }
    }

    /// The single relation this user holds with `other`.
    pub fn state_towards(&self, other: &UserId) -> PairState {
        if self.friends.contains(other) {
            PairState::Friends
        } else if self.sent.contains(other) {
            PairState::Pending {
                from: self.user.clone(),
                to: other.clone(),
            }
        } else if self.received.contains(other) {
            PairState::Pending {
                from: other.clone(),
                to: self.user.clone(),
            }
        } else {
            PairState::Unrelated
        }
    }

    fn forget(&mut self, other: &UserId) {
        self.friends.remove(other);
        self.sent.remove(other);
        self.received.remove(other);
    }
}

/// How a viewer relates to another user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipFlags {
    pub is_friend: bool,
    pub request_sent: bool,
    pub request_received: bool,
}

/// Relationship state violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipError {
    /// A user cannot befriend themselves.
    InvalidTarget,
    /// The users are already friends.
    AlreadyFriends,
    /// The requester already has a pending request to the target.
    AlreadyRequested,
    /// The target already sent a request to the requester.
    IncomingRequestPending,
    /// There is no pending request to accept or reject.
    NoSuchRequest,
}

impl RelationshipError {
    /// Stable code used in error details.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidTarget => "invalid_target",
            Self::AlreadyFriends => "already_friends",
            Self::AlreadyRequested => "already_requested",
            Self::IncomingRequestPending => "incoming_request_pending",
            Self::NoSuchRequest => "no_such_request",
        }
    }
}

impl fmt::Display for RelationshipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidTarget => "you cannot send a friend request to yourself",
            Self::AlreadyFriends => "you are already friends",
            Self::AlreadyRequested => "friend request already sent",
            Self::IncomingRequestPending => "this user already sent you a friend request",
            Self::NoSuchRequest => "no pending friend request from this user",
        })
    }
}

impl std::error::Error for RelationshipError {}

/// Relation between two users after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairState {
    /// No relation.
    Unrelated,
    /// `from` asked `to` and is waiting for an answer.
    Pending { from: UserId, to: UserId },
    /// Mutual friends.
    Friends,
}

/// Both sides of a relationship, mutated together.
///
/// `actor` is the user performing the operation; `counterpart` is the other
/// side. Construction rejects pairs where both are the same user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipPair {
    actor: Relationships,
    counterpart: Relationships,
}

impl RelationshipPair {
    /// Pair two users' sets.
    pub fn new(actor: Relationships, counterpart: Relationships) -> Result<Self, RelationshipError> {
        if actor.user == counterpart.user {
            return Err(RelationshipError::InvalidTarget);
        }
        Ok(Self { actor, counterpart })
    }

    /// Acting user's sets.
    pub fn actor(&self) -> &Relationships {
        &self.actor
    }

    /// Other side's sets.
    pub fn counterpart(&self) -> &Relationships {
        &self.counterpart
    }

    /// Actor sends a friend request to the counterpart.
    pub fn send_request(&mut self) -> Result<(), RelationshipError> {
        let target = self.counterpart.user.clone();
        if self.actor.friends.contains(&target) {
            return Err(RelationshipError::AlreadyFriends);
        }
        if self.counterpart.received.contains(&self.actor.user) {
            return Err(RelationshipError::AlreadyRequested);
        }
        if self.actor.received.contains(&target) {
            return Err(RelationshipError::IncomingRequestPending);
        }
        self.actor.sent.insert(target);
        self.counterpart.received.insert(self.actor.user.clone());
        Ok(())
    }

    /// Actor accepts the counterpart's pending request.
    pub fn accept_request(&mut self) -> Result<(), RelationshipError> {
        self.clear_pending_request()?;
        self.actor.friends.insert(self.counterpart.user.clone());
        self.counterpart.friends.insert(self.actor.user.clone());
        Ok(())
    }

    /// Actor declines the counterpart's pending request.
    pub fn reject_request(&mut self) -> Result<(), RelationshipError> {
        self.clear_pending_request()
    }

    /// Drop the friendship on both sides; returns whether anything changed.
    pub fn remove_friend(&mut self) -> bool {
        let removed_here = self.actor.friends.remove(&self.counterpart.user);
        let removed_there = self.counterpart.friends.remove(&self.actor.user);
        removed_here || removed_there
    }

    /// Reduce both sides to the single relation they describe.
    pub fn state(&self) -> PairState {
        self.actor.state_towards(&self.counterpart.user)
    }

    /// Check the mirror and exclusivity rules for this pair.
    pub fn is_consistent(&self) -> bool {
        let a = &self.actor;
        let b = &self.counterpart;
        let mirrored = a.sent.contains(&b.user) == b.received.contains(&a.user)
            && a.received.contains(&b.user) == b.sent.contains(&a.user)
            && a.friends.contains(&b.user) == b.friends.contains(&a.user);
        let relations = [
            a.friends.contains(&b.user),
            a.sent.contains(&b.user),
            a.received.contains(&b.user),
        ];
        mirrored && relations.iter().filter(|held| **held).count() <= 1
    }

    /// Apply a pair state to both sides, replacing whatever they held.
    pub fn apply_state(&mut self, state: &PairState) {
        let a = self.actor.user.clone();
        let b = self.counterpart.user.clone();
        self.actor.forget(&b);
        self.counterpart.forget(&a);
        match state {
            PairState::Unrelated => {}
            PairState::Friends => {
                self.actor.friends.insert(b);
                self.counterpart.friends.insert(a);
            }
            PairState::Pending { from, to } => {
                let (sender, receiver) = if *from == a {
                    (&mut self.actor, &mut self.counterpart)
                } else {
                    (&mut self.counterpart, &mut self.actor)
                };
                sender.sent.insert(to.clone());
                receiver.received.insert(from.clone());
            }
        }
    }

    fn clear_pending_request(&mut self) -> Result<(), RelationshipError> {
        if !self.actor.received.contains(&self.counterpart.user) {
            return Err(RelationshipError::NoSuchRequest);
        }
        self.actor.received.remove(&self.counterpart.user);
        self.counterpart.sent.remove(&self.actor.user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Pair transition coverage, including the mirror invariant.

    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn alice() -> UserId {
        UserId::new("11111111-1111-1111-1111-111111111111").expect("fixture id")
    }

    #[fixture]
    fn bob() -> UserId {
        UserId::new("22222222-2222-2222-2222-222222222222").expect("fixture id")
    }

    fn pair(actor: &UserId, counterpart: &UserId) -> RelationshipPair {
        RelationshipPair::new(
            Relationships::empty(actor.clone()),
            Relationships::empty(counterpart.clone()),
        )
        .expect("distinct users")
    }

    fn swap(pair: RelationshipPair) -> RelationshipPair {
        RelationshipPair::new(pair.counterpart, pair.actor).expect("distinct users")
    }

    #[rstest]
    fn self_pair_is_invalid_target(alice: UserId) {
        let result = RelationshipPair::new(
            Relationships::empty(alice.clone()),
            Relationships::empty(alice),
        );
        assert_eq!(result, Err(RelationshipError::InvalidTarget));
    }

    #[rstest]
    fn send_request_mirrors_both_sides(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.send_request().expect("send");
        assert!(pair.actor().sent().contains(&bob));
        assert!(pair.counterpart().received().contains(&alice));
        assert!(pair.is_consistent());
        assert_eq!(
            pair.state(),
            PairState::Pending {
                from: alice,
                to: bob
            }
        );
    }

    #[rstest]
    fn duplicate_request_is_rejected(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.send_request().expect("first send");
        assert_eq!(pair.send_request(), Err(RelationshipError::AlreadyRequested));
    }

    #[rstest]
    fn request_against_incoming_request_is_rejected(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.send_request().expect("alice asks bob");
        let mut reversed = swap(pair);
        assert_eq!(
            reversed.send_request(),
            Err(RelationshipError::IncomingRequestPending)
        );
    }

    #[rstest]
    fn accept_makes_symmetric_friends(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.send_request().expect("send");
        let mut accepting = swap(pair);
        accepting.accept_request().expect("accept");

        assert!(accepting.actor().friends().contains(&alice));
        assert!(accepting.counterpart().friends().contains(&bob));
        assert!(accepting.actor().received().is_empty());
        assert!(accepting.counterpart().sent().is_empty());
        assert!(accepting.is_consistent());
        assert_eq!(accepting.state(), PairState::Friends);
    }

    #[rstest]
    fn reject_never_inserts_friends(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.send_request().expect("send");
        let mut rejecting = swap(pair);
        rejecting.reject_request().expect("reject");

        assert!(rejecting.actor().friends().is_empty());
        assert!(rejecting.counterpart().friends().is_empty());
        assert_eq!(rejecting.state(), PairState::Unrelated);
    }

    #[rstest]
    fn accept_without_request_fails(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        assert_eq!(pair.accept_request(), Err(RelationshipError::NoSuchRequest));
        assert_eq!(pair.reject_request(), Err(RelationshipError::NoSuchRequest));
    }

    #[rstest]
    fn requester_cannot_accept_own_request(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.send_request().expect("send");
        assert_eq!(pair.accept_request(), Err(RelationshipError::NoSuchRequest));
    }

    #[rstest]
    fn already_friends_cannot_request(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.apply_state(&PairState::Friends);
        assert_eq!(pair.send_request(), Err(RelationshipError::AlreadyFriends));
    }

    #[rstest]
    fn remove_friend_is_idempotent(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.apply_state(&PairState::Friends);
        assert!(pair.remove_friend());
        assert!(!pair.remove_friend());
        assert_eq!(pair.state(), PairState::Unrelated);
    }

    #[rstest]
    fn apply_state_replaces_previous_relation(alice: UserId, bob: UserId) {
        let mut pair = pair(&alice, &bob);
        pair.send_request().expect("send");
        pair.apply_state(&PairState::Pending {
            from: bob.clone(),
            to: alice.clone(),
        });
        assert!(pair.actor().received().contains(&bob));
        assert!(!pair.actor().sent().contains(&bob));
        assert!(pair.is_consistent());
    }

    #[rstest]
    fn from_parts_drops_self_references(alice: UserId, bob: UserId) {
        let rels = Relationships::from_parts(
            alice.clone(),
            [alice.clone(), bob.clone()],
            [alice.clone()],
            Vec::new(),
        );
        assert_eq!(rels.friends().len(), 1);
        assert!(rels.sent().is_empty());
        assert!(rels.flags_towards(&bob).is_friend);
    }
}
