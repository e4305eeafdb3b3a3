//! Notification records delivered to users.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{UserId, UserSummary};

/// Stable notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Wrap a stored UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed set of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FriendRequest,
}

impl NotificationKind {
    /// Storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FriendRequest => "friend_request",
        }
    }

    /// Parse a storage label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "friend_request" => Some(Self::FriendRequest),
            _ => None,
        }
    }
}

/// Processing state of an actionable notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Pending,
    Accepted,
    Rejected,
}

impl Resolution {
    /// Storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a storage label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Stored notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub actor: Option<UserId>,
    pub read: bool,
    pub message: String,
    pub resolution: Resolution,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification; new records are unread and pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub actor: Option<UserId>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    /// Materialise the stored record.
    pub fn into_notification(self) -> Notification {
        Notification {
            id: self.id,
            recipient: self.recipient,
            kind: self.kind,
            actor: self.actor,
            read: false,
            message: self.message,
            resolution: Resolution::Pending,
            created_at: self.created_at,
        }
    }
}

/// Notification side effect committed together with a relationship change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationChange {
    /// Insert a new notification.
    Create(NewNotification),
    /// Resolve pending friend requests from `actor` to `recipient`.
    Resolve {
        recipient: UserId,
        actor: UserId,
        resolution: Resolution,
    },
}

impl Notification {
    /// Whether a [`NotificationChange::Resolve`] targets this record.
    pub fn is_pending_request(&self, recipient: &UserId, actor: &UserId) -> bool {
        self.kind == NotificationKind::FriendRequest
            && self.resolution == Resolution::Pending
            && self.recipient == *recipient
            && self.actor.as_ref() == Some(actor)
    }
}

/// Order by creation time and keep the first record seen for each id.
pub fn dedupe_by_id(mut notifications: Vec<Notification>) -> Vec<Notification> {
    notifications.sort_by_key(|n| n.created_at);
    let mut seen = HashSet::new();
    notifications.retain(|n| seen.insert(n.id));
    notifications
}

/// Notification as shown to its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    #[schema(value_type = String, format = "uuid")]
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<UserSummary>,
    pub read: bool,
    pub message: String,
    pub resolution: Resolution,
    pub created_at: DateTime<Utc>,
}

impl NotificationView {
    /// Attach the resolved actor summary.
    pub fn new(notification: Notification, from: Option<UserSummary>) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            from,
            read: notification.read,
            message: notification.message,
            resolution: notification.resolution,
            created_at: notification.created_at,
        }
    }
}
