//! Internal Diesel row structs and their domain conversions.
//!
//! Rows never leave the persistence layer. Conversions from rows return
//! `Result<_, String>` so each repository can wrap failures in its own port
//! error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    AnimeListEntry, Email, NewNotification, Notification, NotificationId, NotificationKind,
    PasswordHash, Resolution, SocialLinks, TitleId, User, UserId, UserProfile, WatchEvent,
    WatchStatus,
};

use super::schema::{anime_list_entries, notifications, users, watch_history};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    pub bio: Option<String>,
    pub social_links: serde_json::Value,
    pub sticker: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub nickname: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub cover_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub social_links: serde_json::Value,
    pub sticker: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Profile columns rewritten by a profile edit; `None` clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserProfileUpdate<'a> {
    pub nickname: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub cover_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub social_links: serde_json::Value,
    pub sticker: Option<&'a str>,
}

fn social_links_json(links: &SocialLinks) -> serde_json::Value {
    serde_json::to_value(links).unwrap_or_else(|_| serde_json::json!({}))
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn from_user(user: &'a User) -> Self {
        let profile = &user.profile;
        Self {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: user.password_hash().as_ref(),
            nickname: profile.nickname.as_deref(),
            avatar_url: profile.avatar_url.as_deref(),
            cover_url: profile.cover_url.as_deref(),
            bio: profile.bio.as_deref(),
            social_links: social_links_json(&profile.social_links),
            sticker: profile.sticker.as_deref(),
            created_at: user.created_at(),
        }
    }
}

impl<'a> UserProfileUpdate<'a> {
    pub(crate) fn from_profile(profile: &'a UserProfile) -> Self {
        Self {
            nickname: profile.nickname.as_deref(),
            avatar_url: profile.avatar_url.as_deref(),
            cover_url: profile.cover_url.as_deref(),
            bio: profile.bio.as_deref(),
            social_links: social_links_json(&profile.social_links),
            sticker: profile.sticker.as_deref(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(&row.email).map_err(|err| format!("stored email invalid: {err}"))?;
        let social_links = serde_json::from_value(row.social_links).unwrap_or_else(|error| {
            warn!(user_id = %row.id, %error, "unreadable social links, using empty set");
            SocialLinks::default()
        });
        Ok(User::new(
            UserId::from_uuid(row.id),
            email,
            PasswordHash::new(row.password_hash),
            UserProfile {
                nickname: row.nickname,
                avatar_url: row.avatar_url,
                cover_url: row.cover_url,
                bio: row.bio,
                social_links,
                sticker: row.sticker,
            },
            row.created_at,
        ))
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = anime_list_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnimeListEntryRow {
    pub user_id: Uuid,
    pub title_id: String,
    pub status: String,
    pub title: Option<String>,
    pub poster_url: Option<String>,
    pub episodes_total: Option<i32>,
    pub last_watched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnimeListEntryRow {
    pub(crate) fn from_entry(user: &UserId, entry: &AnimeListEntry) -> Self {
        Self {
            user_id: *user.as_uuid(),
            title_id: entry.title_id.as_ref().to_owned(),
            status: entry.status.as_str().to_owned(),
            title: entry.title.clone(),
            poster_url: entry.poster_url.clone(),
            episodes_total: entry
                .episodes_total
                .and_then(|n| i32::try_from(n).ok()),
            last_watched_at: entry.last_watched_at,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl TryFrom<AnimeListEntryRow> for AnimeListEntry {
    type Error = String;

    fn try_from(row: AnimeListEntryRow) -> Result<Self, Self::Error> {
        let title_id =
            TitleId::new(&row.title_id).map_err(|err| format!("stored title id invalid: {err}"))?;
        let status: WatchStatus = row
            .status
            .parse()
            .map_err(|err| format!("stored status invalid: {err}"))?;
        Ok(AnimeListEntry {
            title_id,
            status,
            title: row.title,
            poster_url: row.poster_url,
            episodes_total: row.episodes_total.and_then(|n| u32::try_from(n).ok()),
            last_watched_at: row.last_watched_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = watch_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WatchEventRow {
    pub title_id: String,
    pub title: Option<String>,
    pub episode: i32,
    pub watched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = watch_history)]
pub(crate) struct NewWatchEventRow<'a> {
    pub user_id: Uuid,
    pub title_id: &'a str,
    pub title: Option<&'a str>,
    pub episode: i32,
    pub watched_at: DateTime<Utc>,
}

impl<'a> NewWatchEventRow<'a> {
    pub(crate) fn from_event(user: &UserId, event: &'a WatchEvent) -> Result<Self, String> {
        Ok(Self {
            user_id: *user.as_uuid(),
            title_id: event.title_id.as_ref(),
            title: event.title.as_deref(),
            episode: i32::try_from(event.episode)
                .map_err(|_| format!("episode {} out of range", event.episode))?,
            watched_at: event.watched_at,
        })
    }
}

impl TryFrom<WatchEventRow> for WatchEvent {
    type Error = String;

    fn try_from(row: WatchEventRow) -> Result<Self, Self::Error> {
        Ok(WatchEvent {
            title_id: TitleId::new(&row.title_id)
                .map_err(|err| format!("stored title id invalid: {err}"))?,
            title: row.title,
            episode: u32::try_from(row.episode)
                .map_err(|_| format!("stored episode {} invalid", row.episode))?,
            watched_at: row.watched_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: String,
    pub actor_id: Option<Uuid>,
    pub read: bool,
    pub message: String,
    pub resolution: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: &'static str,
    pub actor_id: Option<Uuid>,
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewNotificationRow<'a> {
    pub(crate) fn from_new(notification: &'a NewNotification) -> Self {
        Self {
            id: *notification.id.as_uuid(),
            recipient_id: *notification.recipient.as_uuid(),
            kind: notification.kind.as_str(),
            actor_id: notification.actor.as_ref().map(|id| *id.as_uuid()),
            message: notification.message.as_str(),
            created_at: notification.created_at,
        }
    }
}

impl TryFrom<NotificationRow> for Notification {
    type Error = String;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = NotificationKind::parse(&row.kind)
            .ok_or_else(|| format!("stored notification kind invalid: {}", row.kind))?;
        let resolution = Resolution::parse(&row.resolution)
            .ok_or_else(|| format!("stored resolution invalid: {}", row.resolution))?;
        Ok(Notification {
            id: NotificationId::from_uuid(row.id),
            recipient: UserId::from_uuid(row.recipient_id),
            kind,
            actor: row.actor_id.map(UserId::from_uuid),
            read: row.read,
            message: row.message,
            resolution,
            created_at: row.created_at,
        })
    }
}
