//! Read models for profile pages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{RelationshipFlags, SocialLinks, User, UserId, UserSummary};

/// The signed-in user's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnProfile {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    #[schema(example = "rin@example.com")]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub social_links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
    pub created_at: DateTime<Utc>,
    pub friends: Vec<UserSummary>,
    /// Users waiting for an answer to their friend request.
    pub friend_requests: Vec<UserSummary>,
}

impl OwnProfile {
    /// Build from the stored user plus resolved relationship summaries.
    pub fn new(user: &User, friends: Vec<UserSummary>, friend_requests: Vec<UserSummary>) -> Self {
        let profile = &user.profile;
        Self {
            id: user.id().clone(),
            email: user.email().as_ref().to_owned(),
            nickname: profile.nickname.clone(),
            avatar_url: profile.avatar_url.clone(),
            cover_url: profile.cover_url.clone(),
            bio: profile.bio.clone(),
            social_links: profile.social_links.clone(),
            sticker: profile.sticker.clone(),
            created_at: user.created_at(),
            friends,
            friend_requests,
        }
    }
}

/// Another user's profile as seen by a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub social_links: SocialLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
    pub created_at: DateTime<Utc>,
    pub friends: Vec<UserSummary>,
    #[serde(flatten)]
    pub relationship: RelationshipFlags,
}

impl PublicProfile {
    /// Build the public view; `relationship` is all false for anonymous viewers.
    pub fn new(user: &User, friends: Vec<UserSummary>, relationship: RelationshipFlags) -> Self {
        let profile = &user.profile;
        Self {
            id: user.id().clone(),
            nickname: user.display_name().to_owned(),
            avatar_url: profile.avatar_url.clone(),
            cover_url: profile.cover_url.clone(),
            bio: profile.bio.clone(),
            social_links: profile.social_links.clone(),
            sticker: profile.sticker.clone(),
            created_at: user.created_at(),
            friends,
            relationship,
        }
    }
}
