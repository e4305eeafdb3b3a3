//! User identity and profile model.
//!
//! A [`User`] owns its credentials and profile. Relationship sets, list
//! entries and watch history live in their own modules and repositories so
//! that each can be mutated without rewriting the whole record.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum nickname length in characters.
pub const NICKNAME_MAX: usize = 30;
/// Maximum bio length in characters.
pub const BIO_MAX: usize = 200;
/// Maximum length of a single social link.
pub const SOCIAL_LINK_MAX: usize = 200;
/// Maximum sticker length in characters.
pub const STICKER_MAX: usize = 64;

/// Validation errors for user identity and profile values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    InvalidEmail,
    TooLong { field: &'static str, max: usize },
}

impl UserValidationError {
    /// Name of the offending field, used in error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::InvalidEmail => "email",
            Self::TooLong { field, .. } => field,
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::TooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self::from_uuid(parsed))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login email, stored trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalise and validate an email address.
    ///
    /// # Examples
    /// ```
    /// use anitrack::domain::Email;
    ///
    /// let email = Email::new("  Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Part before the `@`, used as a fallback display name.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque credential hash produced by a `CredentialHasher` adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Trim `raw`, map blank to `None` and enforce a character limit.
fn bounded_text(
    raw: &str,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(UserValidationError::TooLong { field, max });
    }
    Ok(Some(trimmed.to_owned()))
}

/// External profile links shown on the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
}

/// Partial update for [`SocialLinks`]; `None` leaves a link untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinksPatch {
    pub website: Option<String>,
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub vk: Option<String>,
    pub discord: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    pub bio: Option<String>,
    pub social_links: SocialLinks,
    pub sticker: Option<String>,
}

/// Partial profile update. Absent fields are kept; blank strings clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub social_links: Option<SocialLinksPatch>,
    pub sticker: Option<String>,
}

impl UserProfile {
    /// Apply `patch`, validating every supplied field before mutating.
    ///
    /// # Examples
    /// ```
    /// use anitrack::domain::{ProfilePatch, UserProfile};
    ///
    /// let mut profile = UserProfile::default();
    /// profile
    ///     .apply(ProfilePatch {
    ///         nickname: Some(" Rin ".into()),
    ///         ..ProfilePatch::default()
    ///     })
    ///     .expect("valid patch");
    /// assert_eq!(profile.nickname.as_deref(), Some("Rin"));
    /// ```
    pub fn apply(&mut self, patch: ProfilePatch) -> Result<(), UserValidationError> {
        let mut next = self.clone();
        if let Some(raw) = patch.nickname {
            next.nickname = bounded_text(&raw, "nickname", NICKNAME_MAX)?;
        }
        if let Some(raw) = patch.bio {
            next.bio = bounded_text(&raw, "bio", BIO_MAX)?;
        }
        if let Some(raw) = patch.sticker {
            next.sticker = bounded_text(&raw, "sticker", STICKER_MAX)?;
        }
        if let Some(links) = patch.social_links {
            let slots = [
                (links.website, &mut next.social_links.website, "socialLinks.website"),
                (links.telegram, &mut next.social_links.telegram, "socialLinks.telegram"),
                (links.twitter, &mut next.social_links.twitter, "socialLinks.twitter"),
                (links.vk, &mut next.social_links.vk, "socialLinks.vk"),
                (links.discord, &mut next.social_links.discord, "socialLinks.discord"),
            ];
            for (value, slot, field) in slots {
                if let Some(raw) = value {
                    *slot = bounded_text(&raw, field, SOCIAL_LINK_MAX)?;
                }
            }
        }
        *self = next;
        Ok(())
    }
}

/// Registered account with its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    password_hash: PasswordHash,
    pub profile: UserProfile,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from stored parts.
    pub fn new(
        id: UserId,
        email: Email,
        password_hash: PasswordHash,
        profile: UserProfile,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            profile,
            created_at,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Stored credential hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Registration timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Name shown to other users: the nickname, else the email local part.
    pub fn display_name(&self) -> &str {
        self.profile
            .nickname
            .as_deref()
            .unwrap_or_else(|| self.email.local_part())
    }

    /// Compact view used in friend lists.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            nickname: self.display_name().to_owned(),
            avatar_url: self.profile.avatar_url.clone(),
            sticker: self.profile.sticker.clone(),
        }
    }
}

/// Compact user reference used in friend lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    #[schema(example = "rin")]
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<String>,
}
