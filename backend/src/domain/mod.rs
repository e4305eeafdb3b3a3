//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP and
//! persistence layers, and the services that implement the driving ports in
//! [`ports`]. Services depend only on port traits so adapters can be swapped
//! between the Diesel, in-memory and fixture implementations.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - Users and credentials: [`User`], [`UserId`], [`Email`], [`Registration`].
//! - Social graph: [`Relationships`], [`RelationshipPair`], [`RelationshipFlags`].
//! - Tracking: [`AnimeListEntry`], [`WatchStatus`], [`WatchEvent`], stats types.
//! - Notifications: [`Notification`], [`NotificationView`].
//! - Services: one per driving port.

pub mod ports;

pub(crate) mod account_service;
mod anime_list;
mod auth;
mod catalog;
mod error;
mod list_enrichment;
pub(crate) mod list_service;
mod media;
mod notification;
pub(crate) mod notification_service;
mod profile;
pub(crate) mod profile_service;
mod relationship_service;
mod relationships;
mod trace_id;
mod user;
mod watch_status;

pub use self::account_service::AccountService;
pub use self::anime_list::{
    ActivityDay, AnimeListEntry, DetailedStats, ListStats, TITLE_ID_MAX, TitleId, TitleIdError,
    TitleMetadata, TitleSummary, WatchEvent, activity_by_day, sort_by_recent_update,
};
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN, Registration,
};
pub use self::catalog::{
    CatalogService, PlayerInfo, TITLE_UNAVAILABLE_MESSAGE, TitleDetails, TitleLookup,
};
pub use self::error::{Error, ErrorCode};
pub use self::list_enrichment::{
    EnrichedTitle, EnrichmentConfig, EnrichmentHandle, EnrichmentSleeper, ListDetailsService,
    ListEnricher, PLACEHOLDER_POSTER, TokioSleeper,
};
pub use self::list_service::{
    ACTIVITY_DEFAULT_DAYS, ACTIVITY_MAX_DAYS, ListService, RECENT_DEFAULT_LIMIT, RECENT_MAX_LIMIT,
};
pub use self::media::{ImageSlot, ImageType, ImageUpload, ImageValidationError, MAX_IMAGE_BYTES};
pub use self::notification::{
    NewNotification, Notification, NotificationChange, NotificationId, NotificationKind,
    NotificationView, Resolution, dedupe_by_id,
};
pub use self::notification_service::NotificationService;
pub use self::profile::{OwnProfile, PublicProfile};
pub use self::profile_service::ProfileService;
pub use self::relationship_service::RelationshipService;
pub use self::relationships::{
    PairState, RelationshipError, RelationshipFlags, RelationshipPair, Relationships,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    BIO_MAX, Email, NICKNAME_MAX, PasswordHash, ProfilePatch, SOCIAL_LINK_MAX, STICKER_MAX,
    SocialLinks, SocialLinksPatch, User, UserId, UserProfile, UserSummary, UserValidationError,
};
pub use self::watch_status::{StatusNormalization, UnknownStatus, WatchStatus, normalize_status};

