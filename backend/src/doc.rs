//! OpenAPI documentation for the REST API.
//!
//! [`ApiDoc`] registers every handler under `crate::inbound::http`, the
//! domain read models they return and the session cookie security scheme.
//! Swagger UI serves it in debug builds and `cargo run --bin openapi-dump`
//! prints it for client generators.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    ActivityDay, AnimeListEntry, DetailedStats, EnrichedTitle, ListStats, NotificationKind,
    NotificationView, OwnProfile, PlayerInfo, ProfilePatch, PublicProfile, RelationshipFlags,
    Resolution, SocialLinks, SocialLinksPatch, TitleDetails, TitleMetadata, TitleSummary,
    UserSummary, WatchEvent, WatchStatus,
};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::catalog::TitleUnavailable;
use crate::inbound::http::list::{LogEpisodeBody, UpsertEntryBody};
use crate::inbound::http::notifications::{MarkReadResponse, UnreadCountResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Name of the cookie-based security scheme.
pub const SESSION_SCHEME: &str = "SessionCookie";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            SESSION_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login or /api/auth/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Anitrack backend API",
        description = "Watch lists, watch history, friendships and notifications for anime fans."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::upload_avatar,
        crate::inbound::http::users::upload_cover,
        crate::inbound::http::users::public_profile,
        crate::inbound::http::users::stats,
        crate::inbound::http::users::recent,
        crate::inbound::http::users::detailed_stats,
        crate::inbound::http::users::activity,
        crate::inbound::http::users::request_friend,
        crate::inbound::http::users::accept_friend,
        crate::inbound::http::users::reject_friend,
        crate::inbound::http::users::remove_friend,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::unread_count,
        crate::inbound::http::list::get_list,
        crate::inbound::http::list::upsert_entry,
        crate::inbound::http::list::remove_entry,
        crate::inbound::http::list::list_details,
        crate::inbound::http::list::log_episode,
        crate::inbound::http::catalog::title_details,
        crate::inbound::http::catalog::player,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        OwnProfile,
        PublicProfile,
        ProfilePatch,
        SocialLinks,
        SocialLinksPatch,
        UserSummary,
        RelationshipFlags,
        NotificationView,
        NotificationKind,
        Resolution,
        MarkReadResponse,
        UnreadCountResponse,
        AnimeListEntry,
        WatchStatus,
        TitleMetadata,
        TitleSummary,
        UpsertEntryBody,
        LogEpisodeBody,
        WatchEvent,
        ListStats,
        DetailedStats,
        ActivityDay,
        EnrichedTitle,
        TitleDetails,
        TitleUnavailable,
        PlayerInfo,
    )),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "users", description = "Own and public profiles"),
        (name = "friends", description = "Friend requests and friendships"),
        (name = "stats", description = "Public list statistics and watch activity"),
        (name = "notifications", description = "Notification inbox"),
        (name = "list", description = "Watch list and episode history"),
        (name = "catalog", description = "Catalog gateway"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
