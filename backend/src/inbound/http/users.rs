//! Profile, statistics and friendship handlers.
//!
//! ```text
//! GET    /api/users/me
//! PUT    /api/users/me                  {"nickname":"Rin","bio":""}
//! POST   /api/users/me/avatar           multipart/form-data, part "avatar"
//! POST   /api/users/me/cover            multipart/form-data, part "cover"
//! GET    /api/users/{id}
//! GET    /api/users/{id}/stats
//! GET    /api/users/{id}/recent?limit=20
//! GET    /api/users/{id}/detailed-stats
//! GET    /api/users/{id}/activity?days=365
//! POST   /api/users/{id}/request-friend
//! POST   /api/users/{id}/accept-friend
//! POST   /api/users/{id}/reject-friend
//! DELETE /api/users/{id}/friend
//! ```

use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpMessage, HttpRequest, delete, get, post, put, web};
use futures_util::StreamExt as _;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{
    ActivityDay, DetailedStats, Error, ImageSlot, ImageUpload, ImageValidationError, ListStats,
    MAX_IMAGE_BYTES, OwnProfile, ProfilePatch, PublicProfile, RelationshipFlags, UserId,
    WatchEvent,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    field_error, map_image_error, missing_field_error, parse_user_id,
};

/// Query for `GET /api/users/{id}/recent`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RecentQuery {
    /// Number of events, 1 to 100; defaults to 20.
    pub limit: Option<usize>,
}

/// Query for `GET /api/users/{id}/activity`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ActivityQuery {
    /// Window length in days; defaults to 365.
    pub days: Option<u32>,
}

fn target(path: &web::Path<String>) -> Result<UserId, Error> {
    parse_user_id(path.as_str(), "id")
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Own profile", body = OwnProfile),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<OwnProfile>> {
    let user = session.require_user()?;
    Ok(web::Json(state.profiles.own_profile(&user).await?))
}

/// Partially update the caller's profile. Empty strings clear a field.
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Updated profile", body = OwnProfile),
        (status = 400, description = "Field too long", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    patch: web::Json<ProfilePatch>,
) -> ApiResult<web::Json<OwnProfile>> {
    let user = session.require_user()?;
    let profile = state
        .profile_updates
        .update_profile(&user, patch.into_inner())
        .await?;
    Ok(web::Json(profile))
}

const MULTIPART_FORM: &str = "multipart/form-data";

/// Append a chunk unless the part would outgrow the image limit.
fn append_capped(field: &str, bytes: &mut Vec<u8>, chunk: &[u8]) -> Result<(), Error> {
    let actual = bytes.len() + chunk.len();
    if actual > MAX_IMAGE_BYTES {
        return Err(map_image_error(
            field,
            ImageValidationError::TooLarge {
                max: MAX_IMAGE_BYTES,
                actual,
            },
        ));
    }
    bytes.extend_from_slice(chunk);
    Ok(())
}

fn multipart_error(error: MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart body: {error}"))
        .with_details(json!({ "code": "invalid_multipart" }))
}

/// Pull the image part named after `slot` out of a `multipart/form-data`
/// body. Other parts are read and discarded under the same size cap.
async fn read_image(
    req: &HttpRequest,
    mut payload: Multipart,
    slot: ImageSlot,
) -> Result<ImageUpload, Error> {
    let name = slot.as_str();
    if req.content_type() != MULTIPART_FORM {
        return Err(field_error(
            "content-type",
            "unsupported_media_type",
            format!("uploads must be sent as {MULTIPART_FORM}"),
        ));
    }

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let field_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_name())
            .map(str::to_owned);
        let wanted = field_name.as_deref() == Some(name);
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_owned())
            .unwrap_or_default();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            append_capped(field_name.as_deref().unwrap_or(name), &mut bytes, &chunk)?;
        }
        if wanted {
            return ImageUpload::new(&content_type, bytes)
                .map_err(|error| map_image_error(name, error));
        }
    }
    Err(missing_field_error(name))
}

async fn upload(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Multipart,
    slot: ImageSlot,
) -> ApiResult<web::Json<OwnProfile>> {
    let user = session.require_user()?;
    let image = read_image(&req, payload, slot).await?;
    Ok(web::Json(
        state.profile_updates.set_image(&user, slot, image).await?,
    ))
}

/// Replace the avatar with the `avatar` part of a multipart form.
#[utoipa::path(
    post,
    path = "/api/users/me/avatar",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated profile", body = OwnProfile),
        (status = 400, description = "Missing part, unsupported type or too large", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "uploadAvatar"
)]
#[post("/users/me/avatar")]
pub async fn upload_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Multipart,
) -> ApiResult<web::Json<OwnProfile>> {
    upload(state, session, req, payload, ImageSlot::Avatar).await
}

/// Replace the cover image with the `cover` part of a multipart form.
#[utoipa::path(
    post,
    path = "/api/users/me/cover",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated profile", body = OwnProfile),
        (status = 400, description = "Missing part, unsupported type or too large", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "uploadCover"
)]
#[post("/users/me/cover")]
pub async fn upload_cover(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Multipart,
) -> ApiResult<web::Json<OwnProfile>> {
    upload(state, session, req, payload, ImageSlot::Cover).await
}

/// Public profile, with relationship flags relative to the caller.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "publicProfile",
    security([])
)]
#[get("/users/{id}")]
pub async fn public_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicProfile>> {
    let user = target(&path)?;
    let viewer = session.user_id()?;
    Ok(web::Json(state.profiles.public_profile(viewer, &user).await?))
}

/// Entry counts per status.
#[utoipa::path(
    get,
    path = "/api/users/{id}/stats",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Counts", body = ListStats),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "userStats",
    security([])
)]
#[get("/users/{id}/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ListStats>> {
    let user = target(&path)?;
    Ok(web::Json(state.list_query.stats(&user).await?))
}

/// Newest watch events first.
#[utoipa::path(
    get,
    path = "/api/users/{id}/recent",
    params(("id" = String, Path, description = "User id"), RecentQuery),
    responses(
        (status = 200, description = "Recent events", body = [WatchEvent]),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "userRecent",
    security([])
)]
#[get("/users/{id}/recent")]
pub async fn recent(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<RecentQuery>,
) -> ApiResult<web::Json<Vec<WatchEvent>>> {
    let user = target(&path)?;
    Ok(web::Json(state.list_query.recent(&user, query.limit).await?))
}

/// Entries grouped by status.
#[utoipa::path(
    get,
    path = "/api/users/{id}/detailed-stats",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Grouped entries", body = DetailedStats),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "userDetailedStats",
    security([])
)]
#[get("/users/{id}/detailed-stats")]
pub async fn detailed_stats(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DetailedStats>> {
    let user = target(&path)?;
    Ok(web::Json(state.list_query.detailed_stats(&user).await?))
}

/// Episodes logged per UTC day; empty days are omitted.
#[utoipa::path(
    get,
    path = "/api/users/{id}/activity",
    params(("id" = String, Path, description = "User id"), ActivityQuery),
    responses(
        (status = 200, description = "Daily counts", body = [ActivityDay]),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "userActivity",
    security([])
)]
#[get("/users/{id}/activity")]
pub async fn activity(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<ActivityQuery>,
) -> ApiResult<web::Json<Vec<ActivityDay>>> {
    let user = target(&path)?;
    Ok(web::Json(state.list_query.activity(&user, query.days).await?))
}

/// Send a friend request to `{id}`.
#[utoipa::path(
    post,
    path = "/api/users/{id}/request-friend",
    params(("id" = String, Path, description = "Target user id")),
    responses(
        (status = 200, description = "Flags after the request", body = RelationshipFlags),
        (status = 400, description = "Self request", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Already friends or requested", body = ErrorSchema)
    ),
    tags = ["friends"],
    operation_id = "requestFriend"
)]
#[post("/users/{id}/request-friend")]
pub async fn request_friend(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RelationshipFlags>> {
    let requester = session.require_user()?;
    let other = target(&path)?;
    Ok(web::Json(
        state.relationships.send_request(&requester, &other).await?,
    ))
}

/// Accept the pending request from `{id}`.
#[utoipa::path(
    post,
    path = "/api/users/{id}/accept-friend",
    params(("id" = String, Path, description = "Requesting user id")),
    responses(
        (status = 200, description = "Flags after accepting", body = RelationshipFlags),
        (status = 404, description = "No such request", body = ErrorSchema)
    ),
    tags = ["friends"],
    operation_id = "acceptFriend"
)]
#[post("/users/{id}/accept-friend")]
pub async fn accept_friend(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RelationshipFlags>> {
    let accepter = session.require_user()?;
    let requester = target(&path)?;
    Ok(web::Json(
        state
            .relationships
            .accept_request(&accepter, &requester)
            .await?,
    ))
}

/// Decline the pending request from `{id}`.
#[utoipa::path(
    post,
    path = "/api/users/{id}/reject-friend",
    params(("id" = String, Path, description = "Requesting user id")),
    responses(
        (status = 200, description = "Flags after rejecting", body = RelationshipFlags),
        (status = 404, description = "No such request", body = ErrorSchema)
    ),
    tags = ["friends"],
    operation_id = "rejectFriend"
)]
#[post("/users/{id}/reject-friend")]
pub async fn reject_friend(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RelationshipFlags>> {
    let accepter = session.require_user()?;
    let requester = target(&path)?;
    Ok(web::Json(
        state
            .relationships
            .reject_request(&accepter, &requester)
            .await?,
    ))
}

/// Remove `{id}` from the caller's friends. Idempotent.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/friend",
    params(("id" = String, Path, description = "Friend user id")),
    responses(
        (status = 200, description = "Flags after removal", body = RelationshipFlags),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["friends"],
    operation_id = "removeFriend"
)]
#[delete("/users/{id}/friend")]
pub async fn remove_friend(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RelationshipFlags>> {
    let user = session.require_user()?;
    let friend = target(&path)?;
    Ok(web::Json(
        state.relationships.remove_friend(&user, &friend).await?,
    ))
}
