//! Notification inbox handlers.

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::NotificationView;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Result of marking the inbox read.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    /// Number of notifications that changed from unread to read.
    pub updated: usize,
}

/// Unread badge count.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: usize,
}

/// The caller's notifications, oldest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Inbox", body = [NotificationView]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<NotificationView>>> {
    let user = session.require_user()?;
    Ok(web::Json(state.notifications.list_for(&user).await?))
}

/// Mark every notification read.
#[utoipa::path(
    post,
    path = "/api/notifications/read",
    responses(
        (status = 200, description = "Count of changed records", body = MarkReadResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationsRead"
)]
#[post("/notifications/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MarkReadResponse>> {
    let user = session.require_user()?;
    let updated = state.notifications.mark_all_read(&user).await?;
    Ok(web::Json(MarkReadResponse { updated }))
}

/// Number of unread notifications.
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount"
)]
#[get("/notifications/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UnreadCountResponse>> {
    let user = session.require_user()?;
    let count = state.notifications.unread_count(&user).await?;
    Ok(web::Json(UnreadCountResponse { count }))
}
