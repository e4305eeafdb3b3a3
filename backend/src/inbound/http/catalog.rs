//! Catalog gateway handlers.
//!
//! `GET /api/anime/{id}` answers 200 even when the upstream is down; the body
//! then reads `{"available": false, "message": "..."}` so the client can
//! render a placeholder.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, PlayerInfo, TitleDetails, TitleLookup};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_title_id;

/// Body returned when title details cannot be loaded.
#[derive(Debug, Serialize, ToSchema)]
pub struct TitleUnavailable {
    #[schema(example = false)]
    pub available: bool,
    #[schema(example = "could not load title details")]
    pub message: String,
}

/// Title metadata from the catalog, or an availability notice.
#[utoipa::path(
    get,
    path = "/api/anime/{id}",
    params(("id" = String, Path, description = "Catalog title id")),
    responses(
        (status = 200, description = "Title details or an unavailable notice", body = TitleDetails),
        (status = 400, description = "Malformed id", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "titleDetails",
    security([])
)]
#[get("/anime/{id}")]
pub async fn title_details(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let title_id = parse_title_id(path.as_str(), "id")?;
    let response = match state.catalog.title_details(&title_id).await {
        TitleLookup::Available(details) => HttpResponse::Ok().json(details),
        TitleLookup::Unavailable { message } => HttpResponse::Ok().json(TitleUnavailable {
            available: false,
            message,
        }),
    };
    Ok(response)
}

/// Embeddable player for a title.
#[utoipa::path(
    get,
    path = "/api/player/{id}",
    params(("id" = String, Path, description = "Catalog title id")),
    responses(
        (status = 200, description = "Player info", body = PlayerInfo),
        (status = 404, description = "No player for this title", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "titlePlayer",
    security([])
)]
#[get("/player/{id}")]
pub async fn player(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PlayerInfo>> {
    let title_id = parse_title_id(path.as_str(), "id")?;
    state
        .catalog
        .player(&title_id)
        .await
        .map(web::Json)
        .ok_or_else(|| Error::not_found("no player for this title"))
}
