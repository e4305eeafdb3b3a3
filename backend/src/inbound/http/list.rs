//! Watch list and history handlers.
//!
//! ```text
//! GET    /api/list
//! POST   /api/list          {"malId":"5114","status":"watching","animeData":{...}}
//! DELETE /api/list/{id}
//! GET    /api/list/details
//! POST   /api/history       {"titleId":"5114","episode":3}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::UpsertEntryRequest;
use crate::domain::{AnimeListEntry, EnrichedTitle, Error, TitleId, TitleMetadata, WatchEvent};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_title_id};

/// Title id as sent by clients: a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTitleId {
    Number(u64),
    Text(String),
}

impl RawTitleId {
    fn parse(&self, field: &str) -> Result<TitleId, Error> {
        match self {
            Self::Number(n) => parse_title_id(&n.to_string(), field),
            Self::Text(raw) => parse_title_id(raw, field),
        }
    }
}

/// Body for `POST /api/list`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertEntryBody {
    #[serde(default, alias = "mal_id")]
    #[schema(value_type = Option<String>, example = "5114")]
    pub mal_id: Option<RawTitleId>,
    #[serde(default, alias = "shikimori_id")]
    #[schema(value_type = Option<String>, example = "5114")]
    pub shikimori_id: Option<RawTitleId>,
    /// Watch status label, e.g. `watching` or `"Просмотрено"`.
    #[schema(example = "watching")]
    pub status: Option<String>,
    #[serde(default, alias = "anime_data")]
    pub anime_data: Option<TitleMetadata>,
}

impl UpsertEntryBody {
    /// `malId` wins when both ids are present.
    fn title_id(&self) -> Result<TitleId, Error> {
        match (&self.mal_id, &self.shikimori_id) {
            (Some(raw), _) => raw.parse("malId"),
            (None, Some(raw)) => raw.parse("shikimoriId"),
            (None, None) => Err(missing_field_error("malId")),
        }
    }
}

/// Body for `POST /api/history`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEpisodeBody {
    #[serde(alias = "title_id")]
    #[schema(value_type = String, example = "5114")]
    pub title_id: Option<RawTitleId>,
    #[schema(example = 3, minimum = 1)]
    pub episode: Option<i64>,
}

fn parse_episode(raw: Option<i64>) -> Result<u32, Error> {
    let raw = raw.ok_or_else(|| missing_field_error("episode"))?;
    u32::try_from(raw)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| {
            Error::invalid_request("episode must be at least 1").with_details(json!({
                "field": "episode",
                "code": "invalid_episode",
                "value": raw,
            }))
        })
}

/// The caller's list, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/list",
    responses(
        (status = 200, description = "List entries", body = [AnimeListEntry]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["list"],
    operation_id = "getList"
)]
#[get("/list")]
pub async fn get_list(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AnimeListEntry>>> {
    let user = session.require_user()?;
    Ok(web::Json(state.list_query.list(&user).await?))
}

/// Add a title or change its status.
#[utoipa::path(
    post,
    path = "/api/list",
    request_body = UpsertEntryBody,
    responses(
        (status = 200, description = "Updated list", body = [AnimeListEntry]),
        (status = 400, description = "Missing id or unknown status", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["list"],
    operation_id = "upsertListEntry"
)]
#[post("/list")]
pub async fn upsert_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<UpsertEntryBody>,
) -> ApiResult<web::Json<Vec<AnimeListEntry>>> {
    let user = session.require_user()?;
    let body = body.into_inner();
    let title_id = body.title_id()?;
    let status = body.status.ok_or_else(|| missing_field_error("status"))?;
    let entries = state
        .list
        .upsert(UpsertEntryRequest {
            user,
            title_id,
            status,
            metadata: body.anime_data.unwrap_or_default(),
        })
        .await?;
    Ok(web::Json(entries))
}

/// Remove a title from the list; absent titles are ignored.
#[utoipa::path(
    delete,
    path = "/api/list/{id}",
    params(("id" = String, Path, description = "Catalog title id")),
    responses(
        (status = 200, description = "Updated list", body = [AnimeListEntry]),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["list"],
    operation_id = "removeListEntry"
)]
#[delete("/list/{id}")]
pub async fn remove_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<AnimeListEntry>>> {
    let user = session.require_user()?;
    let title_id = parse_title_id(path.as_str(), "id")?;
    Ok(web::Json(state.list.remove(&user, &title_id).await?))
}

/// List entries joined with catalog details.
#[utoipa::path(
    get,
    path = "/api/list/details",
    responses(
        (status = 200, description = "Enriched entries", body = [EnrichedTitle]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["list"],
    operation_id = "listDetails"
)]
#[get("/list/details")]
pub async fn list_details(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<EnrichedTitle>>> {
    let user = session.require_user()?;
    Ok(web::Json(state.list_details.list_details(&user).await?))
}

/// Log one watched episode.
#[utoipa::path(
    post,
    path = "/api/history",
    request_body = LogEpisodeBody,
    responses(
        (status = 201, description = "Recorded event", body = WatchEvent),
        (status = 400, description = "Invalid title or episode", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["list"],
    operation_id = "logEpisode"
)]
#[post("/history")]
pub async fn log_episode(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<LogEpisodeBody>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let body = body.into_inner();
    let title_id = body
        .title_id
        .as_ref()
        .ok_or_else(|| missing_field_error("titleId"))?
        .parse("titleId")?;
    let episode = parse_episode(body.episode)?;
    let event = state
        .list
        .log_episode_watched(&user, &title_id, episode)
        .await?;
    Ok(HttpResponse::Created().json(event))
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
