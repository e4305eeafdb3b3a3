//! Reqwest-backed catalog source.
//!
//! Owns transport concerns only: URL building, the request timeout, HTTP
//! status classification and JSON decoding into domain types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{AnimeDto, PlayerSearchDto};
use crate::domain::ports::{CatalogSource, CatalogSourceError};
use crate::domain::{PlayerInfo, TitleDetails, TitleId};

const USER_AGENT: &str = "anitrack-backend/0.1";

/// Upstream base URLs.
#[derive(Debug, Clone)]
pub struct CatalogEndpoints {
    /// Catalog API root, e.g. `https://shikimori.one/api/`.
    pub catalog_base: Url,
    /// Player search endpoint; player lookups return `None` when unset.
    pub player_search: Option<Url>,
}

/// Catalog source performing HTTP GET requests against the configured API.
pub struct CatalogHttpSource {
    client: Client,
    endpoints: CatalogEndpoints,
}

impl CatalogHttpSource {
    /// Build the adapter with a client-wide request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: CatalogEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoints })
    }

    fn title_url(&self, title_id: &TitleId) -> Result<Url, CatalogSourceError> {
        self.endpoints
            .catalog_base
            .join(&format!("animes/{title_id}"))
            .map_err(|error| CatalogSourceError::invalid_request(error.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogSourceError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode(body.as_ref())
    }
}

#[async_trait]
impl CatalogSource for CatalogHttpSource {
    async fn fetch_title(&self, title_id: &TitleId) -> Result<TitleDetails, CatalogSourceError> {
        let url = self.title_url(title_id)?;
        debug!(%title_id, %url, "fetching catalog title");
        let dto: AnimeDto = self.get_json(url).await?;
        dto.into_details(title_id, &self.endpoints.catalog_base)
            .map_err(CatalogSourceError::decode)
    }

    async fn fetch_player(
        &self,
        title_id: &TitleId,
    ) -> Result<Option<PlayerInfo>, CatalogSourceError> {
        let Some(mut url) = self.endpoints.player_search.clone() else {
            return Ok(None);
        };
        url.query_pairs_mut()
            .append_pair("shikimori_id", title_id.as_ref());
        let dto: PlayerSearchDto = self.get_json(url).await?;
        Ok(dto.into_player(title_id))
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, CatalogSourceError> {
    serde_json::from_slice(body).map_err(|error| {
        CatalogSourceError::decode(format!("invalid catalog JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> CatalogSourceError {
    debug!(%error, "catalog request failed");
    if error.is_timeout() {
        CatalogSourceError::timeout(error.to_string())
    } else {
        CatalogSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CatalogSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };
    match status {
        StatusCode::TOO_MANY_REQUESTS => CatalogSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CatalogSourceError::timeout(message)
        }
        _ if status.is_client_error() => CatalogSourceError::invalid_request(message),
        _ => CatalogSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > LIMIT {
        format!("{}...", compact.chars().take(LIMIT).collect::<String>())
    } else {
        compact
    }
}

#[cfg(test)]
mod tests {
    //! Non-network coverage for URL building, status mapping and decoding.

    use super::*;
    use rstest::rstest;

    fn source(player: Option<&str>) -> CatalogHttpSource {
        CatalogHttpSource::new(
            CatalogEndpoints {
                catalog_base: Url::parse("https://catalog.test/api/").expect("url"),
                player_search: player.map(|p| Url::parse(p).expect("url")),
            },
            Duration::from_secs(1),
        )
        .expect("client")
    }

    fn id(raw: &str) -> TitleId {
        TitleId::new(raw).expect("title id")
    }

    #[rstest]
    fn title_url_appends_to_base_path() {
        let url = source(None).title_url(&id("5114")).expect("url");
        assert_eq!(url.as_str(), "https://catalog.test/api/animes/5114");
    }

    #[rstest]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    #[case(StatusCode::NOT_FOUND, false)]
    #[case(StatusCode::BAD_REQUEST, false)]
    fn status_errors_classify_retryability(#[case] status: StatusCode, #[case] retryable: bool) {
        let error = map_status_error(status, b"{\"message\": \"nope\"}");
        assert_eq!(error.is_retryable(), retryable);
    }

    #[rstest]
    fn anime_payload_maps_to_details() {
        let body = r#"{
            "id": 5114,
            "name": "Fullmetal Alchemist: Brotherhood",
            "russian": "Стальной алхимик: Братство",
            "english": ["Fullmetal Alchemist: Brotherhood"],
            "description": "Two brothers...",
            "image": { "original": "/system/animes/original/5114.jpg" },
            "episodes": 64,
            "status": "released",
            "score": "9.1",
            "genres": [{ "id": 1, "name": "Action" }]
        }"#;
        let dto: AnimeDto = decode(body.as_bytes()).expect("decodes");
        let base = Url::parse("https://catalog.test/api/").expect("url");
        let details = dto.into_details(&id("5114"), &base).expect("maps");

        assert_eq!(details.title, "Fullmetal Alchemist: Brotherhood");
        assert_eq!(
            details.poster_url.as_deref(),
            Some("https://catalog.test/system/animes/original/5114.jpg")
        );
        assert_eq!(details.episodes, Some(64));
        assert_eq!(details.score, Some(9.1));
        assert_eq!(details.genres, vec!["Action".to_owned()]);
    }

    #[rstest]
    fn nameless_payload_is_a_decode_error() {
        let dto: AnimeDto = decode(br#"{"episodes": 12}"#).expect("decodes");
        let base = Url::parse("https://catalog.test/api/").expect("url");
        assert!(dto.into_details(&id("1"), &base).is_err());
    }

    #[rstest]
    fn malformed_json_is_a_decode_error() {
        let error = decode::<AnimeDto>(b"<html>").expect_err("not json");
        assert!(matches!(error, CatalogSourceError::Decode { .. }));
    }

    #[rstest]
    fn player_search_picks_first_link() {
        let dto: PlayerSearchDto = decode(
            br#"{"results": [{"link": null}, {"link": "//player.test/embed/1", "episodes_count": 12}]}"#,
        )
        .expect("decodes");
        let player = dto.into_player(&id("1")).expect("player");
        assert_eq!(player.embed_url, "https://player.test/embed/1");
        assert_eq!(player.episodes_total, Some(12));
    }

    #[tokio::test]
    async fn unconfigured_player_search_returns_none() {
        let result = source(None).fetch_player(&id("1")).await.expect("no call");
        assert!(result.is_none());
    }
}
