//! Catalog gateway: title metadata and player lookups.
//!
//! Upstream failures never surface as request errors. Title lookups degrade
//! to [`TitleLookup::Unavailable`] and player lookups to `None`; both are
//! logged so operators can see the upstream trouble.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::TitleId;
use super::ports::{CatalogQuery, CatalogSource};

/// Message returned when title details cannot be loaded.
pub const TITLE_UNAVAILABLE_MESSAGE: &str = "could not load title details";

/// Display metadata for one catalog title.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetails {
    #[schema(value_type = String, example = "5114")]
    pub title_id: TitleId,
    #[schema(example = "Fullmetal Alchemist: Brotherhood")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub genres: Vec<String>,
}

/// Embeddable player for a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    #[schema(value_type = String, example = "5114")]
    pub title_id: TitleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes_total: Option<u32>,
    pub embed_url: String,
}

/// Outcome of a title lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleLookup {
    Available(TitleDetails),
    Unavailable { message: String },
}

/// Gateway service over a [`CatalogSource`].
#[derive(Clone)]
pub struct CatalogService<S> {
    source: Arc<S>,
}

impl<S> CatalogService<S> {
    /// Wrap a catalog source.
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S> CatalogQuery for CatalogService<S>
where
    S: CatalogSource,
{
    async fn title_details(&self, title_id: &TitleId) -> TitleLookup {
        match self.source.fetch_title(title_id).await {
            Ok(details) => TitleLookup::Available(details),
            Err(error) => {
                warn!(title_id = %title_id, error = %error, "catalog title lookup failed");
                TitleLookup::Unavailable {
                    message: TITLE_UNAVAILABLE_MESSAGE.to_owned(),
                }
            }
        }
    }

    async fn player(&self, title_id: &TitleId) -> Option<PlayerInfo> {
        match self.source.fetch_player(title_id).await {
            Ok(player) => player,
            Err(error) => {
                debug!(title_id = %title_id, error = %error, "player lookup failed");
                None
            }
        }
    }
}
