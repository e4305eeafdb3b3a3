//! Port for the third-party anime catalog.
//!
//! Adapters translate upstream payloads into [`TitleDetails`] and
//! [`PlayerInfo`] and classify failures so callers can decide whether a retry
//! is worthwhile.

use async_trait::async_trait;

use crate::domain::{PlayerInfo, TitleDetails, TitleId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog source adapters.
    pub enum CatalogSourceError {
        /// Network or server-side failure.
        Transport { message: String } => "catalog transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } => "catalog request timed out: {message}",
        /// The upstream asked us to slow down.
        RateLimited { message: String } => "catalog rate limited the request: {message}",
        /// The upstream rejected the request, including unknown titles.
        InvalidRequest { message: String } => "catalog rejected the request: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "catalog response could not be decoded: {message}",
    }
}

impl CatalogSourceError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch display metadata for one title.
    async fn fetch_title(&self, title_id: &TitleId) -> Result<TitleDetails, CatalogSourceError>;

    /// Look up an embeddable player; `Ok(None)` when none exists.
    async fn fetch_player(
        &self,
        title_id: &TitleId,
    ) -> Result<Option<PlayerInfo>, CatalogSourceError>;
}

/// Offline catalog that synthesises details from the title id.
///
/// Used when no upstream is reachable, such as in local development and
/// end-to-end tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogSource;

#[async_trait]
impl CatalogSource for FixtureCatalogSource {
    async fn fetch_title(&self, title_id: &TitleId) -> Result<TitleDetails, CatalogSourceError> {
        Ok(TitleDetails {
            title_id: title_id.clone(),
            title: format!("Fixture title {title_id}"),
            title_english: None,
            synopsis: None,
            poster_url: None,
            episodes: Some(12),
            status: Some("released".to_owned()),
            score: None,
            genres: Vec::new(),
        })
    }

    async fn fetch_player(
        &self,
        _title_id: &TitleId,
    ) -> Result<Option<PlayerInfo>, CatalogSourceError> {
        Ok(None)
    }
}
