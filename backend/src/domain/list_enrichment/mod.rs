//! Background enrichment of list entries with catalog details.
//!
//! [`ListEnricher::spawn`] walks the entries one at a time on a tokio task and
//! streams [`EnrichedTitle`] items over a bounded channel. Each fetch is
//! retried with linear backoff while the source reports retryable errors;
//! anything else degrades the item to a placeholder. The task stops as soon
//! as the [`EnrichmentHandle`] is cancelled or dropped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::domain::ports::{AnimeListRepository, CatalogSource, ListDetailsQuery};
use crate::domain::{
    AnimeListEntry, Error, TitleDetails, TitleId, UserId, WatchStatus, sort_by_recent_update,
};

mod runtime;

pub use runtime::TokioSleeper;

/// Poster shown when neither the catalog nor the entry has one.
pub const PLACEHOLDER_POSTER: &str = "/placeholder-anime.jpg";

/// Retry and pacing settings for the enricher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Fetch attempts per entry, including the first.
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` waits `retry_delay * n` before retrying.
    pub retry_delay: Duration,
    /// Pause between consecutive entries.
    pub item_delay: Duration,
    /// Capacity of the result channel.
    pub channel_capacity: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(600),
            item_delay: Duration::from_millis(300),
            channel_capacity: 16,
        }
    }
}

/// Async sleeping abstraction so tests can observe and skip delays.
#[async_trait]
pub trait EnrichmentSleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// A list entry joined with catalog details.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTitle {
    #[schema(value_type = String, example = "5114")]
    pub title_id: TitleId,
    pub status: WatchStatus,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_english: Option<String>,
    pub poster_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub genres: Vec<String>,
    /// Set when catalog details could not be loaded.
    pub load_failed: bool,
}

impl EnrichedTitle {
    fn loaded(entry: &AnimeListEntry, details: TitleDetails) -> Self {
        Self {
            title_id: entry.title_id.clone(),
            status: entry.status,
            title: details.title,
            title_english: details.title_english,
            poster_url: details
                .poster_url
                .or_else(|| entry.poster_url.clone())
                .unwrap_or_else(|| PLACEHOLDER_POSTER.to_owned()),
            episodes_total: details.episodes.or(entry.episodes_total),
            score: details.score,
            genres: details.genres,
            load_failed: false,
        }
    }

    /// Stand-in used when the catalog lookup gave up.
    pub fn placeholder(entry: &AnimeListEntry) -> Self {
        Self {
            title_id: entry.title_id.clone(),
            status: entry.status,
            title: format!("Anime {}", entry.title_id),
            title_english: None,
            poster_url: entry
                .poster_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_POSTER.to_owned()),
            episodes_total: entry.episodes_total,
            score: None,
            genres: Vec::new(),
            load_failed: true,
        }
    }
}

/// Receiving end of a running enrichment task.
///
/// Dropping the handle cancels the task.
pub struct EnrichmentHandle {
    results: mpsc::Receiver<EnrichedTitle>,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl EnrichmentHandle {
    /// Next enriched item, or `None` once the task has finished.
    pub async fn next(&mut self) -> Option<EnrichedTitle> {
        self.results.recv().await
    }

    /// Ask the task to stop before its next fetch or pause.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Drain every remaining item.
    pub async fn collect(mut self) -> Vec<EnrichedTitle> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item);
        }
        items
    }
}

impl Drop for EnrichmentHandle {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

/// Spawns enrichment tasks against a catalog source.
#[derive(Clone)]
pub struct ListEnricher {
    source: Arc<dyn CatalogSource>,
    sleeper: Arc<dyn EnrichmentSleeper>,
    config: EnrichmentConfig,
}

impl ListEnricher {
    /// Enricher that sleeps on the tokio timer.
    pub fn new(source: Arc<dyn CatalogSource>, config: EnrichmentConfig) -> Self {
        Self::with_sleeper(source, Arc::new(TokioSleeper), config)
    }

    /// Enricher with an injected sleeper.
    pub fn with_sleeper(
        source: Arc<dyn CatalogSource>,
        sleeper: Arc<dyn EnrichmentSleeper>,
        config: EnrichmentConfig,
    ) -> Self {
        Self {
            source,
            sleeper,
            config,
        }
    }

    /// Start enriching `entries` in order.
    pub fn spawn(&self, entries: Vec<AnimeListEntry>) -> EnrichmentHandle {
        let (results_tx, results) = mpsc::channel(self.config.channel_capacity.max(1));
        let (cancel, cancel_rx) = watch::channel(false);
        let run = EnrichmentRun {
            source: Arc::clone(&self.source),
            sleeper: Arc::clone(&self.sleeper),
            config: self.config.clone(),
            cancel: cancel_rx,
        };
        let task = tokio::spawn(run.execute(entries, results_tx));
        EnrichmentHandle {
            results,
            cancel,
            task,
        }
    }
}

struct EnrichmentRun {
    source: Arc<dyn CatalogSource>,
    sleeper: Arc<dyn EnrichmentSleeper>,
    config: EnrichmentConfig,
    cancel: watch::Receiver<bool>,
}

impl EnrichmentRun {
    async fn execute(mut self, entries: Vec<AnimeListEntry>, results: mpsc::Sender<EnrichedTitle>) {
        for (index, entry) in entries.iter().enumerate() {
            if index > 0 && !self.pause(self.config.item_delay).await {
                return;
            }
            let Some(item) = self.enrich(entry).await else {
                debug!("list enrichment cancelled");
                return;
            };
            if results.send(item).await.is_err() {
                return;
            }
        }
    }

    /// Fetch one entry; `None` means the run was cancelled.
    async fn enrich(&mut self, entry: &AnimeListEntry) -> Option<EnrichedTitle> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            if self.is_cancelled() {
                return None;
            }
            let source = Arc::clone(&self.source);
            let fetched = tokio::select! {
                result = source.fetch_title(&entry.title_id) => result,
                () = wait_for_cancel(&mut self.cancel) => return None,
            };
            match fetched {
                Ok(details) => return Some(EnrichedTitle::loaded(entry, details)),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    debug!(
                        title_id = %entry.title_id,
                        attempt,
                        error = %error,
                        "retrying catalog fetch"
                    );
                    if !self.pause(self.config.retry_delay * attempt).await {
                        return None;
                    }
                    attempt += 1;
                }
                Err(error) => {
                    warn!(
                        title_id = %entry.title_id,
                        attempt,
                        error = %error,
                        "catalog fetch gave up; using placeholder"
                    );
                    return Some(EnrichedTitle::placeholder(entry));
                }
            }
        }
    }

    /// Sleep unless cancelled first; returns `false` on cancellation.
    async fn pause(&mut self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let sleeper = Arc::clone(&self.sleeper);
        let slept = tokio::select! {
            () = sleeper.sleep(duration) => true,
            () = wait_for_cancel(&mut self.cancel) => false,
        };
        slept && !self.is_cancelled()
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() || self.cancel.has_changed().is_err()
    }
}

/// Resolve once cancellation is requested or the handle is gone.
async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}

/// Enriched list view backed by a list repository and an enricher.
#[derive(Clone)]
pub struct ListDetailsService<R> {
    entries: Arc<R>,
    enricher: ListEnricher,
}

impl<R> ListDetailsService<R> {
    /// Combine the list store with an enricher.
    pub fn new(entries: Arc<R>, enricher: ListEnricher) -> Self {
        Self { entries, enricher }
    }
}

#[async_trait]
impl<R> ListDetailsQuery for ListDetailsService<R>
where
    R: AnimeListRepository,
{
    async fn list_details(&self, user: &UserId) -> Result<Vec<EnrichedTitle>, Error> {
        let mut entries = self
            .entries
            .entries(user)
            .await
            .map_err(crate::domain::list_service::map_list_error)?;
        sort_by_recent_update(&mut entries);
        Ok(self.enricher.spawn(entries).collect().await)
    }
}

#[cfg(test)]
mod tests;
