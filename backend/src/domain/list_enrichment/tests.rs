//! Behaviour coverage for the list enricher.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{CatalogSourceError, MockAnimeListRepository};
use crate::domain::{PlayerInfo, TitleMetadata};
use crate::test_support::{PendingSleeper, RecordingSleeper};

struct SourceStub {
    scripted: Mutex<VecDeque<Result<TitleDetails, CatalogSourceError>>>,
    calls: AtomicUsize,
}

impl SourceStub {
    fn scripted(scripted: Vec<Result<TitleDetails, CatalogSourceError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CatalogSource for SourceStub {
    async fn fetch_title(&self, title_id: &TitleId) -> Result<TitleDetails, CatalogSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .scripted
            .lock()
            .unwrap_or_else(|_| panic!("script mutex"))
            .pop_front();
        next.unwrap_or_else(|| Ok(details(title_id)))
    }

    async fn fetch_player(
        &self,
        _title_id: &TitleId,
    ) -> Result<Option<PlayerInfo>, CatalogSourceError> {
        Ok(None)
    }
}

fn details(title_id: &TitleId) -> TitleDetails {
    TitleDetails {
        title_id: title_id.clone(),
        title: format!("Title {title_id}"),
        title_english: None,
        synopsis: None,
        poster_url: Some(format!("https://img/{title_id}.jpg")),
        episodes: Some(12),
        status: None,
        score: Some(8.0),
        genres: vec!["Drama".into()],
    }
}

fn entry(id: &str) -> AnimeListEntry {
    AnimeListEntry::new(
        TitleId::new(id).expect("digits"),
        WatchStatus::Watching,
        TitleMetadata {
            title: Some(format!("Stored {id}")),
            poster_url: None,
            episodes_total: Some(24),
        },
        Utc::now(),
    )
}

#[fixture]
fn config() -> EnrichmentConfig {
    EnrichmentConfig::default()
}

#[rstest]
#[tokio::test]
async fn emits_items_in_list_order(config: EnrichmentConfig) {
    let source = Arc::new(SourceStub::scripted(Vec::new()));
    let sleeper = Arc::new(RecordingSleeper::default());
    let enricher = ListEnricher::with_sleeper(source.clone(), sleeper.clone(), config);

    let items = enricher.spawn(vec![entry("1"), entry("2")]).collect().await;

    let ids: Vec<_> = items.iter().map(|i| i.title_id.as_ref().to_owned()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert!(items.iter().all(|i| !i.load_failed));
    assert_eq!(items[0].title, "Title 1");
    assert_eq!(sleeper.recorded(), vec![Duration::from_millis(300)]);
}

#[rstest]
#[tokio::test]
async fn exhausted_retries_yield_placeholder(config: EnrichmentConfig) {
    let source = Arc::new(SourceStub::scripted(vec![
        Err(CatalogSourceError::timeout("slow")),
        Err(CatalogSourceError::transport("reset")),
        Err(CatalogSourceError::rate_limited("429")),
    ]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let enricher = ListEnricher::with_sleeper(source.clone(), sleeper.clone(), config);

    let items = enricher.spawn(vec![entry("77")]).collect().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        sleeper.recorded(),
        vec![Duration::from_millis(600), Duration::from_millis(1200)]
    );
    let item = &items[0];
    assert!(item.load_failed);
    assert_eq!(item.title, "Anime 77");
    assert_eq!(item.poster_url, PLACEHOLDER_POSTER);
    assert_eq!(item.episodes_total, Some(24));
}

#[rstest]
#[tokio::test]
async fn non_retryable_error_is_not_retried(config: EnrichmentConfig) {
    let source = Arc::new(SourceStub::scripted(vec![Err(
        CatalogSourceError::invalid_request("404"),
    )]));
    let sleeper = Arc::new(RecordingSleeper::default());
    let enricher = ListEnricher::with_sleeper(source.clone(), sleeper.clone(), config);

    let items = enricher.spawn(vec![entry("5")]).collect().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(sleeper.recorded().is_empty());
    assert!(items[0].load_failed);
}

#[rstest]
#[tokio::test]
async fn retry_recovers_before_limit(config: EnrichmentConfig) {
    let source = Arc::new(SourceStub::scripted(vec![Err(CatalogSourceError::timeout(
        "slow",
    ))]));
    let enricher = ListEnricher::with_sleeper(
        source.clone(),
        Arc::new(RecordingSleeper::default()),
        config,
    );

    let items = enricher.spawn(vec![entry("9")]).collect().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(!items[0].load_failed);
    assert_eq!(items[0].poster_url, "https://img/9.jpg");
}

#[rstest]
#[tokio::test]
async fn cancel_stops_before_next_fetch(config: EnrichmentConfig) {
    let source = Arc::new(SourceStub::scripted(Vec::new()));
    let enricher = ListEnricher::with_sleeper(source.clone(), Arc::new(PendingSleeper), config);

    let mut handle = enricher.spawn(vec![entry("1"), entry("2"), entry("3")]);
    let first = handle.next().await.expect("first item");
    assert_eq!(first.title_id.as_ref(), "1");

    handle.cancel();
    assert!(handle.next().await.is_none());
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn dropping_handle_ends_task(config: EnrichmentConfig) {
    let source = Arc::new(SourceStub::scripted(Vec::new()));
    let enricher = ListEnricher::with_sleeper(source.clone(), Arc::new(PendingSleeper), config);

    let mut handle = enricher.spawn(vec![entry("1"), entry("2")]);
    handle.next().await.expect("first item");
    drop(handle);
    drop(enricher);

    let released = tokio::time::timeout(Duration::from_secs(1), async {
        while Arc::strong_count(&source) > 1 {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(released.is_ok(), "task kept running after drop");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn details_service_enriches_newest_entries_first(config: EnrichmentConfig) {
    let older = entry("1");
    let mut newer = entry("2");
    newer.updated_at = older.updated_at + chrono::Duration::minutes(1);
    let mut repo = MockAnimeListRepository::new();
    repo.expect_entries()
        .times(1)
        .return_once(move |_| Ok(vec![older, newer]));
    let enricher = ListEnricher::with_sleeper(
        Arc::new(SourceStub::scripted(Vec::new())),
        Arc::new(RecordingSleeper::default()),
        config,
    );
    let service = ListDetailsService::new(Arc::new(repo), enricher);

    let items = service
        .list_details(&UserId::random())
        .await
        .expect("details");

    assert_eq!(items[0].title_id.as_ref(), "2");
    assert_eq!(items[1].title_id.as_ref(), "1");
}
