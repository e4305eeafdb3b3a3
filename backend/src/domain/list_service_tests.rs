//! Tests for the list tracking service.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockAnimeListRepository, MockUserRepository};
use crate::domain::{Email, ErrorCode, PasswordHash, TitleMetadata, User, UserProfile};
use crate::test_support::MutableClock;

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn user() -> UserId {
    UserId::random()
}

#[fixture]
fn title_id() -> TitleId {
    TitleId::new("5114").expect("digits")
}

type Service = ListService<MockAnimeListRepository, MockUserRepository>;

fn known_users() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|id| {
        Ok(Some(User::new(
            id.clone(),
            Email::new("owner@example.com").expect("email"),
            PasswordHash::new("hash"),
            UserProfile::default(),
            Utc::now(),
        )))
    });
    users
}

fn make_service(repo: MockAnimeListRepository, now: DateTime<Utc>) -> Service {
    ListService::new(
        Arc::new(repo),
        Arc::new(known_users()),
        Arc::new(MutableClock::new(now)),
    )
}

fn request(user: &UserId, title_id: &TitleId, status: &str) -> UpsertEntryRequest {
    UpsertEntryRequest {
        user: user.clone(),
        title_id: title_id.clone(),
        status: status.to_owned(),
        metadata: TitleMetadata {
            title: Some("Fullmetal Alchemist".into()),
            poster_url: None,
            episodes_total: Some(64),
        },
    }
}

#[rstest]
#[tokio::test]
async fn upsert_creates_entry_with_normalised_status(
    now: DateTime<Utc>,
    user: UserId,
    title_id: TitleId,
) {
    let saved: Arc<Mutex<Option<AnimeListEntry>>> = Arc::default();
    let sink = Arc::clone(&saved);
    let mut repo = MockAnimeListRepository::new();
    repo.expect_find_entry().times(1).return_once(|_, _| Ok(None));
    repo.expect_save_entry().times(1).returning(move |_, entry| {
        *sink.lock().expect("sink") = Some(entry.clone());
        Ok(())
    });
    let listed = Arc::clone(&saved);
    repo.expect_entries().times(1).returning(move |_| {
        Ok(listed.lock().expect("sink").clone().into_iter().collect())
    });

    let service = make_service(repo, now);
    let list = service
        .upsert(request(&user, &title_id, "Plan to watch"))
        .await
        .expect("upsert");

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].status, WatchStatus::Planned);
    assert_eq!(list[0].created_at, now);
    assert_eq!(list[0].episodes_total, Some(64));
}

#[rstest]
#[tokio::test]
async fn upsert_updates_existing_entry_in_place(
    now: DateTime<Utc>,
    user: UserId,
    title_id: TitleId,
) {
    let created = now - Duration::days(3);
    let existing = AnimeListEntry::new(
        title_id.clone(),
        WatchStatus::Planned,
        TitleMetadata::default(),
        created,
    );
    let mut repo = MockAnimeListRepository::new();
    repo.expect_find_entry()
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_save_entry()
        .withf(move |_, entry| {
            entry.status == WatchStatus::Completed
                && entry.created_at == created
                && entry.updated_at == now
        })
        .times(1)
        .returning(|_, _| Ok(()));
    repo.expect_entries().returning(|_| Ok(Vec::new()));

    let service = make_service(repo, now);
    service
        .upsert(request(&user, &title_id, "просмотрено"))
        .await
        .expect("upsert");
}

#[rstest]
#[tokio::test]
async fn upsert_rejects_unknown_status_without_writing(
    now: DateTime<Utc>,
    user: UserId,
    title_id: TitleId,
) {
    let mut repo = MockAnimeListRepository::new();
    repo.expect_save_entry().never();

    let service = make_service(repo, now);
    let error = service
        .upsert(request(&user, &title_id, "on hold"))
        .await
        .expect_err("invalid status");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details");
    assert_eq!(details["code"], "invalid_status");
    assert_eq!(details["value"], "on hold");
}

#[rstest]
#[tokio::test]
async fn remove_returns_remaining_entries(now: DateTime<Utc>, user: UserId, title_id: TitleId) {
    let mut repo = MockAnimeListRepository::new();
    repo.expect_delete_entry()
        .with(eq(user.clone()), eq(title_id.clone()))
        .times(1)
        .returning(|_, _| Ok(false));
    repo.expect_entries().returning(|_| Ok(Vec::new()));

    let service = make_service(repo, now);
    let list = service.remove(&user, &title_id).await.expect("remove");
    assert!(list.is_empty());
}

#[rstest]
#[tokio::test]
async fn log_episode_uses_entry_title(now: DateTime<Utc>, user: UserId, title_id: TitleId) {
    let entry = AnimeListEntry::new(
        title_id.clone(),
        WatchStatus::Watching,
        TitleMetadata {
            title: Some("Frieren".into()),
            ..TitleMetadata::default()
        },
        now,
    );
    let mut repo = MockAnimeListRepository::new();
    repo.expect_find_entry()
        .return_once(move |_, _| Ok(Some(entry)));
    repo.expect_record_watch()
        .withf(move |_, event| event.episode == 4 && event.watched_at == now)
        .times(1)
        .returning(|_, _| Ok(()));

    let service = make_service(repo, now);
    let event = service
        .log_episode_watched(&user, &title_id, 4)
        .await
        .expect("logged");
    assert_eq!(event.title.as_deref(), Some("Frieren"));
}

#[rstest]
#[tokio::test]
async fn log_episode_rejects_episode_zero(now: DateTime<Utc>, user: UserId, title_id: TitleId) {
    let mut repo = MockAnimeListRepository::new();
    repo.expect_record_watch().never();

    let service = make_service(repo, now);
    let error = service
        .log_episode_watched(&user, &title_id, 0)
        .await
        .expect_err("invalid episode");
    assert_eq!(error.details().expect("details")["code"], "invalid_episode");
}

#[rstest]
#[case(None, RECENT_DEFAULT_LIMIT)]
#[case(Some(0), 1)]
#[case(Some(500), RECENT_MAX_LIMIT)]
#[tokio::test]
async fn recent_clamps_limit(
    now: DateTime<Utc>,
    user: UserId,
    #[case] requested: Option<usize>,
    #[case] expected: usize,
) {
    let mut repo = MockAnimeListRepository::new();
    repo.expect_recent_history()
        .with(eq(user.clone()), eq(expected))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let service = make_service(repo, now);
    service.recent(&user, requested).await.expect("recent");
}

#[rstest]
#[tokio::test]
async fn activity_queries_from_start_of_window(now: DateTime<Utc>, user: UserId) {
    let expected_since = Utc
        .with_ymd_and_hms(2024, 5, 4, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    let mut repo = MockAnimeListRepository::new();
    repo.expect_history_since()
        .with(eq(user.clone()), eq(expected_since))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let service = make_service(repo, now);
    let days = service.activity(&user, Some(7)).await.expect("activity");
    assert!(days.is_empty());
}

#[rstest]
#[case(AnimeListRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
#[case(AnimeListRepositoryError::query("broken"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_errors_are_mapped(
    now: DateTime<Utc>,
    user: UserId,
    #[case] failure: AnimeListRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockAnimeListRepository::new();
    repo.expect_entries().return_once(move |_| Err(failure));

    let service = make_service(repo, now);
    let error = service.stats(&user).await.expect_err("mapped");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case::stats("stats")]
#[case::detailed("detailed")]
#[case::recent("recent")]
#[case::activity("activity")]
#[tokio::test]
async fn public_queries_reject_unknown_users(
    #[case] query: &str,
    now: DateTime<Utc>,
    user: UserId,
) {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));
    let service = ListService::new(
        Arc::new(MockAnimeListRepository::new()),
        Arc::new(users),
        Arc::new(MutableClock::new(now)),
    );

    let error = match query {
        "stats" => service.stats(&user).await.map(|_| ()),
        "detailed" => service.detailed_stats(&user).await.map(|_| ()),
        "recent" => service.recent(&user, None).await.map(|_| ()),
        _ => service.activity(&user, None).await.map(|_| ()),
    }
    .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.details().expect("details")["field"], "id");
}
