//! Per-user anime list entries, watch history and derived statistics.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::WatchStatus;

/// Longest accepted title id; matches the storage column width and `u64::MAX`.
pub const TITLE_ID_MAX: usize = 20;

/// Validation failure for catalog identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleIdError {
    Empty,
    NotNumeric,
    TooLong,
}

impl fmt::Display for TitleIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "title id must not be empty"),
            Self::NotNumeric => write!(f, "title id must contain only digits"),
            Self::TooLong => write!(f, "title id must be at most {TITLE_ID_MAX} digits"),
        }
    }
}

impl std::error::Error for TitleIdError {}

/// External catalog identifier held in canonical decimal form.
///
/// # Examples
/// ```
/// use anitrack::domain::TitleId;
///
/// let id = TitleId::new(" 5114 ").expect("digits");
/// assert_eq!(id.as_ref(), "5114");
/// assert!(TitleId::new("abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct TitleId(String);

impl TitleId {
    /// Trim and validate a decimal identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TitleIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TitleIdError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TitleIdError::NotNumeric);
        }
        if trimmed.len() > TITLE_ID_MAX {
            return Err(TitleIdError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for TitleId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TitleId> for String {
    fn from(value: TitleId) -> Self {
        value.0
    }
}

impl From<u64> for TitleId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for TitleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::from(n)),
            Raw::Text(text) => Self::new(text).map_err(serde::de::Error::custom),
        }
    }
}

/// Optional display metadata cached on a list entry.
///
/// Accepts the field spellings clients send (`image_url`, `episodes`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitleMetadata {
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        alias = "poster_url",
        alias = "image_url",
        alias = "imageUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_url: Option<String>,
    #[serde(
        default,
        alias = "episodes_total",
        alias = "episodes",
        skip_serializing_if = "Option::is_none"
    )]
    pub episodes_total: Option<u32>,
}

impl TitleMetadata {
    /// Drop blank strings and zero episode counts.
    pub fn normalised(self) -> Self {
        let keep = |value: Option<String>| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        Self {
            title: keep(self.title),
            poster_url: keep(self.poster_url),
            episodes_total: self.episodes_total.filter(|n| *n > 0),
        }
    }
}

/// One tracked title in a user's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeListEntry {
    #[schema(value_type = String, example = "5114")]
    pub title_id: TitleId,
    pub status: WatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_watched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnimeListEntry {
    /// Fresh entry created at `now`.
    pub fn new(
        title_id: TitleId,
        status: WatchStatus,
        metadata: TitleMetadata,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            title_id,
            status,
            title: metadata.title,
            poster_url: metadata.poster_url,
            episodes_total: metadata.episodes_total,
            last_watched_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace status and metadata in place, keeping `created_at`.
    pub fn update(&mut self, status: WatchStatus, metadata: TitleMetadata, now: DateTime<Utc>) {
        self.status = status;
        self.title = metadata.title;
        self.poster_url = metadata.poster_url;
        self.episodes_total = metadata.episodes_total;
        self.updated_at = now;
    }

    /// Metadata currently cached on the entry.
    pub fn metadata(&self) -> TitleMetadata {
        TitleMetadata {
            title: self.title.clone(),
            poster_url: self.poster_url.clone(),
            episodes_total: self.episodes_total,
        }
    }
}

/// Order entries most recently updated first.
pub fn sort_by_recent_update(entries: &mut [AnimeListEntry]) {
    entries.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.title_id.cmp(&b.title_id))
    });
}

/// One logged episode view. History is append-only and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchEvent {
    #[schema(value_type = String, example = "5114")]
    pub title_id: TitleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub episode: u32,
    pub watched_at: DateTime<Utc>,
}

/// Entry counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ListStats {
    pub total: usize,
    pub watching: usize,
    pub planned: usize,
    pub completed: usize,
    pub dropped: usize,
}

impl ListStats {
    /// Count entries per status.
    pub fn from_entries(entries: &[AnimeListEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, entry| {
            stats.total += 1;
            match entry.status {
                WatchStatus::Watching => stats.watching += 1,
                WatchStatus::Planned => stats.planned += 1,
                WatchStatus::Completed => stats.completed += 1,
                WatchStatus::Dropped => stats.dropped += 1,
            }
            stats
        })
    }
}

/// Compact title reference used in grouped statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TitleSummary {
    #[schema(value_type = String, example = "5114")]
    pub title_id: TitleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes_total: Option<u32>,
}

/// Entries grouped by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DetailedStats {
    pub watching: Vec<TitleSummary>,
    pub planned: Vec<TitleSummary>,
    pub completed: Vec<TitleSummary>,
    pub dropped: Vec<TitleSummary>,
}

impl DetailedStats {
    /// Group entries, preserving their input order within each bucket.
    pub fn from_entries(entries: &[AnimeListEntry]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            let summary = TitleSummary {
                title_id: entry.title_id.clone(),
                title: entry.title.clone(),
                poster_url: entry.poster_url.clone(),
                episodes_total: entry.episodes_total,
            };
            let bucket = match entry.status {
                WatchStatus::Watching => &mut stats.watching,
                WatchStatus::Planned => &mut stats.planned,
                WatchStatus::Completed => &mut stats.completed,
                WatchStatus::Dropped => &mut stats.dropped,
            };
            bucket.push(summary);
        }
        stats
    }
}

/// Number of episodes logged on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ActivityDay {
    #[schema(value_type = String, example = "2024-05-01")]
    pub date: NaiveDate,
    pub count: usize,
}

/// Count events per UTC day over the `days` days ending at `now`.
///
/// Days without events are omitted; the result is ordered by date.
pub fn activity_by_day(events: &[WatchEvent], now: DateTime<Utc>, days: u32) -> Vec<ActivityDay> {
    if days == 0 {
        return Vec::new();
    }
    let today = now.date_naive();
    let first = today - Duration::days(i64::from(days) - 1);
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for event in events {
        let day = event.watched_at.date_naive();
        if day >= first && day <= today {
            *counts.entry(day).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(date, count)| ActivityDay { date, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn entry(id: &str, status: WatchStatus, at: DateTime<Utc>) -> AnimeListEntry {
        AnimeListEntry::new(
            TitleId::new(id).expect("digits"),
            status,
            TitleMetadata::default(),
            at,
        )
    }

    fn event(id: &str, at: DateTime<Utc>) -> WatchEvent {
        WatchEvent {
            title_id: TitleId::new(id).expect("digits"),
            title: None,
            episode: 1,
            watched_at: at,
        }
    }

    #[rstest]
    #[case(json!("5114"), Some("5114"))]
    #[case(json!(5114), Some("5114"))]
    #[case(json!(" 21 "), Some("21"))]
    #[case(json!(""), None)]
    #[case(json!("12a"), None)]
    #[case(json!(-3), None)]
    #[case(json!(u64::MAX), Some("18446744073709551615"))]
    #[case(json!("12345678901234567890"), Some("12345678901234567890"))]
    #[case(json!("123456789012345678901"), None)]
    fn title_id_accepts_strings_and_numbers(
        #[case] value: serde_json::Value,
        #[case] expected: Option<&str>,
    ) {
        let parsed = serde_json::from_value::<TitleId>(value).ok();
        assert_eq!(parsed.as_ref().map(AsRef::as_ref), expected);
    }

    #[rstest]
    fn overlong_title_id_is_rejected_before_storage() {
        assert_eq!(
            TitleId::new("9".repeat(TITLE_ID_MAX + 1)),
            Err(TitleIdError::TooLong)
        );
    }

    #[rstest]
    fn metadata_accepts_client_spellings() {
        let metadata: TitleMetadata = serde_json::from_value(json!({
            "title": "Frieren",
            "image_url": "https://img/1.jpg",
            "episodes": 28,
            "mal_id": "52991"
        }))
        .expect("deserialise");
        assert_eq!(metadata.poster_url.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(metadata.episodes_total, Some(28));
    }

    #[rstest]
    fn normalised_metadata_drops_blank_values() {
        let metadata = TitleMetadata {
            title: Some("  ".into()),
            poster_url: Some(" /p.jpg ".into()),
            episodes_total: Some(0),
        }
        .normalised();
        assert_eq!(metadata.title, None);
        assert_eq!(metadata.poster_url.as_deref(), Some("/p.jpg"));
        assert_eq!(metadata.episodes_total, None);
    }

    #[rstest]
    fn update_keeps_creation_time(now: DateTime<Utc>) {
        let mut item = entry("1", WatchStatus::Planned, now);
        let later = now + Duration::hours(1);
        item.update(WatchStatus::Watching, TitleMetadata::default(), later);
        assert_eq!(item.created_at, now);
        assert_eq!(item.updated_at, later);
        assert_eq!(item.status, WatchStatus::Watching);
    }

    #[rstest]
    fn stats_count_each_status(now: DateTime<Utc>) {
        let entries = vec![
            entry("1", WatchStatus::Watching, now),
            entry("2", WatchStatus::Watching, now),
            entry("3", WatchStatus::Dropped, now),
            entry("4", WatchStatus::Planned, now),
        ];
        let stats = ListStats::from_entries(&entries);
        assert_eq!(
            stats,
            ListStats {
                total: 4,
                watching: 2,
                planned: 1,
                completed: 0,
                dropped: 1,
            }
        );
        let detailed = DetailedStats::from_entries(&entries);
        assert_eq!(detailed.watching.len(), 2);
        assert!(detailed.completed.is_empty());
    }

    #[rstest]
    fn sorting_puts_latest_update_first(now: DateTime<Utc>) {
        let mut entries = vec![
            entry("1", WatchStatus::Planned, now),
            entry("2", WatchStatus::Planned, now + Duration::minutes(5)),
        ];
        sort_by_recent_update(&mut entries);
        assert_eq!(entries[0].title_id.as_ref(), "2");
    }

    #[rstest]
    fn activity_groups_by_utc_day_within_window(now: DateTime<Utc>) {
        let events = vec![
            event("1", now),
            event("1", now - Duration::hours(3)),
            event("2", now - Duration::days(2)),
            event("3", now - Duration::days(30)),
        ];
        let activity = activity_by_day(&events, now, 7);
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].count, 1);
        assert_eq!(activity[1].date, now.date_naive());
        assert_eq!(activity[1].count, 2);
    }

    #[rstest]
    fn activity_with_zero_days_is_empty(now: DateTime<Utc>) {
        assert!(activity_by_day(&[event("1", now)], now, 0).is_empty());
    }
}
