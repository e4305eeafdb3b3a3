//! Watch status vocabulary and normalisation.
//!
//! Clients and the catalog describe progress in several languages and
//! spellings. [`normalize_status`] folds all of them onto [`WatchStatus`];
//! anything outside the vocabulary is reported back unchanged so callers can
//! reject it with the raw value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Canonical per-title progress state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Watching,
    Completed,
    Dropped,
    Planned,
}

impl WatchStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 4] = [Self::Watching, Self::Planned, Self::Completed, Self::Dropped];

    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
            Self::Planned => "planned",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`normalize_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusNormalization {
    Recognised(WatchStatus),
    Unrecognised(String),
}

const ALIASES: &[(&str, WatchStatus)] = &[
    ("watching", WatchStatus::Watching),
    ("watch", WatchStatus::Watching),
    ("currently airing", WatchStatus::Watching),
    ("airing", WatchStatus::Watching),
    ("now airing", WatchStatus::Watching),
    ("on air", WatchStatus::Watching),
    ("airing now", WatchStatus::Watching),
    ("смотрю", WatchStatus::Watching),
    ("planned", WatchStatus::Planned),
    ("plan to watch", WatchStatus::Planned),
    ("plan", WatchStatus::Planned),
    ("в планах", WatchStatus::Planned),
    ("completed", WatchStatus::Completed),
    ("finished", WatchStatus::Completed),
    ("завершено", WatchStatus::Completed),
    ("просмотрено", WatchStatus::Completed),
    ("dropped", WatchStatus::Dropped),
    ("брошено", WatchStatus::Dropped),
];

/// Map a free-form status label onto [`WatchStatus`].
///
/// Matching trims whitespace and ignores case, including Cyrillic.
///
/// # Examples
/// ```
/// use anitrack::domain::{normalize_status, StatusNormalization, WatchStatus};
///
/// assert_eq!(
///     normalize_status("  Plan to Watch "),
///     StatusNormalization::Recognised(WatchStatus::Planned)
/// );
/// assert_eq!(
///     normalize_status("paused"),
///     StatusNormalization::Unrecognised("paused".into())
/// );
/// ```
pub fn normalize_status(raw: &str) -> StatusNormalization {
    let folded = raw.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map_or_else(
            || StatusNormalization::Unrecognised(raw.to_owned()),
            |(_, status)| StatusNormalization::Recognised(*status),
        )
}

/// Raised when a label is outside the status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown watch status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for WatchStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_status(s) {
            StatusNormalization::Recognised(status) => Ok(status),
            StatusNormalization::Unrecognised(raw) => Err(UnknownStatus(raw)),
        }
    }
}
