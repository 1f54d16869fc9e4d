//! Shared value types for repo-admin.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. timeouts are strictly positive,
//! batch sizes are at least one) and participate in computations.

use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Settings values
// ---------------------------------------------------------------------------

/// Overall time budget for one logical API call, retries included.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ApiTimeout(Duration);

impl ApiTimeout {
    /// Default budget applied when `API_TIMEOUT_SECONDS` is not set.
    pub const DEFAULT_SECONDS: f64 = 60.0;

    /// Creates an [`ApiTimeout`] from a number of seconds.
    ///
    /// Returns `None` if `seconds` is not strictly positive, is NaN, or does
    /// not fit in a [`Duration`].
    #[must_use]
    pub fn from_secs_f64(seconds: f64) -> Option<Self> {
        if seconds.is_nan() || seconds <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|duration| !duration.is_zero())
            .map(Self)
    }

    /// Returns the budget as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for ApiTimeout {
    fn default() -> Self {
        Self(Duration::from_secs_f64(Self::DEFAULT_SECONDS))
    }
}

impl std::fmt::Display for ApiTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}s", self.0.as_secs_f64())
    }
}

// ---------------------------------------------------------------------------

/// Number of work items processed together as one batch. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    /// Default batch size applied when `BATCH_SIZE` is not set.
    pub const DEFAULT: usize = 1;

    /// Creates a [`BatchSize`], returning `None` for zero.
    #[must_use]
    pub fn new(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self)
    }

    /// Returns the size as a plain integer.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(NonZeroUsize::MIN)
    }
}

impl std::fmt::Display for BatchSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// A personal access token.
///
/// The value is never printed by [`Debug`]; callers must ask for it explicitly
/// with [`Credential::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token, returning `None` if it is empty.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Returns the raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

// ---------------------------------------------------------------------------
// Repository metadata
// ---------------------------------------------------------------------------

/// The outcome of looking up a repository's most recent commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastCommit {
    /// Committer date of the newest commit, as reported by the API.
    Date(String),
    /// The repository exists but has no commits.
    NoCommits,
    /// The commit listing could not be fetched.
    Unavailable,
}

impl std::fmt::Display for LastCommit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LastCommit::Date(date) => f.write_str(date),
            LastCommit::NoCommits => f.write_str("No commits"),
            LastCommit::Unavailable => f.write_str("Failed to fetch commits"),
        }
    }
}

/// Maps a file path to a language name using its extension.
///
/// Matching is case-insensitive. Unknown or missing extensions return `None`.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        // Dotfiles such as `.gitignore` have no extension.
        return None;
    }
    let language = match extension.to_ascii_lowercase().as_str() {
        "py" => "Python",
        "js" | "mjs" | "cjs" => "JavaScript",
        "ts" | "tsx" => "TypeScript",
        "html" | "htm" => "HTML",
        "css" => "CSS",
        "rs" => "Rust",
        "go" => "Go",
        "java" => "Java",
        "cs" => "C#",
        "ps1" => "PowerShell",
        "sh" => "Shell",
        _ => return None,
    };
    Some(language)
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a [`Timestamp`] from whole Unix epoch seconds.
    ///
    /// Returns `None` if the value is outside the representable range.
    pub fn from_epoch_seconds(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns fractional Unix epoch seconds.
    pub fn epoch_seconds_f64(self) -> f64 {
        self.0.timestamp_micros() as f64 / 1_000_000.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        (self.0 - earlier.0).to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns this timestamp moved forward by `by`.
    ///
    /// Saturates at `self` if `by` does not fit chrono's range.
    pub fn advanced_by(self, by: Duration) -> Self {
        match chrono::Duration::from_std(by) {
            Ok(delta) => self.0.checked_add_signed(delta).map(Self).unwrap_or(self),
            Err(_) => self,
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
