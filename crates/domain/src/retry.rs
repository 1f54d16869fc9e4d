//! Rate-limit and retry-budget bookkeeping for a single logical API call.
//!
//! [`RateLimitState`] is derived fresh from every response and tells the client
//! how long to wait before the rate-limit window resets. [`RetryBudget`] is
//! created when a logical call starts and tracks the elapsed time against the
//! configured [`ApiTimeout`] together with the conflict back-off schedule.
//!
//! Neither type performs I/O or sleeps; the client crate drives them.

use std::time::Duration;

use crate::{ApiTimeout, Timestamp};

/// Safety margin added on top of the advertised rate-limit reset time.
pub const RATE_LIMIT_RESET_BUFFER: Duration = Duration::from_secs(10);

/// First delay applied after a write conflict.
pub const INITIAL_CONFLICT_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound for the doubling conflict back-off.
pub const MAX_CONFLICT_BACKOFF: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Rate-limit state
// ---------------------------------------------------------------------------

/// Rate-limit information advertised by one response.
///
/// Both fields are optional because the headers are frequently absent (e.g. on
/// error responses from proxies) or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitState {
    /// Requests left in the current window (`X-RateLimit-Remaining`).
    pub remaining: Option<u64>,
    /// Unix epoch second at which the window resets (`X-RateLimit-Reset`).
    pub reset_epoch_seconds: Option<i64>,
}

impl RateLimitState {
    /// Parses the raw header values. Unparseable values are treated as absent.
    pub fn from_header_values(remaining: Option<&str>, reset: Option<&str>) -> Self {
        Self {
            remaining: remaining.and_then(|v| v.trim().parse().ok()),
            reset_epoch_seconds: reset.and_then(|v| v.trim().parse().ok()),
        }
    }

    /// `true` when the window has no requests left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// How long to wait, measured from `now`, before the window has reset.
    ///
    /// A missing reset time is treated as epoch zero, which yields no wait.
    pub fn wait_from(&self, now: Timestamp) -> Duration {
        let reset = self.reset_epoch_seconds.unwrap_or(0) as f64;
        let wait = reset - now.epoch_seconds_f64() + RATE_LIMIT_RESET_BUFFER.as_secs_f64();
        if wait > 0.0 {
            Duration::from_secs_f64(wait)
        } else {
            Duration::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Retry budget
// ---------------------------------------------------------------------------

/// Time budget and back-off schedule for one logical call and its retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryBudget {
    started_at: Timestamp,
    timeout: ApiTimeout,
    backoff: Duration,
    max_backoff: Duration,
}

impl RetryBudget {
    /// Starts a budget at `started_at` with the default back-off cap.
    pub fn start(started_at: Timestamp, timeout: ApiTimeout) -> Self {
        Self::with_max_backoff(started_at, timeout, MAX_CONFLICT_BACKOFF)
    }

    /// Starts a budget with a custom cap on the conflict back-off.
    pub fn with_max_backoff(started_at: Timestamp, timeout: ApiTimeout, max_backoff: Duration) -> Self {
        Self {
            started_at,
            timeout,
            backoff: INITIAL_CONFLICT_BACKOFF.min(max_backoff),
            max_backoff,
        }
    }

    /// When the budget was started.
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// The configured timeout.
    pub fn timeout(&self) -> ApiTimeout {
        self.timeout
    }

    /// The point in time after which no further retry is attempted.
    pub fn deadline(&self) -> Timestamp {
        self.started_at.advanced_by(self.timeout.as_duration())
    }

    /// Time spent so far.
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// `true` once the elapsed time is strictly greater than the timeout.
    pub fn is_exhausted(&self, now: Timestamp) -> bool {
        self.elapsed(now) > self.timeout.as_duration()
    }

    /// Returns the delay for the next conflict retry and doubles the stored
    /// delay, capped at the configured maximum.
    pub fn next_conflict_backoff(&mut self) -> Duration {
        let current = self.backoff;
        self.backoff = current.saturating_mul(2).min(self.max_backoff);
        current
    }
}
