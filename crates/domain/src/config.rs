//! Resolution of named settings from the process environment.
//!
//! [`ConfigResolver`] wraps a lookup function so that the same resolution rules
//! apply to the real environment ([`ConfigResolver::from_env`]) and to
//! in-memory maps used by tests and embedding callers.
//!
//! Rules:
//!
//! - Required strings (credentials, organisation names) fail with
//!   [`ConfigError::MissingConfiguration`] when unset or empty.
//! - Settings with a default never fail. An absent value falls back silently;
//!   a malformed value falls back with a warning.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use crate::{ApiTimeout, BatchSize, ConfigError, Credential};

/// Environment variable holding the batch size.
pub const BATCH_SIZE_VAR: &str = "BATCH_SIZE";

/// Environment variable holding the per-call timeout in seconds.
pub const API_TIMEOUT_SECONDS_VAR: &str = "API_TIMEOUT_SECONDS";

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Resolves configuration values by name.
pub struct ConfigResolver {
    lookup: Box<Lookup>,
}

impl ConfigResolver {
    /// Resolves against the process environment.
    ///
    /// Variables holding non-UTF-8 data are treated as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves with an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Resolves against a fixed set of name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_lookup(move |name| values.get(name).cloned())
    }

    /// Returns the value of `name` if it is set and non-empty.
    pub fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.is_empty())
    }

    /// Returns the value of `name`, failing if it is unset or empty.
    pub fn require(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::MissingConfiguration {
                name: name.to_string(),
            })
    }

    /// Returns the credential stored in `name`, failing if it is unset or empty.
    pub fn credential(&self, name: &str) -> Result<Credential, ConfigError> {
        let token = self.require(name)?;
        Credential::new(token).ok_or_else(|| ConfigError::MissingConfiguration {
            name: name.to_string(),
        })
    }

    /// Parses `name` with [`FromStr`], falling back to `default` when the value
    /// is absent or does not parse.
    pub fn parse_or<T>(&self, name: &str, default: T) -> T
    where
        T: FromStr + std::fmt::Debug,
    {
        match self.optional(name) {
            None => default,
            Some(raw) => match raw.trim().parse() {
                Ok(value) => value,
                Err(_) => {
                    warn!(variable = name, value = %raw, ?default, "Malformed setting, using default");
                    default
                }
            },
        }
    }

    /// Integer setting with a default.
    pub fn integer_or(&self, name: &str, default: i64) -> i64 {
        self.parse_or(name, default)
    }

    /// Floating-point setting with a default.
    pub fn float_or(&self, name: &str, default: f64) -> f64 {
        self.parse_or(name, default)
    }

    /// Boolean switch: only a case-insensitive `"true"` enables it.
    pub fn flag(&self, name: &str) -> bool {
        self.optional(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// The batch size from `BATCH_SIZE` (default 1).
    ///
    /// Zero and negative values are malformed and fall back to the default.
    pub fn batch_size(&self) -> BatchSize {
        let raw = self.integer_or(BATCH_SIZE_VAR, BatchSize::DEFAULT as i64);
        usize::try_from(raw)
            .ok()
            .and_then(BatchSize::new)
            .unwrap_or_else(|| {
                warn!(variable = BATCH_SIZE_VAR, value = raw, "Batch size must be at least 1, using default");
                BatchSize::default()
            })
    }

    /// The per-call timeout from `API_TIMEOUT_SECONDS` (default 60).
    ///
    /// Non-positive values and values too large for a duration are malformed
    /// and fall back to the default.
    pub fn api_timeout(&self) -> ApiTimeout {
        let raw = self.float_or(API_TIMEOUT_SECONDS_VAR, ApiTimeout::DEFAULT_SECONDS);
        ApiTimeout::from_secs_f64(raw).unwrap_or_else(|| {
            warn!(variable = API_TIMEOUT_SECONDS_VAR, value = raw, "Timeout must be a positive, representable number of seconds, using default");
            ApiTimeout::default()
        })
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver").finish_non_exhaustive()
    }
}
