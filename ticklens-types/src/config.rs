//! Configuration types shared by the dashboard, middleware and binary.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LensError;
use crate::request::Lookback;

/// Retry policy applied to provider calls.
///
/// The default is a single attempt: retrying is opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first (>= 1).
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    pub min_backoff_ms: u64,
    /// Upper bound on any single delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor applied after each failed attempt (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            min_backoff_ms: 250,
            max_backoff_ms: 5_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

impl RetryConfig {
    /// A policy making `attempts` tries with the default backoff.
    #[must_use]
    pub fn attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            ..Self::default()
        }
    }

    /// True when the policy ever retries.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Check the numeric bounds of the policy.
    ///
    /// # Errors
    /// Returns `InvalidArg` describing the first offending field.
    pub fn validate(&self) -> Result<(), LensError> {
        if self.max_attempts == 0 {
            return Err(LensError::InvalidArg("retry.max_attempts must be >= 1".into()));
        }
        if self.factor == 0 {
            return Err(LensError::InvalidArg("retry.factor must be >= 1".into()));
        }
        if self.jitter_percent > 100 {
            return Err(LensError::InvalidArg(
                "retry.jitter_percent must be within [0, 100]".into(),
            ));
        }
        if self.min_backoff_ms > self.max_backoff_ms {
            return Err(LensError::InvalidArg(
                "retry.min_backoff_ms must not exceed retry.max_backoff_ms".into(),
            ));
        }
        Ok(())
    }
}

/// Fetch memoization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether fetch results are memoized at all.
    pub enabled: bool,
    /// Entry lifetime in milliseconds; `None` keeps entries for the process lifetime.
    pub ttl_ms: Option<u64>,
    /// Maximum entries per cached capability.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: Some(3_600_000),
            max_entries: 256,
        }
    }
}

impl CacheConfig {
    /// Entry lifetime, if bounded.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

/// Global configuration for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Moving-average window used when none is requested.
    pub default_window: usize,
    /// Smallest window accepted from interactive input.
    pub min_window: usize,
    /// Largest window accepted from interactive input.
    pub max_window: usize,
    /// Rows shown from the end of each history table.
    pub table_tail_rows: usize,
    /// First day of the long-run history table.
    pub history_since: NaiveDate,
    /// Span aggregated into the monthly volume breakdown.
    pub volume_lookback: Lookback,
    /// Span searched for the most recent close.
    pub latest_price_lookback: Lookback,
    /// Timeout for individual provider calls in milliseconds.
    pub provider_timeout_ms: u64,
    /// Retry policy for provider calls.
    pub retry: RetryConfig,
    /// Fetch memoization settings.
    pub cache: CacheConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_window: 20,
            min_window: 5,
            max_window: 50,
            table_tail_rows: 5,
            history_since: NaiveDate::from_ymd_opt(1999, 1, 1).unwrap_or(NaiveDate::MIN),
            volume_lookback: Lookback::M6,
            latest_price_lookback: Lookback::D5,
            provider_timeout_ms: 10_000,
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    ///
    /// # Errors
    /// Returns `InvalidArg` for malformed TOML or out-of-range values.
    pub fn from_toml_str(raw: &str) -> Result<Self, LensError> {
        let cfg: Self =
            toml::from_str(raw).map_err(|e| LensError::InvalidArg(format!("config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LensError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LensError::InvalidArg(format!("config {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Per-call provider timeout.
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Check that the configuration is internally consistent.
    ///
    /// # Errors
    /// Returns `InvalidArg` describing the first inconsistency.
    pub fn validate(&self) -> Result<(), LensError> {
        if self.min_window == 0 || self.min_window > self.max_window {
            return Err(LensError::InvalidArg(format!(
                "window bounds [{}, {}] are invalid",
                self.min_window, self.max_window
            )));
        }
        if !(self.min_window..=self.max_window).contains(&self.default_window) {
            return Err(LensError::InvalidArg(format!(
                "default_window {} outside [{}, {}]",
                self.default_window, self.min_window, self.max_window
            )));
        }
        if self.provider_timeout_ms == 0 {
            return Err(LensError::InvalidArg("provider_timeout_ms must be > 0".into()));
        }
        self.retry.validate()
    }
}
