//! Request-scoped parameters: what to fetch, over which span, at which cadence.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LensError;

/// Relative lookback span ending "now", in the provider's period vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Lookback {
    /// One day.
    D1,
    /// Two days.
    D2,
    /// Five days.
    D5,
    /// One month.
    M1,
    /// Three months.
    M3,
    /// Six months.
    M6,
    /// One year.
    Y1,
    /// Five years.
    Y5,
    /// Ten years.
    Y10,
    /// Since January 1st of the current year.
    Ytd,
    /// Everything the provider has.
    Max,
}

impl Lookback {
    /// Every supported lookback, in ascending span order.
    pub const ALL: [Self; 11] = [
        Self::D1,
        Self::D2,
        Self::D5,
        Self::M1,
        Self::M3,
        Self::M6,
        Self::Y1,
        Self::Y5,
        Self::Y10,
        Self::Ytd,
        Self::Max,
    ];

    /// Provider code for this span (`"6mo"`, `"ytd"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::D1 => "1d",
            Self::D2 => "2d",
            Self::D5 => "5d",
            Self::M1 => "1mo",
            Self::M3 => "3mo",
            Self::M6 => "6mo",
            Self::Y1 => "1y",
            Self::Y5 => "5y",
            Self::Y10 => "10y",
            Self::Ytd => "ytd",
            Self::Max => "max",
        }
    }

    /// Resolve the span into an absolute start instant for a window ending at `end`.
    ///
    /// Month arithmetic clamps to the last valid day (Aug 31 minus one month is Jul 31,
    /// Mar 31 minus one month is Feb 28/29). `Max` resolves to the Unix epoch.
    #[must_use]
    pub fn start_before(self, end: DateTime<Utc>) -> DateTime<Utc> {
        let months = |n: u32| end.checked_sub_months(Months::new(n)).unwrap_or(DateTime::UNIX_EPOCH);
        match self {
            Self::D1 => end - TimeDelta::days(1),
            Self::D2 => end - TimeDelta::days(2),
            Self::D5 => end - TimeDelta::days(5),
            Self::M1 => months(1),
            Self::M3 => months(3),
            Self::M6 => months(6),
            Self::Y1 => months(12),
            Self::Y5 => months(60),
            Self::Y10 => months(120),
            Self::Ytd => Utc
                .with_ymd_and_hms(end.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(DateTime::UNIX_EPOCH),
            Self::Max => DateTime::UNIX_EPOCH,
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == code)
            .ok_or_else(|| LensError::InvalidArg(format!("unknown period '{s}'")))
    }
}

impl TryFrom<String> for Lookback {
    type Error = LensError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Lookback> for String {
    fn from(value: Lookback) -> Self {
        value.as_str().to_string()
    }
}

/// Sampling cadence of the requested bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sampling {
    /// One-minute bars.
    I1m,
    /// Five-minute bars.
    I5m,
    /// Fifteen-minute bars.
    I15m,
    /// Thirty-minute bars.
    I30m,
    /// Hourly bars.
    I1h,
    /// Daily bars.
    D1,
    /// Five-day bars.
    D5,
    /// Weekly bars.
    W1,
    /// Monthly bars.
    Mo1,
}

impl Sampling {
    /// Every supported cadence, finest first.
    pub const ALL: [Self; 9] = [
        Self::I1m,
        Self::I5m,
        Self::I15m,
        Self::I30m,
        Self::I1h,
        Self::D1,
        Self::D5,
        Self::W1,
        Self::Mo1,
    ];

    /// Provider code for this cadence (`"1d"`, `"1wk"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I1m => "1m",
            Self::I5m => "5m",
            Self::I15m => "15m",
            Self::I30m => "30m",
            Self::I1h => "1h",
            Self::D1 => "1d",
            Self::D5 => "5d",
            Self::W1 => "1wk",
            Self::Mo1 => "1mo",
        }
    }

    /// True for bars finer than one trading day.
    #[must_use]
    pub const fn is_intraday(self) -> bool {
        matches!(self, Self::I1m | Self::I5m | Self::I15m | Self::I30m | Self::I1h)
    }
}

impl fmt::Display for Sampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sampling {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == code)
            .ok_or_else(|| LensError::InvalidArg(format!("unknown interval '{s}'")))
    }
}

impl TryFrom<String> for Sampling {
    type Error = LensError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sampling> for String {
    fn from(value: Sampling) -> Self {
        value.as_str().to_string()
    }
}

/// Which slice of history to fetch.
///
/// Equality and hashing are structural, so a `RangeSpec` doubles as part of a
/// memoization key: two requests share a cached result only when they name the
/// same span the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSpec {
    /// A lookback ending at fetch time.
    Lookback {
        /// Span to look back over.
        period: Lookback,
        /// Bar cadence.
        interval: Sampling,
    },
    /// An explicit calendar window; `end` is exclusive.
    Dates {
        /// First calendar day (inclusive).
        start: NaiveDate,
        /// Last calendar day (exclusive).
        end: NaiveDate,
        /// Bar cadence.
        interval: Sampling,
    },
}

impl RangeSpec {
    /// Lookback range.
    #[must_use]
    pub const fn lookback(period: Lookback, interval: Sampling) -> Self {
        Self::Lookback { period, interval }
    }

    /// Explicit date range.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `start` is not strictly before `end`.
    pub fn between(start: NaiveDate, end: NaiveDate, interval: Sampling) -> Result<Self, LensError> {
        if start >= end {
            return Err(LensError::InvalidArg(format!(
                "start date {start} must be before end date {end}"
            )));
        }
        Ok(Self::Dates {
            start,
            end,
            interval,
        })
    }

    /// Bar cadence of this range.
    #[must_use]
    pub const fn interval(&self) -> Sampling {
        match self {
            Self::Lookback { interval, .. } | Self::Dates { interval, .. } => *interval,
        }
    }

    /// Resolve into absolute `[start, end)` instants, using `now` for lookbacks.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            Self::Lookback { period, .. } => (period.start_before(now), now),
            Self::Dates { start, end, .. } => (
                start.and_time(chrono::NaiveTime::MIN).and_utc(),
                end.and_time(chrono::NaiveTime::MIN).and_utc(),
            ),
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookback { period, interval } => write!(f, "{period} @ {interval}"),
            Self::Dates {
                start,
                end,
                interval,
            } => write!(f, "{start}..{end} @ {interval}"),
        }
    }
}

/// Everything a single dashboard interaction asks for.
///
/// Deserialization goes through [`DashboardRequest::new`], so a decoded
/// request is held to the same checks as a constructed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDashboardRequest")]
pub struct DashboardRequest {
    symbol: String,
    range: RangeSpec,
    window: usize,
}

#[derive(Deserialize)]
struct RawDashboardRequest {
    symbol: String,
    range: RangeSpec,
    window: usize,
}

impl TryFrom<RawDashboardRequest> for DashboardRequest {
    type Error = LensError;

    fn try_from(raw: RawDashboardRequest) -> Result<Self, Self::Error> {
        Self::new(&raw.symbol, raw.range, raw.window)
    }
}

impl DashboardRequest {
    /// Build a request, normalizing the ticker to upper case.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a blank ticker or a zero window.
    pub fn new(symbol: &str, range: RangeSpec, window: usize) -> Result<Self, LensError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(LensError::InvalidArg("ticker symbol must not be empty".into()));
        }
        if window == 0 {
            return Err(LensError::InvalidArg(
                "moving average window must be at least 1".into(),
            ));
        }
        Ok(Self {
            symbol: symbol.to_ascii_uppercase(),
            range,
            window,
        })
    }

    /// Upper-cased ticker.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Requested price-history range.
    #[must_use]
    pub const fn range(&self) -> &RangeSpec {
        &self.range
    }

    /// Moving-average window.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }
}
