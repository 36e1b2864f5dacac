//! Ordered, zone-aware series handed to the transformers.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use paft::market::responses::history::HistoryMeta;
use ticklens_types::LensError;

/// Time zone a provider expressed its timestamps in.
///
/// Calendar grouping (days, months) is evaluated in this zone so that a bar
/// stamped late on the last day of a month in New York does not drift into
/// the following month when viewed from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketZone {
    /// Coordinated Universal Time.
    #[default]
    Utc,
    /// Fixed offset from UTC in seconds.
    Offset(i64),
    /// IANA zone with daylight-saving rules.
    Named(chrono_tz::Tz),
}

impl MarketZone {
    /// Zone carried by provider history metadata: IANA zone first, then fixed offset, else UTC.
    #[must_use]
    pub fn from_meta(meta: Option<&HistoryMeta>) -> Self {
        match meta {
            Some(HistoryMeta {
                timezone: Some(tz), ..
            }) => Self::Named(*tz),
            Some(HistoryMeta {
                utc_offset_seconds: Some(off),
                ..
            }) => Self::Offset(*off),
            _ => Self::Utc,
        }
    }

    /// Wall-clock time of `ts` in this zone.
    #[must_use]
    pub fn local(&self, ts: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Utc => ts.naive_utc(),
            Self::Offset(secs) => (ts + TimeDelta::seconds(*secs)).naive_utc(),
            Self::Named(tz) => ts.with_timezone(tz).naive_local(),
        }
    }

    /// Calendar `(year, month)` of `ts` in this zone.
    #[must_use]
    pub fn year_month(&self, ts: DateTime<Utc>) -> (i32, u32) {
        let local = self.local(ts);
        (local.year(), local.month())
    }

    /// Display label, e.g. `UTC`, `UTC-05:00`, `America/New_York`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Utc => "UTC".to_string(),
            Self::Offset(secs) => {
                let sign = if *secs < 0 { '-' } else { '+' };
                let abs = secs.unsigned_abs();
                format!("UTC{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
            }
            Self::Named(tz) => tz.name().to_string(),
        }
    }
}

/// A single timestamped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation<T> {
    /// Bar timestamp.
    pub ts: DateTime<Utc>,
    /// Observed value.
    pub value: T,
}

impl<T> Observation<T> {
    /// Pair a timestamp with a value.
    pub const fn new(ts: DateTime<Utc>, value: T) -> Self {
        Self { ts, value }
    }
}

fn ensure_strictly_increasing<T>(what: &str, points: &[Observation<T>]) -> Result<(), LensError> {
    if let Some(w) = points.windows(2).find(|w| w[0].ts >= w[1].ts) {
        return Err(LensError::Data(format!(
            "{what} timestamps must be strictly increasing: {} is followed by {}",
            w[0].ts, w[1].ts
        )));
    }
    Ok(())
}

/// Closing prices in ascending time order; `None` marks a missing close.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriceSeries {
    zone: MarketZone,
    points: Vec<Observation<Option<Decimal>>>,
}

impl PriceSeries {
    /// Build a series, rejecting unordered or duplicate timestamps.
    ///
    /// # Errors
    /// Returns `LensError::Data` if timestamps are not strictly increasing.
    pub fn new(zone: MarketZone, points: Vec<Observation<Option<Decimal>>>) -> Result<Self, LensError> {
        ensure_strictly_increasing("price", &points)?;
        Ok(Self { zone, points })
    }

    /// Wrap points already known to be strictly increasing.
    pub(crate) const fn from_sorted(
        zone: MarketZone,
        points: Vec<Observation<Option<Decimal>>>,
    ) -> Self {
        Self { zone, points }
    }

    /// Convenience constructor for series without gaps.
    ///
    /// # Errors
    /// Returns `LensError::Data` if timestamps are not strictly increasing.
    pub fn from_closes(
        zone: MarketZone,
        closes: impl IntoIterator<Item = (DateTime<Utc>, Decimal)>,
    ) -> Result<Self, LensError> {
        Self::new(
            zone,
            closes
                .into_iter()
                .map(|(ts, v)| Observation::new(ts, Some(v)))
                .collect(),
        )
    }

    /// Zone the timestamps were delivered in.
    #[must_use]
    pub const fn zone(&self) -> MarketZone {
        self.zone
    }

    /// Observations in time order.
    #[must_use]
    pub fn points(&self) -> &[Observation<Option<Decimal>>] {
        &self.points
    }

    /// Number of observations, missing closes included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series has no observations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent observation carrying a close.
    #[must_use]
    pub fn last_defined(&self) -> Option<Observation<Decimal>> {
        self.points
            .iter()
            .rev()
            .find_map(|p| p.value.map(|v| Observation::new(p.ts, v)))
    }
}

/// Traded volume per bar in ascending time order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VolumeSeries {
    zone: MarketZone,
    points: Vec<Observation<u64>>,
}

impl VolumeSeries {
    /// Build a series, rejecting unordered or duplicate timestamps.
    ///
    /// # Errors
    /// Returns `LensError::Data` if timestamps are not strictly increasing.
    pub fn new(zone: MarketZone, points: Vec<Observation<u64>>) -> Result<Self, LensError> {
        ensure_strictly_increasing("volume", &points)?;
        Ok(Self { zone, points })
    }

    /// Wrap points already known to be strictly increasing.
    pub(crate) const fn from_sorted(zone: MarketZone, points: Vec<Observation<u64>>) -> Self {
        Self { zone, points }
    }

    /// Zone the timestamps were delivered in.
    #[must_use]
    pub const fn zone(&self) -> MarketZone {
        self.zone
    }

    /// Observations in time order.
    #[must_use]
    pub fn points(&self) -> &[Observation<u64>] {
        &self.points
    }

    /// Number of observations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series has no observations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exact sum of every observation.
    #[must_use]
    pub fn total(&self) -> u128 {
        self.points.iter().map(|p| u128::from(p.value)).sum()
    }
}
