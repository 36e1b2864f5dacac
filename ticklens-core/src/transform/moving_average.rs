//! Simple moving average over closing prices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use ticklens_types::LensError;

use crate::series::{MarketZone, Observation, PriceSeries};

/// Trailing simple moving average aligned one-to-one with its input series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovingAverageSeries {
    window: usize,
    zone: MarketZone,
    points: Vec<Observation<Option<Decimal>>>,
}

impl MovingAverageSeries {
    /// Window the average was computed over.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Zone inherited from the price series.
    #[must_use]
    pub const fn zone(&self) -> MarketZone {
        self.zone
    }

    /// One entry per input observation; `None` where the average is undefined.
    #[must_use]
    pub fn points(&self) -> &[Observation<Option<Decimal>>] {
        &self.points
    }

    /// Number of entries (always the input length).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// True for an empty input.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Entries where the average is defined.
    pub fn defined(&self) -> impl Iterator<Item = Observation<Decimal>> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| Observation::new(p.ts, v)))
    }

    /// Average at `ts`, if that timestamp exists and is defined.
    #[must_use]
    pub fn at(&self, ts: DateTime<Utc>) -> Option<Decimal> {
        self.points
            .binary_search_by_key(&ts, |p| p.ts)
            .ok()
            .and_then(|i| self.points[i].value)
    }

    /// True when no position has a defined average, e.g. the window exceeds the series length.
    ///
    /// This is a reportable condition, not an error.
    #[must_use]
    pub fn is_insufficient(&self) -> bool {
        self.points.iter().all(|p| p.value.is_none())
    }
}

/// Compute the trailing `window`-period mean of `prices`.
///
/// Entry `i` is the mean of closes `i-window+1 ..= i`. The first `window-1`
/// entries are undefined, as is any entry whose window contains a missing
/// close. A window longer than the series leaves every entry undefined.
///
/// # Errors
/// Returns `LensError::InvalidArg` for a zero window and `LensError::Data`
/// if the running sum overflows the decimal range.
///
/// ```
/// use chrono::{DateTime, Utc};
/// use rust_decimal::Decimal;
/// use ticklens_core::series::{MarketZone, PriceSeries};
/// use ticklens_core::transform::moving_average::compute_moving_average;
///
/// let t = |d: i64| DateTime::<Utc>::from_timestamp(d * 86_400, 0).unwrap();
/// let prices = PriceSeries::from_closes(
///     MarketZone::Utc,
///     (1..=5).map(|i| (t(i), Decimal::from(i * 10))),
/// )
/// .unwrap();
/// let ma = compute_moving_average(&prices, 3).unwrap();
/// let values: Vec<_> = ma.points().iter().map(|p| p.value).collect();
/// assert_eq!(
///     values,
///     vec![None, None, Some(Decimal::from(20)), Some(Decimal::from(30)), Some(Decimal::from(40))]
/// );
/// ```
pub fn compute_moving_average(
    prices: &PriceSeries,
    window: usize,
) -> Result<MovingAverageSeries, LensError> {
    if window == 0 {
        return Err(LensError::InvalidArg(
            "moving average window must be at least 1".into(),
        ));
    }
    let overflow = || LensError::Data("moving average sum overflowed".into());
    let divisor = Decimal::from(window);

    let pts = prices.points();
    let mut points = Vec::with_capacity(pts.len());
    let mut sum = Decimal::ZERO;
    let mut missing = 0usize;

    for (i, p) in pts.iter().enumerate() {
        match p.value {
            Some(v) => sum = sum.checked_add(v).ok_or_else(overflow)?,
            None => missing += 1,
        }
        if i >= window {
            match pts[i - window].value {
                Some(v) => sum = sum.checked_sub(v).ok_or_else(overflow)?,
                None => missing -= 1,
            }
        }
        let value = if i + 1 >= window && missing == 0 {
            Some(sum.checked_div(divisor).ok_or_else(overflow)?)
        } else {
            None
        };
        points.push(Observation::new(p.ts, value));
    }

    Ok(MovingAverageSeries {
        window,
        zone: prices.zone(),
        points,
    })
}
