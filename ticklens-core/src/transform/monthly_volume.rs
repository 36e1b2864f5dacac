//! Calendar-month volume totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::series::VolumeSeries;

/// Total traded volume for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyVolume {
    /// Calendar year in the series' zone.
    pub year: i32,
    /// Calendar month (1-12) in the series' zone.
    pub month: u32,
    /// Exact sum of the month's volumes.
    pub total: u128,
}

impl MonthlyVolume {
    /// Human label such as `Jul 2025`.
    #[must_use]
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).map_or_else(
            || format!("{:02}/{}", self.month, self.year),
            |d| d.format("%b %Y").to_string(),
        )
    }

    /// Percentage of `grand_total` carried by this month; zero when the total is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share_of(&self, grand_total: u128) -> f64 {
        if grand_total == 0 {
            0.0
        } else {
            self.total as f64 / grand_total as f64 * 100.0
        }
    }
}

/// Chronological per-month totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MonthlyVolumeAggregate {
    months: Vec<MonthlyVolume>,
}

impl MonthlyVolumeAggregate {
    /// Months in chronological order.
    #[must_use]
    pub fn months(&self) -> &[MonthlyVolume] {
        &self.months
    }

    /// Number of months present.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.months.len()
    }

    /// True when the input had no observations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Sum over all months; equals the sum of the input volumes.
    #[must_use]
    pub fn total(&self) -> u128 {
        self.months.iter().map(|m| m.total).sum()
    }
}

/// Sum `volumes` per `(year, month)` evaluated in the series' own zone.
///
/// Every month containing at least one observation appears exactly once, in
/// chronological order, even when its volumes sum to zero.
#[must_use]
pub fn aggregate_monthly_volume(volumes: &VolumeSeries) -> MonthlyVolumeAggregate {
    let zone = volumes.zone();
    let mut buckets: BTreeMap<(i32, u32), u128> = BTreeMap::new();
    for p in volumes.points() {
        *buckets.entry(zone.year_month(p.ts)).or_default() += u128::from(p.value);
    }
    MonthlyVolumeAggregate {
        months: buckets
            .into_iter()
            .map(|((year, month), total)| MonthlyVolume { year, month, total })
            .collect(),
    }
}
