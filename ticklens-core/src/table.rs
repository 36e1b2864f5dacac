//! Normalized OHLCV table produced at the fetch boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use paft::money::Currency;
use paft::market::responses::history::HistoryResponse;
use serde::Serialize;
use ticklens_types::LensError;

use crate::series::{MarketZone, Observation, PriceSeries, VolumeSeries};

/// One bar of provider history; any field but the timestamp may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OhlcvRow {
    /// Bar timestamp (UTC instant).
    pub ts: DateTime<Utc>,
    /// Opening price.
    pub open: Option<Decimal>,
    /// Highest price.
    pub high: Option<Decimal>,
    /// Lowest price.
    pub low: Option<Decimal>,
    /// Closing price.
    pub close: Option<Decimal>,
    /// Traded volume.
    pub volume: Option<u64>,
}

/// Provider history with rows sorted by timestamp and duplicates removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OhlcvTable {
    zone: MarketZone,
    currency: Option<Currency>,
    rows: Vec<OhlcvRow>,
}

impl OhlcvTable {
    /// Normalize arbitrary rows: stable sort by timestamp, first occurrence wins on duplicates.
    #[must_use]
    pub fn from_rows(zone: MarketZone, currency: Option<Currency>, mut rows: Vec<OhlcvRow>) -> Self {
        rows.sort_by_key(|r| r.ts);
        rows.dedup_by_key(|r| r.ts);
        Self {
            zone,
            currency,
            rows,
        }
    }

    /// Normalize a typed provider response.
    ///
    /// # Errors
    /// Returns `LensError::Data` if candles mix currencies.
    pub fn from_history(resp: &HistoryResponse) -> Result<Self, LensError> {
        let zone = MarketZone::from_meta(resp.meta.as_ref());
        let mut currency: Option<Currency> = None;
        let mut rows = Vec::with_capacity(resp.candles.len());
        for c in &resp.candles {
            let cur = c.close.currency();
            match &currency {
                Some(seen) if seen != cur => {
                    return Err(LensError::Data(format!(
                        "mixed currencies in history at {}: expected {seen:?}, got {cur:?}",
                        c.ts
                    )));
                }
                Some(_) => {}
                None => currency = Some(cur.clone()),
            }
            rows.push(OhlcvRow {
                ts: c.ts,
                open: Some(c.open.amount()),
                high: Some(c.high.amount()),
                low: Some(c.low.amount()),
                close: Some(c.close.amount()),
                volume: c.volume,
            });
        }
        Ok(Self::from_rows(zone, currency, rows))
    }

    /// Zone the provider delivered timestamps in.
    #[must_use]
    pub const fn zone(&self) -> MarketZone {
        self.zone
    }

    /// Quote currency of the prices, when the source declared one.
    #[must_use]
    pub const fn currency(&self) -> Option<&Currency> {
        self.currency.as_ref()
    }

    /// Rows in time order.
    #[must_use]
    pub fn rows(&self) -> &[OhlcvRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the provider returned nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last `n` rows (fewer if the table is shorter).
    #[must_use]
    pub fn tail(&self, n: usize) -> &[OhlcvRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Closing-price series.
    #[must_use]
    pub fn closes(&self) -> PriceSeries {
        let points = self
            .rows
            .iter()
            .map(|r| Observation::new(r.ts, r.close))
            .collect();
        // rows are sorted and deduplicated on construction
        PriceSeries::from_sorted(self.zone, points)
    }

    /// Volume series; a missing volume counts as zero traded shares.
    #[must_use]
    pub fn volumes(&self) -> VolumeSeries {
        let points = self
            .rows
            .iter()
            .map(|r| Observation::new(r.ts, r.volume.unwrap_or(0)))
            .collect();
        VolumeSeries::from_sorted(self.zone, points)
    }

    /// Most recent defined close.
    #[must_use]
    pub fn latest_close(&self) -> Option<Observation<Decimal>> {
        self.rows
            .iter()
            .rev()
            .find_map(|r| r.close.map(|c| Observation::new(r.ts, c)))
    }
}
