//! Offline connector over an exported split-orient history file.
//!
//! Rows are served as a table rather than as candles, so a bar missing its
//! close keeps its volume and shows up as a gap in the price series. Profile,
//! valuation and statements are absent, so those sections degrade to notices
//! when a dashboard runs from a snapshot.

use std::path::Path;

use async_trait::async_trait;
use ticklens_core::connector::{MarketConnector, TableProvider};
use ticklens_core::frame::SplitFrame;
use ticklens_core::{
    AssetKind, Currency, Instrument, IsoCurrency, LensError, OhlcvRow, OhlcvTable, RangeSpec,
};

/// Serves history from a [`SplitFrame`] loaded once at construction.
pub struct SnapshotConnector {
    frame: SplitFrame,
    currency: Currency,
}

impl SnapshotConnector {
    /// Connector name reported in errors and reports.
    pub const NAME: &'static str = "ticklens-snapshot";

    /// Wrap an already parsed frame. Prices are quoted in USD unless
    /// [`with_currency`](Self::with_currency) says otherwise.
    #[must_use]
    pub fn new(frame: SplitFrame) -> Self {
        Self {
            frame,
            currency: Currency::Iso(IsoCurrency::USD),
        }
    }

    /// Parse a split-orient JSON document.
    ///
    /// # Errors
    /// Returns `LensError::Data` for malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self, LensError> {
        Ok(Self::new(SplitFrame::from_json(raw)?))
    }

    /// Read and parse a split-orient JSON file.
    ///
    /// # Errors
    /// Returns `LensError::Data` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LensError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LensError::Data(format!("reading {}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Quote currency attached to every price.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Keep the rows `range` selects. Lookbacks are anchored on the last
    /// snapshot bar rather than the wall clock, since the file does not grow.
    fn select(table: &OhlcvTable, range: RangeSpec) -> Vec<&OhlcvRow> {
        let rows = table.rows();
        let Some(last) = rows.last().map(|r| r.ts) else {
            return vec![];
        };
        let (start, end) = range.resolve(last);
        let inclusive_end = matches!(range, RangeSpec::Lookback { .. });
        rows.iter()
            .filter(|r| r.ts >= start && (r.ts < end || (inclusive_end && r.ts == end)))
            .collect()
    }
}

#[async_trait]
impl TableProvider for SnapshotConnector {
    async fn table(
        &self,
        instrument: &Instrument,
        range: RangeSpec,
    ) -> Result<OhlcvTable, LensError> {
        let table = self.frame.normalize(instrument.symbol_str())?;
        let rows = Self::select(&table, range).into_iter().cloned().collect();
        Ok(OhlcvTable::from_rows(
            table.zone(),
            Some(self.currency.clone()),
            rows,
        ))
    }
}

#[async_trait]
impl MarketConnector for SnapshotConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Snapshot file"
    }

    fn supports_kind(&self, _kind: AssetKind) -> bool {
        true
    }

    fn as_table_provider(&self) -> Option<&dyn TableProvider> {
        Some(self as &dyn TableProvider)
    }
}
