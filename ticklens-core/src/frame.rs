//! Labelled tabular history as exported by dataframe tooling.
//!
//! A [`SplitFrame`] mirrors the `orient="split"` JSON layout (`columns`,
//! `index`, `data`). Column labels arrive either flat (`"Close"`) or compound
//! (`["Close", "AAPL"]`), depending on the client that produced the export.
//! [`SplitFrame::normalize`] resolves every label to a single OHLCV field for
//! one ticker so nothing downstream ever deals with labels.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use ticklens_types::LensError;

use crate::series::MarketZone;
use crate::table::{OhlcvRow, OhlcvTable};

/// A column label, flat or compound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnLabel {
    /// Single-level label, e.g. `"Close"`.
    Flat(String),
    /// Multi-level label, e.g. `["Close", "AAPL"]`.
    Compound(Vec<String>),
}

/// OHLCV field a column resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    Close,
    /// Dividend/split adjusted close.
    AdjClose,
    /// Traded volume.
    Volume,
}

impl Field {
    /// Recognize a field name, ignoring case, spaces and underscores.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "open" => Some(Self::Open),
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            "close" => Some(Self::Close),
            "adjclose" => Some(Self::AdjClose),
            "volume" => Some(Self::Volume),
            _ => None,
        }
    }
}

/// Index entry: epoch milliseconds or an RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// RFC 3339 / ISO 8601 timestamp, optionally with an offset.
    Iso(String),
}

/// Split-orient table: labels, timestamps and a row-major value grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SplitFrame {
    /// Column labels, one per value in each row.
    pub columns: Vec<ColumnLabel>,
    /// Row timestamps.
    pub index: Vec<IndexValue>,
    /// Row-major values; `null` marks a missing value.
    pub data: Vec<Vec<Option<f64>>>,
}

impl SplitFrame {
    /// Parse a split-orient JSON document.
    ///
    /// # Errors
    /// Returns `LensError::Data` for malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self, LensError> {
        serde_json::from_str(raw).map_err(|e| LensError::Data(format!("frame json: {e}")))
    }

    /// Resolve labels for `symbol` and produce a normalized table.
    ///
    /// Compound labels naming a different ticker are skipped, unknown fields
    /// (dividends, splits) are ignored. The zone is taken from the offset of the
    /// first ISO timestamp, UTC otherwise.
    ///
    /// # Errors
    /// Returns `LensError::Data` when shapes disagree, `Close` is missing or
    /// ambiguous, a timestamp cannot be parsed, or a volume is not a
    /// non-negative integer.
    pub fn normalize(&self, symbol: &str) -> Result<OhlcvTable, LensError> {
        let layout = self.resolve_columns(symbol)?;
        if self.data.len() != self.index.len() {
            return Err(LensError::Data(format!(
                "frame has {} index entries but {} rows",
                self.index.len(),
                self.data.len()
            )));
        }

        let zone = self.zone();
        let mut rows = Vec::with_capacity(self.data.len());
        for (idx, values) in self.index.iter().zip(&self.data) {
            if values.len() != self.columns.len() {
                return Err(LensError::Data(format!(
                    "row has {} values for {} columns",
                    values.len(),
                    self.columns.len()
                )));
            }
            let ts = parse_index(idx)?;
            let price = |col: Option<usize>| -> Result<Option<Decimal>, LensError> {
                col.and_then(|c| values[c]).map(to_decimal).transpose()
            };
            rows.push(OhlcvRow {
                ts,
                open: price(layout.open)?,
                high: price(layout.high)?,
                low: price(layout.low)?,
                close: price(Some(layout.close))?,
                volume: layout
                    .volume
                    .and_then(|c| values[c])
                    .map(to_volume)
                    .transpose()?,
            });
        }
        Ok(OhlcvTable::from_rows(zone, None, rows))
    }

    fn zone(&self) -> MarketZone {
        match self.index.first() {
            Some(IndexValue::Iso(s)) => DateTime::parse_from_rfc3339(s)
                .map(|dt| match dt.offset().local_minus_utc() {
                    0 => MarketZone::Utc,
                    off => MarketZone::Offset(i64::from(off)),
                })
                .unwrap_or_default(),
            _ => MarketZone::Utc,
        }
    }

    fn resolve_columns(&self, symbol: &str) -> Result<Layout, LensError> {
        let mut slots: [Option<usize>; 6] = [None; 6];
        for (pos, label) in self.columns.iter().enumerate() {
            let Some(field) = flatten_label(label, symbol) else {
                #[cfg(feature = "tracing")]
                tracing::debug!(?label, symbol, "ignoring column");
                continue;
            };
            let slot = &mut slots[field as usize];
            if slot.is_some() {
                return Err(LensError::Data(format!(
                    "ambiguous {field:?} column for {symbol}"
                )));
            }
            *slot = Some(pos);
        }
        let close = slots[Field::Close as usize]
            .ok_or_else(|| LensError::Data(format!("no Close column for {symbol}")))?;
        Ok(Layout {
            open: slots[Field::Open as usize],
            high: slots[Field::High as usize],
            low: slots[Field::Low as usize],
            close,
            volume: slots[Field::Volume as usize],
        })
    }
}

struct Layout {
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

/// Map a label to the field it carries for `symbol`.
///
/// A compound label with more than one meaningful part must name `symbol` in
/// one of them; the remaining part is the field. When the ticker itself reads
/// like a field (`LOW`), the last matching part is taken as the ticker, since
/// exports put the field level first.
///
/// Returns `None` for columns that carry no OHLCV field or belong to another ticker.
#[must_use]
pub fn flatten_label(label: &ColumnLabel, symbol: &str) -> Option<Field> {
    match label {
        ColumnLabel::Flat(name) => Field::parse(name),
        ColumnLabel::Compound(parts) => {
            let mut parts: Vec<&str> = parts
                .iter()
                .map(String::as_str)
                .filter(|p| !p.is_empty() && !is_level_name(p))
                .collect();
            if parts.len() > 1 {
                let ticker = parts.iter().rposition(|p| p.eq_ignore_ascii_case(symbol))?;
                parts.remove(ticker);
            }
            match parts.as_slice() {
                [field] => Field::parse(field),
                _ => None,
            }
        }
    }
}

fn is_level_name(part: &str) -> bool {
    matches!(part.to_ascii_lowercase().as_str(), "price" | "ticker")
}

fn parse_index(idx: &IndexValue) -> Result<DateTime<Utc>, LensError> {
    match idx {
        IndexValue::Millis(ms) => DateTime::from_timestamp_millis(*ms)
            .ok_or_else(|| LensError::Data(format!("timestamp {ms} out of range"))),
        IndexValue::Iso(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| LensError::Data(format!("timestamp '{s}': {e}"))),
    }
}

fn to_decimal(v: f64) -> Result<Decimal, LensError> {
    Decimal::try_from(v).map_err(|e| LensError::Data(format!("price {v}: {e}")))
}

fn to_volume(v: f64) -> Result<u64, LensError> {
    // 2^53: largest range where every integer is exactly representable in f64
    const EXACT: f64 = 9_007_199_254_740_992.0;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= EXACT {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = v as u64;
        Ok(n)
    } else {
        Err(LensError::Data(format!(
            "volume {v} is not a non-negative integer"
        )))
    }
}
