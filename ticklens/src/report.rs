//! Serializable dashboard output.
//!
//! Every section is optional; a section that could not be produced leaves a
//! [`Notice`] behind instead.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use ticklens_core::{
    BalanceSheetRow, Currency, IncomeStatementRow, Lookback, Money, MonthlyVolumeAggregate,
    MovingAverageSeries, OhlcvRow, OhlcvTable, PriceSeries, Profile, RangeSpec, Valuation,
};

/// Placeholder shown for any value the provider did not supply.
pub const PLACEHOLDER: &str = "N/A";

/// Dashboard section a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Requested price history and moving-average overlay.
    PriceHistory,
    /// Company name, sector and valuation.
    CompanyInfo,
    /// Daily history since the configured start day.
    LongRunHistory,
    /// Most recent close.
    LatestPrice,
    /// Annual statements.
    Financials,
    /// Monthly volume distribution.
    MonthlyVolume,
}

impl Section {
    /// Heading used in text output.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::PriceHistory => "Stock Price Data",
            Self::CompanyInfo => "Company Information",
            Self::LongRunHistory => "Historical Data",
            Self::LatestPrice => "Real-Time Price",
            Self::Financials => "Financial Statements",
            Self::MonthlyVolume => "Monthly Volume Distribution",
        }
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// The section was produced.
    Success,
    /// The section is degraded or empty but nothing failed.
    Warning,
    /// A fetch failed.
    Error,
}

/// User-facing status message attached to a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Section concerned.
    pub section: Section,
    /// Message shown to the user.
    pub message: String,
}

impl Notice {
    pub(crate) fn new(level: NoticeLevel, section: Section, message: impl Into<String>) -> Self {
        Self {
            level,
            section,
            message: message.into(),
        }
    }
}

/// One point of the price chart: the close and the moving average at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlayPoint {
    /// Bar timestamp.
    pub ts: DateTime<Utc>,
    /// Closing price, if the provider supplied one.
    pub close: Option<Decimal>,
    /// Trailing average, undefined during warm-up or across gaps.
    pub average: Option<Decimal>,
}

/// Closes aligned with their moving average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlay {
    /// Window used for the average.
    pub window: usize,
    /// One point per close.
    pub points: Vec<OverlayPoint>,
}

impl Overlay {
    pub(crate) fn new(prices: &PriceSeries, ma: &MovingAverageSeries) -> Self {
        let points = prices
            .points()
            .iter()
            .zip(ma.points())
            .map(|(p, m)| OverlayPoint {
                ts: p.ts,
                close: p.value,
                average: m.value,
            })
            .collect();
        Self {
            window: ma.window(),
            points,
        }
    }

    /// Number of points with a defined average.
    #[must_use]
    pub fn defined_averages(&self) -> usize {
        self.points.iter().filter(|p| p.average.is_some()).count()
    }
}

/// The end of a history table plus its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryTail {
    /// Zone label of the timestamps (e.g. `America/New_York`).
    pub zone: String,
    /// Quote currency, when declared.
    pub currency: Option<Currency>,
    /// Rows fetched in total.
    pub total_rows: usize,
    /// First timestamp fetched.
    pub first: Option<DateTime<Utc>>,
    /// The trailing rows, oldest first.
    pub tail: Vec<OhlcvRow>,
}

impl HistoryTail {
    pub(crate) fn new(table: &OhlcvTable, rows: usize) -> Self {
        Self {
            zone: table.zone().label(),
            currency: table.currency().cloned(),
            total_rows: table.len(),
            first: table.rows().first().map(|r| r.ts),
            tail: table.tail(rows).to_vec(),
        }
    }
}

/// Requested history with its moving-average overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceHistory {
    /// Trailing rows of the table.
    pub table: HistoryTail,
    /// Close and average chart data.
    pub overlay: Overlay,
}

/// Daily history since a fixed day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRunHistory {
    /// First requested day.
    pub since: NaiveDate,
    /// Trailing rows of the table.
    pub table: HistoryTail,
}

/// Company metadata with optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyInfo {
    /// Long name.
    pub name: Option<String>,
    /// Sector.
    pub sector: Option<String>,
    /// Industry.
    pub industry: Option<String>,
    /// Market capitalization.
    pub market_cap: Option<Money>,
    /// Trailing price/earnings ratio.
    pub trailing_pe: Option<Decimal>,
}

impl CompanyInfo {
    pub(crate) fn from_parts(profile: &Profile, valuation: Option<Valuation>) -> Self {
        let (name, sector, industry) = match profile {
            Profile::Company(c) => (Some(c.name.clone()), c.sector.clone(), c.industry.clone()),
            Profile::Fund(f) => (Some(f.name.clone()), None, None),
        };
        let valuation = valuation.unwrap_or_default();
        Self {
            name,
            sector,
            industry,
            market_cap: valuation.market_cap,
            trailing_pe: valuation.trailing_pe,
        }
    }

    /// Label/value pairs for display, with [`PLACEHOLDER`] for absent values.
    #[must_use]
    pub fn display_fields(&self) -> [(&'static str, String); 5] {
        fn or_na(v: Option<String>) -> String {
            v.unwrap_or_else(|| PLACEHOLDER.to_string())
        }
        [
            ("Company Name", or_na(self.name.clone())),
            ("Sector", or_na(self.sector.clone())),
            ("Industry", or_na(self.industry.clone())),
            ("Market Cap", or_na(self.market_cap.as_ref().map(Money::format))),
            ("PE Ratio", or_na(self.trailing_pe.map(|pe| pe.round_dp(2).to_string()))),
        ]
    }
}

/// Most recent close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestPrice {
    /// Heading, e.g. `AAPL Real-Time Price (Close)`.
    pub title: String,
    /// Bar the close belongs to.
    pub ts: DateTime<Utc>,
    /// Closing price.
    pub close: Decimal,
    /// Quote currency, when declared.
    pub currency: Option<Currency>,
}

/// Annual statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Financials {
    /// Balance sheet rows, as ordered by the provider.
    pub balance_sheet: Vec<BalanceSheetRow>,
    /// Income statement rows, as ordered by the provider.
    pub income_statement: Vec<IncomeStatementRow>,
}

impl Financials {
    /// True when the provider had no statements at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balance_sheet.is_empty() && self.income_statement.is_empty()
    }
}

/// One pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSlice {
    /// Month label, e.g. `Jul 2025`.
    pub label: String,
    /// Shares traded that month.
    pub total: u128,
    /// Percentage of the period's volume.
    pub share: f64,
}

/// Monthly volume distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePie {
    /// Heading, e.g. `AAPL - Monthly Volume Distribution`.
    pub title: String,
    /// Span the volumes were taken from.
    pub lookback: Lookback,
    /// Grand total over all slices.
    pub total: u128,
    /// Slices in chronological order.
    pub slices: Vec<VolumeSlice>,
}

impl VolumePie {
    pub(crate) fn new(symbol: &str, lookback: Lookback, agg: &MonthlyVolumeAggregate) -> Self {
        let total = agg.total();
        let slices = agg
            .months()
            .iter()
            .map(|m| VolumeSlice {
                label: m.label(),
                total: m.total,
                share: m.share_of(total),
            })
            .collect();
        Self {
            title: format!("{symbol} - Monthly Volume Distribution"),
            lookback,
            total,
            slices,
        }
    }
}

/// Everything the dashboard produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    /// Upper-cased ticker.
    pub symbol: String,
    /// Requested range.
    pub range: RangeSpec,
    /// Requested moving-average window.
    pub window: usize,
    /// Connector the data came from.
    pub source: String,
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Requested history and overlay.
    pub price_history: Option<PriceHistory>,
    /// Company metadata; all placeholders when unavailable.
    pub company: CompanyInfo,
    /// Daily history since the configured day.
    pub long_run: Option<LongRunHistory>,
    /// Most recent close.
    pub latest_price: Option<LatestPrice>,
    /// Annual statements.
    pub financials: Option<Financials>,
    /// Monthly volume distribution.
    pub monthly_volume: Option<VolumePie>,
    /// Status messages, in section order.
    pub notices: Vec<Notice>,
}

impl DashboardReport {
    /// Notices attached to `section`.
    pub fn notices_for(&self, section: Section) -> impl Iterator<Item = &Notice> + '_ {
        self.notices.iter().filter(move |n| n.section == section)
    }

    /// True if any section failed outright.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.notices.iter().any(|n| n.level == NoticeLevel::Error)
    }
}
