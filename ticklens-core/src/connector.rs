use async_trait::async_trait;

use paft::domain::{AssetKind, Instrument};
use paft::fundamentals::profile::Profile;
use paft::fundamentals::statements::{BalanceSheetRow, IncomeStatementRow};
use paft::market::responses::history::HistoryResponse;
use ticklens_types::{LensError, RangeSpec, Valuation};

use crate::table::OhlcvTable;

/// Focused role trait for connectors that provide OHLCV history.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetch OHLCV history for the instrument over `range`.
    ///
    /// Lookback ranges are resolved against the wall clock at call time.
    async fn history(
        &self,
        instrument: &Instrument,
        range: RangeSpec,
    ) -> Result<HistoryResponse, LensError>;
}

/// Role trait for connectors whose source is already tabular.
///
/// Candles require a close, so a source with partial bars would lose them on
/// the way through [`HistoryProvider`]. Such connectors hand over the table
/// directly and it is preferred over history when both are advertised.
#[async_trait]
pub trait TableProvider: Send + Sync {
    /// Fetch the OHLCV rows of the instrument over `range`, partial bars included.
    async fn table(&self, instrument: &Instrument, range: RangeSpec)
    -> Result<OhlcvTable, LensError>;
}

/// Focused role trait for connectors that provide company profile data.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Fetch the company or fund profile.
    async fn profile(&self, instrument: &Instrument) -> Result<Profile, LensError>;
}

/// Focused role trait for connectors that provide valuation figures.
#[async_trait]
pub trait ValuationProvider: Send + Sync {
    /// Fetch market capitalization and trailing P/E.
    async fn valuation(&self, instrument: &Instrument) -> Result<Valuation, LensError>;
}

/// Focused role trait for connectors that provide balance sheets.
#[async_trait]
pub trait BalanceSheetProvider: Send + Sync {
    /// Fetch balance sheet rows (quarterly when `quarterly` is true, annual otherwise).
    async fn balance_sheet(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<BalanceSheetRow>, LensError>;
}

/// Focused role trait for connectors that provide income statements.
#[async_trait]
pub trait IncomeStatementProvider: Send + Sync {
    /// Fetch income statement rows (quarterly when `quarterly` is true, annual otherwise).
    async fn income_statement(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<IncomeStatementRow>, LensError>;
}

/// Main connector trait implemented by provider crates. Exposes capability discovery.
#[async_trait]
pub trait MarketConnector: Send + Sync {
    /// A stable identifier (e.g., "ticklens-yfinance").
    fn name(&self) -> &'static str;

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether this connector claims to support a given asset kind.
    ///
    /// Default: equities only.
    fn supports_kind(&self, kind: AssetKind) -> bool {
        matches!(kind, AssetKind::Equity)
    }

    /// Advertise history capability.
    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        None
    }

    /// Advertise tabular history capability.
    fn as_table_provider(&self) -> Option<&dyn TableProvider> {
        None
    }

    /// Advertise profile capability.
    fn as_profile_provider(&self) -> Option<&dyn ProfileProvider> {
        None
    }

    /// Advertise valuation capability.
    fn as_valuation_provider(&self) -> Option<&dyn ValuationProvider> {
        None
    }

    /// Advertise balance sheet capability.
    fn as_balance_sheet_provider(&self) -> Option<&dyn BalanceSheetProvider> {
        None
    }

    /// Advertise income statement capability.
    fn as_income_statement_provider(&self) -> Option<&dyn IncomeStatementProvider> {
        None
    }
}
