//! Mock connectors for tests, CI and offline demos.
//!
//! [`MockConnector`] serves deterministic fixtures for a handful of tickers.
//! A few reserved symbols drive failure paths:
//!
//! - `FAIL`: every capability returns a connector error.
//! - `EMPTY`: history succeeds with zero rows.
//! - `TIMEOUT`: every call sleeps before answering.
//!
//! Unknown tickers get an empty history and not-found metadata, which is what
//! the live provider does for a misspelled symbol.
//!
//! [`DynamicMock`] is scriptable per symbol and counts calls, for exercising
//! middleware and orchestration behavior.

use std::time::Duration;

use async_trait::async_trait;
use ticklens_core::connector::{
    BalanceSheetProvider, HistoryProvider, IncomeStatementProvider, MarketConnector,
    ProfileProvider, ValuationProvider,
};
use ticklens_core::{
    AssetKind, BalanceSheetRow, HistoryResponse, IncomeStatementRow, Instrument, LensError,
    Profile, RangeSpec, Valuation,
};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMock, MockBehavior};

/// Delay applied to every call for the `TIMEOUT` symbol.
pub const TIMEOUT_DELAY: Duration = Duration::from_millis(200);

/// Mock connector for CI-safe runs. Provides deterministic data from static fixtures.
pub struct MockConnector;

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn not_found(what: &str) -> LensError {
        LensError::not_found(what.to_string())
    }

    async fn maybe_fail_or_timeout(symbol: &str, capability: &'static str) -> Result<(), LensError> {
        match symbol {
            "FAIL" => Err(LensError::connector(
                "ticklens-mock",
                format!("forced failure: {capability}"),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(TIMEOUT_DELAY).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MarketConnector for MockConnector {
    fn name(&self) -> &'static str {
        "ticklens-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn supports_kind(&self, _kind: AssetKind) -> bool {
        true
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        Some(self as &dyn HistoryProvider)
    }
    fn as_profile_provider(&self) -> Option<&dyn ProfileProvider> {
        Some(self as &dyn ProfileProvider)
    }
    fn as_valuation_provider(&self) -> Option<&dyn ValuationProvider> {
        Some(self as &dyn ValuationProvider)
    }
    fn as_balance_sheet_provider(&self) -> Option<&dyn BalanceSheetProvider> {
        Some(self as &dyn BalanceSheetProvider)
    }
    fn as_income_statement_provider(&self) -> Option<&dyn IncomeStatementProvider> {
        Some(self as &dyn IncomeStatementProvider)
    }
}

#[async_trait]
impl HistoryProvider for MockConnector {
    async fn history(
        &self,
        instrument: &Instrument,
        range: RangeSpec,
    ) -> Result<HistoryResponse, LensError> {
        let s = instrument.symbol_str();
        Self::maybe_fail_or_timeout(s, "history").await?;
        Ok(fixtures::history::by_symbol(s)
            .map_or_else(fixtures::history::empty, |full| {
                fixtures::history::slice(full, &range)
            }))
    }
}

#[async_trait]
impl ProfileProvider for MockConnector {
    async fn profile(&self, instrument: &Instrument) -> Result<Profile, LensError> {
        let s = instrument.symbol_str();
        Self::maybe_fail_or_timeout(s, "profile").await?;
        fixtures::profile::by_symbol(s).ok_or_else(|| Self::not_found(&format!("profile for {s}")))
    }
}

#[async_trait]
impl ValuationProvider for MockConnector {
    async fn valuation(&self, instrument: &Instrument) -> Result<Valuation, LensError> {
        let s = instrument.symbol_str();
        Self::maybe_fail_or_timeout(s, "valuation").await?;
        fixtures::valuation::by_symbol(s)
            .ok_or_else(|| Self::not_found(&format!("valuation for {s}")))
    }
}

#[async_trait]
impl BalanceSheetProvider for MockConnector {
    async fn balance_sheet(
        &self,
        instrument: &Instrument,
        _q: bool,
    ) -> Result<Vec<BalanceSheetRow>, LensError> {
        let s = instrument.symbol_str();
        Self::maybe_fail_or_timeout(s, "balance-sheet").await?;
        Ok(fixtures::fundamentals::balance_sheet_by_symbol(s))
    }
}

#[async_trait]
impl IncomeStatementProvider for MockConnector {
    async fn income_statement(
        &self,
        instrument: &Instrument,
        _q: bool,
    ) -> Result<Vec<IncomeStatementRow>, LensError> {
        let s = instrument.symbol_str();
        Self::maybe_fail_or_timeout(s, "income-statement").await?;
        Ok(fixtures::fundamentals::income_stmt_by_symbol(s))
    }
}

/// Full fixture history for `symbol`, independent of any range.
///
/// Useful for tests that want to compare derived output with the raw fixture.
#[must_use]
pub fn fixture_history(symbol: &str) -> Option<HistoryResponse> {
    fixtures::history::by_symbol(symbol)
}
