//! ticklens-yfinance
//!
//! Public connector that implements `MarketConnector` on top of the `yfinance-rs`
//! client library. Exposes price history, company profiles, balance sheets and
//! income statements. Valuation figures are not served by this connector.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `yfinance-rs`.
pub mod adapter;
mod builder;

use std::sync::Arc;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
use adapter::{RealAdapter, YfFundamentals, YfHistory, YfProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ticklens_core::{
    AssetKind, BalanceSheetRow, HistoryResponse, IncomeStatementRow, Instrument, Interval,
    LensError, Profile, RangeSpec, Sampling,
    connector::{
        BalanceSheetProvider, HistoryProvider, IncomeStatementProvider, MarketConnector,
        ProfileProvider,
    },
};

pub use builder::YfConnectorBuilder;

#[cfg(not(feature = "test-adapters"))]
type AdapterArc = Arc<RealAdapter>;

#[cfg(feature = "test-adapters")]
type HistoryAdapter = Arc<dyn YfHistory>;
#[cfg(not(feature = "test-adapters"))]
type HistoryAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type ProfileAdapter = Arc<dyn YfProfile>;
#[cfg(not(feature = "test-adapters"))]
type ProfileAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type FundamentalsAdapter = Arc<dyn YfFundamentals>;
#[cfg(not(feature = "test-adapters"))]
type FundamentalsAdapter = AdapterArc;

/// Public connector type. Production users construct it with `YfConnector::new_default()`.
pub struct YfConnector {
    history: HistoryAdapter,
    profile: ProfileAdapter,
    fundamentals: FundamentalsAdapter,
}

impl YfConnector {
    /// Stable connector name.
    pub const NAME: &'static str = "ticklens-yfinance";

    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("no data") || m.contains("no matches")
    }

    fn normalize_error(e: LensError, what: &str) -> LensError {
        match e {
            LensError::Connector { connector: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    LensError::not_found(what.to_string())
                } else {
                    LensError::connector(Self::NAME, msg)
                }
            }
            LensError::Other(msg) => LensError::connector(Self::NAME, msg),
            other => other,
        }
    }

    const fn interval_for(sampling: Sampling) -> Interval {
        match sampling {
            Sampling::I1m => Interval::I1m,
            Sampling::I5m => Interval::I5m,
            Sampling::I15m => Interval::I15m,
            Sampling::I30m => Interval::I30m,
            Sampling::I1h => Interval::I1h,
            Sampling::D1 => Interval::D1,
            Sampling::D5 => Interval::D5,
            Sampling::W1 => Interval::W1,
            Sampling::Mo1 => Interval::M1,
        }
    }

    /// Translate a range into the provider request, resolving lookbacks against `now`.
    ///
    /// Prices are split/dividend adjusted and corporate actions are not requested.
    #[must_use]
    pub fn provider_request(
        range: &RangeSpec,
        now: DateTime<Utc>,
    ) -> yfinance_rs::core::services::HistoryRequest {
        let (start, end) = range.resolve(now);
        yfinance_rs::core::services::HistoryRequest {
            range: None,
            period: Some((start.timestamp(), end.timestamp())),
            interval: Self::interval_for(range.interval()),
            include_prepost: false,
            include_actions: false,
            auto_adjust: true,
            keepna: false,
        }
    }

    /// Build with a fresh `yfinance_rs::YfClient` inside.
    ///
    /// # Errors
    /// Returns an error if the HTTP or Yahoo client cannot be constructed.
    pub fn new_default() -> Result<Self, LensError> {
        let a = RealAdapter::new_default()?;
        Ok(Self::from_adapter(&a))
    }

    /// Build from an existing `yfinance_rs::YfClient`.
    #[must_use]
    pub fn new_with_client(client: yfinance_rs::YfClient) -> Self {
        let a = RealAdapter::new(client);
        Self::from_adapter(&a)
    }

    /// Build from a provided `reqwest::Client`.
    ///
    /// The provided client should enable a cookie store for the Yahoo crumb flow.
    ///
    /// # Errors
    /// Returns an error if the internal `YfClient` cannot be constructed.
    pub fn try_new_with_reqwest_client(http: reqwest::Client) -> Result<Self, LensError> {
        let a = RealAdapter::with_http(http)?;
        Ok(Self::from_adapter(&a))
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            history: adapter.clone_arc_history(),
            profile: adapter.clone_arc_profile(),
            fundamentals: adapter.clone_arc_fundamentals(),
        }
    }

    /// Build from a concrete `RealAdapter` by cloning it into shared handles.
    #[cfg(not(feature = "test-adapters"))]
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        let shared = Arc::new(adapter.clone());
        Self {
            history: Arc::clone(&shared),
            profile: Arc::clone(&shared),
            fundamentals: shared,
        }
    }
}

#[async_trait]
impl HistoryProvider for YfConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ticklens_yfinance::history",
            skip(self, instrument),
            fields(symbol = %instrument.symbol_str(), range = %range),
        )
    )]
    async fn history(
        &self,
        instrument: &Instrument,
        range: RangeSpec,
    ) -> Result<HistoryResponse, LensError> {
        let symbol = instrument.symbol_str();
        let req = Self::provider_request(&range, Utc::now());
        self.history
            .fetch_full(symbol, req)
            .await
            .map_err(|e| Self::normalize_error(e, &format!("history for {symbol}")))
    }
}

#[async_trait]
impl ProfileProvider for YfConnector {
    async fn profile(&self, instrument: &Instrument) -> Result<Profile, LensError> {
        let symbol = instrument.symbol_str();
        self.profile
            .load(symbol)
            .await
            .map_err(|e| Self::normalize_error(e, &format!("profile for {symbol}")))
    }
}

#[async_trait]
impl BalanceSheetProvider for YfConnector {
    async fn balance_sheet(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<BalanceSheetRow>, LensError> {
        let symbol = instrument.symbol_str();
        self.fundamentals
            .balance_sheet(symbol, quarterly)
            .await
            .map_err(|e| Self::normalize_error(e, &format!("balance sheet for {symbol}")))
    }
}

#[async_trait]
impl IncomeStatementProvider for YfConnector {
    async fn income_statement(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<IncomeStatementRow>, LensError> {
        let symbol = instrument.symbol_str();
        self.fundamentals
            .income_statement(symbol, quarterly)
            .await
            .map_err(|e| Self::normalize_error(e, &format!("income statement for {symbol}")))
    }
}

#[async_trait]
impl MarketConnector for YfConnector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn vendor(&self) -> &'static str {
        "Yahoo Finance"
    }

    fn supports_kind(&self, kind: AssetKind) -> bool {
        matches!(
            kind,
            AssetKind::Equity | AssetKind::Fund | AssetKind::Index | AssetKind::Crypto
        )
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        Some(self as &dyn HistoryProvider)
    }

    fn as_profile_provider(&self) -> Option<&dyn ProfileProvider> {
        Some(self as &dyn ProfileProvider)
    }

    fn as_balance_sheet_provider(&self) -> Option<&dyn BalanceSheetProvider> {
        Some(self as &dyn BalanceSheetProvider)
    }

    fn as_income_statement_provider(&self) -> Option<&dyn IncomeStatementProvider> {
        Some(self as &dyn IncomeStatementProvider)
    }
}
