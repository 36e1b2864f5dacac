use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use ticklens_core::connector::{
    BalanceSheetProvider, HistoryProvider, IncomeStatementProvider, MarketConnector,
    ProfileProvider, TableProvider, ValuationProvider,
};
use ticklens_core::{
    AssetKind, BalanceSheetRow, HistoryResponse, IncomeStatementRow, Instrument, LensError,
    Profile, RangeSpec, RetryConfig, Valuation,
};

/// Add up to `jitter_percent` of `base_ms` at random.
fn jitter_wait(base_ms: u64, jitter_percent: u8) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, base_ms.saturating_mul(u64::from(jitter_percent)) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Delay before retry number `retry` (1-based), exponential in `retry`.
#[must_use]
pub fn backoff_delay(cfg: &RetryConfig, retry: u32) -> Duration {
    let growth = u64::from(cfg.factor).saturating_pow(retry.saturating_sub(1));
    let base = cfg
        .min_backoff_ms
        .saturating_mul(growth)
        .min(cfg.max_backoff_ms);
    Duration::from_millis(jitter_wait(base, cfg.jitter_percent).min(cfg.max_backoff_ms))
}

/// Declarative wrapper that applies retries when building a connector stack.
pub struct RetryMiddleware {
    cfg: RetryConfig,
}

impl RetryMiddleware {
    /// Create the layer from its policy.
    #[must_use]
    pub const fn new(cfg: RetryConfig) -> Self {
        Self { cfg }
    }
}

impl ticklens_core::Middleware for RetryMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn MarketConnector>) -> Arc<dyn MarketConnector> {
        Arc::new(RetryingConnector::new(inner, self.cfg))
    }

    fn name(&self) -> &'static str {
        RetryingConnector::NAME
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "max_attempts": self.cfg.max_attempts,
            "min_backoff_ms": self.cfg.min_backoff_ms,
            "max_backoff_ms": self.cfg.max_backoff_ms,
            "factor": self.cfg.factor,
            "jitter_percent": self.cfg.jitter_percent,
        })
    }

    fn validate(&self) -> Result<(), LensError> {
        self.cfg
            .validate()
            .map_err(|e| LensError::InvalidMiddlewareStack {
                message: e.to_string(),
            })
    }
}

/// Connector wrapper retrying transient failures with exponential backoff.
///
/// Connector errors and timeouts are retried up to `max_attempts` total
/// tries. Everything else (not found, empty results, bad arguments) returns
/// on the first attempt. When every attempt fails the last error is wrapped
/// in `RetriesExhausted`.
pub struct RetryingConnector {
    inner: Arc<dyn MarketConnector>,
    cfg: RetryConfig,
}

impl RetryingConnector {
    /// Layer name used in builder introspection.
    pub const NAME: &'static str = "RetryMiddleware";

    /// Wrap `inner` with the given policy.
    #[must_use]
    pub fn new(inner: Arc<dyn MarketConnector>, cfg: RetryConfig) -> Self {
        Self { inner, cfg }
    }

    async fn run<T, F, Fut>(
        &self,
        capability: &'static str,
        symbol: &str,
        mut call: F,
    ) -> Result<T, LensError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LensError>>,
    {
        let max = self.cfg.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            match call().await {
                Ok(v) => return Ok(v),
                Err(e) if !e.is_transient() || max == 1 => return Err(e),
                Err(e) if attempt >= max => {
                    return Err(LensError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = backoff_delay(&self.cfg, attempt);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        capability,
                        symbol,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "transient provider failure; retrying"
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = (capability, symbol, e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl MarketConnector for RetryingConnector {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn vendor(&self) -> &'static str {
        self.inner.vendor()
    }

    fn supports_kind(&self, kind: AssetKind) -> bool {
        self.inner.supports_kind(kind)
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        self.inner
            .as_history_provider()
            .map(|_| self as &dyn HistoryProvider)
    }

    fn as_profile_provider(&self) -> Option<&dyn ProfileProvider> {
        self.inner
            .as_profile_provider()
            .map(|_| self as &dyn ProfileProvider)
    }

    fn as_table_provider(&self) -> Option<&dyn TableProvider> {
        // tabular sources are local reads with nothing transient to retry
        self.inner.as_table_provider()
    }

    fn as_valuation_provider(&self) -> Option<&dyn ValuationProvider> {
        self.inner
            .as_valuation_provider()
            .map(|_| self as &dyn ValuationProvider)
    }

    fn as_balance_sheet_provider(&self) -> Option<&dyn BalanceSheetProvider> {
        self.inner
            .as_balance_sheet_provider()
            .map(|_| self as &dyn BalanceSheetProvider)
    }

    fn as_income_statement_provider(&self) -> Option<&dyn IncomeStatementProvider> {
        self.inner
            .as_income_statement_provider()
            .map(|_| self as &dyn IncomeStatementProvider)
    }
}

#[async_trait]
impl HistoryProvider for RetryingConnector {
    async fn history(
        &self,
        instrument: &Instrument,
        range: RangeSpec,
    ) -> Result<HistoryResponse, LensError> {
        let inner = self
            .inner
            .as_history_provider()
            .ok_or_else(|| LensError::unsupported("history"))?;
        self.run("history", instrument.symbol_str(), move || {
            inner.history(instrument, range)
        })
        .await
    }
}

#[async_trait]
impl ProfileProvider for RetryingConnector {
    async fn profile(&self, instrument: &Instrument) -> Result<Profile, LensError> {
        let inner = self
            .inner
            .as_profile_provider()
            .ok_or_else(|| LensError::unsupported("profile"))?;
        self.run("profile", instrument.symbol_str(), move || {
            inner.profile(instrument)
        })
        .await
    }
}

#[async_trait]
impl ValuationProvider for RetryingConnector {
    async fn valuation(&self, instrument: &Instrument) -> Result<Valuation, LensError> {
        let inner = self
            .inner
            .as_valuation_provider()
            .ok_or_else(|| LensError::unsupported("valuation"))?;
        self.run("valuation", instrument.symbol_str(), move || {
            inner.valuation(instrument)
        })
        .await
    }
}

#[async_trait]
impl BalanceSheetProvider for RetryingConnector {
    async fn balance_sheet(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<BalanceSheetRow>, LensError> {
        let inner = self
            .inner
            .as_balance_sheet_provider()
            .ok_or_else(|| LensError::unsupported("balance_sheet"))?;
        self.run("balance_sheet", instrument.symbol_str(), move || {
            inner.balance_sheet(instrument, quarterly)
        })
        .await
    }
}

#[async_trait]
impl IncomeStatementProvider for RetryingConnector {
    async fn income_statement(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<IncomeStatementRow>, LensError> {
        let inner = self
            .inner
            .as_income_statement_provider()
            .ok_or_else(|| LensError::unsupported("income_statement"))?;
        self.run("income_statement", instrument.symbol_str(), move || {
            inner.income_statement(instrument, quarterly)
        })
        .await
    }
}
