use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use ticklens_core::{
    DashboardConfig, DashboardRequest, LensError, Lookback, MarketConnector, RangeSpec,
};

/// Request-scoped dashboard pipeline over a single market connector.
pub struct Dashboard {
    pub(crate) connector: Arc<dyn MarketConnector>,
    pub(crate) cfg: DashboardConfig,
}

/// Builder for constructing a `Dashboard` with custom configuration.
pub struct DashboardBuilder {
    connector: Option<Arc<dyn MarketConnector>>,
    cfg: DashboardConfig,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardBuilder {
    /// Create a new builder with default configuration and no connector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connector: None,
            cfg: DashboardConfig::default(),
        }
    }

    /// Set the connector every section fetches from.
    ///
    /// Wrap it with `ticklens_middleware::ConnectorBuilder` first to get
    /// memoization and retries.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn MarketConnector>) -> Self {
        self.connector = Some(c);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: DashboardConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the per-call provider timeout.
    #[must_use]
    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Number of trailing rows kept in history tables.
    #[must_use]
    pub const fn table_tail_rows(mut self, rows: usize) -> Self {
        self.cfg.table_tail_rows = rows;
        self
    }

    /// First day of the long-run history section.
    #[must_use]
    pub const fn history_since(mut self, day: NaiveDate) -> Self {
        self.cfg.history_since = day;
        self
    }

    /// Span aggregated into the monthly volume section.
    #[must_use]
    pub const fn volume_lookback(mut self, lookback: Lookback) -> Self {
        self.cfg.volume_lookback = lookback;
        self
    }

    /// Span searched for the latest close.
    #[must_use]
    pub const fn latest_price_lookback(mut self, lookback: Lookback) -> Self {
        self.cfg.latest_price_lookback = lookback;
        self
    }

    /// Build the `Dashboard`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connector was set or the configuration is inconsistent.
    pub fn build(self) -> Result<Dashboard, LensError> {
        let connector = self.connector.ok_or_else(|| {
            LensError::InvalidArg(
                "no connector registered; add one via with_connector(...)".to_string(),
            )
        })?;
        self.cfg.validate()?;
        Ok(Dashboard {
            connector,
            cfg: self.cfg,
        })
    }
}

impl Dashboard {
    /// Start building a new `Dashboard`.
    #[must_use]
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.cfg
    }

    /// Build a request for `symbol`, applying the configured default window
    /// and enforcing the configured window bounds.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a blank ticker or a window outside
    /// `[min_window, max_window]`.
    pub fn request(
        &self,
        symbol: &str,
        range: RangeSpec,
        window: Option<usize>,
    ) -> Result<DashboardRequest, LensError> {
        let window = window.unwrap_or(self.cfg.default_window);
        if !(self.cfg.min_window..=self.cfg.max_window).contains(&window) {
            return Err(LensError::InvalidArg(format!(
                "moving average window {window} outside [{}, {}]",
                self.cfg.min_window, self.cfg.max_window
            )));
        }
        DashboardRequest::new(symbol, range, window)
    }

    /// Name of the connector sections fetch from.
    #[must_use]
    pub fn connector_name(&self) -> &'static str {
        self.connector.name()
    }

    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ticklens::core::provider_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: &'static str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, LensError>
    where
        Fut: core::future::Future<Output = Result<T, LensError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(LensError::provider_timeout(connector_name, capability)))
    }
}
