use std::sync::Arc;

use ticklens_core::{DashboardConfig, LensError, MarketConnector};
use ticklens_middleware::ConnectorBuilder as GenericConnectorBuilder;

use crate::YfConnector;

/// Builder type alias specialized for yfinance connectors.
pub type YfConnectorBuilder = GenericConnectorBuilder;

impl YfConnector {
    /// Returns a builder around the default connector with no layers.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn builder() -> Result<YfConnectorBuilder, LensError> {
        let raw: Arc<dyn MarketConnector> = Arc::new(Self::new_default()?);
        Ok(GenericConnectorBuilder::new(raw))
    }

    /// Returns a builder preloaded with the retry and cache layers described by `cfg`.
    ///
    /// The cache layer is skipped when `cfg.cache.enabled` is false and the retry
    /// layer when the policy makes a single attempt.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn configured(cfg: &DashboardConfig) -> Result<YfConnectorBuilder, LensError> {
        Ok(Self::builder()?.with_config(cfg))
    }
}
