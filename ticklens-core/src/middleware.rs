//! Middleware trait for wrapping `MarketConnector` implementations.

use std::sync::Arc;

use crate::connector::MarketConnector;
use ticklens_types::LensError;

/// Trait implemented by connector middleware layers.
///
/// A middleware consumes an inner `MarketConnector` and returns a wrapped
/// connector that augments its behavior (memoization, retries).
pub trait Middleware: Send + Sync {
    /// Wrap an inner connector and return the wrapped connector.
    fn apply(self: Box<Self>, inner: Arc<dyn MarketConnector>) -> Arc<dyn MarketConnector>;

    /// Human-readable middleware name for introspection/logging.
    fn name(&self) -> &'static str;

    /// Opaque configuration snapshot for serialization/inspection.
    fn config_json(&self) -> serde_json::Value;

    /// Check the layer's own configuration before it is applied.
    ///
    /// # Errors
    /// Returns `InvalidMiddlewareStack` when the layer cannot be built as configured.
    fn validate(&self) -> Result<(), LensError> {
        Ok(())
    }
}
