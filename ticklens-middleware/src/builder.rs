//! Builder for composing connectors with middleware layers.
//!
//! # Middleware Ordering Convention
//!
//! Middleware layers form an "onion" around the raw connector:
//!
//! ```text
//! Dashboard request
//!     ↓
//! Cache  (answers repeated requests without touching the provider)
//!     ↓
//! Retry  (re-issues transient failures)
//!     ↓
//! Raw connector (makes the actual API calls)
//! ```
//!
//! `layers` stores middleware outermost-first and `build()` applies them in
//! reverse. The cache is always kept outermost so a memoized answer never
//! waits on a retry loop and a retried success is memoized once.

use std::collections::HashSet;
use std::sync::Arc;

use ticklens_core::connector::MarketConnector;
use ticklens_core::{CacheConfig, DashboardConfig, LensError, Middleware, RetryConfig};

use crate::cache::{CacheMiddleware, CachingConnector};
use crate::retry::{RetryMiddleware, RetryingConnector};

/// Generic middleware builder for composing a connector with layered wrappers.
///
/// See [module-level documentation](self) for details on middleware ordering.
pub struct ConnectorBuilder {
    raw: Arc<dyn MarketConnector>,
    /// Middleware layers in outermost-first order.
    layers: Vec<Box<dyn Middleware>>,
}

impl ConnectorBuilder {
    /// Create a new builder from a raw, unwrapped connector.
    #[must_use]
    pub fn new(raw: Arc<dyn MarketConnector>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|m| m.name() == name)
    }

    /// Add or replace the memoization layer at the outermost position.
    #[must_use]
    pub fn with_cache(mut self, cfg: &CacheConfig) -> Self {
        self.layers.retain(|m| m.name() != CachingConnector::NAME);
        self.layers.insert(0, Box::new(CacheMiddleware::new(*cfg)));
        self
    }

    /// Remove the memoization layer if present.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.layers.retain(|m| m.name() != CachingConnector::NAME);
        self
    }

    /// Add or replace the retry layer directly inside the cache (or outermost
    /// when there is no cache).
    #[must_use]
    pub fn with_retry(mut self, cfg: &RetryConfig) -> Self {
        self.layers.retain(|m| m.name() != RetryingConnector::NAME);
        let at = self.position_of(CachingConnector::NAME).map_or(0, |i| i + 1);
        self.layers.insert(at, Box::new(RetryMiddleware::new(*cfg)));
        self
    }

    /// Remove the retry layer if present.
    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.layers.retain(|m| m.name() != RetryingConnector::NAME);
        self
    }

    /// Apply the cache and retry sections of a dashboard configuration.
    ///
    /// A disabled cache or a single-attempt retry policy removes the layer.
    #[must_use]
    pub fn with_config(self, cfg: &DashboardConfig) -> Self {
        let this = if cfg.retry.is_enabled() {
            self.with_retry(&cfg.retry)
        } else {
            self.without_retry()
        };
        if cfg.cache.enabled {
            this.with_cache(&cfg.cache)
        } else {
            this.without_cache()
        }
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.insert(0, Box::new(layer));
        self
    }

    /// Layer names, outermost first, ending with the raw connector's name.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers
            .iter()
            .map(|m| m.name())
            .chain(std::iter::once(self.raw.name()))
            .collect()
    }

    /// Configuration snapshots of each layer, outermost first.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let layers: Vec<serde_json::Value> = self
            .layers
            .iter()
            .map(|m| serde_json::json!({ "name": m.name(), "config": m.config_json() }))
            .collect();
        serde_json::json!({ "layers": layers, "raw": self.raw.name() })
    }

    /// Build the wrapped connector.
    ///
    /// # Errors
    /// Returns `InvalidMiddlewareStack` if a layer rejects its configuration
    /// or the same layer appears twice.
    pub fn build(self) -> Result<Arc<dyn MarketConnector>, LensError> {
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.name()) {
                return Err(LensError::InvalidMiddlewareStack {
                    message: format!("{} appears more than once", layer.name()),
                });
            }
            layer.validate()?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(layers = ?self.layer_names(), "building connector stack");

        let mut acc: Arc<dyn MarketConnector> = Arc::clone(&self.raw);
        for m in self.layers.into_iter().rev() {
            acc = m.apply(acc);
        }
        Ok(acc)
    }
}
