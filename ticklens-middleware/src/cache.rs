use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use ticklens_core::connector::{
    BalanceSheetProvider, HistoryProvider, IncomeStatementProvider, MarketConnector,
    ProfileProvider, TableProvider, ValuationProvider,
};
use ticklens_core::{
    AssetKind, BalanceSheetRow, CacheConfig, HistoryResponse, IncomeStatementRow, Instrument,
    LensError, Profile, RangeSpec, Valuation,
};

/// Identity of an instrument for caching discrimination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InstrumentKey {
    symbol: String,
    kind: AssetKind,
}

impl From<&Instrument> for InstrumentKey {
    fn from(i: &Instrument) -> Self {
        Self {
            symbol: i.symbol_str().to_string(),
            kind: *i.kind(),
        }
    }
}

// The range is kept unresolved so a lookback maps to one entry for the
// lifetime of the cache, however much wall-clock time passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HistoryKey {
    inst: InstrumentKey,
    range: RangeSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StatementKey {
    inst: InstrumentKey,
    quarterly: bool,
}

struct Store<K, V> {
    inner: Cache<K, Arc<V>>,
}

impl<K, V> Store<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn new(cfg: &CacheConfig) -> Option<Self> {
        if !cfg.enabled || cfg.ttl_ms == Some(0) {
            return None;
        }
        let mut builder = Cache::builder().max_capacity(cfg.max_entries.max(1));
        if let Some(ttl) = cfg.ttl() {
            builder = builder.time_to_live(ttl);
        }
        Some(Self {
            inner: builder.build(),
        })
    }

    /// Return the memoized value or run `fetch`. Only successes are stored,
    /// and concurrent misses on one key share a single `fetch`.
    async fn get_or_fetch<Fut>(&self, key: K, fetch: Fut) -> Result<V, LensError>
    where
        V: Clone,
        Fut: Future<Output = Result<V, LensError>>,
    {
        self.inner
            .try_get_with(key, async move { fetch.await.map(Arc::new) })
            .await
            .map(|v| (*v).clone())
            .map_err(|e: Arc<LensError>| (*e).clone())
    }
}

struct Stores {
    history: Option<Store<HistoryKey, HistoryResponse>>,
    profile: Option<Store<InstrumentKey, Profile>>,
    valuation: Option<Store<InstrumentKey, Valuation>>,
    balance_sheet: Option<Store<StatementKey, Vec<BalanceSheetRow>>>,
    income_stmt: Option<Store<StatementKey, Vec<IncomeStatementRow>>>,
}

/// Declarative wrapper that applies memoization when building a connector stack.
pub struct CacheMiddleware {
    cfg: CacheConfig,
}

impl CacheMiddleware {
    /// Create the layer from its configuration.
    #[must_use]
    pub const fn new(cfg: CacheConfig) -> Self {
        Self { cfg }
    }
}

impl ticklens_core::Middleware for CacheMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn MarketConnector>) -> Arc<dyn MarketConnector> {
        let Self { cfg } = *self;
        Arc::new(CachingConnector::new(inner, &cfg))
    }

    fn name(&self) -> &'static str {
        CachingConnector::NAME
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "enabled": self.cfg.enabled,
            "ttl_ms": self.cfg.ttl_ms,
            "max_entries": self.cfg.max_entries,
        })
    }

    fn validate(&self) -> Result<(), LensError> {
        if self.cfg.max_entries == 0 {
            return Err(LensError::InvalidMiddlewareStack {
                message: "cache.max_entries must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Connector wrapper memoizing successful fetches per capability.
///
/// History is keyed on `(symbol, kind, range)`; statements additionally on
/// the quarterly flag. Errors always pass through uncached.
pub struct CachingConnector {
    inner: Arc<dyn MarketConnector>,
    stores: Stores,
}

impl CachingConnector {
    /// Layer name used in builder introspection.
    pub const NAME: &'static str = "CachingMiddleware";

    /// Wrap `inner` with stores sized and aged by `cfg`.
    #[must_use]
    pub fn new(inner: Arc<dyn MarketConnector>, cfg: &CacheConfig) -> Self {
        let stores = Stores {
            history: Store::new(cfg),
            profile: Store::new(cfg),
            valuation: Store::new(cfg),
            balance_sheet: Store::new(cfg),
            income_stmt: Store::new(cfg),
        };
        Self { inner, stores }
    }
}

#[async_trait]
impl MarketConnector for CachingConnector {
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
        // tabular sources are local reads, not worth caching
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
impl HistoryProvider for CachingConnector {
    async fn history(
        &self,
        instrument: &Instrument,
        range: RangeSpec,
    ) -> Result<HistoryResponse, LensError> {
        let inner = self
            .inner
            .as_history_provider()
            .ok_or_else(|| LensError::unsupported("history"))?;
        let Some(store) = &self.stores.history else {
            return inner.history(instrument, range).await;
        };
        let key = HistoryKey {
            inst: InstrumentKey::from(instrument),
            range,
        };
        #[cfg(feature = "tracing")]
        if store.inner.contains_key(&key) {
            tracing::debug!(symbol = %instrument.symbol_str(), %range, "history served from cache");
        }
        store
            .get_or_fetch(key, inner.history(instrument, range))
            .await
    }
}

#[async_trait]
impl ProfileProvider for CachingConnector {
    async fn profile(&self, instrument: &Instrument) -> Result<Profile, LensError> {
        let inner = self
            .inner
            .as_profile_provider()
            .ok_or_else(|| LensError::unsupported("profile"))?;
        match &self.stores.profile {
            Some(store) => {
                store
                    .get_or_fetch(InstrumentKey::from(instrument), inner.profile(instrument))
                    .await
            }
            None => inner.profile(instrument).await,
        }
    }
}

#[async_trait]
impl ValuationProvider for CachingConnector {
    async fn valuation(&self, instrument: &Instrument) -> Result<Valuation, LensError> {
        let inner = self
            .inner
            .as_valuation_provider()
            .ok_or_else(|| LensError::unsupported("valuation"))?;
        match &self.stores.valuation {
            Some(store) => {
                store
                    .get_or_fetch(InstrumentKey::from(instrument), inner.valuation(instrument))
                    .await
            }
            None => inner.valuation(instrument).await,
        }
    }
}

#[async_trait]
impl BalanceSheetProvider for CachingConnector {
    async fn balance_sheet(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<BalanceSheetRow>, LensError> {
        let inner = self
            .inner
            .as_balance_sheet_provider()
            .ok_or_else(|| LensError::unsupported("balance_sheet"))?;
        match &self.stores.balance_sheet {
            Some(store) => {
                let key = StatementKey {
                    inst: InstrumentKey::from(instrument),
                    quarterly,
                };
                store
                    .get_or_fetch(key, inner.balance_sheet(instrument, quarterly))
                    .await
            }
            None => inner.balance_sheet(instrument, quarterly).await,
        }
    }
}

#[async_trait]
impl IncomeStatementProvider for CachingConnector {
    async fn income_statement(
        &self,
        instrument: &Instrument,
        quarterly: bool,
    ) -> Result<Vec<IncomeStatementRow>, LensError> {
        let inner = self
            .inner
            .as_income_statement_provider()
            .ok_or_else(|| LensError::unsupported("income_statement"))?;
        match &self.stores.income_stmt {
            Some(store) => {
                let key = StatementKey {
                    inst: InstrumentKey::from(instrument),
                    quarterly,
                };
                store
                    .get_or_fetch(key, inner.income_statement(instrument, quarterly))
                    .await
            }
            None => inner.income_statement(instrument, quarterly).await,
        }
    }
}
