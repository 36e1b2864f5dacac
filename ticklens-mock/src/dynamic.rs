use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use ticklens_core::connector::{HistoryProvider, MarketConnector, ProfileProvider};
use ticklens_core::{AssetKind, HistoryResponse, Instrument, LensError, Profile, RangeSpec};

/// Instruction for how a method should behave for a given symbol.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(LensError),
    /// Hang indefinitely (simulate a stalled provider).
    Hang,
    /// Fail `failures` times with `error`, then keep returning `then`.
    FailTimes {
        /// Number of leading failures.
        failures: u32,
        /// Error returned while failing.
        error: LensError,
        /// Value returned afterwards.
        then: T,
    },
}

#[derive(Default)]
struct State {
    history_rules: HashMap<String, MockBehavior<HistoryResponse>>,
    profile_rules: HashMap<String, MockBehavior<Profile>>,
    attempts: HashMap<(&'static str, String), u32>,
    history_requests: Vec<(String, RangeSpec)>,
}

/// Scriptable connector exposing history and profile capabilities only.
///
/// Symbols without a rule answer `NotFound`. Every call is counted.
pub struct DynamicMock {
    name: &'static str,
    state: Mutex<State>,
    history_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

impl Default for DynamicMock {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicMock {
    /// Empty script named `ticklens-dynamic-mock`.
    #[must_use]
    pub fn new() -> Self {
        Self::named("ticklens-dynamic-mock")
    }

    /// Empty script with a custom connector name.
    #[must_use]
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(State::default()),
            history_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// Script the history answer for `symbol`.
    pub async fn set_history(&self, symbol: &str, behavior: MockBehavior<HistoryResponse>) {
        self.state
            .lock()
            .await
            .history_rules
            .insert(symbol.to_string(), behavior);
    }

    /// Script the profile answer for `symbol`.
    pub async fn set_profile(&self, symbol: &str, behavior: MockBehavior<Profile>) {
        self.state
            .lock()
            .await
            .profile_rules
            .insert(symbol.to_string(), behavior);
    }

    /// Number of history calls received so far.
    #[must_use]
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// Number of profile calls received so far.
    #[must_use]
    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    /// Every `(symbol, range)` pair history was asked for, in call order.
    pub async fn history_requests(&self) -> Vec<(String, RangeSpec)> {
        self.state.lock().await.history_requests.clone()
    }

    async fn resolve<T: Clone>(
        &self,
        capability: &'static str,
        symbol: &str,
        pick: impl FnOnce(&State) -> Option<MockBehavior<T>>,
    ) -> Result<T, LensError> {
        let behavior = {
            let mut state = self.state.lock().await;
            let behavior = pick(&state);
            let counter = state
                .attempts
                .entry((capability, symbol.to_string()))
                .or_default();
            *counter += 1;
            let attempt = *counter;
            behavior.map(|b| (b, attempt))
        };
        match behavior {
            None => Err(LensError::not_found(format!("{capability} for {symbol}"))),
            Some((MockBehavior::Return(v), _)) => Ok(v),
            Some((MockBehavior::Fail(e), _)) => Err(e),
            Some((MockBehavior::Hang, _)) => std::future::pending().await,
            Some((
                MockBehavior::FailTimes {
                    failures,
                    error,
                    then,
                },
                attempt,
            )) => {
                if attempt <= failures {
                    Err(error)
                } else {
                    Ok(then)
                }
            }
        }
    }
}

#[async_trait]
impl MarketConnector for DynamicMock {
    fn name(&self) -> &'static str {
        self.name
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
}

#[async_trait]
impl HistoryProvider for DynamicMock {
    async fn history(
        &self,
        instrument: &Instrument,
        range: RangeSpec,
    ) -> Result<HistoryResponse, LensError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let symbol = instrument.symbol_str().to_string();
        self.state
            .lock()
            .await
            .history_requests
            .push((symbol.clone(), range));
        self.resolve("history", &symbol, |s| s.history_rules.get(&symbol).cloned())
            .await
    }
}

#[async_trait]
impl ProfileProvider for DynamicMock {
    async fn profile(&self, instrument: &Instrument) -> Result<Profile, LensError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        let symbol = instrument.symbol_str();
        self.resolve("profile", symbol, |s| s.profile_rules.get(symbol).cloned())
            .await
    }
}
