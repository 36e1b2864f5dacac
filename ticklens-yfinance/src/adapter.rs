#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;

use ticklens_core::LensError;
use yf::core::HistoryService;
use yfinance_rs as yf;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// History abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait YfHistory: Send + Sync {
    /// Fetch full history for a symbol using a provider-specific request.
    async fn fetch_full(
        &self,
        symbol: &str,
        req: yf::core::services::HistoryRequest,
    ) -> Result<yf::HistoryResponse, LensError>;
}

/// Profile abstraction for company/fund metadata.
#[async_trait]
pub trait YfProfile: Send + Sync {
    /// Load a company/fund profile for `symbol`.
    async fn load(&self, symbol: &str) -> Result<yf::profile::Profile, LensError>;
}

/// Fundamentals abstraction for financial statements.
#[async_trait]
pub trait YfFundamentals: Send + Sync {
    /// Fetch income statement rows.
    async fn income_statement(
        &self,
        symbol: &str,
        quarterly: bool,
    ) -> Result<Vec<yf::fundamentals::IncomeStatementRow>, LensError>;

    /// Fetch balance sheet rows.
    async fn balance_sheet(
        &self,
        symbol: &str,
        quarterly: bool,
    ) -> Result<Vec<yf::fundamentals::BalanceSheetRow>, LensError>;
}

/// Real adapter backed by a single `YfClient` instance.
/// `YfClient` is `Clone + Send + Sync`, so no external locking is needed.
#[derive(Clone)]
pub struct RealAdapter {
    client: yf::YfClient,
}

impl RealAdapter {
    /// Build a default `YfClient` with a cookie-enabled HTTP client and a browser user agent.
    ///
    /// # Errors
    /// Returns `LensError::Other` if the HTTP or Yahoo client cannot be constructed.
    pub fn new_default() -> Result<Self, LensError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .no_proxy()
            .build()
            .map_err(|e| LensError::Other(format!("http client: {e}")))?;
        Self::with_http(http)
    }

    /// Build around a caller-provided HTTP client.
    ///
    /// The client should enable a cookie store for the Yahoo crumb flow.
    ///
    /// # Errors
    /// Returns `LensError::Other` if the Yahoo client cannot be constructed.
    pub fn with_http(http: reqwest::Client) -> Result<Self, LensError> {
        let client = yf::YfClient::builder()
            .custom_client(http)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LensError::Other(format!("yahoo client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing `YfClient`.
    #[must_use]
    pub const fn new(client: yf::YfClient) -> Self {
        Self { client }
    }
}

fn map_yf_err(e: &yf::YfError, context: &str) -> LensError {
    match e {
        yf::YfError::NotFound { .. } => LensError::not_found(context.to_string()),
        yf::YfError::RateLimited { .. } => {
            LensError::connector("ticklens-yfinance", format!("rate limit: {context}"))
        }
        yf::YfError::ServerError { status, .. } => LensError::connector(
            "ticklens-yfinance",
            format!("server error {status}: {context}"),
        ),
        yf::YfError::Status { status, .. } => {
            LensError::connector("ticklens-yfinance", format!("status {status}: {context}"))
        }
        other => LensError::connector("ticklens-yfinance", other.to_string()),
    }
}

#[async_trait]
impl YfHistory for RealAdapter {
    async fn fetch_full(
        &self,
        symbol: &str,
        req: yf::core::services::HistoryRequest,
    ) -> Result<yf::HistoryResponse, LensError> {
        self.client
            .fetch_full_history(symbol, req)
            .await
            .map_err(|e| map_yf_err(&e, &format!("history for {symbol}")))
    }
}

#[async_trait]
impl YfProfile for RealAdapter {
    async fn load(&self, symbol: &str) -> Result<yf::profile::Profile, LensError> {
        yf::profile::load_profile(&self.client, symbol)
            .await
            .map_err(|e| map_yf_err(&e, &format!("profile for {symbol}")))
    }
}

#[async_trait]
impl YfFundamentals for RealAdapter {
    async fn income_statement(
        &self,
        symbol: &str,
        quarterly: bool,
    ) -> Result<Vec<yf::fundamentals::IncomeStatementRow>, LensError> {
        let fb = yf::fundamentals::FundamentalsBuilder::new(&self.client, symbol.to_string());
        fb.income_statement(quarterly, None)
            .await
            .map_err(|e| map_yf_err(&e, &format!("income statement for {symbol}")))
    }

    async fn balance_sheet(
        &self,
        symbol: &str,
        quarterly: bool,
    ) -> Result<Vec<yf::fundamentals::BalanceSheetRow>, LensError> {
        let fb = yf::fundamentals::FundamentalsBuilder::new(&self.client, symbol.to_string());
        fb.balance_sheet(quarterly, None)
            .await
            .map_err(|e| map_yf_err(&e, &format!("balance sheet for {symbol}")))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn YfHistory {
    /// Build a `YfHistory` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn YfHistory>
    where
        F: Send
            + Sync
            + 'static
            + Fn(String, yf::core::services::HistoryRequest) -> Result<yf::HistoryResponse, LensError>,
    {
        struct FnHist<F>(F);
        #[async_trait]
        impl<F> YfHistory for FnHist<F>
        where
            F: Send
                + Sync
                + 'static
                + Fn(
                    String,
                    yf::core::services::HistoryRequest,
                ) -> Result<yf::HistoryResponse, LensError>,
        {
            async fn fetch_full(
                &self,
                symbol: &str,
                req: yf::core::services::HistoryRequest,
            ) -> Result<yf::HistoryResponse, LensError> {
                (self.0)(symbol.to_string(), req)
            }
        }
        Arc::new(FnHist(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn YfProfile {
    /// Build a `YfProfile` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn YfProfile>
    where
        F: Send + Sync + 'static + Fn(String) -> Result<yf::profile::Profile, LensError>,
    {
        struct FnProfile<F>(F);
        #[async_trait]
        impl<F> YfProfile for FnProfile<F>
        where
            F: Send + Sync + 'static + Fn(String) -> Result<yf::profile::Profile, LensError>,
        {
            async fn load(&self, symbol: &str) -> Result<yf::profile::Profile, LensError> {
                (self.0)(symbol.to_string())
            }
        }
        Arc::new(FnProfile(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn YfFundamentals {
    /// Build a `YfFundamentals` from closures (tests only).
    pub fn from_fns<FI, FB>(fi: FI, fb: FB) -> Arc<dyn YfFundamentals>
    where
        FI: Send
            + Sync
            + 'static
            + Fn(String, bool) -> Result<Vec<yf::fundamentals::IncomeStatementRow>, LensError>,
        FB: Send
            + Sync
            + 'static
            + Fn(String, bool) -> Result<Vec<yf::fundamentals::BalanceSheetRow>, LensError>,
    {
        struct FnFund<FI, FB> {
            fi: FI,
            fb: FB,
        }
        #[async_trait]
        impl<FI, FB> YfFundamentals for FnFund<FI, FB>
        where
            FI: Send
                + Sync
                + 'static
                + Fn(String, bool) -> Result<Vec<yf::fundamentals::IncomeStatementRow>, LensError>,
            FB: Send
                + Sync
                + 'static
                + Fn(String, bool) -> Result<Vec<yf::fundamentals::BalanceSheetRow>, LensError>,
        {
            async fn income_statement(
                &self,
                symbol: &str,
                quarterly: bool,
            ) -> Result<Vec<yf::fundamentals::IncomeStatementRow>, LensError> {
                (self.fi)(symbol.to_string(), quarterly)
            }

            async fn balance_sheet(
                &self,
                symbol: &str,
                quarterly: bool,
            ) -> Result<Vec<yf::fundamentals::BalanceSheetRow>, LensError> {
                (self.fb)(symbol.to_string(), quarterly)
            }
        }
        Arc::new(FnFund { fi, fb })
    }
}

/// Produce trait-object handles for each adapter role (tests only).
///
/// Every method defaults to an adapter that answers `Unsupported`, so a test
/// only overrides the roles it exercises.
#[cfg(feature = "test-adapters")]
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn YfHistory>`.
    fn clone_arc_history(&self) -> Arc<dyn YfHistory> {
        <dyn YfHistory>::from_fn(|_, _| Err(LensError::unsupported("history")))
    }
    /// Clone as `Arc<dyn YfProfile>`.
    fn clone_arc_profile(&self) -> Arc<dyn YfProfile> {
        <dyn YfProfile>::from_fn(|_| Err(LensError::unsupported("profile")))
    }
    /// Clone as `Arc<dyn YfFundamentals>`.
    fn clone_arc_fundamentals(&self) -> Arc<dyn YfFundamentals> {
        <dyn YfFundamentals>::from_fns(
            |_, _| Err(LensError::unsupported("fundamentals/income_statement")),
            |_, _| Err(LensError::unsupported("fundamentals/balance_sheet")),
        )
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_history(&self) -> Arc<dyn YfHistory> {
        Arc::new(self.clone()) as Arc<dyn YfHistory>
    }
    fn clone_arc_profile(&self) -> Arc<dyn YfProfile> {
        Arc::new(self.clone()) as Arc<dyn YfProfile>
    }
    fn clone_arc_fundamentals(&self) -> Arc<dyn YfFundamentals> {
        Arc::new(self.clone()) as Arc<dyn YfFundamentals>
    }
}
