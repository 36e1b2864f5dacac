//! Provider-facing operations: every call is capability-checked, bounded by
//! the provider timeout and normalized before it reaches a transformer.

use ticklens_core::{AssetKind, Instrument, LensError, OhlcvTable, RangeSpec};

use crate::Dashboard;
use crate::report::{CompanyInfo, Financials};

pub(crate) fn instrument(symbol: &str) -> Result<Instrument, LensError> {
    Ok(Instrument::from_symbol(symbol, AssetKind::Equity)?)
}

impl Dashboard {
    /// Fetch history for `symbol` over `range` as a normalized table.
    ///
    /// A connector that serves tables directly is asked for one; otherwise its
    /// candles are normalized.
    ///
    /// # Errors
    /// - `Unsupported` if the connector has neither table nor history capability.
    /// - `ProviderTimeout` if the call exceeds the provider timeout.
    /// - `EmptyResult` if the provider answered with zero rows.
    /// - Whatever the connector reports otherwise (`NotFound`, `Connector`, ...).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "ticklens::fetch_ohlcv",
            skip(self),
            fields(range = %range),
        )
    )]
    pub async fn fetch_ohlcv(&self, symbol: &str, range: RangeSpec) -> Result<OhlcvTable, LensError> {
        let inst = instrument(symbol)?;
        let name = self.connector.name();
        let timeout = self.cfg.provider_timeout();
        let table = if let Some(provider) = self.connector.as_table_provider() {
            Self::provider_call_with_timeout(name, "table", timeout, provider.table(&inst, range))
                .await?
        } else {
            let provider = self
                .connector
                .as_history_provider()
                .ok_or_else(|| LensError::unsupported("history"))?;
            let resp = Self::provider_call_with_timeout(
                name,
                "history",
                timeout,
                provider.history(&inst, range),
            )
            .await?;
            OhlcvTable::from_history(&resp)?
        };
        if table.is_empty() {
            return Err(LensError::empty(format!("history for {symbol}")));
        }
        Ok(table)
    }

    /// Fetch the profile and valuation of `symbol`.
    ///
    /// The profile is required. Valuation figures are best-effort: a connector
    /// without the capability, or a failed valuation call, leaves them absent.
    ///
    /// # Errors
    /// Returns the profile error when the profile cannot be fetched.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "ticklens::fetch_company_info", skip(self))
    )]
    pub async fn fetch_company_info(&self, symbol: &str) -> Result<CompanyInfo, LensError> {
        let inst = instrument(symbol)?;
        let name = self.connector.name();
        let timeout = self.cfg.provider_timeout();
        let profile_provider = self
            .connector
            .as_profile_provider()
            .ok_or_else(|| LensError::unsupported("profile"))?;

        let profile_fut = Self::provider_call_with_timeout(
            name,
            "profile",
            timeout,
            profile_provider.profile(&inst),
        );
        let valuation_fut = async {
            match self.connector.as_valuation_provider() {
                Some(p) => {
                    Self::provider_call_with_timeout(name, "valuation", timeout, p.valuation(&inst))
                        .await
                }
                None => Err(LensError::unsupported("valuation")),
            }
        };
        let (profile, valuation) = tokio::join!(profile_fut, valuation_fut);
        let profile = profile?;
        let valuation = match valuation {
            Ok(v) => Some(v),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(symbol, error = %e, "valuation unavailable");
                #[cfg(not(feature = "tracing"))]
                let _ = e;
                None
            }
        };
        Ok(CompanyInfo::from_parts(&profile, valuation))
    }

    /// Fetch annual balance sheet and income statement rows for `symbol`.
    ///
    /// # Errors
    /// Fails if either statement cannot be fetched; `EmptyResult` if both are empty.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "ticklens::fetch_financials", skip(self))
    )]
    pub async fn fetch_financials(&self, symbol: &str) -> Result<Financials, LensError> {
        let inst = instrument(symbol)?;
        let name = self.connector.name();
        let timeout = self.cfg.provider_timeout();
        let bs = self
            .connector
            .as_balance_sheet_provider()
            .ok_or_else(|| LensError::unsupported("balance_sheet"))?;
        let is = self
            .connector
            .as_income_statement_provider()
            .ok_or_else(|| LensError::unsupported("income_statement"))?;

        let (balance_sheet, income_statement) = tokio::join!(
            Self::provider_call_with_timeout(name, "balance_sheet", timeout, bs.balance_sheet(&inst, false)),
            Self::provider_call_with_timeout(
                name,
                "income_statement",
                timeout,
                is.income_statement(&inst, false)
            ),
        );
        let financials = Financials {
            balance_sheet: balance_sheet?,
            income_statement: income_statement?,
        };
        if financials.is_empty() {
            return Err(LensError::empty(format!("financials for {symbol}")));
        }
        Ok(financials)
    }
}
