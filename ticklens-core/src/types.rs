//! Re-export of foundational types from `paft` and `ticklens-types`.
// Consolidated re-exports so downstream crates can depend on `ticklens-core` only

pub use ticklens_types::{
    CacheConfig, DashboardConfig, DashboardRequest, LensError, Lookback, RangeSpec, RetryConfig,
    Sampling, Valuation,
};

pub use paft::domain::{AssetKind, Instrument, Period};

pub use paft::money::{Currency, IsoCurrency, Money};

pub use rust_decimal::Decimal;

pub use paft::fundamentals::profile::{CompanyProfile, FundProfile, Profile};
pub use paft::fundamentals::statements::{BalanceSheetRow, IncomeStatementRow};

pub use paft::market::requests::history::{HistoryRequest, Interval};
pub use paft::market::responses::history::{Candle, HistoryMeta, HistoryResponse};
