//! Shared ticklens error taxonomy, configuration and request types built on top of `paft`.
#![warn(missing_docs)]

mod config;
mod error;
mod request;
mod valuation;

pub use config::{CacheConfig, DashboardConfig, RetryConfig};
pub use error::LensError;
pub use request::{DashboardRequest, Lookback, RangeSpec, Sampling};
pub use valuation::Valuation;
