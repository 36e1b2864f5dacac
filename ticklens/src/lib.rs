//! Ticklens assembles a single-ticker market dashboard from one connector.
//!
//! Overview
//! - A [`DashboardRequest`] names the ticker, the price-history range and the
//!   moving-average window.
//! - [`Dashboard::run`] fetches six sections concurrently: price history with a
//!   moving-average overlay, company info, long-run daily history, the latest
//!   close, annual statements and the monthly volume split.
//! - Provider failures never abort a run. Each section that could not be
//!   produced leaves a [`Notice`] in the report and absent company fields
//!   render as `"N/A"`.
//! - [`render_text`] and [`render_json`] present a [`DashboardReport`].
//!
//! Connectors come from `ticklens-yfinance` (live), `ticklens-mock` (fixtures)
//! or [`SnapshotConnector`] (an exported split-orient JSON file). Wrap them with
//! [`ConnectorBuilder`] for memoization and retries.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticklens::{ConnectorBuilder, Dashboard, Lookback, RangeSpec, Sampling};
//! use ticklens_mock::MockConnector;
//!
//! let connector = ConnectorBuilder::new(Arc::new(MockConnector::new())).build()?;
//! let dashboard = Dashboard::builder().with_connector(connector).build()?;
//! let req = dashboard.request("aapl", RangeSpec::lookback(Lookback::M1, Sampling::D1), None)?;
//! let report = dashboard.run(&req).await;
//! println!("{}", ticklens::render_text(&report));
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod fetch;
mod pipeline;
pub mod report;
mod render;
mod snapshot;

pub use core::{Dashboard, DashboardBuilder};
pub use render::{render_json, render_text};
pub use report::{
    CompanyInfo, DashboardReport, Financials, HistoryTail, LatestPrice, LongRunHistory, Notice,
    NoticeLevel, Overlay, OverlayPoint, PLACEHOLDER, PriceHistory, Section, VolumePie, VolumeSlice,
};
pub use snapshot::SnapshotConnector;

pub use ticklens_middleware::ConnectorBuilder;

// Re-export core types for convenience
pub use ticklens_core::{
    AssetKind, CacheConfig, Currency, DashboardConfig, DashboardRequest, LensError, Lookback,
    MarketConnector, MarketZone, Money, OhlcvRow, OhlcvTable, RangeSpec, RetryConfig, Sampling,
    frame::SplitFrame,
};
