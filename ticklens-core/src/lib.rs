//! ticklens-core
//!
//! Core types, traits, and derivations shared across the ticklens workspace.
//!
//! - `types`: re-exported `paft` and `ticklens-types` building blocks.
//! - `connector`: the `MarketConnector` trait and capability provider traits.
//! - `series` / `table` / `frame`: the fetch-boundary data model. Provider
//!   output is normalized into an [`OhlcvTable`] and split into ordered,
//!   zone-aware [`PriceSeries`] and [`VolumeSeries`].
//! - `transform`: the moving-average transformer and the monthly volume
//!   aggregator. Both are pure functions of their inputs.
#![warn(missing_docs)]

/// Connector capability traits and the primary `MarketConnector` interface.
pub mod connector;
/// Labelled-column frames and their flattening into OHLCV tables.
pub mod frame;
/// Middleware trait implemented by connector wrappers.
pub mod middleware;
/// Ordered, zone-aware price and volume series.
pub mod series;
/// Normalized provider history.
pub mod table;
/// Moving average and monthly volume derivations.
pub mod transform;
pub mod types;

pub use connector::MarketConnector;
pub use middleware::Middleware;
pub use series::{MarketZone, Observation, PriceSeries, VolumeSeries};
pub use table::{OhlcvRow, OhlcvTable};
pub use transform::monthly_volume::{MonthlyVolume, MonthlyVolumeAggregate, aggregate_monthly_volume};
pub use transform::moving_average::{MovingAverageSeries, compute_moving_average};
pub use types::*;
