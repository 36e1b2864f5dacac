//! Pure derivations over fetched series.

pub mod monthly_volume;
pub mod moving_average;
