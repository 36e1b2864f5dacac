//! ticklens-middleware
//!
//! Connector wrappers: fetch memoization keyed on the exact request, retry
//! with exponential backoff for transient failures, and a builder composing
//! them around a raw connector.

mod builder;
mod cache;
mod retry;

pub use crate::builder::ConnectorBuilder;
pub use crate::cache::{CacheMiddleware, CachingConnector};
pub use crate::retry::{RetryMiddleware, RetryingConnector, backoff_delay};
