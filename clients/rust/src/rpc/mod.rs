//! RPC utilities.
//!
//! This module provides:
//! - `with_retry` - Bounded retry with fixed or computed delay
//! - `RetryPolicy` - Per call-site retry settings

pub mod retry;

pub use retry::{with_retry, RetryDelay, RetryPolicy, ShouldRetry};
