//! Mirror node indexer client.
//!
//! This module provides:
//! - `IndexerClient` - Single-page and paginated GETs with retry
//! - `IndexerTransport` - HTTP seam (`HttpTransport` by default)
//! - `types` - Response models for transactions, contract results and balances

mod client;
mod error;
mod query;
mod transport;
pub mod types;

pub use client::{IndexerClient, IndexerRequest};
pub use error::IndexerError;
pub use query::{parse_query_params, Query};
pub use transport::{HttpTransport, IndexerTransport};
pub use types::Paginated;
