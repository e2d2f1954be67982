//! Error type for indexer requests.

use thiserror::Error;

/// Errors returned by the mirror node indexer client.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// The indexer answered with a `_status.messages` envelope.
    #[error("{}", .messages.join(","))]
    Api { messages: Vec<String> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode indexer response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid indexer URL: {0}")]
    InvalidUrl(String),
}

impl IndexerError {
    /// Transport failures and server-side statuses that may clear up on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            IndexerError::Http(_) => true,
            IndexerError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
