//! Error types for the memejob client.
//!
//! Provides rich error types with retry hints and categorization
//! for better error handling and observability.

use thiserror::Error;

use crate::mirror::IndexerError;

/// Main error type for memejob client operations.
#[derive(Error, Debug)]
pub enum MemejobError {
    // Validation Errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Operational mode not supported: {message}")]
    UnsupportedMode { message: String },

    #[error("Address mismatch: {message}")]
    AddressMismatch { message: String },

    // Network Errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {message}")]
    Rpc { message: String },

    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    // Transaction Errors
    #[error("Transaction failed: {message}")]
    TransactionFailed { message: String },

    #[error("Receipt not available for {transaction}")]
    ReceiptUnavailable { transaction: String },

    // Resolution Errors
    #[error("Token not found on memejob bonding curve: {token}")]
    TokenNotFound { token: String },

    #[error("Could not resolve created token: {reason}")]
    CreationUnresolved { reason: String },

    // Encoding Errors
    #[error("ABI error: {0}")]
    Abi(#[from] alloy::sol_types::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Internal Errors
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl MemejobError {
    /// Check if this error is retryable.
    ///
    /// Retryable errors are transient network failures or receipts that
    /// have not been indexed yet.
    pub fn is_retryable(&self) -> bool {
        match self {
            MemejobError::Http(_)
            | MemejobError::Rpc { .. }
            | MemejobError::ReceiptUnavailable { .. } => true,
            MemejobError::Indexer(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Categorize the error for logging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MemejobError::InvalidInput(_)
            | MemejobError::MissingField { .. }
            | MemejobError::AddressMismatch { .. } => ErrorCategory::Validation,

            MemejobError::InvalidConfig { .. } | MemejobError::UnsupportedMode { .. } => {
                ErrorCategory::Config
            }

            MemejobError::Http(_) | MemejobError::Rpc { .. } | MemejobError::Indexer(_) => {
                ErrorCategory::Network
            }

            MemejobError::TransactionFailed { .. } | MemejobError::ReceiptUnavailable { .. } => {
                ErrorCategory::Transaction
            }

            MemejobError::TokenNotFound { .. } | MemejobError::CreationUnresolved { .. } => {
                ErrorCategory::Resolution
            }

            MemejobError::Abi(_) | MemejobError::Serialization(_) => ErrorCategory::Encoding,

            MemejobError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Create an RPC error from any displayable failure.
    pub fn rpc(message: impl std::fmt::Display) -> Self {
        MemejobError::Rpc {
            message: message.to_string(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        MemejobError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a transaction failed error.
    pub fn transaction_failed(message: impl std::fmt::Display) -> Self {
        MemejobError::TransactionFailed {
            message: message.to_string(),
        }
    }

    /// Create a creation resolution error.
    pub fn unresolved(reason: impl Into<String>) -> Self {
        MemejobError::CreationUnresolved {
            reason: reason.into(),
        }
    }
}

/// Error category for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, RPC, indexer)
    Network,
    /// Transaction-related errors (execution, receipts)
    Transaction,
    /// Input validation errors
    Validation,
    /// Token lookup and creation-id resolution errors
    Resolution,
    /// Configuration errors
    Config,
    /// ABI and envelope encoding errors
    Encoding,
    /// Internal errors (unexpected failures)
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Transaction => write!(f, "transaction"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Resolution => write!(f, "resolution"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Encoding => write!(f, "encoding"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Result type alias for memejob operations.
pub type MemejobResult<T> = Result<T, MemejobError>;
