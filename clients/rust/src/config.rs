//! Configuration types for the MemejobClient.
//!
//! This module provides the retry settings for indexer reads, the
//! token-existence strategy and the main client configuration.

use std::sync::Arc;

use crate::address::LedgerAddress;
use crate::chains::Chain;
use crate::mirror::IndexerTransport;
use crate::reader::ContractReader;
use crate::types::OperationalMode;

/// Retry configuration for indexer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first failure
    pub retry_count: u32,
    /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_count: 2,
            delay_ms: 100,
        }
    }
}

/// Retry settings for resolving a created token through the indexer.
/// Contract results lag consensus by a few seconds.
pub const CREATION_RECEIPT_RETRY: RetryConfig = RetryConfig {
    retry_count: 10,
    delay_ms: 2_000,
};

/// How the bonding-curve registry is queried for a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExistenceCheck {
    /// Fetch every registered token and compare addresses.
    #[default]
    Scan,
    /// Look up the token's registry entry directly.
    Mapping,
}

/// Main configuration for the MemejobClient.
#[derive(Clone)]
pub struct ClientConfig {
    /// Bonding-curve contract, native or EVM form depending on the backend
    pub contract_id: LedgerAddress,
    /// Network the contract lives on
    pub chain: Chain,
    /// Mirror node base URL
    pub indexer_base_url: String,
    /// Retry configuration for indexer reads
    pub retry: RetryConfig,
    /// Overrides the adapter's operational mode when set
    pub operational_mode: Option<OperationalMode>,
    /// Registry lookup strategy
    pub existence_check: ExistenceCheck,
    /// Read-only call client (defaults to the chain's JSON-RPC relay)
    pub reader: Option<Arc<dyn ContractReader>>,
    /// Indexer transport (defaults to HTTP)
    pub indexer_transport: Option<Arc<dyn IndexerTransport>>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("contract_id", &self.contract_id)
            .field("chain", &self.chain.name)
            .field("indexer_base_url", &self.indexer_base_url)
            .field("retry", &self.retry)
            .field("operational_mode", &self.operational_mode)
            .field("existence_check", &self.existence_check)
            .field("custom_reader", &self.reader.is_some())
            .field("custom_transport", &self.indexer_transport.is_some())
            .finish()
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for ClientConfig.
#[derive(Default)]
pub struct ClientConfigBuilder {
    contract_id: Option<LedgerAddress>,
    chain: Option<Chain>,
    indexer_base_url: Option<String>,
    retry: Option<RetryConfig>,
    operational_mode: Option<OperationalMode>,
    existence_check: Option<ExistenceCheck>,
    reader: Option<Arc<dyn ContractReader>>,
    indexer_transport: Option<Arc<dyn IndexerTransport>>,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bonding-curve contract id.
    pub fn contract_id(mut self, id: impl Into<LedgerAddress>) -> Self {
        self.contract_id = Some(id.into());
        self
    }

    /// Set the chain.
    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Set the mirror node base URL.
    pub fn indexer_base_url(mut self, url: impl Into<String>) -> Self {
        self.indexer_base_url = Some(url.into());
        self
    }

    /// Set the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Force an operational mode for the adapter.
    pub fn operational_mode(mut self, mode: OperationalMode) -> Self {
        self.operational_mode = Some(mode);
        self
    }

    /// Set the registry lookup strategy.
    pub fn existence_check(mut self, check: ExistenceCheck) -> Self {
        self.existence_check = Some(check);
        self
    }

    /// Use a custom read-only call client.
    pub fn reader(mut self, reader: Arc<dyn ContractReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Use a custom indexer transport.
    pub fn indexer_transport(mut self, transport: Arc<dyn IndexerTransport>) -> Self {
        self.indexer_transport = Some(transport);
        self
    }

    /// Build the configuration.
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let contract_id = self
            .contract_id
            .ok_or(ConfigError::MissingField("contract_id"))?;
        let chain = self.chain.ok_or(ConfigError::MissingField("chain"))?;

        let indexer_base_url = match self.indexer_base_url {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::Invalid("indexer base URL is empty".to_string()))
            }
            Some(url) => url,
            None => chain.default_mirror_url(),
        };

        Ok(ClientConfig {
            contract_id,
            chain,
            indexer_base_url,
            retry: self.retry.unwrap_or_default(),
            operational_mode: self.operational_mode,
            existence_check: self.existence_check.unwrap_or_default(),
            reader: self.reader,
            indexer_transport: self.indexer_transport,
        })
    }
}

/// Error type for configuration issues.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
