//! Read-only EVM calls against the ledger's JSON-RPC relay.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use crate::errors::{MemejobError, MemejobResult};

/// Executes `eth_call` and returns the raw return data.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> MemejobResult<Bytes>;
}

/// [`ContractReader`] over an alloy HTTP provider.
#[derive(Clone)]
pub struct ProviderReader {
    provider: DynProvider,
}

impl ProviderReader {
    /// Connect to the JSON-RPC endpoint at `rpc_url`. No request is made
    /// until the first call.
    pub fn connect(rpc_url: &str) -> MemejobResult<Self> {
        let url = rpc_url
            .parse::<url::Url>()
            .map_err(|e| MemejobError::invalid_config(format!("invalid RPC URL {rpc_url}: {e}")))?;

        Ok(Self {
            provider: ProviderBuilder::new().connect_http(url).erased(),
        })
    }

    pub fn from_provider(provider: DynProvider) -> Self {
        Self { provider }
    }
}

impl std::fmt::Debug for ProviderReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderReader").finish_non_exhaustive()
    }
}

#[async_trait]
impl ContractReader for ProviderReader {
    async fn call(&self, to: Address, data: Bytes) -> MemejobResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.provider.call(tx).await.map_err(MemejobError::rpc)
    }
}
