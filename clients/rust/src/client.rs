//! Main MemejobClient implementation.
//!
//! Wires the chain, contract and indexer into an adapter built from an
//! [`AdapterFactory`](crate::adapter::AdapterFactory) and exposes token
//! creation and lookup.

use std::sync::Arc;

use crate::adapter::{AdapterBuilder, AdapterOverrides, MemejobAdapter, SharedParams};
use crate::address::{to_evm_address, LedgerAddress};
use crate::chains::Chain;
use crate::config::ClientConfig;
use crate::constants::ZERO_ADDRESS;
use crate::errors::{MemejobError, MemejobResult};
use crate::mirror::{HttpTransport, IndexerClient};
use crate::reader::{ContractReader, ProviderReader};
use crate::rpc::RetryPolicy;
use crate::token::MemejobToken;
use crate::types::{CreateOptions, CreateRequest, CreateTokenParams, Outcome};
use alloy::primitives::U256;

/// Client for the memejob bonding curve.
///
/// Cheap to clone; clones share the adapter.
///
/// # Example
///
/// ```ignore
/// use memejob_client::{create_adapter, ClientConfig, MemejobClient, NativeAdapter, NativeParams};
///
/// let factory = create_adapter::<NativeAdapter>(NativeParams::with_client(ledger));
/// let config = ClientConfig::builder()
///     .contract_id(TESTNET_DEPLOYMENT.contract_id.parse::<EntityId>()?)
///     .chain(Chain::hedera_testnet())
///     .build()?;
///
/// let client = MemejobClient::new(&factory, config)?;
/// let token = client.get_token("0.0.6000001".parse()?).await?;
/// ```
#[derive(Clone)]
pub struct MemejobClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    indexer: IndexerClient,
    adapter: Arc<dyn MemejobAdapter>,
}

impl std::fmt::Debug for MemejobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemejobClient")
            .field("config", &self.inner.config)
            .field("mode", &self.inner.adapter.operational_mode())
            .finish_non_exhaustive()
    }
}

impl MemejobClient {
    /// Build the indexer and read clients, then the adapter.
    pub fn new(factory: &dyn AdapterBuilder, config: ClientConfig) -> MemejobResult<Self> {
        let transport = config
            .indexer_transport
            .clone()
            .unwrap_or_else(|| Arc::new(HttpTransport::default()));
        let indexer = IndexerClient::with_transport(&config.indexer_base_url, transport)?
            .with_retry_policy(RetryPolicy::from(&config.retry));

        let reader: Arc<dyn ContractReader> = match &config.reader {
            Some(reader) => reader.clone(),
            None => Arc::new(ProviderReader::connect(&config.chain.rpc_url)?),
        };

        let adapter = factory.build_adapter(
            SharedParams {
                chain: config.chain.clone(),
                contract_id: config.contract_id,
                indexer: indexer.clone(),
                reader,
                existence_check: config.existence_check,
            },
            AdapterOverrides {
                operational_mode: config.operational_mode,
            },
        )?;

        tracing::debug!(
            chain = config.chain.name,
            contract_id = %config.contract_id,
            indexer = %config.indexer_base_url,
            mode = ?adapter.operational_mode(),
            "Memejob client ready"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                indexer,
                adapter,
            }),
        })
    }

    pub fn adapter(&self) -> &Arc<dyn MemejobAdapter> {
        &self.inner.adapter
    }

    pub fn indexer(&self) -> &IndexerClient {
        &self.inner.indexer
    }

    pub fn contract_id(&self) -> LedgerAddress {
        self.inner.config.contract_id
    }

    pub fn chain(&self) -> &Chain {
        &self.inner.config.chain
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Launch a token on the bonding curve.
    ///
    /// `name`, `symbol` and `memo` are checked before any network call.
    /// In bytes mode the unsigned creation transaction is returned.
    pub async fn create_token(
        &self,
        params: CreateTokenParams,
        options: CreateOptions,
    ) -> MemejobResult<Outcome<MemejobToken>> {
        let request = create_request(params, options)?;

        tracing::debug!(name = %request.name, symbol = %request.symbol, "Creating token");
        let outcome = self.inner.adapter.create(request).await?;

        Ok(outcome.map(|token_id| MemejobToken::new(token_id, self.clone())))
    }

    /// Handle for a token registered on the bonding curve.
    pub async fn get_token(&self, token: LedgerAddress) -> MemejobResult<MemejobToken> {
        let token_id = token.entity_id().ok_or_else(|| {
            MemejobError::InvalidInput(format!("token {token} has no native id"))
        })?;

        if !self
            .inner
            .adapter
            .check_token_existence(to_evm_address(&token))
            .await
        {
            return Err(MemejobError::TokenNotFound {
                token: token.to_string(),
            });
        }

        Ok(MemejobToken::new(token_id, self.clone()))
    }
}

fn create_request(params: CreateTokenParams, options: CreateOptions) -> MemejobResult<CreateRequest> {
    let CreateTokenParams { name, symbol, memo } = params;

    if name.trim().is_empty() {
        return Err(MemejobError::MissingField { field: "name" });
    }
    if symbol.trim().is_empty() {
        return Err(MemejobError::MissingField { field: "symbol" });
    }
    if memo.trim().is_empty() {
        return Err(MemejobError::MissingField { field: "memo" });
    }

    Ok(CreateRequest {
        name,
        symbol,
        memo,
        referrer: options.referrer.unwrap_or(ZERO_ADDRESS),
        amount: options.amount.unwrap_or(U256::ZERO),
        distribute_rewards: options.distribute_rewards.unwrap_or(true),
    })
}
