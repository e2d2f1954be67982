//! EVM backend.
//!
//! Every write is signed and submitted immediately, either by a local
//! private key through an alloy wallet provider or by an external
//! EIP-1193 wallet. Bytes mode is therefore unsupported.

use std::sync::Arc;

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};

use super::factory::{Backend, ConstructionToken};
use super::{sealed, shared, AdapterContext, MemejobAdapter};
use crate::abi::{IHederaToken, IMemeJob};
use crate::address::{is_evm_address, to_evm_address, EntityId, LedgerAddress};
use crate::config::RetryConfig;
use crate::constants::{CREATE_GAS, TOKEN_FACADE_GAS, TRADE_GAS, WEIBARS_PER_TINYBAR};
use crate::errors::{MemejobError, MemejobResult};
use crate::rpc::{with_retry, RetryPolicy};
use crate::types::{
    AllowanceEntry, AllowanceResult, AssociateResult, BuyRequest, BuyResult, CreateRequest,
    OperationalMode, Outcome, SellRequest, SellResult, TradeResult,
};

/// Receipt polling for external wallets: up to a minute.
const EXTERNAL_RECEIPT_POLL: RetryConfig = RetryConfig {
    retry_count: 30,
    delay_ms: 2_000,
};

/// A request-based wallet bridge (EIP-1193), e.g. a browser extension.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> MemejobResult<Value>;
}

/// Signing method for [`EvmAdapter`].
#[derive(Clone)]
pub enum EvmSigner {
    PrivateKey(PrivateKeySigner),
    Provider(Arc<dyn Eip1193Provider>),
}

impl std::fmt::Debug for EvmSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvmSigner::PrivateKey(signer) => {
                f.debug_tuple("PrivateKey").field(&signer.address()).finish()
            }
            EvmSigner::Provider(_) => f.write_str("Provider"),
        }
    }
}

/// Backend-specific parameters for [`EvmAdapter`].
#[derive(Debug, Clone)]
pub struct EvmParams {
    pub signer: EvmSigner,
    pub operational_mode: Option<OperationalMode>,
}

impl EvmParams {
    pub fn with_private_key(signer: PrivateKeySigner) -> Self {
        Self {
            signer: EvmSigner::PrivateKey(signer),
            operational_mode: None,
        }
    }

    pub fn with_provider(provider: Arc<dyn Eip1193Provider>) -> Self {
        Self {
            signer: EvmSigner::Provider(provider),
            operational_mode: None,
        }
    }

    pub fn operational_mode(mut self, mode: OperationalMode) -> Self {
        self.operational_mode = Some(mode);
        self
    }
}

enum Wallet {
    Local {
        provider: DynProvider,
        address: Address,
    },
    External {
        provider: Arc<dyn Eip1193Provider>,
        receipt_poll: RetryPolicy<MemejobError>,
    },
}

/// A mined transaction: hash and inclusion status.
struct Mined {
    hash: String,
    status: String,
}

impl Wallet {
    async fn account(&self) -> MemejobResult<Address> {
        match self {
            Wallet::Local { address, .. } => Ok(*address),
            Wallet::External { provider, .. } => {
                let accounts = provider.request("eth_accounts", json!([])).await?;
                accounts
                    .get(0)
                    .and_then(Value::as_str)
                    .ok_or_else(|| MemejobError::rpc("wallet exposes no accounts"))?
                    .parse::<Address>()
                    .map_err(|e| MemejobError::rpc(format!("wallet returned a bad account: {e}")))
            }
        }
    }

    async fn send(&self, to: Address, data: Vec<u8>, value: U256, gas: u64) -> MemejobResult<Mined> {
        match self {
            Wallet::Local { provider, .. } => {
                let tx = TransactionRequest::default()
                    .with_to(to)
                    .with_input(Bytes::from(data))
                    .with_value(value)
                    .with_gas_limit(gas);

                let receipt = provider
                    .send_transaction(tx)
                    .await
                    .map_err(MemejobError::rpc)?
                    .get_receipt()
                    .await
                    .map_err(MemejobError::rpc)?;

                Ok(Mined {
                    hash: format!("{:#x}", receipt.transaction_hash),
                    status: inclusion_status(ReceiptResponse::status(&receipt)),
                })
            }
            Wallet::External {
                provider,
                receipt_poll,
            } => {
                let from = self.account().await?;
                let params = json!([{
                    "from": format!("{from:#x}"),
                    "to": format!("{to:#x}"),
                    "data": format!("0x{}", hex::encode(&data)),
                    "value": format!("0x{value:x}"),
                    "gas": format!("{gas:#x}"),
                }]);

                let hash = provider
                    .request("eth_sendTransaction", params)
                    .await?
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| MemejobError::rpc("wallet returned no transaction hash"))?;

                let receipt = with_retry(
                    || {
                        let hash = hash.clone();
                        async move {
                            let receipt = provider
                                .request("eth_getTransactionReceipt", json!([hash.clone()]))
                                .await?;
                            if receipt.is_null() {
                                return Err(MemejobError::ReceiptUnavailable { transaction: hash });
                            }
                            Ok(receipt)
                        }
                    },
                    receipt_poll,
                )
                .await?;

                let included = receipt.get("status").and_then(Value::as_str) == Some("0x1");
                Ok(Mined {
                    hash,
                    status: inclusion_status(included),
                })
            }
        }
    }
}

fn inclusion_status(success: bool) -> String {
    let status = if success { "success" } else { "reverted" };
    status.to_string()
}

/// Collect a concurrently submitted batch.
///
/// Every submission runs to completion, so a failure never abandons a
/// transaction that is already in flight. On failure the hashes that did
/// land are logged and the first error is returned.
fn settle_batch<T>(
    what: &str,
    results: Vec<MemejobResult<T>>,
    hash: impl Fn(&T) -> &str,
) -> MemejobResult<Vec<T>> {
    if results.iter().all(Result::is_ok) {
        return results.into_iter().collect();
    }

    let mut first_error = None;
    for result in results {
        match result {
            Ok(record) => tracing::warn!(
                batch = what,
                hash = %hash(&record),
                "Transaction submitted in a failed batch"
            ),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(e) => tracing::warn!(batch = what, error = %e, "Further batch failure"),
        }
    }

    Err(first_error.unwrap_or_else(|| MemejobError::rpc("batch failed")))
}

/// Adapter that submits EVM transactions.
pub struct EvmAdapter {
    ctx: AdapterContext,
    contract: Address,
    wallet: Wallet,
}

impl std::fmt::Debug for EvmAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wallet = match &self.wallet {
            Wallet::Local { address, .. } => format!("local {address:#x}"),
            Wallet::External { .. } => "external".to_string(),
        };
        f.debug_struct("EvmAdapter")
            .field("ctx", &self.ctx)
            .field("contract", &self.contract)
            .field("wallet", &wallet)
            .finish()
    }
}

impl sealed::Sealed for EvmAdapter {}

impl Backend for EvmAdapter {
    type Params = EvmParams;

    fn requested_mode(params: &EvmParams) -> Option<OperationalMode> {
        params.operational_mode
    }

    fn construct(_token: ConstructionToken, ctx: AdapterContext, params: EvmParams) -> MemejobResult<Self> {
        if ctx.mode == OperationalMode::ReturnBytes {
            return Err(MemejobError::UnsupportedMode {
                message: "EvmAdapter signs and submits every call; bytes mode is not available"
                    .to_string(),
            });
        }

        if !is_evm_address(&ctx.contract_id) {
            return Err(MemejobError::AddressMismatch {
                message: format!(
                    "EvmAdapter requires a genuine EVM contract address, got {}",
                    ctx.contract_id
                ),
            });
        }

        let wallet = match params.signer {
            EvmSigner::PrivateKey(mut signer) => {
                signer.set_chain_id(Some(ctx.chain.id));
                let url = ctx.chain.rpc_url.parse::<url::Url>().map_err(|e| {
                    MemejobError::invalid_config(format!("invalid RPC URL {}: {e}", ctx.chain.rpc_url))
                })?;
                let address = signer.address();
                let provider = ProviderBuilder::new().wallet(signer).connect_http(url).erased();
                Wallet::Local { provider, address }
            }
            EvmSigner::Provider(provider) => Wallet::External {
                provider,
                receipt_poll: RetryPolicy::from(&EXTERNAL_RECEIPT_POLL)
                    .should_retry(|_, e: &MemejobError| e.is_retryable()),
            },
        };

        let contract = to_evm_address(&ctx.contract_id);
        tracing::debug!(contract = %contract, chain_id = ctx.chain.id, "Constructed EVM adapter");

        Ok(Self {
            ctx,
            contract,
            wallet,
        })
    }
}

impl EvmAdapter {
    async fn write(&self, to: Address, call: impl SolCall, value_tinybars: U256, gas: u64) -> MemejobResult<Mined> {
        let value = value_tinybars
            .checked_mul(U256::from(WEIBARS_PER_TINYBAR))
            .ok_or_else(|| {
                MemejobError::InvalidInput(format!(
                    "payment of {value_tinybars} tinybars overflows the weibar range"
                ))
            })?;
        let mined = self.wallet.send(to, call.abi_encode(), value, gas).await?;

        tracing::info!(to = %to, hash = %mined.hash, status = %mined.status, "EVM transaction mined");
        Ok(mined)
    }
}

#[async_trait]
impl MemejobAdapter for EvmAdapter {
    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    async fn create(&self, request: CreateRequest) -> MemejobResult<Outcome<EntityId>> {
        let fee = self.get_creation_fee().await;
        let value = shared::creation_value(fee, request.amount)?;

        let mined = self
            .write(
                self.contract,
                IMemeJob::memeJobCall {
                    name: request.name,
                    symbol: request.symbol,
                    memo: request.memo,
                    referrer: request.referrer,
                    amount: request.amount,
                    distributeRewards: request.distribute_rewards,
                },
                value,
                CREATE_GAS,
            )
            .await?;

        if mined.status != "success" {
            return Err(MemejobError::transaction_failed(format!(
                "token creation {} was reverted",
                mined.hash
            )));
        }

        let token_id = shared::get_token_id_on_create(&self.ctx, &mined.hash).await?;
        Ok(Outcome::Executed(token_id))
    }

    async fn buy(&self, request: BuyRequest) -> MemejobResult<Outcome<BuyResult>> {
        let amount_out = self.get_amount_out(request.token, request.amount).await;

        let mined = self
            .write(
                self.contract,
                IMemeJob::buyJobCall {
                    memeAddress: request.token,
                    amount: request.amount,
                    referrer: request.referrer,
                },
                amount_out,
                TRADE_GAS,
            )
            .await?;

        Ok(Outcome::Executed(TradeResult {
            transaction_id_or_hash: mined.hash,
            status: mined.status,
            amount: request.amount,
        }))
    }

    async fn sell(&self, request: SellRequest) -> MemejobResult<Outcome<SellResult>> {
        let mined = self
            .write(
                self.contract,
                IMemeJob::sellJobCall {
                    memeAddress: request.token,
                    amount: request.amount,
                },
                U256::ZERO,
                TRADE_GAS,
            )
            .await?;

        Ok(Outcome::Executed(TradeResult {
            transaction_id_or_hash: mined.hash,
            status: mined.status,
            amount: request.amount,
        }))
    }

    async fn approve_allowance(
        &self,
        tokens: &[AllowanceEntry],
        spender: LedgerAddress,
    ) -> MemejobResult<Outcome<Vec<AllowanceResult>>> {
        let spender_address = to_evm_address(&spender);

        let results = join_all(tokens.iter().map(|entry| async move {
            let mined = self
                .write(
                    to_evm_address(&entry.token_id),
                    IHederaToken::approveCall {
                        spender: spender_address,
                        amount: entry.amount,
                    },
                    U256::ZERO,
                    TOKEN_FACADE_GAS,
                )
                .await?;

            Ok::<_, MemejobError>(AllowanceResult {
                transaction_id_or_hash: mined.hash,
                status: mined.status,
                token: entry.clone(),
                spender,
            })
        }))
        .await;

        let results = settle_batch("allowance", results, |r| r.transaction_id_or_hash.as_str())?;
        Ok(Outcome::Executed(results))
    }

    async fn associate_tokens(
        &self,
        tokens: &[LedgerAddress],
    ) -> MemejobResult<Outcome<Vec<AssociateResult>>> {
        let results = join_all(tokens.iter().map(|token| async move {
            let mined = self
                .write(
                    to_evm_address(token),
                    IHederaToken::associateCall {},
                    U256::ZERO,
                    TOKEN_FACADE_GAS,
                )
                .await?;

            Ok::<_, MemejobError>(AssociateResult {
                transaction_id_or_hash: mined.hash,
                status: mined.status,
                token: *token,
            })
        }))
        .await;

        let results = settle_batch("association", results, |r| r.transaction_id_or_hash.as_str())?;
        Ok(Outcome::Executed(results))
    }

    async fn get_balance(&self, token: &LedgerAddress) -> MemejobResult<U256> {
        let account = self.wallet.account().await?;
        shared::read(
            &self.ctx,
            to_evm_address(token),
            IHederaToken::balanceOfCall { account },
        )
        .await
    }
}
