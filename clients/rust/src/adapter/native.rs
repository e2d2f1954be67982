//! Ledger-native backend.
//!
//! Transactions are modelled as [`NativeTransaction`] values. In bytes mode
//! they are frozen into the Hedera SDK's unsigned encoding for external
//! signing; otherwise they are handed to a [`LedgerClient`] for signing,
//! submission and receipts.

use std::sync::Arc;

use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use super::factory::{Backend, ConstructionToken};
use super::hedera::{HederaConnector, HederaLedger};
use super::{sealed, shared, AdapterContext, MemejobAdapter};
use crate::abi::IMemeJob;
use crate::address::{EntityId, LedgerAddress};
use crate::chains::Chain;
use crate::constants::{CREATE_GAS, TRADE_GAS};
use crate::errors::{MemejobError, MemejobResult};
use crate::mirror::types::BalancesResponse;
use crate::types::{
    AllowanceEntry, AllowanceResult, AssociateResult, BuyRequest, BuyResult, CreateRequest,
    OperationalMode, Outcome, SellRequest, SellResult, TradeResult,
};

/// Ledger status of a successful receipt.
const SUCCESS: &str = "SUCCESS";

/// Page size for balance listings.
const BALANCES_PAGE_LIMIT: u32 = 100;

/// An unsigned native transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTransaction {
    /// Paying account. Unset when the signer decides at submission.
    pub payer: Option<EntityId>,
    pub body: TransactionBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionBody {
    /// Call a contract function, optionally attaching tinybars.
    ContractExecute {
        contract_id: EntityId,
        gas: u64,
        payable_tinybars: u64,
        /// ABI-encoded call, selector included.
        function_parameters: Vec<u8>,
    },
    /// Grant token allowances from `owner` to `spender`.
    AllowanceApprove {
        owner: EntityId,
        spender: EntityId,
        allowances: Vec<TokenAllowance>,
    },
    /// Associate tokens with an account.
    TokenAssociate {
        account_id: EntityId,
        token_ids: Vec<EntityId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAllowance {
    pub token_id: EntityId,
    pub amount: u64,
}

/// Signs and submits native transactions.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Account that signs and pays, if the client has one.
    fn operator_account_id(&self) -> Option<EntityId>;

    /// Sign and submit. Returns the transaction id (`0.0.x@secs.nanos`).
    async fn execute(&self, transaction: &NativeTransaction) -> MemejobResult<String>;

    /// Wait for the receipt and return its status code, e.g. `SUCCESS`.
    async fn get_receipt(&self, transaction_id: &str) -> MemejobResult<String>;
}

/// Builds a [`LedgerClient`] for a chain from operator credentials.
pub trait LedgerConnector: Send + Sync {
    fn connect(&self, chain: &Chain, operator: &Operator) -> MemejobResult<Arc<dyn LedgerClient>>;
}

/// Operator credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Operator {
    pub account_id: EntityId,
    pub private_key: String,
}

impl std::fmt::Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operator")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Backend-specific parameters for [`NativeAdapter`].
#[derive(Clone, Default)]
pub struct NativeParams {
    /// Ready-made client. Exclusive with `operator`.
    pub client: Option<Arc<dyn LedgerClient>>,
    /// Credentials turned into a client through `connector`.
    pub operator: Option<Operator>,
    /// Defaults to [`HederaConnector`].
    pub connector: Option<Arc<dyn LedgerConnector>>,
    /// Account used for allowances, associations and balances when there
    /// is no client to ask.
    pub account_id: Option<EntityId>,
    pub operational_mode: Option<OperationalMode>,
}

impl NativeParams {
    pub fn with_client(client: Arc<dyn LedgerClient>) -> Self {
        Self {
            client: Some(client),
            ..Self::default()
        }
    }

    pub fn with_operator(operator: Operator) -> Self {
        Self {
            operator: Some(operator),
            ..Self::default()
        }
    }

    pub fn connector(mut self, connector: Arc<dyn LedgerConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Bytes mode without a signer. `account_id` pays for the frozen
    /// transactions.
    pub fn unsigned(account_id: Option<EntityId>) -> Self {
        Self {
            account_id,
            operational_mode: Some(OperationalMode::ReturnBytes),
            ..Self::default()
        }
    }

    pub fn operational_mode(mut self, mode: OperationalMode) -> Self {
        self.operational_mode = Some(mode);
        self
    }

    pub fn account_id(mut self, account_id: EntityId) -> Self {
        self.account_id = Some(account_id);
        self
    }
}

impl std::fmt::Debug for NativeParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeParams")
            .field("client", &self.client.is_some())
            .field("operator", &self.operator)
            .field("account_id", &self.account_id)
            .field("operational_mode", &self.operational_mode)
            .finish_non_exhaustive()
    }
}

/// Adapter that builds ledger-native contract calls.
pub struct NativeAdapter {
    ctx: AdapterContext,
    contract_id: EntityId,
    client: Option<Arc<dyn LedgerClient>>,
    /// Freezes unsigned transactions in bytes mode.
    encoder: Option<HederaLedger>,
    account_id: Option<EntityId>,
}

impl std::fmt::Debug for NativeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeAdapter")
            .field("ctx", &self.ctx)
            .field("has_client", &self.client.is_some())
            .field("encoder", &self.encoder)
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl sealed::Sealed for NativeAdapter {}

impl Backend for NativeAdapter {
    type Params = NativeParams;

    fn requested_mode(params: &NativeParams) -> Option<OperationalMode> {
        params.operational_mode
    }

    fn construct(
        _token: ConstructionToken,
        ctx: AdapterContext,
        params: NativeParams,
    ) -> MemejobResult<Self> {
        // Long-zero addresses are accepted: they name exactly one triplet.
        let contract_id = ctx.contract_id.entity_id().ok_or_else(|| {
            MemejobError::AddressMismatch {
                message: format!(
                    "NativeAdapter requires a native contract id (0.0.x), got {}",
                    ctx.contract_id
                ),
            }
        })?;

        let client = match (params.client, params.operator) {
            (Some(_), Some(_)) => {
                return Err(MemejobError::invalid_config(
                    "cannot set both a ledger client and an operator",
                ))
            }
            (Some(client), None) => Some(client),
            (None, Some(operator)) => {
                let connector = params
                    .connector
                    .unwrap_or_else(|| Arc::new(HederaConnector) as Arc<dyn LedgerConnector>);
                Some(connector.connect(&ctx.chain, &operator)?)
            }
            (None, None) if ctx.mode == OperationalMode::ReturnBytes => None,
            (None, None) => {
                return Err(MemejobError::invalid_config(
                    "NativeAdapter needs a ledger client, an operator, or bytes mode",
                ))
            }
        };

        let encoder = match ctx.mode {
            OperationalMode::ReturnBytes => Some(HederaLedger::for_chain(&ctx.chain)?),
            OperationalMode::ReturnResult => None,
        };

        tracing::debug!(
            contract_id = %contract_id,
            mode = ?ctx.mode,
            signer = client.is_some(),
            "Constructed native adapter"
        );

        Ok(Self {
            ctx,
            contract_id,
            client,
            encoder,
            account_id: params.account_id,
        })
    }
}

impl NativeAdapter {
    fn client(&self) -> MemejobResult<&Arc<dyn LedgerClient>> {
        self.client
            .as_ref()
            .ok_or_else(|| MemejobError::invalid_config("no ledger client configured"))
    }

    /// Account acting as owner, payer and balance holder.
    fn account_id(&self) -> MemejobResult<EntityId> {
        self.client
            .as_ref()
            .and_then(|client| client.operator_account_id())
            .or(self.account_id)
            .ok_or(MemejobError::MissingField { field: "account_id" })
    }

    fn payer(&self) -> Option<EntityId> {
        self.account_id().ok()
    }

    fn contract_execute(&self, gas: u64, payable: U256, call: impl SolCall) -> MemejobResult<NativeTransaction> {
        Ok(NativeTransaction {
            payer: self.payer(),
            body: TransactionBody::ContractExecute {
                contract_id: self.contract_id,
                gas,
                payable_tinybars: to_u64(payable, "payable amount")?,
                function_parameters: call.abi_encode(),
            },
        })
    }

    /// Returns the bytes in bytes mode, otherwise the executed transaction id
    /// and lower-cased receipt status.
    async fn submit(&self, tx: &NativeTransaction) -> MemejobResult<Outcome<(String, String)>> {
        if let Some(encoder) = &self.encoder {
            return Ok(Outcome::Bytes(encoder.freeze(tx).await?));
        }

        let client = self.client()?;
        let transaction_id = client.execute(tx).await?;
        let status = client.get_receipt(&transaction_id).await?;

        tracing::info!(transaction = %transaction_id, status = %status, "Native transaction executed");
        Ok(Outcome::Executed((transaction_id, status.to_lowercase())))
    }
}

#[async_trait]
impl MemejobAdapter for NativeAdapter {
    fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    async fn create(&self, request: CreateRequest) -> MemejobResult<Outcome<EntityId>> {
        let fee = self.get_creation_fee().await;
        let value = shared::creation_value(fee, request.amount)?;

        let tx = self.contract_execute(
            CREATE_GAS,
            value,
            IMemeJob::memeJobCall {
                name: request.name,
                symbol: request.symbol,
                memo: request.memo,
                referrer: request.referrer,
                amount: request.amount,
                distributeRewards: request.distribute_rewards,
            },
        )?;

        match self.submit(&tx).await? {
            Outcome::Bytes(bytes) => Ok(Outcome::Bytes(bytes)),
            Outcome::Executed((transaction_id, status)) => {
                if !status.eq_ignore_ascii_case(SUCCESS) {
                    return Err(MemejobError::transaction_failed(format!(
                        "token creation {transaction_id} finished with status {status}"
                    )));
                }
                let token_id = shared::get_token_id_on_create(&self.ctx, &transaction_id).await?;
                Ok(Outcome::Executed(token_id))
            }
        }
    }

    async fn buy(&self, request: BuyRequest) -> MemejobResult<Outcome<BuyResult>> {
        let amount_out = self.get_amount_out(request.token, request.amount).await;

        let tx = self.contract_execute(
            TRADE_GAS,
            amount_out,
            IMemeJob::buyJobCall {
                memeAddress: request.token,
                amount: request.amount,
                referrer: request.referrer,
            },
        )?;

        Ok(self.submit(&tx).await?.map(|(transaction_id_or_hash, status)| TradeResult {
            transaction_id_or_hash,
            status,
            amount: request.amount,
        }))
    }

    async fn sell(&self, request: SellRequest) -> MemejobResult<Outcome<SellResult>> {
        let tx = self.contract_execute(
            TRADE_GAS,
            U256::ZERO,
            IMemeJob::sellJobCall {
                memeAddress: request.token,
                amount: request.amount,
            },
        )?;

        Ok(self.submit(&tx).await?.map(|(transaction_id_or_hash, status)| TradeResult {
            transaction_id_or_hash,
            status,
            amount: request.amount,
        }))
    }

    async fn approve_allowance(
        &self,
        tokens: &[AllowanceEntry],
        spender: LedgerAddress,
    ) -> MemejobResult<Outcome<Vec<AllowanceResult>>> {
        let spender_id = native_id(&spender, "spender")?;
        let allowances = tokens
            .iter()
            .map(|entry| {
                Ok(TokenAllowance {
                    token_id: native_id(&entry.token_id, "token")?,
                    amount: to_u64(entry.amount, "allowance amount")?,
                })
            })
            .collect::<MemejobResult<Vec<_>>>()?;

        let owner = self.account_id()?;
        let tx = NativeTransaction {
            payer: Some(owner),
            body: TransactionBody::AllowanceApprove {
                owner,
                spender: spender_id,
                allowances,
            },
        };

        Ok(self.submit(&tx).await?.map(|(transaction_id, status)| {
            tokens
                .iter()
                .map(|entry| AllowanceResult {
                    transaction_id_or_hash: transaction_id.clone(),
                    status: status.clone(),
                    token: entry.clone(),
                    spender,
                })
                .collect()
        }))
    }

    async fn associate_tokens(
        &self,
        tokens: &[LedgerAddress],
    ) -> MemejobResult<Outcome<Vec<AssociateResult>>> {
        let token_ids = tokens
            .iter()
            .map(|token| native_id(token, "token"))
            .collect::<MemejobResult<Vec<_>>>()?;

        let account_id = self.account_id()?;
        let tx = NativeTransaction {
            payer: Some(account_id),
            body: TransactionBody::TokenAssociate {
                account_id,
                token_ids,
            },
        };

        Ok(self.submit(&tx).await?.map(|(transaction_id, status)| {
            tokens
                .iter()
                .map(|token| AssociateResult {
                    transaction_id_or_hash: transaction_id.clone(),
                    status: status.clone(),
                    token: *token,
                })
                .collect()
        }))
    }

    async fn get_balance(&self, token: &LedgerAddress) -> MemejobResult<U256> {
        let account_id = self.account_id()?;
        let token_id = native_id(token, "token")?.to_string();

        let pages = self
            .ctx
            .indexer
            .request("/api/v1/balances")
            .query("account.id", account_id)
            .query("limit", BALANCES_PAGE_LIMIT)
            .get_paginated_with(|page: BalancesResponse| {
                page.balances
                    .into_iter()
                    .next()
                    .map(|balance| {
                        balance
                            .tokens
                            .into_iter()
                            .filter(|entry| entry.token_id == token_id)
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .await?;

        Ok(pages
            .into_iter()
            .flatten()
            .next()
            .map(|entry| U256::from(entry.balance))
            .unwrap_or(U256::ZERO))
    }
}

fn native_id(address: &LedgerAddress, what: &str) -> MemejobResult<EntityId> {
    address.entity_id().ok_or_else(|| {
        MemejobError::InvalidInput(format!("{what} {address} has no native id"))
    })
}

fn to_u64(value: U256, what: &str) -> MemejobResult<u64> {
    u64::try_from(value)
        .map_err(|_| MemejobError::InvalidInput(format!("{what} {value} exceeds 64 bits")))
}
