//! Adapter contract for the bonding-curve operation set.
//!
//! Two backends implement [`MemejobAdapter`]:
//! - [`NativeAdapter`] - ledger-native contract calls through a [`LedgerClient`],
//!   by default a [`HederaLedger`] over the Hedera SDK
//! - [`EvmAdapter`] - EVM transactions through a local key or an external wallet
//!
//! Adapters can only be built through [`create_adapter`].

mod evm;
mod factory;
mod hedera;
mod native;
pub mod shared;

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::address::{to_evm_address, EntityId, LedgerAddress};
use crate::chains::Chain;
use crate::config::ExistenceCheck;
use crate::errors::MemejobResult;
use crate::mirror::IndexerClient;
use crate::reader::ContractReader;
use crate::types::{
    AllowanceEntry, AllowanceResult, AssociateResult, BuyRequest, BuyResult, CreateRequest,
    OperationalMode, Outcome, SellRequest, SellResult,
};

pub use evm::{Eip1193Provider, EvmAdapter, EvmParams, EvmSigner};
pub use factory::{
    create_adapter, AdapterBuilder, AdapterFactory, AdapterOverrides, Backend, ConstructionToken,
    SharedParams,
};
pub use hedera::{HederaConnector, HederaLedger};
pub use native::{
    LedgerClient, LedgerConnector, NativeAdapter, NativeParams, NativeTransaction, Operator,
    TokenAllowance, TransactionBody,
};

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Read-only state every adapter is built with.
#[derive(Clone)]
pub struct AdapterContext {
    pub chain: Chain,
    pub contract_id: LedgerAddress,
    pub indexer: IndexerClient,
    pub reader: Arc<dyn ContractReader>,
    pub mode: OperationalMode,
    pub existence_check: ExistenceCheck,
}

impl AdapterContext {
    /// EVM address of the bonding-curve contract.
    pub fn contract_address(&self) -> Address {
        to_evm_address(&self.contract_id)
    }
}

impl std::fmt::Debug for AdapterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterContext")
            .field("chain", &self.chain.name)
            .field("contract_id", &self.contract_id)
            .field("indexer", &self.indexer)
            .field("mode", &self.mode)
            .field("existence_check", &self.existence_check)
            .finish_non_exhaustive()
    }
}

/// The fixed bonding-curve operation set.
///
/// Write operations return [`Outcome::Bytes`] when the adapter was built in
/// [`OperationalMode::ReturnBytes`] and [`Outcome::Executed`] otherwise.
#[async_trait]
pub trait MemejobAdapter: sealed::Sealed + Send + Sync {
    fn context(&self) -> &AdapterContext;

    fn operational_mode(&self) -> OperationalMode {
        self.context().mode
    }

    /// Launch a token. Resolves to the new token's native id.
    async fn create(&self, request: CreateRequest) -> MemejobResult<Outcome<EntityId>>;

    /// Buy `amount` tokens, paying the bonding curve's quote.
    async fn buy(&self, request: BuyRequest) -> MemejobResult<Outcome<BuyResult>>;

    /// Sell `amount` tokens back to the bonding curve.
    async fn sell(&self, request: SellRequest) -> MemejobResult<Outcome<SellResult>>;

    /// Let `spender` move the listed amounts. One record per entry, in order.
    async fn approve_allowance(
        &self,
        tokens: &[AllowanceEntry],
        spender: LedgerAddress,
    ) -> MemejobResult<Outcome<Vec<AllowanceResult>>>;

    /// Associate tokens with the account. One record per token, in order.
    async fn associate_tokens(
        &self,
        tokens: &[LedgerAddress],
    ) -> MemejobResult<Outcome<Vec<AssociateResult>>>;

    /// Account balance of `token` in its smallest unit. Always a read,
    /// regardless of operational mode.
    async fn get_balance(&self, token: &LedgerAddress) -> MemejobResult<U256>;

    /// Creation fee in tinybars. Falls back to the fixed fee on failure.
    async fn get_creation_fee(&self) -> U256 {
        shared::get_creation_fee(self.context()).await
    }

    /// Payment in tinybars required to buy `amount` of `token`. Zero means unknown.
    async fn get_amount_out(&self, token: Address, amount: U256) -> U256 {
        shared::get_amount_out(self.context(), token, amount).await
    }

    /// Whether `token` is registered on the bonding curve. Failures read as absent.
    async fn check_token_existence(&self, token: Address) -> bool {
        shared::check_token_existence(self.context(), token).await
    }
}
