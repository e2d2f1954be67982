//! Read helpers shared by both backends.
//!
//! The fee, quote and existence helpers never fail: they log the error and
//! return a sentinel (fallback fee, zero, `false`).

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

use super::AdapterContext;
use crate::abi::{IExchangeRate, IMemeJob, QUOTE_BUY};
use crate::address::EntityId;
use crate::config::{ExistenceCheck, CREATION_RECEIPT_RETRY};
use crate::constants::{
    CREATION_COST_CENTS, EXCHANGE_RATE_PRECOMPILE, TOKEN_CREATION_FEE, TOKEN_CREATION_TRANSACTION,
    TOKEN_DECIMALS,
};
use crate::errors::{MemejobError, MemejobResult};
use crate::mirror::types::{ContractResult, TransactionsResponse};
use crate::rpc::RetryPolicy;
use crate::types::{normalize_transaction_id, parse_entity_id};

/// Fee charged when the exchange-rate contract cannot be reached, in tinybars.
pub fn fallback_creation_fee() -> U256 {
    U256::from(TOKEN_CREATION_FEE) * U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

/// Creation fee plus the initial buy, in tinybars.
pub fn creation_value(fee: U256, amount: U256) -> MemejobResult<U256> {
    fee.checked_add(amount).ok_or_else(|| {
        MemejobError::InvalidInput(format!("initial buy {amount} overflows the creation payment"))
    })
}

pub(crate) async fn read<C: SolCall>(ctx: &AdapterContext, to: Address, call: C) -> MemejobResult<C::Return> {
    let data = ctx.reader.call(to, call.abi_encode().into()).await?;
    Ok(C::abi_decode_returns(&data)?)
}

/// Convert the fixed USD creation cost to tinybars.
pub async fn get_creation_fee(ctx: &AdapterContext) -> U256 {
    let tinycents = U256::from(CREATION_COST_CENTS) * U256::from(10u64).pow(U256::from(TOKEN_DECIMALS));
    let call = IExchangeRate::tinycentsToTinybarsCall { tinycents };

    match read(ctx, EXCHANGE_RATE_PRECOMPILE, call).await {
        Ok(fee) => fee,
        Err(e) => {
            let fallback = fallback_creation_fee();
            tracing::warn!(error = %e, fallback = %fallback, "Failed to get token creation fee");
            fallback
        }
    }
}

/// Quote the payment for buying `amount` of `token`.
pub async fn get_amount_out(ctx: &AdapterContext, token: Address, amount: U256) -> U256 {
    let call = IMemeJob::getAmountOutCall {
        memeAddress: token,
        amount,
        txType: QUOTE_BUY,
    };

    match read(ctx, ctx.contract_address(), call).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(token = %token, amount = %amount, error = %e, "Failed to quote buy");
            U256::ZERO
        }
    }
}

/// Whether `token` is registered on the bonding curve.
pub async fn check_token_existence(ctx: &AdapterContext, token: Address) -> bool {
    let contract = ctx.contract_address();

    let result = match ctx.existence_check {
        ExistenceCheck::Scan => read(ctx, contract, IMemeJob::getAllMemeJobsCall {})
            .await
            .map(|tokens| tokens.iter().any(|entry| entry.tokenAddress == token)),
        ExistenceCheck::Mapping => {
            read(ctx, contract, IMemeJob::addressToMemeTokenMappingCall { token })
                .await
                .map(|entry| entry.tokenAddress != Address::ZERO)
        }
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(token = %token, error = %e, "Token existence check failed");
        false
    })
}

/// Resolve the token created by `transaction_id_or_hash` through the indexer.
///
/// The contract call and the token creation it triggers are separate
/// records sharing a consensus timestamp, so the lookup goes contract
/// result, then the transactions at that timestamp, then the full
/// transaction group.
pub async fn get_token_id_on_create(
    ctx: &AdapterContext,
    transaction_id_or_hash: &str,
) -> MemejobResult<EntityId> {
    let id = normalize_transaction_id(transaction_id_or_hash);

    let result: ContractResult = ctx
        .indexer
        .request(format!("/api/v1/contracts/results/{id}"))
        .retry(RetryPolicy::from(&CREATION_RECEIPT_RETRY))
        .get()
        .await?;

    let at_timestamp: TransactionsResponse = ctx
        .indexer
        .request("/api/v1/transactions")
        .query("timestamp", &result.timestamp)
        .get()
        .await?;

    let first = at_timestamp.transactions.into_iter().next().ok_or_else(|| {
        MemejobError::unresolved(format!("no transactions at timestamp {}", result.timestamp))
    })?;

    let group: TransactionsResponse = ctx
        .indexer
        .request(format!("/api/v1/transactions/{}", first.transaction_id))
        .get()
        .await?;

    let entity_id = group
        .transactions
        .into_iter()
        .find(|tx| tx.name == TOKEN_CREATION_TRANSACTION)
        .and_then(|tx| tx.entity_id)
        .ok_or_else(|| {
            MemejobError::unresolved(format!(
                "no token creation in transaction {}",
                first.transaction_id
            ))
        })?;

    let token_id = parse_entity_id(&entity_id)
        .ok_or_else(|| MemejobError::unresolved(format!("malformed entity id {entity_id}")))?;

    tracing::info!(transaction = %id, token_id = %token_id, "Resolved created token");
    Ok(token_id)
}
