//! Request and result types shared by both backends.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::address::{EntityId, LedgerAddress};

/// Whether write operations execute or only produce unsigned bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationalMode {
    /// Sign, submit and wait for the receipt.
    #[default]
    ReturnResult,
    /// Build the transaction and return its unsigned encoding.
    ReturnBytes,
}

/// Result of a write operation. The variant follows the adapter's
/// [`OperationalMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Unsigned transaction envelope for external signing and submission.
    Bytes(Vec<u8>),
    /// Executed operation.
    Executed(T),
}

impl<T> Outcome<T> {
    pub fn is_bytes(&self) -> bool {
        matches!(self, Outcome::Bytes(_))
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Outcome::Bytes(bytes) => Some(bytes),
            Outcome::Executed(_) => None,
        }
    }

    pub fn executed(self) -> Option<T> {
        match self {
            Outcome::Bytes(_) => None,
            Outcome::Executed(value) => Some(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Bytes(bytes) => Outcome::Bytes(bytes),
            Outcome::Executed(value) => Outcome::Executed(f(value)),
        }
    }
}

/// Arguments of the bonding curve's `memeJob` call, with defaults resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub symbol: String,
    /// Metadata URI, usually `ipfs://<cid>`.
    pub memo: String,
    pub referrer: Address,
    /// Initial buy, paid on top of the creation fee.
    pub amount: U256,
    pub distribute_rewards: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyRequest {
    pub token: Address,
    pub amount: U256,
    pub referrer: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellRequest {
    pub token: Address,
    pub amount: U256,
}

/// Executed buy or sell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeResult {
    /// Native transaction id or EVM transaction hash.
    pub transaction_id_or_hash: String,
    /// Lower-cased receipt status, e.g. `success` or `reverted`.
    pub status: String,
    pub amount: U256,
}

pub type BuyResult = TradeResult;
pub type SellResult = TradeResult;

/// One token allowance to grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceEntry {
    pub token_id: LedgerAddress,
    pub amount: U256,
}

impl AllowanceEntry {
    pub fn new(token_id: impl Into<LedgerAddress>, amount: U256) -> Self {
        Self {
            token_id: token_id.into(),
            amount,
        }
    }
}

/// Executed allowance approval for a single token.
///
/// On the native backend every entry of a batch shares one transaction,
/// so the records of one call carry the same id and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceResult {
    pub transaction_id_or_hash: String,
    pub status: String,
    pub token: AllowanceEntry,
    pub spender: LedgerAddress,
}

/// Executed association for a single token. Batching follows
/// [`AllowanceResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociateResult {
    pub transaction_id_or_hash: String,
    pub status: String,
    pub token: LedgerAddress,
}

/// Token creation fields checked before any network call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTokenParams {
    pub name: String,
    pub symbol: String,
    pub memo: String,
}

/// Optional token creation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Defaults to the zero address.
    pub referrer: Option<Address>,
    /// Defaults to zero.
    pub amount: Option<U256>,
    /// Defaults to `true`.
    pub distribute_rewards: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyConfig {
    pub amount: U256,
    pub referrer: Option<Address>,
    /// Associate the token with the account before buying.
    pub auto_associate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellConfig {
    pub amount: U256,
    /// Approve the contract's allowance before selling.
    pub instant: bool,
}

/// Convert a transaction id to the indexer's path form.
///
/// `0.0.1234@1700000000.123456789` becomes `0.0.1234-1700000000-123456789`.
/// Hashes and already-normalised ids are returned unchanged.
pub fn normalize_transaction_id(id: &str) -> String {
    match id.split_once('@') {
        Some((payer, valid_start)) => {
            format!("{payer}-{}", valid_start.replacen('.', "-", 1))
        }
        None => id.to_string(),
    }
}

/// Token id of a created token as reported by the indexer.
pub(crate) fn parse_entity_id(value: &str) -> Option<EntityId> {
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_native_transaction_id() {
        assert_eq!(
            normalize_transaction_id("0.0.1234@1700000000.123456789"),
            "0.0.1234-1700000000-123456789"
        );
    }

    #[test]
    fn test_normalize_leaves_hashes_alone() {
        let hash = "0x5f1c0e3d2a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d";
        assert_eq!(normalize_transaction_id(hash), hash);
        assert_eq!(
            normalize_transaction_id("0.0.1234-1700000000-123456789"),
            "0.0.1234-1700000000-123456789"
        );
    }

    #[test]
    fn test_outcome_accessors() {
        let bytes: Outcome<u32> = Outcome::Bytes(vec![1, 2, 3]);
        assert!(bytes.is_bytes());
        assert_eq!(bytes.bytes(), Some(&[1u8, 2, 3][..]));
        assert_eq!(bytes.map(|v| v + 1).executed(), None);

        let executed = Outcome::Executed(41u32).map(|v| v + 1);
        assert!(!executed.is_bytes());
        assert_eq!(executed.executed(), Some(42));
    }

    #[test]
    fn test_default_mode_returns_results() {
        assert_eq!(OperationalMode::default(), OperationalMode::ReturnResult);
    }
}
