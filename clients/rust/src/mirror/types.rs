//! Response models for the mirror node REST API.
//!
//! Only the fields the client reads are modelled; everything else in the
//! indexer's schema is ignored during decoding.

use serde::Deserialize;

/// Pagination links present on every list response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

/// A response that may point at a further page.
pub trait Paginated {
    fn next_link(&self) -> Option<&str>;
}

/// `{"_status": {"messages": [{"message": ...}]}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "_status")]
    pub status: ErrorStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub messages: Vec<ErrorMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

/// `GET /api/v1/contracts/results/{transactionIdOrHash}`
#[derive(Debug, Clone, Deserialize)]
pub struct ContractResult {
    /// Consensus timestamp, `seconds.nanos`.
    pub timestamp: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contract_id: Option<String>,
}

/// `GET /api/v1/transactions` and `GET /api/v1/transactions/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub links: Links,
}

impl Paginated for TransactionsResponse {
    fn next_link(&self) -> Option<&str> {
        self.links.next.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    /// Operation type, e.g. `CONTRACTCALL`, `TOKENCREATION`.
    pub name: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub consensus_timestamp: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub nonce: Option<u32>,
}

/// `GET /api/v1/balances`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalancesResponse {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub balances: Vec<AccountBalance>,
    #[serde(default)]
    pub links: Links,
}

impl Paginated for BalancesResponse {
    fn next_link(&self) -> Option<&str> {
        self.links.next.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountBalance {
    pub account: String,
    pub balance: u64,
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenBalance {
    pub token_id: String,
    pub balance: u64,
}
