//! Test doubles for the client's network seams.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use memejob_client::{
    AdapterBuilder, Chain, ClientConfig, ContractReader, Eip1193Provider, EntityId, IndexerError,
    IndexerTransport, LedgerAddress, LedgerClient, MemejobClient, MemejobError, MemejobResult,
    NativeTransaction, RetryConfig,
};
use serde_json::{json, Value};
use url::Url;

pub const ACCOUNT: EntityId = EntityId::new(0, 0, 1234);
pub const CONTRACT: EntityId = EntityId::new(0, 0, 5271847);
pub const TOKEN: EntityId = EntityId::new(0, 0, 6000001);

pub const TRANSACTION_ID: &str = "0.0.1234@1700000000.000000001";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Ledger
// ============================================================================

/// Records submitted transactions and answers every receipt with `status`.
pub struct MockLedger {
    pub status: String,
    pub executed: Mutex<Vec<NativeTransaction>>,
}

impl MockLedger {
    pub fn new(status: &str) -> Arc<Self> {
        Arc::new(Self {
            status: status.to_string(),
            executed: Mutex::new(Vec::new()),
        })
    }

    pub fn executed(&self) -> Vec<NativeTransaction> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn operator_account_id(&self) -> Option<EntityId> {
        Some(ACCOUNT)
    }

    async fn execute(&self, transaction: &NativeTransaction) -> MemejobResult<String> {
        self.executed.lock().unwrap().push(transaction.clone());
        Ok(TRANSACTION_ID.to_string())
    }

    async fn get_receipt(&self, transaction_id: &str) -> MemejobResult<String> {
        assert_eq!(transaction_id, TRANSACTION_ID);
        Ok(self.status.clone())
    }
}

// ============================================================================
// Contract reads
// ============================================================================

/// Answers `eth_call` by function selector. Unknown selectors revert.
#[derive(Default)]
pub struct SelectorReader {
    pub answers: HashMap<[u8; 4], Vec<u8>>,
    pub calls: AtomicUsize,
}

impl SelectorReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, selector: [u8; 4], data: Vec<u8>) -> Self {
        self.answers.insert(selector, data);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractReader for SelectorReader {
    async fn call(&self, _to: Address, data: Bytes) -> MemejobResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| MemejobError::rpc("short calldata"))?;

        self.answers
            .get(&selector)
            .map(|answer| Bytes::from(answer.clone()))
            .ok_or_else(|| MemejobError::rpc("execution reverted"))
    }
}

// ============================================================================
// Indexer
// ============================================================================

/// Serves indexer bodies keyed by `path?decoded_query`.
#[derive(Default)]
pub struct RoutedIndexer {
    pub routes: HashMap<String, Value>,
    pub requests: Mutex<Vec<String>>,
}

impl RoutedIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, target: &str, body: Value) -> Self {
        self.routes.insert(target.to_string(), body);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexerTransport for RoutedIndexer {
    async fn get(&self, url: Url) -> Result<Value, IndexerError> {
        let query = url
            .query_pairs()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let target = if query.is_empty() {
            url.path().to_string()
        } else {
            format!("{}?{}", url.path(), query)
        };

        self.requests.lock().unwrap().push(target.clone());
        Ok(self
            .routes
            .get(&target)
            .cloned()
            .unwrap_or_else(|| json!({"_status": {"messages": [{"message": "Not found"}]}})))
    }
}

// ============================================================================
// External wallet
// ============================================================================

/// A transaction as the wallet received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCall {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// EIP-1193 wallet that mines every transaction after a per-recipient delay.
/// Hashes are derived from the recipient so results can be matched to inputs.
pub struct DelayedWallet {
    pub account: Address,
    pub delays_ms: HashMap<Address, u64>,
    /// Recipients whose transactions the wallet refuses to send.
    pub failing: HashSet<Address>,
    /// Recipients whose transactions are mined but reverted.
    pub reverting: HashSet<Address>,
    pub sent: Mutex<Vec<SentCall>>,
}

impl DelayedWallet {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            delays_ms: HashMap::new(),
            failing: HashSet::new(),
            reverting: HashSet::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn delay(mut self, to: Address, ms: u64) -> Self {
        self.delays_ms.insert(to, ms);
        self
    }

    pub fn fail(mut self, to: Address) -> Self {
        self.failing.insert(to);
        self
    }

    pub fn revert(mut self, to: Address) -> Self {
        self.reverting.insert(to);
        self
    }

    pub fn hash_for(to: Address) -> String {
        format!("hash-{to:#x}")
    }

    pub fn sent(&self) -> Vec<SentCall> {
        self.sent.lock().unwrap().clone()
    }

    /// Recipients in the order their transactions were sent.
    pub fn recipients(&self) -> Vec<Address> {
        self.sent().into_iter().map(|call| call.to).collect()
    }
}

fn param<T: std::str::FromStr>(tx: &Value, field: &str) -> MemejobResult<T> {
    tx[field]
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| MemejobError::rpc(format!("missing or malformed {field}")))
}

#[async_trait]
impl Eip1193Provider for DelayedWallet {
    async fn request(&self, method: &str, params: Value) -> MemejobResult<Value> {
        match method {
            "eth_accounts" => Ok(json!([format!("{:#x}", self.account)])),
            "eth_sendTransaction" => {
                let call = SentCall {
                    to: param(&params[0], "to")?,
                    data: param(&params[0], "data")?,
                    value: param(&params[0], "value")?,
                };
                if let Some(ms) = self.delays_ms.get(&call.to) {
                    tokio::time::sleep(Duration::from_millis(*ms)).await;
                }
                if self.failing.contains(&call.to) {
                    return Err(MemejobError::rpc("user rejected the request"));
                }
                let hash = Self::hash_for(call.to);
                self.sent.lock().unwrap().push(call);
                Ok(json!(hash))
            }
            "eth_getTransactionReceipt" => {
                let hash = params[0].as_str().unwrap_or_default();
                let reverted = self
                    .reverting
                    .iter()
                    .any(|to| Self::hash_for(*to) == hash);
                let status = if reverted { "0x0" } else { "0x1" };
                Ok(json!({"transactionHash": hash, "status": status}))
            }
            other => Err(MemejobError::rpc(format!("unsupported method {other}"))),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

pub fn config(
    contract_id: impl Into<LedgerAddress>,
    reader: Arc<dyn ContractReader>,
    indexer: Arc<dyn IndexerTransport>,
) -> ClientConfig {
    ClientConfig::builder()
        .contract_id(contract_id)
        .chain(Chain::hedera_testnet())
        .retry(RetryConfig {
            retry_count: 0,
            delay_ms: 0,
        })
        .reader(reader)
        .indexer_transport(indexer)
        .build()
        .expect("valid config")
}

pub fn build_client(
    factory: &dyn AdapterBuilder,
    reader: Arc<dyn ContractReader>,
    indexer: Arc<dyn IndexerTransport>,
) -> MemejobClient {
    MemejobClient::new(factory, config(CONTRACT, reader, indexer)).expect("client builds")
}
