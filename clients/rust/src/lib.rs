//! Memejob Client
//!
//! A Rust client for the memejob bonding-curve contract on Hedera.
//!
//! # Features
//!
//! - **Two Backends**: Ledger-native contract calls or EVM transactions behind one trait
//! - **Unsigned Mode**: Native writes can return frozen, unsigned Hedera transaction bytes instead of executing
//! - **Indexer Client**: Mirror node reads with cursor pagination and bounded retry
//! - **Creation Resolution**: Recovers a created token's id from the indexer
//! - **Metadata Upload**: IPFS memo builder with Pinata and Infura implementations
//!
//! # Example
//!
//! ```ignore
//! use memejob_client::{
//!     create_adapter, BuyConfig, Chain, ClientConfig, EntityId, MemejobClient, NativeAdapter,
//!     NativeParams, Operator, TESTNET_DEPLOYMENT,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let operator = Operator {
//!         account_id: "0.0.1234".parse()?,
//!         private_key: std::env::var("OPERATOR_KEY")?,
//!     };
//!     let factory = create_adapter::<NativeAdapter>(NativeParams::with_operator(operator));
//!     let config = ClientConfig::builder()
//!         .contract_id(TESTNET_DEPLOYMENT.contract_id.parse::<EntityId>()?)
//!         .chain(Chain::hedera_testnet())
//!         .build()?;
//!
//!     let client = MemejobClient::new(&factory, config)?;
//!     let token = client.get_token("0.0.6000001".parse()?).await?;
//!
//!     let result = token
//!         .buy(BuyConfig { amount: U256::from(1_000_000u64), auto_associate: true, ..Default::default() })
//!         .await?;
//!     println!("{result:?}");
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod abi;
pub mod adapter;
pub mod address;
pub mod chains;
pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod memo;
pub mod mirror;
pub mod reader;
pub mod rpc;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use adapter::{
    create_adapter, AdapterBuilder, AdapterContext, AdapterFactory, Eip1193Provider, EvmAdapter,
    EvmParams, EvmSigner, HederaConnector, HederaLedger, LedgerClient, LedgerConnector,
    MemejobAdapter, NativeAdapter, NativeParams, NativeTransaction, Operator,
};
pub use address::{is_evm_address, is_native_address, to_evm_address, EntityId, LedgerAddress};
pub use chains::{get_chain, Chain, Network};
pub use client::MemejobClient;
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError, ExistenceCheck, RetryConfig};
pub use constants::{MAINNET_DEPLOYMENT, TESTNET_DEPLOYMENT, TOKEN_CREATION_FEE, TOKEN_DECIMALS};
pub use errors::{ErrorCategory, MemejobError, MemejobResult};
pub use memo::{
    Blob, InfuraService, MemoBuilder, PinataService, PinningService, UploadableTokenDetails,
};
pub use mirror::{IndexerClient, IndexerError, IndexerTransport};
pub use reader::{ContractReader, ProviderReader};
pub use rpc::{with_retry, RetryPolicy};
pub use token::MemejobToken;
pub use types::{
    AllowanceEntry, AllowanceResult, AssociateResult, BuyConfig, BuyResult, CreateOptions,
    CreateTokenParams, OperationalMode, Outcome, SellConfig, SellResult,
};
