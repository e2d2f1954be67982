//! Memejob deployment addresses and protocol constants.

use alloy::primitives::{address, Address};

use crate::chains::Network;

/// A memejob contract deployment on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractDeployment {
    /// Native contract id
    pub contract_id: &'static str,
    /// EVM-compatible contract address
    pub evm_address: Address,
}

/// Mainnet deployment
pub const MAINNET_DEPLOYMENT: ContractDeployment = ContractDeployment {
    contract_id: "0.0.7891970",
    evm_address: address!("950230ea77dc168df543609c2349c87dea57e876"),
};

/// Testnet deployment
pub const TESTNET_DEPLOYMENT: ContractDeployment = ContractDeployment {
    contract_id: "0.0.5271847",
    evm_address: address!("a3bf9adec2fb49fb65c8948aed71c6bf1c4d61c8"),
};

/// Fallback token creation fee in whole HBAR, used when the exchange-rate
/// system contract cannot be queried.
pub const TOKEN_CREATION_FEE: u64 = 10;

/// Number of decimals of memejob tokens and of the tinybar unit.
pub const TOKEN_DECIMALS: u32 = 8;

/// Creation cost in US cents (1 USD) fed to the exchange-rate contract.
pub const CREATION_COST_CENTS: u64 = 100;

/// Zero address, used as the default referrer.
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Hedera exchange-rate system contract (`0x…0168`).
pub const EXCHANGE_RATE_PRECOMPILE: Address = address!("0000000000000000000000000000000000000168");

/// One tinybar expressed in weibars (EVM value unit on Hedera).
pub const WEIBARS_PER_TINYBAR: u64 = 10_000_000_000;

/// Gas limit for `memeJob`.
pub const CREATE_GAS: u64 = 400_000;

/// Gas limit for `buyJob` and `sellJob`.
pub const TRADE_GAS: u64 = 200_000;

/// Gas limit for per-token `approve` and `associate` calls on the EVM backend.
pub const TOKEN_FACADE_GAS: u64 = 750_000;

/// Token creation entry name in indexer transaction records.
pub const TOKEN_CREATION_TRANSACTION: &str = "TOKENCREATION";

/// Deployment of the bonding-curve contract on `network`.
pub fn deployment(network: Network) -> ContractDeployment {
    match network {
        Network::Mainnet => MAINNET_DEPLOYMENT,
        Network::Testnet => TESTNET_DEPLOYMENT,
    }
}
