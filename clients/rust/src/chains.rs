//! Supported networks.

use std::fmt;

use crate::errors::MemejobError;

/// Native currency descriptor of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

pub const HEDERA_MAINNET_ID: u64 = 295;
pub const HEDERA_TESTNET_ID: u64 = 296;

/// Hedera network selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Name used in mirror node host names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    /// Network of a Hedera EVM chain id.
    pub fn from_chain_id(id: u64) -> Option<Self> {
        match id {
            HEDERA_MAINNET_ID => Some(Network::Mainnet),
            HEDERA_TESTNET_ID => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network descriptor selected once at client construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub name: &'static str,
    pub id: u64,
    pub network: Network,
    /// JSON-RPC relay endpoint
    pub rpc_url: String,
    pub currency: NativeCurrency,
}

const HBAR: NativeCurrency = NativeCurrency {
    name: "HBAR",
    symbol: "HBAR",
    decimals: 18,
};

impl Chain {
    pub fn hedera_mainnet() -> Self {
        Self {
            name: "Hedera Mainnet",
            id: HEDERA_MAINNET_ID,
            network: Network::Mainnet,
            rpc_url: "https://mainnet.hashio.io/api".to_string(),
            currency: HBAR,
        }
    }

    pub fn hedera_testnet() -> Self {
        Self {
            name: "Hedera Testnet",
            id: HEDERA_TESTNET_ID,
            network: Network::Testnet,
            rpc_url: "https://testnet.hashio.io/api".to_string(),
            currency: HBAR,
        }
    }

    /// Network name used to derive the default indexer URL.
    pub fn network_name(&self) -> &'static str {
        self.network.as_str()
    }

    /// Default mirror node base URL for this chain.
    pub fn default_mirror_url(&self) -> String {
        format!("https://{}.mirrornode.hedera.com", self.network_name())
    }

    /// Replace the JSON-RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }
}

/// Look up a supported chain by network name, optionally overriding its RPC URL.
pub fn get_chain(network: &str, rpc_url: Option<&str>) -> Result<Chain, MemejobError> {
    let chain = match network {
        "mainnet" => Chain::hedera_mainnet(),
        "testnet" => Chain::hedera_testnet(),
        other => {
            return Err(MemejobError::invalid_config(format!(
                "unsupported network: {other}"
            )))
        }
    };

    Ok(match rpc_url {
        Some(url) => chain.with_rpc_url(url),
        None => chain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_chain() {
        let chain = get_chain("testnet", None).unwrap();
        assert_eq!(chain.id, 296);
        assert_eq!(chain.default_mirror_url(), "https://testnet.mirrornode.hedera.com");

        let chain = get_chain("mainnet", Some("http://localhost:7546")).unwrap();
        assert_eq!(chain.id, 295);
        assert_eq!(chain.rpc_url, "http://localhost:7546");

        assert!(get_chain("previewnet", None).is_err());
    }

    #[test]
    fn test_network_from_chain_id() {
        assert_eq!(Network::from_chain_id(295), Some(Network::Mainnet));
        assert_eq!(Network::from_chain_id(296), Some(Network::Testnet));
        assert_eq!(Network::from_chain_id(297), None);
    }
}
