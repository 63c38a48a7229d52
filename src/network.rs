//! Network registry: connection parameters for the chains a client can pay on.
//!
//! Payment options identify their chain by a short network token such as
//! `"base-sepolia"`. The [`NetworkRegistry`] maps those tokens to a
//! [`ChainConfig`] carrying everything the wallet needs to reach the chain:
//! chain id, display name, native currency, RPC endpoints, and explorers.
//!
//! The registry is the single configuration surface for network support.
//! An option whose token has no entry here is simply not payable by this
//! client; the matcher reports it instead of guessing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::types::TransactionHash;

/// Native currency descriptor of a chain, as wallets present it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// A single RPC endpoint, optionally rate-limited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcEndpoint {
    /// HTTP URL for the RPC endpoint.
    pub http: Url,
    /// Rate limit for requests per second (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
}

/// Connection parameters for one network.
///
/// Instances are plain data: construct them statically, load them from JSON,
/// or both. All fields mirror what a wallet needs to register an unknown
/// chain (EIP-3085 style).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Numeric chain id (e.g. `84532` for Base Sepolia).
    pub chain_id: u64,
    /// Human-readable chain name (e.g. `"Base Sepolia"`).
    pub display_name: String,
    pub native_currency: NativeCurrency,
    /// RPC endpoints, tried in order with fallback.
    pub rpc: Vec<RpcEndpoint>,
    /// Block explorer base URLs.
    pub explorers: Vec<Url>,
}

impl ChainConfig {
    /// The chain id in the 0x-prefixed hex form wallets expect.
    pub fn hex_chain_id(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    /// Explorer link for a settled transaction, if an explorer is configured.
    pub fn explorer_tx_url(&self, transaction: &TransactionHash) -> Option<Url> {
        let base = self.explorers.first()?;
        base.join(&format!("tx/{transaction}")).ok()
    }
}

/// Mapping from network token to [`ChainConfig`].
///
/// Lookup is a pure, total function over the table. The registry is a value:
/// start from [`NetworkRegistry::known`] or [`NetworkRegistry::empty`] and
/// extend with [`NetworkRegistry::with_chain`]. Extending network support
/// means adding one entry; no other code path changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkRegistry {
    chains: HashMap<String, ChainConfig>,
}

impl NetworkRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self {
            chains: HashMap::new(),
        }
    }

    /// The built-in table of well-known EVM networks.
    pub fn known() -> Self {
        let mut registry = Self::empty();
        for (token, config) in known_chains() {
            registry.chains.insert(token.to_string(), config);
        }
        registry
    }

    /// Returns the registry extended with one entry, replacing any previous
    /// entry for the same token.
    pub fn with_chain(mut self, network: impl Into<String>, config: ChainConfig) -> Self {
        self.chains.insert(network.into(), config);
        self
    }

    /// Connection parameters for a network token, or `None` when the token
    /// is not supported by this client.
    pub fn lookup(&self, network: &str) -> Option<&ChainConfig> {
        self.chains.get(network)
    }

    /// Network tokens this registry supports, in no particular order.
    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::known()
    }
}

fn chain(
    chain_id: u64,
    display_name: &str,
    currency: (&str, &str, u8),
    rpc: &str,
    explorer: &str,
) -> ChainConfig {
    let (name, symbol, decimals) = currency;
    ChainConfig {
        chain_id,
        display_name: display_name.to_string(),
        native_currency: NativeCurrency {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        },
        rpc: vec![RpcEndpoint {
            http: Url::parse(rpc).expect("static rpc url is valid"),
            rate_limit: None,
        }],
        explorers: vec![Url::parse(explorer).expect("static explorer url is valid")],
    }
}

fn known_chains() -> Vec<(&'static str, ChainConfig)> {
    let ether = ("Ether", "ETH", 18);
    vec![
        (
            "base",
            chain(
                8453,
                "Base",
                ether,
                "https://mainnet.base.org",
                "https://basescan.org",
            ),
        ),
        (
            "base-sepolia",
            chain(
                84532,
                "Base Sepolia",
                ether,
                "https://sepolia.base.org",
                "https://sepolia.basescan.org",
            ),
        ),
        (
            "polygon",
            chain(
                137,
                "Polygon",
                ("Polygon Ecosystem Token", "POL", 18),
                "https://polygon-rpc.com",
                "https://polygonscan.com",
            ),
        ),
        (
            "polygon-amoy",
            chain(
                80002,
                "Polygon Amoy",
                ("Polygon Ecosystem Token", "POL", 18),
                "https://rpc-amoy.polygon.technology",
                "https://amoy.polygonscan.com",
            ),
        ),
        (
            "avalanche",
            chain(
                43114,
                "Avalanche C-Chain",
                ("Avalanche", "AVAX", 18),
                "https://api.avax.network/ext/bc/C/rpc",
                "https://snowtrace.io",
            ),
        ),
        (
            "avalanche-fuji",
            chain(
                43113,
                "Avalanche Fuji",
                ("Avalanche", "AVAX", 18),
                "https://api.avax-test.network/ext/bc/C/rpc",
                "https://testnet.snowtrace.io",
            ),
        ),
        (
            "sei",
            chain(
                1329,
                "Sei",
                ("Sei", "SEI", 18),
                "https://evm-rpc.sei-apis.com",
                "https://seitrace.com",
            ),
        ),
        (
            "sei-testnet",
            chain(
                1328,
                "Sei Testnet",
                ("Sei", "SEI", 18),
                "https://evm-rpc-testnet.sei-apis.com",
                "https://testnet.seitrace.com",
            ),
        ),
        (
            "xdc",
            chain(
                50,
                "XDC Network",
                ("XDC", "XDC", 18),
                "https://rpc.xdc.org",
                "https://xdcscan.io",
            ),
        ),
        (
            "xrpl-evm",
            chain(
                1440000,
                "XRPL EVM",
                ("XRP", "XRP", 18),
                "https://rpc.xrplevm.org",
                "https://explorer.xrplevm.org",
            ),
        ),
    ]
}
