//! Shared test fixtures: a scriptable wallet double and sample chain data.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use alloy_primitives::{Address, U256, address};
use async_trait::async_trait;
use url::Url;

use x402_payer::network::{ChainConfig, NativeCurrency, NetworkRegistry, RpcEndpoint};
use x402_payer::types::{PaymentOption, TokenAmount, TransactionHash};
use x402_payer::wallet::{WalletError, WalletProvider};

pub const PAYER: Address = address!("00000000000000000000000000000000000000aa");
pub const MERCHANT: Address = address!("00000000000000000000000000000000000000bb");
pub const USDC: Address = address!("00000000000000000000000000000000000000cc");

pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "x402_payer=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn tx_hash() -> TransactionHash {
    TransactionHash([0x11; 32])
}

pub fn base_sepolia_config() -> ChainConfig {
    ChainConfig {
        chain_id: BASE_SEPOLIA_CHAIN_ID,
        display_name: "Base Sepolia".to_string(),
        native_currency: NativeCurrency {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
        rpc: vec![RpcEndpoint {
            http: Url::parse("http://127.0.0.1:8545").unwrap(),
            rate_limit: None,
        }],
        explorers: vec![Url::parse("https://sepolia.basescan.org").unwrap()],
    }
}

/// A registry that knows only Base Sepolia, so tests control exactly which
/// offered networks resolve.
pub fn test_registry() -> NetworkRegistry {
    NetworkRegistry::empty().with_chain("base-sepolia", base_sepolia_config())
}

pub fn usdc_option(amount: u64) -> PaymentOption {
    option_on("base-sepolia", amount)
}

pub fn option_on(network: &str, amount: u64) -> PaymentOption {
    PaymentOption {
        scheme: "exact".to_string(),
        network: network.to_string(),
        resource: Url::parse("https://api.example.com/premium").unwrap(),
        pay_to: MERCHANT.to_string(),
        asset: USDC.to_string(),
        max_amount_required: TokenAmount::from(amount),
        extra: None,
    }
}

/// Observable state of the wallet double: configured behavior plus a record
/// of every call the flow made.
#[derive(Debug, Default)]
pub struct MockWalletState {
    pub chain_id: u64,
    pub registered: HashSet<u64>,
    pub balances: HashMap<Address, U256>,
    pub reject_switch: bool,
    pub reject_transfer: bool,
    pub transfer_failure: Option<String>,
    pub switch_calls: Vec<u64>,
    pub add_calls: Vec<u64>,
    pub balance_calls: Vec<Address>,
    pub transfer_calls: Vec<(Address, Address, U256)>,
    pub confirm_calls: Vec<TransactionHash>,
    busy: bool,
    pub overlap_detected: bool,
}

/// Scriptable [`WalletProvider`] double. Records calls; never touches a chain.
pub struct MockWallet {
    state: Mutex<MockWalletState>,
}

impl MockWallet {
    pub fn on_chain(chain_id: u64) -> Self {
        let mut state = MockWalletState::default();
        state.chain_id = chain_id;
        state.registered.insert(chain_id);
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_balance(self, token: Address, amount: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(token, U256::from(amount));
        self
    }

    pub fn knowing_chain(self, chain_id: u64) -> Self {
        self.state.lock().unwrap().registered.insert(chain_id);
        self
    }

    pub fn rejecting_switches(self) -> Self {
        self.state.lock().unwrap().reject_switch = true;
        self
    }

    pub fn rejecting_transfers(self) -> Self {
        self.state.lock().unwrap().reject_transfer = true;
        self
    }

    pub fn failing_transfers(self, message: &str) -> Self {
        self.state.lock().unwrap().transfer_failure = Some(message.to_string());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockWalletState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.state().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut state = self.state();
        state.switch_calls.push(chain_id);
        if state.reject_switch {
            return Err(WalletError::Rejected);
        }
        if !state.registered.contains(&chain_id) {
            return Err(WalletError::UnrecognizedChain(chain_id));
        }
        state.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, config: &ChainConfig) -> Result<(), WalletError> {
        let mut state = self.state();
        state.add_calls.push(config.chain_id);
        state.registered.insert(config.chain_id);
        // Adding a chain also switches to it, as user wallets do.
        state.chain_id = config.chain_id;
        Ok(())
    }

    async fn account(&self) -> Result<Address, WalletError> {
        Ok(PAYER)
    }

    async fn token_balance(&self, token: Address, _owner: Address) -> Result<U256, WalletError> {
        let mut state = self.state();
        state.balance_calls.push(token);
        Ok(state.balances.get(&token).copied().unwrap_or_default())
    }

    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransactionHash, WalletError> {
        {
            let mut state = self.state();
            if state.busy {
                state.overlap_detected = true;
            }
            state.busy = true;
            if state.reject_transfer {
                state.busy = false;
                return Err(WalletError::Rejected);
            }
            if let Some(message) = state.transfer_failure.clone() {
                state.busy = false;
                return Err(WalletError::Provider(message));
            }
            state.transfer_calls.push((token, to, amount));
        }
        // Keep the "signing prompt" open long enough for an interleaved
        // attempt to be caught by the overlap flag.
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.state().busy = false;
        Ok(tx_hash())
    }

    async fn confirm_transfer(&self, transaction: &TransactionHash) -> Result<(), WalletError> {
        self.state().confirm_calls.push(transaction.clone());
        Ok(())
    }
}
