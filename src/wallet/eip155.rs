//! Private-key-signer wallet for EIP-155 chains, built on Alloy.
//!
//! [`LocalWallet`] plays the role a browser wallet plays for a dapp: it keeps
//! a set of registered chains, one of which is active, and signs with a local
//! key. Switching chains re-points the composed provider at the target
//! chain's RPC endpoints; adding a chain registers its config and switches to
//! it in the same motion, which is how user wallets behave.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
};
use alloy_provider::{Identity, PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::sol;
use alloy_transport::layers::{FallbackLayer, ThrottleLayer};
use alloy_transport_http::Http;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tower::ServiceBuilder;

use crate::network::ChainConfig;
use crate::types::TransactionHash;

use super::{WalletError, WalletProvider};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Erc20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Combined filler type for gas, blob gas, nonce, and chain ID.
pub type InnerFiller =
    JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>;

/// The fully composed Ethereum provider type used by [`LocalWallet`].
///
/// Combines filler layers for gas, nonce, chain ID, and blob gas with wallet
/// signing, and wraps a [`RootProvider`] for actual JSON-RPC communication.
pub type InnerProvider = FillProvider<
    JoinFill<JoinFill<Identity, InnerFiller>, WalletFiller<EthereumWallet>>,
    RootProvider,
>;

struct ActiveChain {
    chain_id: u64,
    provider: InnerProvider,
}

/// A wallet backed by a local private key signer.
///
/// Create with [`LocalWallet::new`], then attach to a chain once with
/// [`LocalWallet::connect`]. The connection is reused across payment
/// attempts and never torn down implicitly.
pub struct LocalWallet {
    signer_address: Address,
    wallet: EthereumWallet,
    registered: Mutex<HashMap<u64, ChainConfig>>,
    active: Mutex<Option<ActiveChain>>,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let signer_address = signer.address();
        Self {
            signer_address,
            wallet: EthereumWallet::from(signer),
            registered: Mutex::new(HashMap::new()),
            active: Mutex::new(None),
        }
    }

    /// Registers `config` and makes it the active chain. Call once before
    /// the first payment attempt.
    pub async fn connect(&self, config: &ChainConfig) -> Result<(), WalletError> {
        self.activate(config).await
    }

    async fn activate(&self, config: &ChainConfig) -> Result<(), WalletError> {
        let provider = self.build_provider(config)?;
        self.registered
            .lock()
            .await
            .insert(config.chain_id, config.clone());
        *self.active.lock().await = Some(ActiveChain {
            chain_id: config.chain_id,
            provider,
        });
        tracing::debug!(chain_id = config.chain_id, chain = %config.display_name, "wallet attached to chain");
        Ok(())
    }

    fn build_provider(&self, config: &ChainConfig) -> Result<InnerProvider, WalletError> {
        let client = rpc_client(config)?;
        let filler = JoinFill::new(
            GasFiller,
            JoinFill::new(
                BlobGasFiller::default(),
                JoinFill::new(NonceFiller::default(), ChainIdFiller::default()),
            ),
        );
        let provider: InnerProvider = ProviderBuilder::default()
            .filler(filler)
            .wallet(self.wallet.clone())
            .connect_client(client);
        Ok(provider)
    }

    async fn active_provider(&self) -> Result<InnerProvider, WalletError> {
        let active = self.active.lock().await;
        active
            .as_ref()
            .map(|chain| chain.provider.clone())
            .ok_or(WalletError::NotConnected)
    }
}

/// Builds an RPC client over the config's HTTP endpoints with fallback and
/// per-endpoint throttling.
fn rpc_client(config: &ChainConfig) -> Result<RpcClient, WalletError> {
    let transports = config
        .rpc
        .iter()
        .filter_map(|endpoint| {
            let scheme = endpoint.http.scheme();
            let is_http = scheme == "http" || scheme == "https";
            if !is_http {
                return None;
            }
            let rate_limit = endpoint.rate_limit.unwrap_or(u32::MAX);
            let service = ServiceBuilder::new()
                .layer(ThrottleLayer::new(rate_limit))
                .service(Http::new(endpoint.http.clone()));
            Some(service)
        })
        .collect::<Vec<_>>();
    let transport_count = NonZeroUsize::new(transports.len()).ok_or_else(|| {
        WalletError::Provider(format!(
            "chain {} has no usable http rpc endpoint",
            config.chain_id
        ))
    })?;
    let fallback = ServiceBuilder::new()
        .layer(FallbackLayer::default().with_active_transport_count(transport_count))
        .service(transports);
    Ok(RpcClient::new(fallback, false))
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn chain_id(&self) -> Result<u64, WalletError> {
        let active = self.active.lock().await;
        active
            .as_ref()
            .map(|chain| chain.chain_id)
            .ok_or(WalletError::NotConnected)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        {
            let active = self.active.lock().await;
            if active.as_ref().is_some_and(|c| c.chain_id == chain_id) {
                return Ok(());
            }
        }
        let config = {
            let registered = self.registered.lock().await;
            registered
                .get(&chain_id)
                .cloned()
                .ok_or(WalletError::UnrecognizedChain(chain_id))?
        };
        self.activate(&config).await
    }

    async fn add_chain(&self, config: &ChainConfig) -> Result<(), WalletError> {
        self.activate(config).await
    }

    async fn account(&self) -> Result<Address, WalletError> {
        Ok(self.signer_address)
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        let provider = self.active_provider().await?;
        let erc20 = Erc20::new(token, provider);
        let balance = erc20
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| WalletError::Provider(e.to_string()))?;
        Ok(balance)
    }

    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransactionHash, WalletError> {
        let provider = self.active_provider().await?;
        let erc20 = Erc20::new(token, provider);
        let pending = erc20
            .transfer(to, amount)
            .send()
            .await
            .map_err(|e| WalletError::Provider(e.to_string()))?;
        let hash = *pending.tx_hash();
        tracing::debug!(transaction = %hash, %token, %to, %amount, "submitted token transfer");
        Ok(hash.into())
    }

    async fn confirm_transfer(&self, transaction: &TransactionHash) -> Result<(), WalletError> {
        let provider = self.active_provider().await?;
        let hash = B256::from(transaction);
        let receipt = PendingTransactionBuilder::new(provider.root().clone(), hash)
            .with_required_confirmations(1)
            .get_receipt()
            .await
            .map_err(|e| WalletError::Provider(e.to_string()))?;
        if !receipt.status() {
            return Err(WalletError::Provider(format!(
                "transaction {transaction} reverted"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NativeCurrency, RpcEndpoint};
    use url::Url;

    fn test_signer() -> PrivateKeySigner {
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
            .parse()
            .unwrap()
    }

    fn local_chain(chain_id: u64) -> ChainConfig {
        ChainConfig {
            chain_id,
            display_name: format!("Local {chain_id}"),
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            rpc: vec![RpcEndpoint {
                http: Url::parse("http://127.0.0.1:8545").unwrap(),
                rate_limit: None,
            }],
            explorers: vec![],
        }
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let wallet = LocalWallet::new(test_signer());
        assert!(matches!(
            wallet.chain_id().await,
            Err(WalletError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn connect_sets_the_active_chain() {
        let wallet = LocalWallet::new(test_signer());
        wallet.connect(&local_chain(84532)).await.unwrap();
        assert_eq!(wallet.chain_id().await.unwrap(), 84532);
    }

    #[tokio::test]
    async fn switching_to_an_unregistered_chain_is_unrecognized() {
        let wallet = LocalWallet::new(test_signer());
        wallet.connect(&local_chain(84532)).await.unwrap();
        assert!(matches!(
            wallet.switch_chain(1).await,
            Err(WalletError::UnrecognizedChain(1))
        ));
        // The active chain is untouched by the failed switch.
        assert_eq!(wallet.chain_id().await.unwrap(), 84532);
    }

    #[tokio::test]
    async fn add_chain_registers_and_switches() {
        let wallet = LocalWallet::new(test_signer());
        wallet.connect(&local_chain(84532)).await.unwrap();
        wallet.add_chain(&local_chain(8453)).await.unwrap();
        assert_eq!(wallet.chain_id().await.unwrap(), 8453);
        // Both chains stay registered; switching back needs no re-add.
        wallet.switch_chain(84532).await.unwrap();
        assert_eq!(wallet.chain_id().await.unwrap(), 84532);
    }

    #[tokio::test]
    async fn rejects_configs_without_http_endpoints() {
        let wallet = LocalWallet::new(test_signer());
        let mut config = local_chain(84532);
        config.rpc = vec![RpcEndpoint {
            http: Url::parse("ws://127.0.0.1:8546").unwrap(),
            rate_limit: None,
        }];
        assert!(matches!(
            wallet.connect(&config).await,
            Err(WalletError::Provider(_))
        ));
    }
}
