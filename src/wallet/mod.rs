//! Wallet capability interface.
//!
//! The payment flow never talks to a concrete wallet implementation. It goes
//! through [`WalletProvider`], a small capability trait covering exactly what
//! negotiation needs: account discovery, chain-id query, chain switch/add,
//! token balance reads, and token transfers. Alternate wallet backends plug
//! in by implementing this trait; [`LocalWallet`] is the built-in
//! private-key-signer implementation for EIP-155 chains.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::network::ChainConfig;
use crate::types::TransactionHash;

mod eip155;

pub use eip155::LocalWallet;

/// Errors surfaced by a wallet backend, normalized to the shapes the flow
/// distinguishes. Anything a backend cannot classify goes into
/// [`WalletError::Provider`] with its message intact.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The user declined the prompt (EIP-1193 code 4001 territory).
    #[error("request was rejected in the wallet")]
    Rejected,
    /// The wallet does not know the chain (EIP-1193 code 4902 territory);
    /// the caller may register it with [`WalletProvider::add_chain`].
    #[error("chain {0} has not been added to the wallet")]
    UnrecognizedChain(u64),
    /// The wallet has no active chain connection yet.
    #[error("wallet is not connected to any chain")]
    NotConnected,
    /// No account is available for signing.
    #[error("no account is available in the wallet")]
    NoAccount,
    /// Any other provider, transport, or contract error.
    #[error("{0}")]
    Provider(String),
}

/// Capability interface over a connected wallet.
///
/// Implementations are shared, long-lived state: created lazily on first
/// need, reused across payment attempts, never torn down implicitly.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Chain the wallet is currently authorized to sign for.
    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Switches the wallet to an already-registered chain.
    ///
    /// Fails with [`WalletError::UnrecognizedChain`] when the wallet does not
    /// know the chain yet.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Registers a chain with the wallet and makes it active, the way user
    /// wallets switch to a chain they just added.
    async fn add_chain(&self, config: &ChainConfig) -> Result<(), WalletError>;

    /// The connected account address.
    async fn account(&self) -> Result<Address, WalletError>;

    /// ERC-20 `balanceOf` for `owner` against the `token` contract.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError>;

    /// Signs and submits an ERC-20 `transfer`, returning the transaction hash
    /// without waiting for inclusion.
    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransactionHash, WalletError>;

    /// Waits until the transaction has exactly one confirmation. Fails when
    /// the transaction reverted.
    async fn confirm_transfer(&self, transaction: &TransactionHash) -> Result<(), WalletError>;
}

// Arc-wrapped wallets are themselves wallets, so one session can back both
// an orchestrator and a middleware stack.
#[async_trait]
impl<W: WalletProvider> WalletProvider for std::sync::Arc<W> {
    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.as_ref().chain_id().await
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.as_ref().switch_chain(chain_id).await
    }

    async fn add_chain(&self, config: &ChainConfig) -> Result<(), WalletError> {
        self.as_ref().add_chain(config).await
    }

    async fn account(&self) -> Result<Address, WalletError> {
        self.as_ref().account().await
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        self.as_ref().token_balance(token, owner).await
    }

    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransactionHash, WalletError> {
        self.as_ref().submit_transfer(token, to, amount).await
    }

    async fn confirm_transfer(&self, transaction: &TransactionHash) -> Result<(), WalletError> {
        self.as_ref().confirm_transfer(transaction).await
    }
}
