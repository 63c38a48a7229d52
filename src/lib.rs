//! Client-side implementation of the [x402 protocol](https://www.x402.org) payment flow.
//!
//! A resource server that wants to be paid answers a request with
//! `402 Payment Required` and a machine-readable list of acceptable payment
//! options. This crate drives everything a paying client has to do from that
//! point on: pick an option it can fulfill, put the wallet on the right chain,
//! transfer the token on-chain, wait for one confirmation, and retry the
//! original request exactly once with an `X-Payment` proof header attached.
//!
//! # Overview
//!
//! The flow is owned by [`PaymentOrchestrator`](orchestrator::PaymentOrchestrator);
//! the remaining modules are the stateless services it calls in order:
//!
//! - [`network`] — static registry mapping a network token (e.g. `"base-sepolia"`)
//!   to chain connection parameters. Adding a chain means adding one entry here.
//! - [`types`] — wire types for the payment-required response and its options.
//! - [`negotiation`] — first-match selection among the server-offered options.
//! - [`wallet`] — the [`WalletProvider`](wallet::WalletProvider) capability
//!   interface (account discovery, chain switch/add, balance, transfer), plus
//!   [`LocalWallet`](wallet::LocalWallet), an alloy-backed implementation for
//!   EIP-155 chains.
//! - [`executor`] — chain switching and the pre-flight-checked token transfer.
//! - [`proof`] — encoding of the settled transaction into the proof token the
//!   server verifies.
//! - [`errors`] — the typed failure taxonomy callers branch on.
//! - [`middleware`] — a thin `reqwest` middleware adapter for transparent
//!   payment handling; it delegates to the orchestrator.
//!
//! # Example
//!
//! ```rust,no_run
//! use alloy_signer_local::PrivateKeySigner;
//! use x402_payer::network::NetworkRegistry;
//! use x402_payer::orchestrator::PaymentOrchestrator;
//! use x402_payer::wallet::LocalWallet;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = NetworkRegistry::known();
//! let signer: PrivateKeySigner = "PRIVATE_KEY".parse()?;
//! let wallet = LocalWallet::new(signer);
//! let config = registry.lookup("base-sepolia").expect("known network");
//! wallet.connect(config).await?;
//!
//! let http = reqwest::Client::new();
//! let orchestrator = PaymentOrchestrator::new(http.clone(), wallet, registry);
//! let request = http.get("https://api.example.com/premium").build()?;
//! let paid = orchestrator.fetch(request).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod executor;
pub mod middleware;
pub mod negotiation;
pub mod network;
pub mod orchestrator;
pub mod proof;
pub mod types;
pub mod wallet;

pub use errors::PaymentError;
pub use middleware::X402Middleware;
pub use network::{ChainConfig, NativeCurrency, NetworkRegistry, RpcEndpoint};
pub use orchestrator::{FlowState, PaidResponse, PaymentOrchestrator, PaymentReceipt};
pub use proof::{PaymentProof, ProofToken, X_PAYMENT_HEADER};
pub use types::{PaymentOption, PaymentRequiredResponse, TokenAmount, TransactionHash};
pub use wallet::{LocalWallet, WalletError, WalletProvider};
