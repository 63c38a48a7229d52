//! Typed failure taxonomy for the payment flow.
//!
//! Every failure a payment attempt can end in is a distinct [`PaymentError`]
//! variant, so callers branch on kind rather than sniffing message text.
//! Wallet-level errors cross into this taxonomy through the translation
//! functions below, the only place that inspects provider error shapes.

use http::StatusCode;

use crate::types::{TokenAmount, TransactionHash};
use crate::wallet::WalletError;

/// Terminal outcome of a failed payment attempt.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// None of the server-offered networks resolve in the client's registry.
    /// Carries every offered network token, verbatim and in offer order.
    #[error("no offered network is supported by this client: {offered:?}")]
    UnsupportedNetwork { offered: Vec<String> },
    /// The user declined the chain switch prompt.
    #[error("chain switch was declined in the wallet")]
    ChainSwitchRejected,
    /// The wallet could not switch to the required chain.
    #[error("chain switch failed: {0}")]
    ChainSwitchFailed(String),
    /// The user declined the transfer signing prompt.
    #[error("payment was cancelled in the wallet")]
    UserRejected,
    /// The payer's token balance does not cover the required amount.
    /// Detected pre-flight, before any wallet prompt appears.
    #[error("insufficient token balance: required {required}, available {available}")]
    InsufficientBalance {
        required: TokenAmount,
        available: TokenAmount,
    },
    /// The transfer failed for any reason other than user rejection.
    /// The underlying provider/contract message is preserved.
    #[error("token transfer failed: {0}")]
    TransactionFailed(String),
    /// The payment settled on-chain but the retried request was still
    /// rejected. Distinct from payment failing outright: the money moved.
    #[error("payment {transaction} settled on-chain but the server rejected it with status {status}")]
    ServerRejectedProof {
        status: StatusCode,
        transaction: TransactionHash,
    },
    /// Transport or HTTP failure unrelated to payment execution.
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl PaymentError {
    /// True for outcomes that are expected user decisions rather than faults.
    ///
    /// [`UserRejected`](Self::UserRejected) and
    /// [`ChainSwitchRejected`](Self::ChainSwitchRejected) should render as
    /// calm, non-error-styled messages; everything else is an error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaymentError::UserRejected | PaymentError::ChainSwitchRejected
        )
    }

    /// Translates a wallet error raised while switching chains.
    pub fn from_chain_switch(error: WalletError) -> Self {
        match error {
            WalletError::Rejected => PaymentError::ChainSwitchRejected,
            other => PaymentError::ChainSwitchFailed(other.to_string()),
        }
    }

    /// Translates a wallet error raised while signing or submitting the
    /// transfer. User rejection stays distinguishable from real failures.
    pub fn from_transfer(error: WalletError) -> Self {
        match error {
            WalletError::Rejected => PaymentError::UserRejected,
            other => PaymentError::TransactionFailed(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(error: reqwest::Error) -> Self {
        PaymentError::RequestFailed(error.to_string())
    }
}
