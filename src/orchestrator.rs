//! End-to-end payment flow.
//!
//! [`PaymentOrchestrator`] owns the sequence: issue the original request,
//! detect `402 Payment Required`, match an option, switch chains, execute the
//! transfer, encode the proof, and retry the original request exactly once.
//! Each step's failure becomes a typed [`PaymentError`]; no step is retried
//! automatically. One attempt runs at a time; concurrent calls queue on an
//! in-flight guard, so a half-finished wallet signature is never raced
//! against a second transfer.

use http::StatusCode;
use tokio::sync::Mutex;
use tracing::instrument;
use std::fmt;
use std::fmt::Display;

use crate::errors::PaymentError;
use crate::executor::pay;
use crate::negotiation::select_option;
use crate::network::NetworkRegistry;
use crate::proof::{PaymentProof, ProofToken, X_PAYMENT_HEADER};
use crate::types::{PaymentOption, PaymentRequiredResponse, TransactionHash};
use crate::wallet::WalletProvider;

/// States of one payment attempt, in the order they are traversed.
///
/// Used for structured logging and progress reporting; the transitions
/// themselves are the control flow of [`PaymentOrchestrator::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Requesting,
    AwaitingPayment,
    Negotiating,
    Switching,
    Paying,
    Retrying,
    Succeeded,
    Failed,
}

impl Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowState::Idle => "idle",
            FlowState::Requesting => "requesting",
            FlowState::AwaitingPayment => "awaiting-payment",
            FlowState::Negotiating => "negotiating",
            FlowState::Switching => "switching",
            FlowState::Paying => "paying",
            FlowState::Retrying => "retrying",
            FlowState::Succeeded => "succeeded",
            FlowState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Record of one settled payment: the matched option, where it settled, and
/// the proof the server accepted (or was offered). Lives for one flow only.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// The server-offered option that was fulfilled.
    pub option: PaymentOption,
    /// Chain the transfer settled on.
    pub chain_id: u64,
    /// Hash of the confirmed transfer.
    pub transaction: TransactionHash,
    /// Encoded proof token sent on the retried request.
    pub proof: ProofToken,
}

/// Outcome of a successful fetch: the resource payload, plus the receipt
/// when a payment was necessary to obtain it.
#[derive(Debug)]
pub struct PaidResponse {
    pub response: reqwest::Response,
    pub receipt: Option<PaymentReceipt>,
}

/// Drives the payment negotiation state machine.
///
/// Holds the HTTP client, the wallet session, and the network registry as
/// explicit dependencies; there is no ambient global state. Construct once
/// and reuse; the wallet connection persists across attempts.
pub struct PaymentOrchestrator<W> {
    http: reqwest::Client,
    wallet: W,
    registry: NetworkRegistry,
    in_flight: Mutex<()>,
}

impl<W: WalletProvider> PaymentOrchestrator<W> {
    pub fn new(http: reqwest::Client, wallet: W, registry: NetworkRegistry) -> Self {
        Self {
            http,
            wallet,
            registry,
            in_flight: Mutex::new(()),
        }
    }

    /// The wallet session this orchestrator pays with.
    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Fetches a priced resource, paying for it if the server demands it.
    ///
    /// The request is issued once; on `402 Payment Required` the offered
    /// options are negotiated and paid, and the request is reissued exactly
    /// once with the proof attached. Any non-402 error status (including
    /// `401` from a missing session) is a plain [`PaymentError::RequestFailed`],
    /// not a payment failure.
    ///
    /// Concurrent calls are serialized: a second call waits until the one in
    /// flight reaches a terminal state.
    #[instrument(name = "x402.fetch", skip_all, err, fields(method = %request.method(), url = %request.url()))]
    pub async fn fetch(&self, request: reqwest::Request) -> Result<PaidResponse, PaymentError> {
        let _guard = self.in_flight.lock().await;
        tracing::trace!(state = %FlowState::Idle, "acquired payment flow guard");

        // Clone up front: if the body is not reusable we must find out
        // before any money moves, not after.
        let retry_request = request.try_clone();

        tracing::debug!(state = %FlowState::Requesting, "issuing resource request");
        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(state = %FlowState::Succeeded, %status, "resource served without payment");
            return Ok(PaidResponse {
                response,
                receipt: None,
            });
        }
        if status != StatusCode::PAYMENT_REQUIRED {
            tracing::debug!(state = %FlowState::Failed, %status, "request failed outside the payment flow");
            return Err(PaymentError::RequestFailed(format!(
                "server responded with {status}"
            )));
        }

        tracing::debug!(state = %FlowState::AwaitingPayment, "server requires payment");
        let required: PaymentRequiredResponse = response.json().await.map_err(|e| {
            PaymentError::RequestFailed(format!("malformed payment-required response: {e}"))
        })?;
        let mut retry_request = retry_request.ok_or_else(|| {
            PaymentError::RequestFailed(
                "request cannot be retried with a payment: body is not cloneable".to_string(),
            )
        })?;

        let receipt = self.settle(&required).await?;

        tracing::debug!(
            state = %FlowState::Retrying,
            transaction = %receipt.transaction,
            "reissuing request with payment proof"
        );
        let header = receipt.proof.header_value().map_err(|e| {
            PaymentError::RequestFailed(format!("payment proof is not a valid header value: {e}"))
        })?;
        retry_request.headers_mut().insert(X_PAYMENT_HEADER, header);
        let response = self.http.execute(retry_request).await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(state = %FlowState::Succeeded, %status, "payment accepted");
            Ok(PaidResponse {
                response,
                receipt: Some(receipt),
            })
        } else {
            // The transfer is on-chain and irrevocable; this is not the same
            // failure as a payment that never happened.
            tracing::warn!(
                state = %FlowState::Failed,
                %status,
                transaction = %receipt.transaction,
                "server did not honor settled payment"
            );
            Err(PaymentError::ServerRejectedProof {
                status,
                transaction: receipt.transaction,
            })
        }
    }

    /// Negotiates and pays one of the offered options, returning the receipt
    /// with the encoded proof. Used by [`fetch`](Self::fetch) and by the
    /// transparent middleware adapter; both share the in-flight guard.
    pub async fn settle_payment_required(
        &self,
        required: &PaymentRequiredResponse,
    ) -> Result<PaymentReceipt, PaymentError> {
        let _guard = self.in_flight.lock().await;
        self.settle(required).await
    }

    async fn settle(
        &self,
        required: &PaymentRequiredResponse,
    ) -> Result<PaymentReceipt, PaymentError> {
        tracing::debug!(
            state = %FlowState::Negotiating,
            accepts = required.accepts.len(),
            "selecting payment option"
        );
        let (option, config) = select_option(&self.registry, &required.accepts)?;

        tracing::debug!(state = %FlowState::Switching, chain_id = config.chain_id, "ensuring wallet chain");
        tracing::debug!(state = %FlowState::Paying, amount = %option.max_amount_required, "executing transfer");
        let transaction = pay(&self.wallet, option, config).await?;

        let proof = PaymentProof::new(transaction.clone(), config.chain_id)
            .encode()
            .map_err(|e| {
                PaymentError::RequestFailed(format!("failed to encode payment proof: {e}"))
            })?;
        Ok(PaymentReceipt {
            option: option.clone(),
            chain_id: config.chain_id,
            transaction,
            proof,
        })
    }
}
