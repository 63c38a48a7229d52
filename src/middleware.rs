//! Transparent payment handling for `reqwest` clients.
//!
//! [`X402Middleware`] makes a 402 invisible to the caller: the middleware
//! pays and retries, and the caller sees only the final response. It is a
//! thin adapter: negotiation, chain switching, transfer, and proof encoding
//! all run inside the shared [`PaymentOrchestrator`], so the two entry points
//! cannot drift apart and payment attempts stay serialized across both.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use x402_payer::middleware::X402Middleware;
//! # use x402_payer::orchestrator::PaymentOrchestrator;
//! # use x402_payer::network::NetworkRegistry;
//! # use x402_payer::wallet::LocalWallet;
//! # use alloy_signer_local::PrivateKeySigner;
//! # fn example(wallet: LocalWallet) {
//! let orchestrator = Arc::new(PaymentOrchestrator::new(
//!     reqwest::Client::new(),
//!     wallet,
//!     NetworkRegistry::known(),
//! ));
//! let client = reqwest_middleware::ClientBuilder::new(reqwest::Client::new())
//!     .with(X402Middleware::new(orchestrator))
//!     .build();
//! # }
//! ```

use async_trait::async_trait;
use http::{Extensions, StatusCode};
use reqwest::{Request, Response};
use reqwest_middleware as rqm;
use std::sync::Arc;

use crate::errors::PaymentError;
use crate::orchestrator::PaymentOrchestrator;
use crate::proof::X_PAYMENT_HEADER;
use crate::types::PaymentRequiredResponse;
use crate::wallet::WalletProvider;

/// Middleware that pays `402 Payment Required` responses and retries once.
pub struct X402Middleware<W> {
    orchestrator: Arc<PaymentOrchestrator<W>>,
}

impl<W> X402Middleware<W> {
    pub fn new(orchestrator: Arc<PaymentOrchestrator<W>>) -> Self {
        Self { orchestrator }
    }
}

impl<W> Clone for X402Middleware<W> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

fn middleware_error(error: PaymentError) -> rqm::Error {
    rqm::Error::Middleware(error.into())
}

#[async_trait]
impl<W> rqm::Middleware for X402Middleware<W>
where
    W: WalletProvider + 'static,
{
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        let retry_request = req.try_clone();

        let response = next.clone().run(req, extensions).await?;
        if response.status() != StatusCode::PAYMENT_REQUIRED {
            return Ok(response);
        }

        tracing::debug!(url = %response.url(), "intercepted 402, negotiating payment");
        let required: PaymentRequiredResponse = response.json().await.map_err(|e| {
            middleware_error(PaymentError::RequestFailed(format!(
                "malformed payment-required response: {e}"
            )))
        })?;
        let mut retry_request = retry_request.ok_or_else(|| {
            middleware_error(PaymentError::RequestFailed(
                "request cannot be retried with a payment: body is not cloneable".to_string(),
            ))
        })?;

        let receipt = self
            .orchestrator
            .settle_payment_required(&required)
            .await
            .map_err(middleware_error)?;
        let header = receipt.proof.header_value().map_err(|e| {
            middleware_error(PaymentError::RequestFailed(format!(
                "payment proof is not a valid header value: {e}"
            )))
        })?;
        retry_request
            .headers_mut()
            .insert(X_PAYMENT_HEADER, header);

        next.run(retry_request, extensions).await
    }
}
