//! Proof-of-payment token carried on the retried request.
//!
//! After the transfer confirms, the client serializes `{hash, chainId}` to
//! canonical JSON and base64-encodes it into an opaque [`ProofToken`], sent
//! in the [`X_PAYMENT_HEADER`] header. The resource server is the sole judge
//! of validity; the client only guarantees the encoding round-trips. The
//! token shape is a contract with the server; do not alter it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use http::HeaderValue;
use http::header::InvalidHeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;

use crate::types::TransactionHash;

/// Request header carrying the proof token on the retried request.
pub const X_PAYMENT_HEADER: &str = "X-Payment";

/// The structured record behind a proof token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Hash of the confirmed transfer transaction.
    pub hash: TransactionHash,
    /// Numeric chain id the transfer settled on.
    pub chain_id: u64,
}

/// Opaque transport-safe encoding of a [`PaymentProof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofToken(String);

#[derive(Debug, thiserror::Error)]
pub enum ProofCodecError {
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl PaymentProof {
    pub fn new(hash: TransactionHash, chain_id: u64) -> Self {
        Self { hash, chain_id }
    }

    /// Serializes to canonical JSON, then base64. Deterministic: encoding the
    /// result of [`PaymentProof::decode`] yields the original token.
    pub fn encode(&self) -> Result<ProofToken, ProofCodecError> {
        let json = serde_json::to_vec(self)?;
        Ok(ProofToken(b64.encode(json)))
    }

    pub fn decode(token: &ProofToken) -> Result<Self, ProofCodecError> {
        let bytes = b64.decode(token.as_str())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl ProofToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token as an HTTP header value. Base64 text is always a valid
    /// header value, so failure here indicates a corrupted token.
    pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.0)
    }
}

impl Display for ProofToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProofToken {
    fn from(value: String) -> Self {
        ProofToken(value)
    }
}
