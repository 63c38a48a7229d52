//! Wire types for the payment negotiation.
//!
//! These mirror the payment-required response a gated resource server sends
//! alongside `402 Payment Required`. Amounts are smallest-unit integers
//! serialized as decimal strings to avoid precision loss, and addresses stay
//! plain strings on the wire: an option offered on a network this client does
//! not support must still parse, so the failure can name the offered networks
//! instead of choking on an unfamiliar address format.

use alloy_primitives::{B256, U256};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use url::Url;

/// A token amount in smallest units (e.g. USDC with 6 decimals).
///
/// Serialized as a decimal string in JSON: amounts routinely exceed the safe
/// integer range of JSON consumers, and must never round-trip through floats.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn inner(&self) -> U256 {
        self.0
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        TokenAmount(U256::from(value))
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        TokenAmount(value)
    }
}

impl From<TokenAmount> for U256 {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("token amount must be a base-10 integer string")]
pub struct TokenAmountParseError;

impl FromStr for TokenAmount {
    type Err = TokenAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = U256::from_str_radix(s, 10).map_err(|_| TokenAmountParseError)?;
        Ok(TokenAmount(value))
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 32-byte EVM transaction hash, encoded as 0x-prefixed hex string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHash(pub [u8; 32]);

static TX_HASH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("valid transaction hash regex"));

#[derive(Debug, thiserror::Error)]
#[error("transaction hash must be a 0x-prefixed 64-character hex string")]
pub struct TransactionHashParseError;

impl FromStr for TransactionHash {
    type Err = TransactionHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !TX_HASH_REGEX.is_match(s) {
            return Err(TransactionHashParseError);
        }
        let bytes =
            hex::decode(s.trim_start_matches("0x")).map_err(|_| TransactionHashParseError)?;
        let array: [u8; 32] = bytes.try_into().map_err(|_| TransactionHashParseError)?;
        Ok(TransactionHash(array))
    }
}

impl Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<B256> for TransactionHash {
    fn from(hash: B256) -> Self {
        TransactionHash(hash.0)
    }
}

impl From<&TransactionHash> for B256 {
    fn from(hash: &TransactionHash) -> Self {
        B256::from(hash.0)
    }
}

impl<'de> Deserialize<'de> for TransactionHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for TransactionHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// One server-offered way to pay for a resource.
///
/// Constructed only by deserializing a payment-required response; never
/// persisted. The `network`, `pay_to`, and `asset` fields are deliberately
/// untyped strings; they are interpreted only once the option has been
/// matched against the [`NetworkRegistry`](crate::network::NetworkRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    /// Payment mechanism identifier (e.g. `"exact"`).
    pub scheme: String,
    /// Network token, resolved through the registry (e.g. `"base-sepolia"`).
    pub network: String,
    /// The resource this option pays for.
    pub resource: Url,
    /// Destination account on the option's network.
    pub pay_to: String,
    /// Fungible-token contract identifier on the option's network.
    pub asset: String,
    /// Amount to transfer, in the asset's smallest unit.
    pub max_amount_required: TokenAmount,
    /// Server-provided metadata (display name, decimal places, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// Body of a `402 Payment Required` response: the options the server accepts,
/// in the server's preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredResponse {
    #[serde(default = "default_x402_version")]
    pub x402_version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub accepts: Vec<PaymentOption>,
}

fn default_x402_version() -> u8 {
    1
}
