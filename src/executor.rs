//! On-chain execution of a matched payment option.
//!
//! [`pay`] is the only place money moves. It puts the wallet on the option's
//! chain, verifies the payer can actually afford the transfer before any
//! signing prompt appears, submits the transfer, and waits for exactly one
//! confirmation.

use alloy_primitives::Address;
use tracing::instrument;

use crate::errors::PaymentError;
use crate::network::ChainConfig;
use crate::types::{PaymentOption, TransactionHash};
use crate::wallet::{WalletError, WalletProvider};

/// Puts the wallet on `config`'s chain.
///
/// A wallet already on the right chain is left alone, with no prompt. When the
/// wallet reports the chain as unrecognized, the chain is registered with the
/// full config instead; wallets that add a chain also switch to it, so no
/// re-check follows. If the wallet still ends up on the wrong chain, the
/// transfer fails at signing time rather than here.
#[instrument(name = "x402.ensure_chain", skip_all, err, fields(chain_id = config.chain_id))]
pub async fn ensure_chain<W>(wallet: &W, config: &ChainConfig) -> Result<(), PaymentError>
where
    W: WalletProvider + ?Sized,
{
    let current = wallet
        .chain_id()
        .await
        .map_err(PaymentError::from_chain_switch)?;
    if current == config.chain_id {
        tracing::trace!(chain_id = config.chain_id, "wallet already on required chain");
        return Ok(());
    }
    match wallet.switch_chain(config.chain_id).await {
        Ok(()) => Ok(()),
        Err(WalletError::UnrecognizedChain(_)) => {
            tracing::debug!(chain_id = config.chain_id, chain = %config.display_name, "registering chain with wallet");
            wallet
                .add_chain(config)
                .await
                .map_err(PaymentError::from_chain_switch)
        }
        Err(error) => Err(PaymentError::from_chain_switch(error)),
    }
}

/// Executes the transfer for a matched option and returns the transaction
/// hash once it has one confirmation.
///
/// The balance check runs before the transfer is submitted: an underfunded
/// payer fails with [`PaymentError::InsufficientBalance`] without ever seeing
/// a wallet prompt or spending gas. Amounts are compared as 256-bit integers;
/// they routinely exceed what floats can represent.
#[instrument(name = "x402.pay", skip_all, err, fields(
    network = %option.network,
    asset = %option.asset,
    amount = %option.max_amount_required,
))]
pub async fn pay<W>(
    wallet: &W,
    option: &PaymentOption,
    config: &ChainConfig,
) -> Result<TransactionHash, PaymentError>
where
    W: WalletProvider + ?Sized,
{
    ensure_chain(wallet, config).await?;

    let payer = wallet
        .account()
        .await
        .map_err(|e| PaymentError::TransactionFailed(e.to_string()))?;
    let token: Address = option
        .asset
        .parse()
        .map_err(|_| PaymentError::TransactionFailed(format!("invalid asset address: {}", option.asset)))?;
    let to: Address = option
        .pay_to
        .parse()
        .map_err(|_| PaymentError::TransactionFailed(format!("invalid payTo address: {}", option.pay_to)))?;

    let required = option.max_amount_required;
    let available = wallet
        .token_balance(token, payer)
        .await
        .map_err(|e| PaymentError::TransactionFailed(e.to_string()))?;
    if available < required.inner() {
        return Err(PaymentError::InsufficientBalance {
            required,
            available: available.into(),
        });
    }

    let transaction = wallet
        .submit_transfer(token, to, required.inner())
        .await
        .map_err(PaymentError::from_transfer)?;
    wallet
        .confirm_transfer(&transaction)
        .await
        .map_err(PaymentError::from_transfer)?;
    tracing::info!(transaction = %transaction, chain_id = config.chain_id, "payment confirmed");
    Ok(transaction)
}
