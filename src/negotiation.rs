//! Selection of a payable option from the server's offer list.
//!
//! The server lists options in its own preference order, and that order is
//! respected: the client takes the first option whose network token resolves
//! in the registry, and never re-ranks by price or network.

use crate::errors::PaymentError;
use crate::network::{ChainConfig, NetworkRegistry};
use crate::types::PaymentOption;

/// Returns the first option whose network this client supports, paired with
/// the chain parameters needed to pay it.
///
/// # Errors
///
/// [`PaymentError::UnsupportedNetwork`] when no option resolves, carrying
/// every offered network token verbatim so the failure can be diagnosed
/// server-side and client-side alike.
pub fn select_option<'r, 'o>(
    registry: &'r NetworkRegistry,
    accepts: &'o [PaymentOption],
) -> Result<(&'o PaymentOption, &'r ChainConfig), PaymentError> {
    for option in accepts {
        if let Some(config) = registry.lookup(&option.network) {
            tracing::debug!(
                network = %option.network,
                chain_id = config.chain_id,
                amount = %option.max_amount_required,
                "selected payment option"
            );
            return Ok((option, config));
        }
        tracing::trace!(network = %option.network, "skipping option on unsupported network");
    }
    Err(PaymentError::UnsupportedNetwork {
        offered: accepts.iter().map(|o| o.network.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NativeCurrency, RpcEndpoint};
    use crate::types::TokenAmount;
    use url::Url;

    fn config(chain_id: u64) -> ChainConfig {
        ChainConfig {
            chain_id,
            display_name: format!("chain-{chain_id}"),
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

    fn option(network: &str, amount: u64) -> PaymentOption {
        PaymentOption {
            scheme: "exact".to_string(),
            network: network.to_string(),
            resource: Url::parse("https://api.example.com/premium").unwrap(),
            pay_to: "0x00000000000000000000000000000000000000bb".to_string(),
            asset: "0x00000000000000000000000000000000000000cc".to_string(),
            max_amount_required: TokenAmount::from(amount),
            extra: None,
        }
    }

    #[test]
    fn picks_the_first_resolvable_option() {
        let registry = NetworkRegistry::empty()
            .with_chain("base-sepolia", config(84532))
            .with_chain("base", config(8453));
        let accepts = vec![option("base", 5), option("base-sepolia", 1)];
        let (selected, chain) = select_option(&registry, &accepts).unwrap();
        assert_eq!(selected.network, "base");
        assert_eq!(chain.chain_id, 8453);
    }

    #[test]
    fn skips_unsupported_prefixes() {
        let registry = NetworkRegistry::empty().with_chain("base-sepolia", config(84532));
        let accepts = vec![
            option("polygon", 1),
            option("solana", 1),
            option("base-sepolia", 1),
        ];
        let (selected, chain) = select_option(&registry, &accepts).unwrap();
        assert_eq!(selected.network, "base-sepolia");
        assert_eq!(chain.chain_id, 84532);
    }

    #[test]
    fn reports_every_offered_network_verbatim() {
        let registry = NetworkRegistry::empty().with_chain("base-sepolia", config(84532));
        let accepts = vec![
            option("polygon", 1),
            option("solana", 2),
            option("polygon", 3),
        ];
        match select_option(&registry, &accepts) {
            Err(PaymentError::UnsupportedNetwork { offered }) => {
                assert_eq!(offered, vec!["polygon", "solana", "polygon"]);
            }
            other => panic!("expected UnsupportedNetwork, got {other:?}"),
        }
    }

    #[test]
    fn empty_offer_list_is_unsupported() {
        let registry = NetworkRegistry::known();
        match select_option(&registry, &[]) {
            Err(PaymentError::UnsupportedNetwork { offered }) => assert!(offered.is_empty()),
            other => panic!("expected UnsupportedNetwork, got {other:?}"),
        }
    }
}
