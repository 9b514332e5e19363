//! Builds the base pool records from the configured token list.

use crate::core::bridge::BridgeClient;
use crate::core::pool::{PoolKey, PoolRecord};
use crate::core::resolver::Resolver;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Enumerates every (token, supported chain) pair into a base record.
///
/// Pairs whose token or chain does not resolve are skipped, as are tokens
/// whose supported chains cannot be listed. Duplicate pairs keep the first.
pub async fn build_catalog(
    tokens: &[String],
    bridge: &dyn BridgeClient,
    resolver: &dyn Resolver,
) -> Vec<PoolRecord> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let chains = match bridge.supported_chains(token).await {
            Ok(chains) => chains,
            Err(e) => {
                warn!(token = %token, error = %e, "Failed to list supported chains");
                continue;
            }
        };

        for chain in chains {
            let (Some(chain_model), Some(token_model)) =
                (resolver.resolve_chain(&chain), resolver.resolve_token(token))
            else {
                debug!("Skipping {token} on {chain}: not resolvable");
                continue;
            };

            if !seen.insert(PoolKey::new(&token_model.symbol, &chain_model.slug)) {
                debug!("Skipping duplicate pool {token} on {chain}");
                continue;
            }
            records.push(PoolRecord::new(token_model, chain_model));
        }
    }

    debug!("Catalog built with {} pools", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{PoolError, Result};
    use crate::core::pool::{ChainModel, TokenModel};
    use async_trait::async_trait;

    struct StaticBridge;

    #[async_trait]
    impl BridgeClient for StaticBridge {
        async fn supported_chains(&self, token: &str) -> Result<Vec<String>> {
            match token {
                "USDC" => Ok(vec![
                    "optimism".to_string(),
                    "unknown".to_string(),
                    "gnosis".to_string(),
                    "optimism".to_string(),
                ]),
                "ETH" => Ok(vec!["optimism".to_string()]),
                _ => Err(PoolError::Network("no such bridge".to_string())),
            }
        }

        async fn tvl_usd(&self, _token: &str, _chain: &str) -> Result<f64> {
            unreachable!()
        }

        async fn account_lp_balance_usd(
            &self,
            _token: &str,
            _chain: &str,
            _account: &str,
        ) -> Result<f64> {
            unreachable!()
        }
    }

    struct StaticResolver;

    impl Resolver for StaticResolver {
        fn resolve_chain(&self, slug: &str) -> Option<ChainModel> {
            let name = match slug {
                "optimism" => "Optimism",
                "gnosis" => "Gnosis",
                _ => return None,
            };
            Some(ChainModel {
                slug: slug.to_string(),
                name: name.to_string(),
            })
        }

        fn resolve_token(&self, symbol: &str) -> Option<TokenModel> {
            (symbol != "ETH").then(|| TokenModel {
                symbol: symbol.to_string(),
                decimals: 6,
                image_url: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_build_catalog_skips_unresolvable_pairs() {
        let tokens = vec!["USDC".to_string(), "ETH".to_string(), "DAI".to_string()];
        let records = build_catalog(&tokens, &StaticBridge, &StaticResolver).await;

        let keys: Vec<String> = records.iter().map(|r| r.key().to_string()).collect();
        assert_eq!(keys, vec!["USDC:optimism", "USDC:gnosis"]);
        assert_eq!(records[0].display_name, "USDC Optimism Pool");
        assert_eq!(records[1].tvl_raw, 0.0);
    }
}
