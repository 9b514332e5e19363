use crate::core::pool::{ChainModel, TokenModel};
use crate::core::staking::StakingContracts;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BRIDGE_URL: &str = "https://api.hop.exchange";
pub const DEFAULT_STATS_URL: &str = "https://assets.hop.exchange/v1-pool-stats.json";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenConfig {
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChainConfig {
    pub slug: String,
    pub name: String,
    pub rpc_url: Option<String>,
}

/// Chains on which a token has a liquidity pool.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogEntry {
    pub token: String,
    pub chains: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BridgeProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsProviderConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub bridge: Option<BridgeProviderConfig>,
    pub stats: Option<StatsProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            bridge: Some(BridgeProviderConfig {
                base_url: DEFAULT_BRIDGE_URL.to_string(),
            }),
            stats: Some(StatsProviderConfig {
                url: DEFAULT_STATS_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn bridge_url(&self) -> &str {
        self.bridge
            .as_ref()
            .map_or(DEFAULT_BRIDGE_URL, |p| &p.base_url)
    }

    pub fn stats_url(&self) -> &str {
        self.stats.as_ref().map_or(DEFAULT_STATS_URL, |p| &p.url)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CacheConfig {
    /// Lifetime of cached TVL and reward lookups. Unset keeps them for the
    /// whole session.
    pub ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub tokens: Vec<TokenConfig>,
    pub chains: Vec<ChainConfig>,
    pub catalog: Vec<CatalogEntry>,
    /// Staking rewards contract addresses keyed by chain slug, then token symbol.
    #[serde(default)]
    pub staking_rewards: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub account: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "poolview", "poolview")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn token(&self, symbol: &str) -> Option<TokenModel> {
        self.tokens
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| TokenModel {
                symbol: t.symbol.clone(),
                decimals: t.decimals,
                image_url: t
                    .image_url
                    .clone()
                    .unwrap_or_else(|| format!("/assets/logos/{}.svg", t.symbol.to_lowercase())),
            })
    }

    pub fn chain(&self, slug: &str) -> Option<ChainModel> {
        self.chains
            .iter()
            .find(|c| c.slug == slug)
            .map(|c| ChainModel {
                slug: c.slug.clone(),
                name: c.name.clone(),
            })
    }

    pub fn rpc_url(&self, slug: &str) -> Option<&str> {
        self.chains
            .iter()
            .find(|c| c.slug == slug)
            .and_then(|c| c.rpc_url.as_deref())
    }

    /// Token symbols in catalog order.
    pub fn catalog_tokens(&self) -> Vec<String> {
        self.catalog.iter().map(|e| e.token.clone()).collect()
    }

    pub fn supported_chains(&self, token: &str) -> Vec<String> {
        self.catalog
            .iter()
            .find(|e| e.token == token)
            .map(|e| e.chains.clone())
            .unwrap_or_default()
    }

    pub fn staking_contracts(&self) -> StakingContracts {
        StakingContracts::new(self.staking_rewards.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_YAML: &str = r#"
tokens:
  - symbol: "USDC"
    decimals: 6
  - symbol: "ETH"
    decimals: 18
    image_url: "https://example.com/eth.svg"
chains:
  - slug: "optimism"
    name: "Optimism"
    rpc_url: "https://mainnet.optimism.io"
  - slug: "gnosis"
    name: "Gnosis"
catalog:
  - token: "USDC"
    chains: ["optimism", "gnosis"]
  - token: "ETH"
    chains: ["optimism"]
staking_rewards:
  optimism:
    USDC: "0xf587b9309c603feedf0445af4d3b21300989e93a"
"#;

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = serde_yaml::from_str(CONFIG_YAML).expect("Failed to deserialize");

        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.chains.len(), 2);
        assert_eq!(config.catalog_tokens(), vec!["USDC", "ETH"]);
        assert_eq!(config.supported_chains("USDC"), vec!["optimism", "gnosis"]);
        assert!(config.supported_chains("DAI").is_empty());

        let staking = config.staking_contracts();
        assert_eq!(
            staking.get("optimism", "USDC"),
            Some("0xf587b9309c603feedf0445af4d3b21300989e93a")
        );
        assert!(staking.get("gnosis", "USDC").is_none());

        assert_eq!(config.rpc_url("optimism"), Some("https://mainnet.optimism.io"));
        assert!(config.rpc_url("gnosis").is_none());

        // Defaults when sections are omitted
        assert_eq!(config.providers.stats_url(), DEFAULT_STATS_URL);
        assert_eq!(config.providers.bridge_url(), DEFAULT_BRIDGE_URL);
        assert!(config.cache.ttl().is_none());
        assert!(config.account.is_none());
    }

    #[test]
    fn test_token_and_chain_models() {
        let config: AppConfig = serde_yaml::from_str(CONFIG_YAML).unwrap();

        let usdc = config.token("USDC").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert_eq!(usdc.image_url, "/assets/logos/usdc.svg");
        assert_eq!(
            config.token("ETH").unwrap().image_url,
            "https://example.com/eth.svg"
        );
        assert!(config.token("DAI").is_none());

        assert_eq!(config.chain("gnosis").unwrap().name, "Gnosis");
        assert!(config.chain("polygon").is_none());
    }

    #[test]
    fn test_config_with_providers_and_cache() {
        let yaml = format!(
            r#"{CONFIG_YAML}
providers:
  bridge:
    base_url: "http://example.com/bridge"
  stats:
    url: "http://example.com/stats.json"
cache:
  ttl_secs: 300
account: "0x0000000000000000000000000000000000000001"
"#
        );
        let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.providers.bridge_url(), "http://example.com/bridge");
        assert_eq!(config.providers.stats_url(), "http://example.com/stats.json");
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(300)));
        assert!(config.account.is_some());
    }
}
