//! Pool records and the token/chain models they are built from.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Placeholder shown for balances that are unknown or not positive.
pub const BALANCE_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenModel {
    pub symbol: String,
    pub decimals: u8,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainModel {
    pub slug: String,
    pub name: String,
}

/// Identity of a pool within the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    pub token: String,
    pub chain: String,
}

impl PoolKey {
    pub fn new(token: &str, chain: &str) -> Self {
        Self {
            token: token.to_string(),
            chain: chain.to_string(),
        }
    }
}

impl Display for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.token, self.chain)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolRecord {
    pub token: TokenModel,
    pub chain: ChainModel,
    pub display_name: String,
    pub display_subtitle: String,
    pub deposit_link: String,
    pub claim_link: String,
    pub tvl_raw: f64,
    pub tvl_formatted: String,
    pub user_balance_raw: f64,
    pub user_balance_formatted: String,
    pub apr_raw: f64,
    pub apr_formatted: String,
    pub staking_apr_raw: f64,
    pub staking_apr_formatted: String,
    pub total_apr_raw: f64,
    pub total_apr_formatted: String,
    pub staking_apr_chain: Option<ChainModel>,
    pub can_claim: bool,
}

impl PoolRecord {
    /// Creates a base record with display fields filled in and every
    /// enrichable field at its default.
    pub fn new(token: TokenModel, chain: ChainModel) -> Self {
        let symbol = token.symbol.clone();
        let display_name = format!("{} {} Pool", symbol, chain.name);
        let display_subtitle = format!("{symbol} - h{symbol}");
        let deposit_link = format!(
            "/pool/deposit?token={}&sourceNetwork={}",
            symbol, chain.slug
        );
        let claim_link = format!("/stake?token={}&sourceNetwork={}", symbol, chain.slug);

        Self {
            token,
            chain,
            display_name,
            display_subtitle,
            deposit_link,
            claim_link,
            tvl_raw: 0.0,
            tvl_formatted: String::new(),
            user_balance_raw: 0.0,
            user_balance_formatted: String::new(),
            apr_raw: 0.0,
            apr_formatted: String::new(),
            staking_apr_raw: 0.0,
            staking_apr_formatted: String::new(),
            total_apr_raw: 0.0,
            total_apr_formatted: String::new(),
            staking_apr_chain: None,
            can_claim: false,
        }
    }

    pub fn key(&self) -> PoolKey {
        PoolKey::new(&self.token.symbol, &self.chain.slug)
    }
}
