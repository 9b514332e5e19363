//! Bridge client abstraction: pool liquidity and LP balances per chain.

use crate::core::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Chain slugs with a liquidity pool for `token`, in display order.
    async fn supported_chains(&self, token: &str) -> Result<Vec<String>>;

    /// USD value locked in the `token` pool on `chain`.
    async fn tvl_usd(&self, token: &str, chain: &str) -> Result<f64>;

    /// USD value of the LP position `account` holds in the `token` pool on `chain`.
    async fn account_lp_balance_usd(&self, token: &str, chain: &str, account: &str)
    -> Result<f64>;
}
