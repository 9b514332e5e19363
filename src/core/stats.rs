//! Remote pool statistics document and the feed that serves it.

use crate::core::error::{PoolError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Wrapped and native-gas symbols published under their underlying asset.
const SYMBOL_ALIASES: &[(&str, &str)] = &[
    ("WETH", "ETH"),
    ("XDAI", "DAI"),
    ("WXDAI", "DAI"),
    ("WMATIC", "MATIC"),
];

pub fn canonical_symbol(symbol: &str) -> &str {
    SYMBOL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == symbol)
        .map_or(symbol, |&(_, canonical)| canonical)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub apr: f64,
    pub staking_apr: f64,
}

/// Parsed stats feed, shaped `{ data: { token: { chain: { apr, stakingApr? } } } }`.
///
/// Only the top-level `data` object is validated up front. Entries are checked
/// when looked up so one bad pool does not discard the rest.
#[derive(Debug, Clone)]
pub struct StatsDocument {
    data: Map<String, Value>,
}

impl StatsDocument {
    pub fn parse(body: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(body)
            .map_err(|e| PoolError::FeedFetch(format!("invalid JSON payload: {e}")))?;
        Self::from_value(json)
    }

    pub fn from_value(json: Value) -> Result<Self> {
        match json {
            Value::Object(mut root) => match root.remove("data") {
                Some(Value::Object(data)) => Ok(Self { data }),
                _ => Err(PoolError::FeedFetch("expected data".to_string())),
            },
            _ => Err(PoolError::FeedFetch("expected data".to_string())),
        }
    }

    /// Stats for the pool of `symbol` on `chain`, after symbol aliasing.
    pub fn lookup(&self, symbol: &str, chain: &str) -> Result<PoolStats> {
        let symbol = canonical_symbol(symbol);
        let token_entry = self.data.get(symbol).ok_or_else(|| {
            PoolError::MalformedFeedData(format!("expected data for token symbol \"{symbol}\""))
        })?;
        let chain_entry = token_entry.get(chain).ok_or_else(|| {
            PoolError::MalformedFeedData(format!("expected data for network \"{chain}\""))
        })?;
        let apr = chain_entry
            .get("apr")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                PoolError::MalformedFeedData(format!(
                    "expected apr value for token \"{symbol}\" and network \"{chain}\""
                ))
            })?;
        let staking_apr = chain_entry
            .get("stakingApr")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Ok(PoolStats { apr, staking_apr })
    }
}

#[async_trait]
pub trait StatsFeed: Send + Sync {
    /// Fetches the whole document. Any failure here is a stage-level failure.
    async fn fetch(&self) -> Result<StatsDocument>;
}
