//! Identity-keyed arena of pool records and the patches merged into it.

use crate::core::format::{format_percent, format_usd};
use crate::core::pool::{BALANCE_PLACEHOLDER, ChainModel, PoolKey, PoolRecord};
use std::collections::HashMap;
use tracing::warn;

/// A partial update to one record. Each variant owns a disjoint set of fields.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolPatch {
    Tvl {
        raw: f64,
        formatted: String,
    },
    UserBalance {
        raw: f64,
        formatted: String,
    },
    /// All APR fields land together so the total always matches its parts.
    Apr {
        apr_raw: f64,
        apr_formatted: String,
        staking_apr_raw: f64,
        staking_apr_formatted: String,
        total_apr_raw: f64,
        total_apr_formatted: String,
        staking_apr_chain: Option<ChainModel>,
    },
    CanClaim(bool),
}

impl PoolPatch {
    pub fn tvl(raw: f64) -> Self {
        PoolPatch::Tvl {
            raw,
            formatted: format_usd(raw),
        }
    }

    /// Positive balances are shown in USD, anything else as the placeholder.
    pub fn user_balance(raw: f64) -> Self {
        if raw > 0.0 {
            PoolPatch::UserBalance {
                raw,
                formatted: format_usd(raw),
            }
        } else {
            PoolPatch::UserBalance {
                raw: 0.0,
                formatted: BALANCE_PLACEHOLDER.to_string(),
            }
        }
    }

    pub fn apr(apr: f64, staking_apr: f64, staking_apr_chain: Option<ChainModel>) -> Self {
        let total = apr + staking_apr;
        PoolPatch::Apr {
            apr_raw: apr,
            apr_formatted: format_percent(apr),
            staking_apr_raw: staking_apr,
            staking_apr_formatted: format_percent(staking_apr),
            total_apr_raw: total,
            total_apr_formatted: format_percent(total),
            staking_apr_chain,
        }
    }

    /// Zeroed APR written when a pool's stats are missing or invalid.
    pub fn apr_fallback() -> Self {
        Self::apr(0.0, 0.0, None)
    }

    fn apply_to(self, record: &mut PoolRecord) {
        match self {
            PoolPatch::Tvl { raw, formatted } => {
                record.tvl_raw = raw;
                record.tvl_formatted = formatted;
            }
            PoolPatch::UserBalance { raw, formatted } => {
                record.user_balance_raw = raw;
                record.user_balance_formatted = formatted;
            }
            PoolPatch::Apr {
                apr_raw,
                apr_formatted,
                staking_apr_raw,
                staking_apr_formatted,
                total_apr_raw,
                total_apr_formatted,
                staking_apr_chain,
            } => {
                record.apr_raw = apr_raw;
                record.apr_formatted = apr_formatted;
                record.staking_apr_raw = staking_apr_raw;
                record.staking_apr_formatted = staking_apr_formatted;
                record.total_apr_raw = total_apr_raw;
                record.total_apr_formatted = total_apr_formatted;
                if staking_apr_chain.is_some() {
                    record.staking_apr_chain = staking_apr_chain;
                }
            }
            PoolPatch::CanClaim(can_claim) => record.can_claim = can_claim,
        }
    }
}

/// The shared collection of pool records.
///
/// Records are created once from the catalog and only ever patched in place.
#[derive(Debug, Default)]
pub struct AggregateStore {
    records: Vec<PoolRecord>,
    index: HashMap<PoolKey, usize>,
    revision: u64,
}

impl AggregateStore {
    pub fn new(catalog: Vec<PoolRecord>) -> Self {
        let mut store = Self::default();
        for record in catalog {
            let key = record.key();
            if store.index.contains_key(&key) {
                warn!("Ignoring duplicate catalog entry for {key}");
                continue;
            }
            store.index.insert(key, store.records.len());
            store.records.push(record);
        }
        store
    }

    pub fn records(&self) -> &[PoolRecord] {
        &self.records
    }

    pub fn keys(&self) -> Vec<PoolKey> {
        self.records.iter().map(PoolRecord::key).collect()
    }

    pub fn get(&self, key: &PoolKey) -> Option<&PoolRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bumped on every merge that changes a record.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Merges `patch` into the record for `key`. Returns whether anything changed.
    pub fn apply(&mut self, key: &PoolKey, patch: PoolPatch) -> bool {
        let Some(&i) = self.index.get(key) else {
            warn!("Dropping patch for unknown pool {key}");
            return false;
        };
        let record = &mut self.records[i];
        let before = record.clone();
        patch.apply_to(record);
        let changed = *record != before;
        if changed {
            self.revision += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pool::TokenModel;

    fn record(token: &str, chain: &str) -> PoolRecord {
        PoolRecord::new(
            TokenModel {
                symbol: token.to_string(),
                decimals: 18,
                image_url: String::new(),
            },
            ChainModel {
                slug: chain.to_string(),
                name: chain.to_uppercase(),
            },
        )
    }

    #[test]
    fn test_new_store_keeps_first_of_duplicates() {
        let store = AggregateStore::new(vec![
            record("USDC", "optimism"),
            record("USDC", "gnosis"),
            record("USDC", "optimism"),
        ]);
        assert_eq!(store.len(), 2);
        assert!(store.get(&PoolKey::new("USDC", "gnosis")).is_some());
        assert!(store.get(&PoolKey::new("DAI", "gnosis")).is_none());
    }

    #[test]
    fn test_apply_patches_only_target_record() {
        let mut store = AggregateStore::new(vec![record("USDC", "optimism"), record("USDC", "gnosis")]);
        let key = PoolKey::new("USDC", "optimism");

        assert!(store.apply(&key, PoolPatch::tvl(1234.5)));
        assert_eq!(store.revision(), 1);

        let updated = store.get(&key).unwrap();
        assert_eq!(updated.tvl_raw, 1234.5);
        assert_eq!(updated.tvl_formatted, "$1,234.5");
        assert_eq!(store.get(&PoolKey::new("USDC", "gnosis")).unwrap().tvl_raw, 0.0);

        // Same value again is not a change
        assert!(!store.apply(&key, PoolPatch::tvl(1234.5)));
        assert_eq!(store.revision(), 1);

        assert!(!store.apply(&PoolKey::new("DAI", "optimism"), PoolPatch::tvl(1.0)));
    }

    #[test]
    fn test_user_balance_patch_placeholder() {
        assert_eq!(
            PoolPatch::user_balance(0.0),
            PoolPatch::UserBalance {
                raw: 0.0,
                formatted: "-".to_string()
            }
        );
        assert_eq!(
            PoolPatch::user_balance(-3.0),
            PoolPatch::UserBalance {
                raw: 0.0,
                formatted: "-".to_string()
            }
        );
        assert_eq!(
            PoolPatch::user_balance(12.0),
            PoolPatch::UserBalance {
                raw: 12.0,
                formatted: "$12".to_string()
            }
        );
    }

    #[test]
    fn test_apr_patch_sums_total() {
        let mut store = AggregateStore::new(vec![record("USDC", "optimism")]);
        let key = PoolKey::new("USDC", "optimism");

        store.apply(&key, PoolPatch::apr(0.05, 0.02, None));
        let r = store.get(&key).unwrap();
        assert_eq!(r.total_apr_raw, r.apr_raw + r.staking_apr_raw);
        assert_eq!(r.apr_formatted, "5.00%");
        assert_eq!(r.total_apr_formatted, "7.00%");

        store.apply(&key, PoolPatch::apr_fallback());
        let r = store.get(&key).unwrap();
        assert_eq!(r.apr_raw, 0.0);
        assert_eq!(r.total_apr_raw, 0.0);
        assert_eq!(r.total_apr_formatted, "0.00%");
    }
}
