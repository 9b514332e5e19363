//! The four enrichment stages.
//!
//! A stage turns the current set of pools into a batch of independent
//! lookups. Every lookup is a `'static` future resolving to [`StageEvent`]s;
//! nothing here touches the store, the pipeline merges events as they arrive.

use alloy_primitives::U256;
use crate::core::bridge::BridgeClient;
use crate::core::cache::Cache;
use crate::core::error::PoolError;
use crate::core::pool::{PoolKey, PoolRecord};
use crate::core::resolver::Resolver;
use crate::core::staking::{StakingClient, StakingContracts};
use crate::core::stats::StatsFeed;
use crate::core::store::PoolPatch;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Tvl,
    UserBalance,
    RemoteStats,
    ClaimableRewards,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Tvl,
        Stage::UserBalance,
        Stage::RemoteStats,
        Stage::ClaimableRewards,
    ];

    /// Triggers that (re)run this stage.
    pub fn dependencies(&self) -> &'static [Trigger] {
        match self {
            Stage::Tvl | Stage::RemoteStats => &[Trigger::CatalogReady],
            Stage::UserBalance => &[Trigger::CatalogReady, Trigger::AccountChanged],
            Stage::ClaimableRewards => &[
                Trigger::CatalogReady,
                Trigger::AccountChanged,
                Trigger::RecordsChanged,
            ],
        }
    }

    /// Whether results depend on the active account and go stale with it.
    pub fn is_account_scoped(&self) -> bool {
        matches!(self, Stage::UserBalance | Stage::ClaimableRewards)
    }

    pub fn triggered_by(trigger: Trigger) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|s| s.dependencies().contains(&trigger))
            .collect()
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Stage::Tvl => "tvl",
                Stage::UserBalance => "user-balance",
                Stage::RemoteStats => "remote-stats",
                Stage::ClaimableRewards => "claimable-rewards",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    CatalogReady,
    AccountChanged,
    RecordsChanged,
}

/// Result of one record's lookup.
///
/// A failed lookup may still carry a fallback patch.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub key: PoolKey,
    /// Account active when the lookup was launched.
    pub account: Option<String>,
    pub patch: Option<PoolPatch>,
    pub error: Option<PoolError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    Record(StageOutcome),
    /// The stage could not run at all; no record was written.
    StageFailed { stage: Stage, error: PoolError },
}

pub type Lookup = BoxFuture<'static, Vec<StageEvent>>;

/// Collaborators and caches shared by every stage invocation.
#[derive(Clone)]
pub struct StageContext {
    pub bridge: Arc<dyn BridgeClient>,
    pub resolver: Arc<dyn Resolver>,
    pub stats: Arc<dyn StatsFeed>,
    pub staking: Arc<dyn StakingClient>,
    pub staking_contracts: Arc<StakingContracts>,
    pub tvl_cache: Cache<String, f64>,
    pub rewards_cache: Cache<String, U256>,
}

fn record_event(
    stage: Stage,
    key: PoolKey,
    account: Option<String>,
    patch: Option<PoolPatch>,
    error: Option<PoolError>,
) -> Vec<StageEvent> {
    vec![StageEvent::Record(StageOutcome {
        stage,
        key,
        account,
        patch,
        error,
    })]
}

pub fn tvl_lookups(ctx: &StageContext, keys: &[PoolKey]) -> Vec<Lookup> {
    keys.iter()
        .cloned()
        .map(|key| {
            let bridge = Arc::clone(&ctx.bridge);
            let cache = ctx.tvl_cache.clone();
            async move {
                let cache_key = format!("{}:{}", key.token, key.chain);
                if let Some(tvl) = cache.get(&cache_key).await {
                    return record_event(Stage::Tvl, key, None, Some(PoolPatch::tvl(tvl)), None);
                }
                match bridge.tvl_usd(&key.token, &key.chain).await {
                    Ok(tvl) => {
                        cache.put(cache_key, tvl).await;
                        record_event(Stage::Tvl, key, None, Some(PoolPatch::tvl(tvl)), None)
                    }
                    Err(e) => record_event(Stage::Tvl, key, None, None, Some(e)),
                }
            }
            .boxed()
        })
        .collect()
}

pub fn user_balance_lookups(
    ctx: &StageContext,
    keys: &[PoolKey],
    account: Option<&str>,
) -> Vec<Lookup> {
    let Some(account) = account else {
        return keys
            .iter()
            .cloned()
            .map(|key| {
                future::ready(record_event(
                    Stage::UserBalance,
                    key,
                    None,
                    Some(PoolPatch::user_balance(0.0)),
                    None,
                ))
                .boxed()
            })
            .collect();
    };

    keys.iter()
        .cloned()
        .map(|key| {
            let bridge = Arc::clone(&ctx.bridge);
            let account = account.to_string();
            async move {
                let tag = Some(account.clone());
                match bridge
                    .account_lp_balance_usd(&key.token, &key.chain, &account)
                    .await
                {
                    Ok(balance) => record_event(
                        Stage::UserBalance,
                        key,
                        tag,
                        Some(PoolPatch::user_balance(balance)),
                        None,
                    ),
                    // An unknown balance must not keep the previous account's value.
                    Err(e) => record_event(
                        Stage::UserBalance,
                        key,
                        tag,
                        Some(PoolPatch::user_balance(0.0)),
                        Some(e),
                    ),
                }
            }
            .boxed()
        })
        .collect()
}

/// One lookup for the whole stage: fetch the document, then resolve each pool.
pub fn remote_stats_lookups(ctx: &StageContext, keys: &[PoolKey]) -> Vec<Lookup> {
    let stats = Arc::clone(&ctx.stats);
    let resolver = Arc::clone(&ctx.resolver);
    let keys = keys.to_vec();

    let lookup = async move {
        let document = match stats.fetch().await {
            Ok(document) => document,
            Err(error) => {
                return vec![StageEvent::StageFailed {
                    stage: Stage::RemoteStats,
                    error,
                }];
            }
        };

        keys.into_iter()
            .flat_map(|key| match document.lookup(&key.token, &key.chain) {
                Ok(stats) => {
                    let chain = resolver.resolve_chain(&key.chain);
                    let patch = PoolPatch::apr(stats.apr, stats.staking_apr, chain);
                    record_event(Stage::RemoteStats, key, None, Some(patch), None)
                }
                Err(e) => record_event(
                    Stage::RemoteStats,
                    key,
                    None,
                    Some(PoolPatch::apr_fallback()),
                    Some(e),
                ),
            })
            .collect()
    };

    vec![lookup.boxed()]
}

pub fn claimable_rewards_lookups(
    ctx: &StageContext,
    records: &[PoolRecord],
    account: Option<&str>,
) -> Vec<Lookup> {
    let Some(account) = account else {
        // Only records currently claimable need a write.
        return records
            .iter()
            .filter(|r| r.can_claim)
            .map(|r| {
                future::ready(record_event(
                    Stage::ClaimableRewards,
                    r.key(),
                    None,
                    Some(PoolPatch::CanClaim(false)),
                    None,
                ))
                .boxed()
            })
            .collect();
    };

    records
        .iter()
        .filter_map(|record| {
            let key = record.key();
            let Some(contract) = ctx.staking_contracts.get(&key.chain, &key.token) else {
                debug!("No staking contract for {key}, skipping rewards");
                return None;
            };
            let contract = contract.to_string();
            let staking = Arc::clone(&ctx.staking);
            let cache = ctx.rewards_cache.clone();
            let account = account.to_string();

            let lookup = async move {
                let tag = Some(account.clone());
                let cache_key = format!("{}:{}:{}", key.chain, key.token, account);
                let earned = match cache.get(&cache_key).await {
                    Some(earned) => earned,
                    None => match staking.earned(&key.chain, &contract, &account).await {
                        Ok(earned) => {
                            cache.put(cache_key, earned).await;
                            earned
                        }
                        Err(e) => {
                            return record_event(Stage::ClaimableRewards, key, tag, None, Some(e));
                        }
                    },
                };
                // Zero leaves the flag as is: once claimable, stays claimable.
                let patch = (earned > U256::ZERO).then_some(PoolPatch::CanClaim(true));
                record_event(Stage::ClaimableRewards, key, tag, patch, None)
            };
            Some(lookup.boxed())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_dependencies() {
        assert_eq!(
            Stage::triggered_by(Trigger::CatalogReady),
            Stage::ALL.to_vec()
        );
        assert_eq!(
            Stage::triggered_by(Trigger::AccountChanged),
            vec![Stage::UserBalance, Stage::ClaimableRewards]
        );
        assert_eq!(
            Stage::triggered_by(Trigger::RecordsChanged),
            vec![Stage::ClaimableRewards]
        );
        assert!(Stage::UserBalance.is_account_scoped());
        assert!(!Stage::Tvl.is_account_scoped());
        assert_eq!(Stage::ClaimableRewards.to_string(), "claimable-rewards");
    }
}
