//! Staking rewards contract abstraction.

use alloy_primitives::U256;
use crate::core::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[async_trait]
pub trait StakingClient: Send + Sync {
    /// Unclaimed reward amount, in the reward token's base units, that
    /// `account` has earned on the staking `contract` deployed on `chain`.
    async fn earned(&self, chain: &str, contract: &str, account: &str) -> Result<U256>;
}

/// Staking rewards contract addresses keyed by chain slug, then token symbol.
#[derive(Debug, Clone, Default)]
pub struct StakingContracts {
    contracts: BTreeMap<String, BTreeMap<String, String>>,
}

impl StakingContracts {
    pub fn new(contracts: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { contracts }
    }

    pub fn get(&self, chain: &str, token: &str) -> Option<&str> {
        self.contracts
            .get(chain)
            .and_then(|tokens| tokens.get(token))
            .map(String::as_str)
    }
}
