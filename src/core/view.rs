//! Derived views over the pool records: token/chain filters, column sort and
//! the user's own positions.

use crate::core::pool::{ChainModel, PoolRecord, TokenModel};
use anyhow::anyhow;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Tvl,
    UserBalance,
    Apr,
    StakingApr,
    TotalApr,
}

impl SortColumn {
    pub fn value(&self, record: &PoolRecord) -> f64 {
        match self {
            SortColumn::Tvl => record.tvl_raw,
            SortColumn::UserBalance => record.user_balance_raw,
            SortColumn::Apr => record.apr_raw,
            SortColumn::StakingApr => record.staking_apr_raw,
            SortColumn::TotalApr => record.total_apr_raw,
        }
    }
}

impl Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SortColumn::Tvl => "tvl",
                SortColumn::UserBalance => "userBalance",
                SortColumn::Apr => "apr",
                SortColumn::StakingApr => "stakingApr",
                SortColumn::TotalApr => "totalApr",
            }
        )
    }
}

impl FromStr for SortColumn {
    type Err = anyhow::Error;

    /// Accepts `tvl`, `tvlRaw` and `tvl_raw` style names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace(['_', '-'], "").to_lowercase();
        let name = normalized.strip_suffix("raw").unwrap_or(normalized.as_str());
        match name {
            "tvl" => Ok(SortColumn::Tvl),
            "userbalance" | "balance" => Ok(SortColumn::UserBalance),
            "apr" => Ok(SortColumn::Apr),
            "stakingapr" => Ok(SortColumn::StakingApr),
            "totalapr" => Ok(SortColumn::TotalApr),
            _ => Err(anyhow!("Invalid sort column: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterToken {
    pub token: TokenModel,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    pub chain: ChainModel,
    pub enabled: bool,
}

/// Filter and sort state for the pools table.
#[derive(Debug, Clone)]
pub struct ViewState {
    filter_tokens: Vec<FilterToken>,
    filter_chains: Vec<FilterChain>,
    column_sort: Option<SortColumn>,
    sort_descending: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter_tokens: Vec::new(),
            filter_chains: Vec::new(),
            column_sort: None,
            sort_descending: true,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates one enabled filter per distinct token and chain in `records`.
    ///
    /// Each filter list is only populated while empty, later calls leave
    /// existing entries and their `enabled` flags alone.
    pub fn observe(&mut self, records: &[PoolRecord]) {
        if self.filter_tokens.is_empty() {
            for record in records {
                if !self
                    .filter_tokens
                    .iter()
                    .any(|f| f.token.symbol == record.token.symbol)
                {
                    self.filter_tokens.push(FilterToken {
                        token: record.token.clone(),
                        enabled: true,
                    });
                }
            }
        }
        if self.filter_chains.is_empty() {
            for record in records {
                if !self
                    .filter_chains
                    .iter()
                    .any(|f| f.chain.slug == record.chain.slug)
                {
                    self.filter_chains.push(FilterChain {
                        chain: record.chain.clone(),
                        enabled: true,
                    });
                }
            }
        }
    }

    pub fn filter_tokens(&self) -> &[FilterToken] {
        &self.filter_tokens
    }

    pub fn filter_chains(&self) -> &[FilterChain] {
        &self.filter_chains
    }

    pub fn column_sort(&self) -> Option<SortColumn> {
        self.column_sort
    }

    pub fn is_sort_descending(&self) -> bool {
        self.sort_descending
    }

    /// Flips the token filter for `symbol`. Returns false if there is none.
    pub fn toggle_filter_token(&mut self, symbol: &str) -> bool {
        let mut found = false;
        for filter in self
            .filter_tokens
            .iter_mut()
            .filter(|f| f.token.symbol == symbol)
        {
            filter.enabled = !filter.enabled;
            found = true;
        }
        found
    }

    pub fn toggle_filter_chain(&mut self, slug: &str) -> bool {
        let mut found = false;
        for filter in self
            .filter_chains
            .iter_mut()
            .filter(|f| f.chain.slug == slug)
        {
            filter.enabled = !filter.enabled;
            found = true;
        }
        found
    }

    /// Same column flips the direction, a new column starts descending.
    pub fn toggle_column_sort(&mut self, column: SortColumn) {
        if self.column_sort == Some(column) {
            self.sort_descending = !self.sort_descending;
        } else {
            self.column_sort = Some(column);
            self.sort_descending = true;
        }
    }

    fn is_included(&self, record: &PoolRecord) -> bool {
        let token_disabled = self
            .filter_tokens
            .iter()
            .any(|f| f.token.symbol == record.token.symbol && !f.enabled);
        let chain_disabled = self
            .filter_chains
            .iter()
            .any(|f| f.chain.slug == record.chain.slug && !f.enabled);
        !token_disabled && !chain_disabled
    }

    /// Records passing both filters, sorted by the active column if any.
    pub fn all_pools<'a>(&self, records: &'a [PoolRecord]) -> Vec<&'a PoolRecord> {
        let mut pools: Vec<&PoolRecord> = records.iter().filter(|r| self.is_included(r)).collect();

        if let Some(column) = self.column_sort {
            pools.sort_by(|a, b| {
                let (a, b) = (column.value(a), column.value(b));
                let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                if self.sort_descending { ord.reverse() } else { ord }
            });
        }
        pools
    }

    /// Records holding a positive balance, largest first. Ignores filters and
    /// the active sort column.
    pub fn user_pools<'a>(&self, records: &'a [PoolRecord]) -> Vec<&'a PoolRecord> {
        let mut pools: Vec<&PoolRecord> = records
            .iter()
            .filter(|r| r.user_balance_raw > 0.0)
            .collect();
        pools.sort_by(|a, b| {
            b.user_balance_raw
                .partial_cmp(&a.user_balance_raw)
                .unwrap_or(Ordering::Equal)
        });
        pools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(token: &str, chain: &str, tvl: f64, balance: f64) -> PoolRecord {
        let mut record = PoolRecord::new(
            TokenModel {
                symbol: token.to_string(),
                decimals: 6,
                image_url: String::new(),
            },
            ChainModel {
                slug: chain.to_string(),
                name: chain.to_string(),
            },
        );
        record.tvl_raw = tvl;
        record.user_balance_raw = balance;
        record
    }

    fn sample() -> Vec<PoolRecord> {
        vec![
            record("USDC", "optimism", 100.0, 0.0),
            record("USDC", "gnosis", 300.0, 5.0),
            record("ETH", "optimism", 200.0, 50.0),
            record("ETH", "gnosis", 50.0, 0.0),
        ]
    }

    fn keys(pools: &[&PoolRecord]) -> Vec<String> {
        pools.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_observe_creates_filters_once() {
        let records = sample();
        let mut view = ViewState::new();
        view.observe(&records);

        assert_eq!(view.filter_tokens().len(), 2);
        assert_eq!(view.filter_chains().len(), 2);
        assert!(view.filter_tokens().iter().all(|f| f.enabled));

        view.toggle_filter_token("ETH");
        view.observe(&records);
        assert_eq!(view.filter_tokens().len(), 2);
        assert!(!view.filter_tokens()[1].enabled);
    }

    #[test]
    fn test_filter_conjunction() {
        let records = sample();
        let mut view = ViewState::new();
        view.observe(&records);

        assert_eq!(view.all_pools(&records).len(), 4);

        assert!(view.toggle_filter_token("USDC"));
        assert_eq!(
            keys(&view.all_pools(&records)),
            vec!["ETH:optimism", "ETH:gnosis"]
        );

        assert!(view.toggle_filter_chain("gnosis"));
        assert_eq!(keys(&view.all_pools(&records)), vec!["ETH:optimism"]);

        // Toggling back re-includes
        view.toggle_filter_token("USDC");
        assert_eq!(
            keys(&view.all_pools(&records)),
            vec!["USDC:optimism", "ETH:optimism"]
        );

        assert!(!view.toggle_filter_chain("polygon"));
    }

    #[test]
    fn test_records_without_filter_entry_are_included() {
        let records = sample();
        let view = ViewState::new();
        assert_eq!(view.all_pools(&records).len(), 4);
    }

    #[test]
    fn test_toggle_column_sort() {
        let records = sample();
        let mut view = ViewState::new();

        // No sort keeps catalog order
        assert_eq!(
            keys(&view.all_pools(&records)),
            vec!["USDC:optimism", "USDC:gnosis", "ETH:optimism", "ETH:gnosis"]
        );

        view.toggle_column_sort("tvlRaw".parse().unwrap());
        assert_eq!(view.column_sort(), Some(SortColumn::Tvl));
        assert!(view.is_sort_descending());
        assert_eq!(
            keys(&view.all_pools(&records)),
            vec!["USDC:gnosis", "ETH:optimism", "USDC:optimism", "ETH:gnosis"]
        );

        view.toggle_column_sort(SortColumn::Tvl);
        assert!(!view.is_sort_descending());
        assert_eq!(
            keys(&view.all_pools(&records)),
            vec!["ETH:gnosis", "USDC:optimism", "ETH:optimism", "USDC:gnosis"]
        );

        // Switching columns resets to descending
        view.toggle_column_sort(SortColumn::UserBalance);
        assert!(view.is_sort_descending());
        assert_eq!(keys(&view.all_pools(&records))[0], "ETH:optimism");
    }

    #[test]
    fn test_user_pools_sorted_by_balance() {
        let records = sample();
        let mut view = ViewState::new();
        view.observe(&records);
        view.toggle_column_sort(SortColumn::Tvl);
        view.toggle_filter_token("ETH");

        assert_eq!(
            keys(&view.user_pools(&records)),
            vec!["ETH:optimism", "USDC:gnosis"]
        );
    }

    #[test]
    fn test_sort_column_parsing() {
        assert_eq!("tvl".parse::<SortColumn>().unwrap(), SortColumn::Tvl);
        assert_eq!("tvl_raw".parse::<SortColumn>().unwrap(), SortColumn::Tvl);
        assert_eq!(
            "userBalanceRaw".parse::<SortColumn>().unwrap(),
            SortColumn::UserBalance
        );
        assert_eq!(
            "totalApr".parse::<SortColumn>().unwrap(),
            SortColumn::TotalApr
        );
        assert_eq!(
            "staking-apr".parse::<SortColumn>().unwrap(),
            SortColumn::StakingApr
        );
        assert!("volume".parse::<SortColumn>().is_err());
        assert_eq!(SortColumn::StakingApr.to_string(), "stakingApr");
    }
}
