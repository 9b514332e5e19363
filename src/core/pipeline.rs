//! Drives the enrichment stages and owns every piece of mutable state.
//!
//! All lookups are polled from one task and their events merged on that
//! same task, so the store is never shared and needs no lock.

use crate::core::catalog::build_catalog;
use crate::core::error::PoolError;
use crate::core::pool::PoolRecord;
use crate::core::stages::{
    Lookup, Stage, StageContext, StageEvent, StageOutcome, Trigger, claimable_rewards_lookups,
    remote_stats_lookups, tvl_lookups, user_balance_lookups,
};
use crate::core::store::AggregateStore;
use crate::core::view::{FilterChain, FilterToken, SortColumn, ViewState};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, error, info, warn};

/// What a pipeline run did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunReport {
    pub stages: Vec<Stage>,
    /// Patches that changed a record.
    pub applied: usize,
    /// Per-record lookups that failed.
    pub failed: usize,
    /// Outcomes launched for an account that is no longer active.
    pub stale: usize,
    pub stage_failures: Vec<(Stage, PoolError)>,
}

impl RunReport {
    fn absorb(&mut self, other: RunReport) {
        for stage in other.stages {
            if !self.stages.contains(&stage) {
                self.stages.push(stage);
            }
        }
        self.applied += other.applied;
        self.failed += other.failed;
        self.stale += other.stale;
        self.stage_failures.extend(other.stage_failures);
    }
}

pub struct Pipeline {
    ctx: StageContext,
    tokens: Vec<String>,
    store: AggregateStore,
    view: ViewState,
    account: Option<String>,
    catalog_ready: bool,
}

impl Pipeline {
    pub fn new(ctx: StageContext, tokens: Vec<String>, account: Option<String>) -> Self {
        Self {
            ctx,
            tokens,
            store: AggregateStore::default(),
            view: ViewState::new(),
            account,
            catalog_ready: false,
        }
    }

    /// Builds the catalog and runs every stage that waits on it.
    ///
    /// The catalog is built once per pipeline; later calls are no-ops.
    pub async fn start(&mut self) -> RunReport {
        if self.catalog_ready {
            warn!("Catalog already built, ignoring start");
            return RunReport::default();
        }

        let records =
            build_catalog(&self.tokens, self.ctx.bridge.as_ref(), self.ctx.resolver.as_ref()).await;
        self.store = AggregateStore::new(records);
        self.view.observe(self.store.records());
        self.catalog_ready = true;
        info!("Catalog ready with {} pools", self.store.len());

        self.run(Trigger::CatalogReady).await
    }

    pub fn is_ready(&self) -> bool {
        self.catalog_ready
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Sets the active account without re-running anything. Returns whether
    /// it changed; callers then fire [`Trigger::AccountChanged`].
    pub fn set_account(&mut self, account: Option<String>) -> bool {
        if self.account == account {
            return false;
        }
        self.account = account;
        true
    }

    /// Switches account and re-runs the stages depending on it.
    pub async fn change_account(&mut self, account: Option<String>) -> RunReport {
        if !self.set_account(account) {
            return RunReport::default();
        }
        self.run(Trigger::AccountChanged).await
    }

    /// Lookups for every stage depending on `trigger`, tagged with the
    /// current account. Empty until the catalog is built.
    pub fn launch(&self, trigger: Trigger) -> (Vec<Stage>, Vec<Lookup>) {
        if !self.catalog_ready {
            debug!("Catalog not ready, ignoring {:?}", trigger);
            return (Vec::new(), Vec::new());
        }

        let stages = Stage::triggered_by(trigger);
        let keys = self.store.keys();
        let account = self.account.as_deref();
        let mut lookups = Vec::new();
        for stage in &stages {
            debug!("Launching {stage} stage for {:?}", trigger);
            let batch = match stage {
                Stage::Tvl => tvl_lookups(&self.ctx, &keys),
                Stage::UserBalance => user_balance_lookups(&self.ctx, &keys, account),
                Stage::RemoteStats => remote_stats_lookups(&self.ctx, &keys),
                Stage::ClaimableRewards => {
                    claimable_rewards_lookups(&self.ctx, self.store.records(), account)
                }
            };
            lookups.extend(batch);
        }
        (stages, lookups)
    }

    /// Merges one lookup's events into the store.
    pub fn merge(&mut self, events: Vec<StageEvent>) -> RunReport {
        let mut report = RunReport::default();
        for event in events {
            match event {
                StageEvent::Record(outcome) => self.merge_outcome(outcome, &mut report),
                StageEvent::StageFailed { stage, error } => {
                    error!(stage = %stage, error = %error, "Stage failed, no pools updated");
                    report.stage_failures.push((stage, error));
                }
            }
        }
        report
    }

    fn merge_outcome(&mut self, outcome: StageOutcome, report: &mut RunReport) {
        let StageOutcome {
            stage,
            key,
            account,
            patch,
            error,
        } = outcome;

        if stage.is_account_scoped() && account != self.account {
            debug!("Dropping stale {stage} result for {key}");
            report.stale += 1;
            return;
        }
        if let Some(e) = error {
            warn!(stage = %stage, pool = %key, error = %e, "Pool lookup failed");
            report.failed += 1;
        }
        if let Some(patch) = patch
            && self.store.apply(&key, patch)
        {
            report.applied += 1;
        }
    }

    /// Runs every stage depending on `trigger`, merging each lookup as soon
    /// as it resolves.
    pub async fn run(&mut self, trigger: Trigger) -> RunReport {
        let (stages, lookups) = self.launch(trigger);
        let mut report = RunReport {
            stages,
            ..RunReport::default()
        };

        let mut pending: FuturesUnordered<Lookup> = lookups.into_iter().collect();
        while let Some(events) = pending.next().await {
            let merged = self.merge(events);
            report.absorb(merged);
        }
        self.view.observe(self.store.records());

        info!(
            applied = report.applied,
            failed = report.failed,
            stale = report.stale,
            "Finished {:?} run",
            trigger
        );
        report
    }

    /// Drops every cached TVL and reward lookup.
    pub async fn clear_caches(&self) {
        self.ctx.tvl_cache.clear().await;
        self.ctx.rewards_cache.clear().await;
    }

    pub fn records(&self) -> &[PoolRecord] {
        self.store.records()
    }

    pub fn store(&self) -> &AggregateStore {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn all_pools(&self) -> Vec<&PoolRecord> {
        self.view.all_pools(self.store.records())
    }

    pub fn user_pools(&self) -> Vec<&PoolRecord> {
        self.view.user_pools(self.store.records())
    }

    pub fn filter_tokens(&self) -> &[FilterToken] {
        self.view.filter_tokens()
    }

    pub fn filter_chains(&self) -> &[FilterChain] {
        self.view.filter_chains()
    }

    pub fn toggle_filter_token(&mut self, symbol: &str) -> bool {
        self.view.toggle_filter_token(symbol)
    }

    pub fn toggle_filter_chain(&mut self, slug: &str) -> bool {
        self.view.toggle_filter_chain(slug)
    }

    pub fn toggle_column_sort(&mut self, column: SortColumn) {
        self.view.toggle_column_sort(column)
    }
}
