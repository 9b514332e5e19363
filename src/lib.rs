pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::pools::PoolsOptions;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::pipeline::Pipeline;
use crate::core::stages::StageContext;
use crate::providers::bridge_api::HttpBridgeClient;
use crate::providers::config_resolver::ConfigResolver;
use crate::providers::staking_rpc::JsonRpcStakingClient;
use crate::providers::stats_feed::HttpStatsFeed;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Pools(PoolsOptions),
    Positions { account: Option<String> },
}

/// Wires the HTTP and RPC clients described by `config` into a stage context.
pub fn build_context(config: Arc<AppConfig>) -> StageContext {
    let rpc_urls: HashMap<String, String> = config
        .chains
        .iter()
        .filter_map(|c| c.rpc_url.clone().map(|url| (c.slug.clone(), url)))
        .collect();
    let ttl = config.cache.ttl();

    StageContext {
        bridge: Arc::new(HttpBridgeClient::new(
            config.providers.bridge_url(),
            &config.catalog,
        )),
        stats: Arc::new(HttpStatsFeed::new(config.providers.stats_url())),
        staking: Arc::new(JsonRpcStakingClient::new(rpc_urls)),
        staking_contracts: Arc::new(config.staking_contracts()),
        tvl_cache: Cache::with_ttl(ttl),
        rewards_cache: Cache::with_ttl(ttl),
        resolver: Arc::new(ConfigResolver::new(config)),
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("poolview starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let config = Arc::new(config);
    let tokens = config.catalog_tokens();
    let default_account = config.account.clone();
    let ctx = build_context(config);

    match command {
        AppCommand::Pools(options) => {
            let mut pipeline = Pipeline::new(ctx, tokens, default_account);
            cli::pools::run(&mut pipeline, &options).await
        }
        AppCommand::Positions { account } => {
            let account = account.or(default_account);
            let mut pipeline = Pipeline::new(ctx, tokens, account);
            cli::positions::run(&mut pipeline).await
        }
    }
}
