//! Pool catalog, enrichment stages and the views built on top of them

pub mod bridge;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod log;
pub mod pipeline;
pub mod pool;
pub mod resolver;
pub mod stages;
pub mod staking;
pub mod stats;
pub mod store;
pub mod view;

// Re-export main types for cleaner imports
pub use bridge::BridgeClient;
pub use error::PoolError;
pub use pipeline::{Pipeline, RunReport};
pub use pool::{ChainModel, PoolKey, PoolRecord, TokenModel};
pub use resolver::Resolver;
pub use stages::{Stage, StageContext, Trigger};
pub use staking::StakingClient;
pub use stats::StatsFeed;
pub use view::SortColumn;
