//! Network-backed implementations of the collaborator traits in `core`.

pub mod bridge_api;
pub mod config_resolver;
pub mod staking_rpc;
pub mod stats_feed;
pub mod util;
