//! Error taxonomy for the external lookups feeding the pipeline.

use thiserror::Error;

/// Failures surfaced by the pipeline's collaborators.
///
/// None of these abort a run. Per-record variants are logged and the record
/// falls back to a neutral value; `FeedFetch` skips the whole stats stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Stats feed fetch failed: {0}")]
    FeedFetch(String),

    #[error("Malformed stats data: {0}")]
    MalformedFeedData(String),
}

impl From<reqwest::Error> for PoolError {
    fn from(err: reqwest::Error) -> Self {
        PoolError::Network(err.to_string())
    }
}

pub type Result<T, E = PoolError> = std::result::Result<T, E>;
