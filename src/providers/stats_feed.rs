use super::util::{RETRIES, RETRY_DELAY_MS, http_client, with_retry};
use crate::core::error::{PoolError, Result};
use crate::core::stats::{StatsDocument, StatsFeed};
use async_trait::async_trait;
use tracing::debug;

/// Fetches the pool stats document from a fixed URL.
pub struct HttpStatsFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpStatsFeed {
    pub fn new(url: &str) -> Self {
        HttpStatsFeed {
            url: url.to_string(),
            client: http_client(),
        }
    }
}

#[async_trait]
impl StatsFeed for HttpStatsFeed {
    async fn fetch(&self) -> Result<StatsDocument> {
        let response = with_retry(
            || async { self.client.get(&self.url).send().await },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| PoolError::FeedFetch(format!("Request failed for {}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PoolError::FeedFetch(format!(
                "HTTP error: {status} for {}",
                self.url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PoolError::FeedFetch(format!("Failed to read response: {e}")))?;
        debug!("Pool stats response: {} bytes", body.len());
        StatsDocument::parse(&body)
    }
}
