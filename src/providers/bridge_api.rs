use super::util::{RETRIES, RETRY_DELAY_MS, http_client, with_retry};
use crate::core::bridge::BridgeClient;
use crate::core::config::CatalogEntry;
use crate::core::error::{PoolError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TvlResponse {
    tvl_usd: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    balance_usd: f64,
}

/// Bridge client backed by the bridge's REST API. Supported chains come
/// from the configured catalog.
pub struct HttpBridgeClient {
    base_url: String,
    client: reqwest::Client,
    catalog: HashMap<String, Vec<String>>,
}

impl HttpBridgeClient {
    pub fn new(base_url: &str, catalog: &[CatalogEntry]) -> Self {
        HttpBridgeClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
            catalog: catalog
                .iter()
                .map(|e| (e.token.clone(), e.chains.clone()))
                .collect(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Requesting bridge data from {} with {:?}", url, query);
        let response = with_retry(
            || async { self.client.get(&url).query(query).send().await },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| PoolError::Network(format!("Request failed for {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PoolError::Network(format!("HTTP error: {status} for {url}")));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(error = ?e, response = %body, "Failed to parse bridge response");
            PoolError::Network(format!("Failed to parse response for {url}: {e}"))
        })
    }
}

#[async_trait]
impl BridgeClient for HttpBridgeClient {
    async fn supported_chains(&self, token: &str) -> Result<Vec<String>> {
        Ok(self.catalog.get(token).cloned().unwrap_or_default())
    }

    async fn tvl_usd(&self, token: &str, chain: &str) -> Result<f64> {
        let response: TvlResponse = self
            .get_json("/v1/tvl", &[("token", token), ("chain", chain)])
            .await?;
        Ok(response.tvl_usd)
    }

    async fn account_lp_balance_usd(
        &self,
        token: &str,
        chain: &str,
        account: &str,
    ) -> Result<f64> {
        let response: BalanceResponse = self
            .get_json(
                "/v1/balance",
                &[("token", token), ("chain", chain), ("account", account)],
            )
            .await?;
        Ok(response.balance_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog() -> Vec<CatalogEntry> {
        vec![CatalogEntry {
            token: "USDC".to_string(),
            chains: vec!["optimism".to_string(), "arbitrum".to_string()],
        }]
    }

    #[tokio::test]
    async fn test_supported_chains_from_catalog() {
        let client = HttpBridgeClient::new("http://localhost", &catalog());
        assert_eq!(
            client.supported_chains("USDC").await.unwrap(),
            vec!["optimism", "arbitrum"]
        );
        assert!(client.supported_chains("DAI").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_tvl() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tvl"))
            .and(query_param("token", "USDC"))
            .and(query_param("chain", "optimism"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"tvlUsd": 1520340.25}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpBridgeClient::new(&mock_server.uri(), &catalog());
        let tvl = client.tvl_usd("USDC", "optimism").await.unwrap();
        assert_eq!(tvl, 1520340.25);
    }

    #[tokio::test]
    async fn test_fetch_balance() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/balance"))
            .and(query_param("account", "0xabc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"balanceUsd": 12.5}"#))
            .mount(&mock_server)
            .await;

        let client = HttpBridgeClient::new(&mock_server.uri(), &catalog());
        let balance = client
            .account_lp_balance_usd("USDC", "optimism", "0xabc")
            .await
            .unwrap();
        assert_eq!(balance, 12.5);
    }

    #[tokio::test]
    async fn test_http_error_is_network_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tvl"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = HttpBridgeClient::new(&mock_server.uri(), &catalog());
        let err = client.tvl_usd("USDC", "optimism").await.unwrap_err();
        assert!(matches!(err, PoolError::Network(_)));
        assert!(err.to_string().contains("HTTP error: 500"));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/tvl"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"tvl": "lots"}"#))
            .mount(&mock_server)
            .await;

        let client = HttpBridgeClient::new(&mock_server.uri(), &catalog());
        let err = client.tvl_usd("USDC", "optimism").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse response"));
    }

    #[tokio::test]
    async fn test_query_values_are_encoded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/balance"))
            .and(query_param("chain", "optimism"))
            .and(query_param("account", "0xabc&chain=arbitrum"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"balanceUsd": 3.0}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpBridgeClient::new(&mock_server.uri(), &catalog());
        let balance = client
            .account_lp_balance_usd("USDC", "optimism", "0xabc&chain=arbitrum")
            .await
            .unwrap();
        assert_eq!(balance, 3.0);
    }
}
