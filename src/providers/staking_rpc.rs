use super::util::{RETRIES, RETRY_DELAY_MS, http_client, with_retry};
use crate::core::error::{PoolError, Result};
use crate::core::staking::StakingClient;
use alloy_primitives::{Address, U256, hex};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

sol! {
    function earned(address account) external view returns (uint256);
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

/// Reads `earned(account)` from staking rewards contracts with a plain
/// `eth_call` against each chain's JSON-RPC endpoint.
pub struct JsonRpcStakingClient {
    rpc_urls: HashMap<String, String>,
    client: reqwest::Client,
}

impl JsonRpcStakingClient {
    pub fn new(rpc_urls: HashMap<String, String>) -> Self {
        JsonRpcStakingClient {
            rpc_urls,
            client: http_client(),
        }
    }
}

/// ABI-encodes the call data for `earned(account)`.
fn encode_earned_call(account: &str) -> Result<String> {
    let account: Address = account
        .parse()
        .map_err(|e| PoolError::ContractCall(format!("Invalid account address {account}: {e}")))?;
    Ok(hex::encode_prefixed(earnedCall { account }.abi_encode()))
}

/// Decodes the `uint256` returned by `earned`.
fn decode_earned(result: &str) -> Result<U256> {
    let data = hex::decode(result)
        .map_err(|e| PoolError::ContractCall(format!("Invalid call result {result}: {e}")))?;
    if data.is_empty() {
        return Err(PoolError::ContractCall(
            "Empty call result, is the contract deployed?".to_string(),
        ));
    }
    earnedCall::abi_decode_returns(&data)
        .map_err(|e| PoolError::ContractCall(format!("Invalid call result {result}: {e}")))
}

#[async_trait]
impl StakingClient for JsonRpcStakingClient {
    async fn earned(&self, chain: &str, contract: &str, account: &str) -> Result<U256> {
        let rpc_url = self.rpc_urls.get(chain).ok_or_else(|| {
            PoolError::ContractCall(format!("No RPC endpoint configured for chain {chain}"))
        })?;

        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": contract, "data": encode_earned_call(account)? },
                "latest"
            ]
        });

        debug!("Calling earned() on {} ({})", contract, chain);
        let response = with_retry(
            || async { self.client.post(rpc_url).json(&payload).send().await },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| PoolError::ContractCall(format!("RPC request to {chain} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PoolError::ContractCall(format!(
                "HTTP error: {status} from {chain} RPC"
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| PoolError::ContractCall(format!("Invalid RPC response: {e}")))?;

        if let Some(err) = body.error {
            return Err(PoolError::ContractCall(format!(
                "RPC error {}: {}",
                err.code, err.message
            )));
        }
        let result = body
            .result
            .ok_or_else(|| PoolError::ContractCall("RPC response without result".to_string()))?;
        decode_earned(&result)
    }
}
