use std::time::Duration;

use alloy::primitives::{Address, U256, address, utils::parse_ether};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::info;

use crate::error::NodeRpcError;

/// First account of the anvil dev mnemonic, unlocked on every local node.
pub const DEV_ACCOUNT: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC client for the local dev node.
#[derive(Debug, Clone)]
pub struct NodeRpc {
    client: Client,
    url: String,
}

impl NodeRpc {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_default();
        Self { client, url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, NodeRpcError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(NodeRpcError::Rpc { code: error.code, message: error.message });
        }

        let result = response.result.unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|e| NodeRpcError::InvalidResponse(format!("{}: {}", method, e)))
    }

    pub async fn block_number(&self) -> Result<u64, NodeRpcError> {
        let hex: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&hex)
    }

    pub async fn chain_id(&self) -> Result<u64, NodeRpcError> {
        let hex: String = self.call("eth_chainId", json!([])).await?;
        parse_quantity(&hex)
    }

    pub async fn balance(&self, account: &Address) -> Result<U256, NodeRpcError> {
        let hex: String = self.call("eth_getBalance", json!([account, "latest"])).await?;
        U256::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| NodeRpcError::InvalidResponse(format!("eth_getBalance: {}", e)))
    }

    /// Sends value from an account the node holds the key for. Returns the tx hash.
    pub async fn send_transaction(
        &self,
        from: &Address,
        to: &Address,
        value_wei: U256,
    ) -> Result<String, NodeRpcError> {
        let transaction = json!({
            "from": from,
            "to": to,
            "value": format!("0x{:x}", value_wei),
        });

        self.call("eth_sendTransaction", json!([transaction])).await
    }

    pub async fn mine_blocks(&self, blocks: u64) -> Result<(), NodeRpcError> {
        let _: Value = self.call("anvil_mine", json!([format!("0x{:x}", blocks)])).await?;
        Ok(())
    }
}

/// Sends `ether_amount` ETH from the dev account to `to` and mines it in.
pub async fn fund_address(
    node: &NodeRpc,
    to: &Address,
    ether_amount: &str,
    quiet: bool,
) -> Result<String, NodeRpcError> {
    let value = parse_ether(ether_amount)
        .map_err(|_| NodeRpcError::InvalidAmount(ether_amount.to_string()))?;

    if !quiet {
        info!("Funding {} with {} ETH...", to, ether_amount);
    }

    let hash = node.send_transaction(&DEV_ACCOUNT, to, value).await?;
    node.mine_blocks(1).await?;

    Ok(hash)
}

fn parse_quantity(hex: &str) -> Result<u64, NodeRpcError> {
    u64::from_str_radix(hex.trim_start_matches("0x"), 16)
        .map_err(|e| NodeRpcError::InvalidResponse(format!("{}: {}", hex, e)))
}
