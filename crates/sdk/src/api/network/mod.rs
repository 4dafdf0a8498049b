use std::sync::Arc;

use crate::api::{http::HttpClient, types::ApiResult};
use crate::types::Network;

#[derive(Debug, Clone)]
pub struct NetworkApi {
    client: Arc<HttpClient>,
}

impl NetworkApi {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Get all networks
    pub async fn get_all(&self) -> ApiResult<Vec<Network>> {
        self.client.get("networks").await
    }

    pub async fn get(&self, chain_id: u64) -> ApiResult<Option<Network>> {
        self.client.get_or_none(&format!("networks/{}", chain_id)).await
    }

    /// Get enabled networks
    pub async fn get_enabled(&self) -> ApiResult<Vec<Network>> {
        self.client.get("networks/enabled").await
    }

    /// Get disabled networks
    pub async fn get_disabled(&self) -> ApiResult<Vec<Network>> {
        self.client.get("networks/disabled").await
    }

    /// Gas price estimates per speed for a chain.
    ///
    /// The estimator payload differs per gas provider so it is returned as raw JSON.
    pub async fn get_gas_prices(&self, chain_id: u64) -> ApiResult<Option<serde_json::Value>> {
        self.client.get_or_none(&format!("networks/gas/price/{}", chain_id)).await
    }
}
