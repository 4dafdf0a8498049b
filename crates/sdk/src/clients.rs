use std::sync::Arc;

use crate::api::{
    ApiResult, AuthenticationApi, HealthApi, NetworkApi, RelayerAllowlist, RelayerApi, SignApi,
    TransactionApi,
    http::HttpClient,
    types::{ApiBaseConfig, AuthConfig},
};
use crate::types::StatusResponse;

#[derive(Debug, Clone)]
pub struct CreateClientConfig {
    pub server_url: String,
    pub auth: AuthConfig,
}

/// Authenticated handle onto every resource the relayer server exposes.
///
/// All resource APIs share one [`HttpClient`], so cloning a `Client` is cheap
/// and every clone sends the same credentials.
#[derive(Debug, Clone)]
pub struct Client {
    config: CreateClientConfig,
    authentication_api: AuthenticationApi,
    network_api: NetworkApi,
    relayer_api: RelayerApi,
    sign_api: SignApi,
    transaction_api: TransactionApi,
    health_api: HealthApi,
}

impl Client {
    pub fn new(config: CreateClientConfig) -> Self {
        let api_base_config =
            ApiBaseConfig { server_url: config.server_url.clone(), auth: config.auth.clone() };
        let client = Arc::new(HttpClient::new(api_base_config));

        Self {
            config,
            authentication_api: AuthenticationApi::new(Arc::clone(&client)),
            network_api: NetworkApi::new(Arc::clone(&client)),
            relayer_api: RelayerApi::new(Arc::clone(&client)),
            sign_api: SignApi::new(Arc::clone(&client)),
            transaction_api: TransactionApi::new(Arc::clone(&client)),
            health_api: HealthApi::new(Arc::clone(&client)),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.config.auth
    }

    pub fn relayer(&self) -> &RelayerApi {
        &self.relayer_api
    }

    pub fn allowlist(&self) -> &RelayerAllowlist {
        &self.relayer_api.allowlist
    }

    pub fn network(&self) -> &NetworkApi {
        &self.network_api
    }

    pub fn transaction(&self) -> &TransactionApi {
        &self.transaction_api
    }

    pub fn sign(&self) -> &SignApi {
        &self.sign_api
    }

    pub fn health(&self) -> &HealthApi {
        &self.health_api
    }

    /// Asks the server whether the configured credentials are accepted.
    pub async fn authenticated(&self) -> ApiResult<StatusResponse> {
        self.authentication_api.test_auth().await
    }
}

pub fn create_client(config: CreateClientConfig) -> Client {
    Client::new(config)
}
