mod authentication;
pub mod http;
mod network;
mod relayer;
mod sign;
mod transaction;
pub mod types;

use std::sync::Arc;

pub use authentication::AuthenticationApi;
pub use network::NetworkApi;
pub use relayer::{RelayerAllowlist, RelayerApi};
pub use sign::SignApi;
pub use transaction::TransactionApi;
pub use types::{
    ApiBaseConfig, ApiResult, ApiSdkError, AuthConfig, CredentialsError, ListQuery,
    PagingContext, PagingResult,
};

use crate::api::http::HttpClient;

#[derive(Debug, Clone)]
pub struct HealthApi {
    client: Arc<HttpClient>,
}

impl HealthApi {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub async fn check(&self) -> ApiResult<()> {
        self.client.get_status("health").await
    }
}
