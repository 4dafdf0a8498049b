use std::sync::Arc;

use crate::api::{http::HttpClient, types::ApiResult};
use crate::types::StatusResponse;

#[derive(Debug, Clone)]
pub struct AuthenticationApi {
    client: Arc<HttpClient>,
}

impl AuthenticationApi {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Calls the auth status endpoint with the configured credentials
    pub async fn test_auth(&self) -> ApiResult<StatusResponse> {
        self.client.get("auth/status").await
    }
}
