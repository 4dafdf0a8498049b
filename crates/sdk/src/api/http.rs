use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::api::types::{ApiBaseConfig, ApiResult, ApiSdkError, AuthConfig};

pub const API_KEY_HEADER_NAME: &str = "x-api-key";

/// Upper bound for one request, connect to last body byte.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_config: ApiBaseConfig,
}

impl HttpClient {
    pub fn new(base_config: ApiBaseConfig) -> Self {
        Self::with_timeout(base_config, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_config: ApiBaseConfig, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { client, base_config }
    }

    pub fn server_url(&self) -> &str {
        &self.base_config.server_url
    }

    pub(crate) fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_config.server_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub(crate) fn build_headers(
        &self,
        additional_headers: Option<HeaderMap>,
    ) -> ApiResult<HeaderMap> {
        let mut headers = auth_headers(&self.base_config.auth)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(additional) = additional_headers {
            for (key, value) in additional {
                if let Some(key) = key {
                    headers.insert(key, value);
                }
            }
        }

        Ok(headers)
    }

    fn request(&self, builder: RequestBuilder) -> ApiResult<RequestBuilder> {
        Ok(builder.headers(self.build_headers(None)?))
    }

    pub async fn get<T>(&self, endpoint: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(endpoint);
        let response = self.request(self.client.get(&url))?.send().await?;

        Ok(ensure_success(response).await?.json::<T>().await?)
    }

    /// Like [`HttpClient::get`] but a 404 becomes `Ok(None)`.
    pub async fn get_or_none<T>(&self, endpoint: &str) -> ApiResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(endpoint);
        let response = self.request(self.client.get(&url))?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(ensure_success(response).await?.json::<T>().await?))
    }

    pub async fn get_with_query<T, Q>(&self, endpoint: &str, query: Option<&Q>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint);

        let mut request = self.request(self.client.get(&url))?;
        if let Some(q) = query {
            request = request.query(q);
        }

        let response = request.send().await?;
        Ok(ensure_success(response).await?.json::<T>().await?)
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint);
        let response = self.request(self.client.post(&url))?.json(body).send().await?;

        Ok(ensure_success(response).await?.json::<T>().await?)
    }

    pub async fn post_status<B>(&self, endpoint: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint);
        let response = self.request(self.client.post(&url))?.json(body).send().await?;

        ensure_success(response).await?;
        Ok(())
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint);
        let response = self.request(self.client.put(&url))?.json(body).send().await?;

        Ok(ensure_success(response).await?.json::<T>().await?)
    }

    pub async fn put_status<B>(&self, endpoint: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(endpoint);
        let response = self.request(self.client.put(&url))?.json(body).send().await?;

        ensure_success(response).await?;
        Ok(())
    }

    pub async fn delete_status(&self, endpoint: &str) -> ApiResult<()> {
        let url = self.build_url(endpoint);
        let response = self.request(self.client.delete(&url))?.send().await?;

        ensure_success(response).await?;
        Ok(())
    }

    /// Unauthenticated GET that only cares about the status code.
    pub async fn get_status(&self, endpoint: &str) -> ApiResult<()> {
        let url = self.build_url(endpoint);
        let response = self.client.get(&url).send().await?;

        ensure_success(response).await?;
        Ok(())
    }
}

/// Builds the credential header for one auth mode.
pub fn auth_headers(auth: &AuthConfig) -> ApiResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    match auth {
        AuthConfig::ApiKey { api_key } => {
            let value = HeaderValue::from_str(api_key)
                .map_err(|e| ApiSdkError::ConfigError(format!("Invalid api key header: {}", e)))?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER_NAME), value);
        }
        AuthConfig::BasicAuth { username, password } => {
            let encoded = general_purpose::STANDARD.encode(format!("{}:{}", username, password));
            let value = HeaderValue::from_str(&format!("Basic {}", encoded)).map_err(|e| {
                ApiSdkError::ConfigError(format!("Invalid basic auth header: {}", e))
            })?;
            headers.insert(AUTHORIZATION, value);
        }
    }

    Ok(headers)
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiSdkError::RequestFailed { status: status.as_u16(), body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubServer;

    fn client(auth: AuthConfig) -> HttpClient {
        HttpClient::new(ApiBaseConfig { server_url: "http://localhost:8000/".to_string(), auth })
    }

    #[test]
    fn test_basic_auth_header() {
        let headers = auth_headers(&AuthConfig::BasicAuth {
            username: "alice".to_string(),
            password: "secret".to_string(),
        })
        .unwrap();

        // base64("alice:secret")
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic YWxpY2U6c2VjcmV0");
        assert!(headers.get(API_KEY_HEADER_NAME).is_none());
    }

    #[test]
    fn test_api_key_header() {
        let headers = auth_headers(&AuthConfig::ApiKey { api_key: "k1".to_string() }).unwrap();

        assert_eq!(headers.get(API_KEY_HEADER_NAME).unwrap(), "k1");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_api_key_with_invalid_header_characters_is_rejected() {
        let result = auth_headers(&AuthConfig::ApiKey { api_key: "bad\nkey".to_string() });
        assert!(matches!(result, Err(ApiSdkError::ConfigError(_))));
    }

    #[test]
    fn test_every_request_carries_content_type_and_credentials() {
        let http = client(AuthConfig::ApiKey { api_key: "k1".to_string() });
        let headers = http.build_headers(None).unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(API_KEY_HEADER_NAME).unwrap(), "k1");
    }

    #[tokio::test]
    async fn test_requests_to_a_silent_server_time_out() {
        let server = StubServer::silent().await;
        let base_config = ApiBaseConfig {
            server_url: server.url().to_string(),
            auth: AuthConfig::ApiKey { api_key: "k1".to_string() },
        };
        let http = HttpClient::with_timeout(base_config, Duration::from_millis(200));

        let result = tokio::time::timeout(Duration::from_secs(5), http.get_status("health"))
            .await
            .expect("request must be bounded by the client timeout");

        assert!(matches!(result, Err(ApiSdkError::HttpError(e)) if e.is_timeout()));
    }

    #[test]
    fn test_build_url_joins_without_duplicate_slashes() {
        let http = client(AuthConfig::ApiKey { api_key: "k1".to_string() });

        assert_eq!(http.build_url("/relayers"), "http://localhost:8000/relayers");
        assert_eq!(http.build_url("health"), "http://localhost:8000/health");
    }
}
