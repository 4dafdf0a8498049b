use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{TransactionId, TransactionStatus};

#[derive(Debug, Clone)]
pub struct ApiBaseConfig {
    pub server_url: String,
    pub auth: AuthConfig,
}

/// How every outbound request authenticates against the relayer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    BasicAuth { username: String, password: String },
    ApiKey { api_key: String },
}

impl AuthConfig {
    /// Resolves credentials from loosely supplied parts.
    ///
    /// Exactly one form must be present: an API key on its own, or a full
    /// username/password pair. Empty strings are treated as absent.
    pub fn resolve(
        username: Option<&str>,
        password: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, CredentialsError> {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);
        let username = present(username);
        let password = present(password);
        let api_key = present(api_key);

        match (username, password, api_key) {
            (None, None, Some(api_key)) => Ok(AuthConfig::ApiKey { api_key }),
            (Some(username), Some(password), None) => {
                Ok(AuthConfig::BasicAuth { username, password })
            }
            (None, None, None) => Err(CredentialsError::Missing),
            (_, _, Some(_)) => Err(CredentialsError::Conflicting),
            _ => Err(CredentialsError::IncompleteBasicAuth),
        }
    }

    pub fn is_api_key(&self) -> bool {
        matches!(self, AuthConfig::ApiKey { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("No credentials supplied, provide either a username and password or an api key")]
    Missing,

    #[error("Both an api key and basic auth credentials were supplied, only one may be used")]
    Conflicting,

    #[error("Basic auth needs both a username and a password")]
    IncompleteBasicAuth,
}

#[derive(Error, Debug)]
pub enum ApiSdkError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid credentials: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Transaction {0} not found")]
    TransactionNotFound(TransactionId),

    #[error("Transaction {id} ended as {status:?} without being mined")]
    TransactionNotMined { id: TransactionId, status: TransactionStatus },

    #[error("Transaction {id} was still in flight after {attempts} checks ({elapsed:?})")]
    ReceiptTimeout { id: TransactionId, attempts: u32, elapsed: Duration },
}

impl ApiSdkError {
    /// The HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiSdkError::RequestFailed { status, .. } => Some(*status),
            ApiSdkError::HttpError(error) => error.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiSdkError>;

pub const DEFAULT_PAGING_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagingContext {
    pub limit: u32,
    pub offset: u32,
}

impl Default for PagingContext {
    fn default() -> Self {
        Self { limit: DEFAULT_PAGING_LIMIT, offset: 0 }
    }
}

impl PagingContext {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// The following page, or `None` once a page came back empty.
    pub fn next(&self, result_length: usize) -> Option<Self> {
        if result_length == 0 {
            return None;
        }

        Some(Self { limit: self.limit, offset: self.offset + self.limit })
    }

    /// The preceding page, or `None` when already on the first one.
    pub fn previous(&self) -> Option<Self> {
        if self.offset == 0 {
            return None;
        }

        Some(Self { limit: self.limit, offset: self.offset.saturating_sub(self.limit) })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<PagingContext>,
    #[serde(default)]
    pub previous: Option<PagingContext>,
}

/// Query string for list endpoints: paging plus an optional chain filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u32,
    #[serde(rename = "chainId", skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl ListQuery {
    pub fn new(paging: &PagingContext, chain_id: Option<u64>) -> Self {
        Self { limit: paging.limit, offset: paging.offset, chain_id }
    }
}

impl From<&PagingContext> for ListQuery {
    fn from(paging: &PagingContext) -> Self {
        Self::new(paging, None)
    }
}
