use std::fmt;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayerId(String);

impl RelayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RelayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relayer {
    pub id: RelayerId,
    pub name: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub address: Address,
    #[serde(rename = "maxGasPrice", skip_serializing_if = "Option::is_none", default)]
    pub max_gas_price: Option<String>,
    pub paused: bool,
    #[serde(rename = "eip1559Enabled")]
    pub eip_1559_enabled: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRelayerResult {
    pub relayer: Relayer,
    #[serde(rename = "providerUrls", default)]
    pub provider_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelayerResult {
    pub id: RelayerId,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(rename = "providerUrls")]
    pub provider_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionSpeed {
    Slow,
    Medium,
    Fast,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Inmempool,
    Mined,
    Confirmed,
    Failed,
    Expired,
    Cancelled,
    Replaced,
    Dropped,
}

impl TransactionStatus {
    /// Whether the relayer is still working on the transaction.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TransactionStatus::Pending | TransactionStatus::Inmempool)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "relayerId")]
    pub relayer_id: RelayerId,
    pub to: Address,
    pub from: Address,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    pub status: TransactionStatus,
    #[serde(rename = "txHash", default)]
    pub hash: Option<String>,
    #[serde(rename = "externalId", default)]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayTransactionRequest {
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub speed: Option<TransactionSpeed>,
    #[serde(rename = "externalId", skip_serializing_if = "Option::is_none", default)]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub blobs: Option<Vec<String>>,
}

impl RelayTransactionRequest {
    pub fn new(to: Address) -> Self {
        Self { to, value: None, data: None, speed: None, external_id: None, blobs: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionResult {
    pub id: TransactionId,
    pub hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayTransactionStatusResult {
    pub hash: Option<String>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub receipt: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTextResult {
    #[serde(rename = "messageSigned")]
    pub message_signed: String,
    pub signature: serde_json::Value,
    #[serde(rename = "signedBy", default)]
    pub signed_by: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignTypedDataResult {
    pub signature: serde_json::Value,
    #[serde(rename = "signedBy", default)]
    pub signed_by: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub authenticated: bool,
    pub message: String,
}
