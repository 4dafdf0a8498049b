use std::sync::Arc;

use crate::api::{
    http::HttpClient,
    types::{ApiResult, ListQuery, PagingContext, PagingResult},
};
use crate::types::{RelayerId, SignTextResult, SignTypedDataResult};

#[derive(Debug, Clone)]
pub struct SignApi {
    client: Arc<HttpClient>,
}

impl SignApi {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub async fn sign_text(&self, relayer_id: &RelayerId, text: &str) -> ApiResult<SignTextResult> {
        self.client
            .post(
                &format!("relayers/{}/sign/message", relayer_id),
                &serde_json::json!({ "text": text }),
            )
            .await
    }

    /// `typed_data` is an EIP-712 document in its JSON form.
    pub async fn sign_typed_data(
        &self,
        relayer_id: &RelayerId,
        typed_data: &serde_json::Value,
    ) -> ApiResult<SignTypedDataResult> {
        self.client.post(&format!("relayers/{}/sign/typed-data", relayer_id), typed_data).await
    }

    pub async fn get_text_history(
        &self,
        relayer_id: &RelayerId,
        paging: &PagingContext,
    ) -> ApiResult<PagingResult<serde_json::Value>> {
        self.client
            .get_with_query(
                &format!("signing/relayers/{}/text-history", relayer_id),
                Some(&ListQuery::from(paging)),
            )
            .await
    }

    pub async fn get_typed_data_history(
        &self,
        relayer_id: &RelayerId,
        paging: &PagingContext,
    ) -> ApiResult<PagingResult<serde_json::Value>> {
        self.client
            .get_with_query(
                &format!("signing/relayers/{}/typed-data-history", relayer_id),
                Some(&ListQuery::from(paging)),
            )
            .await
    }
}
