use alloy::primitives::Address;
use std::sync::Arc;

use crate::api::{
    http::HttpClient,
    types::{ApiResult, ListQuery, PagingContext, PagingResult},
};
use crate::types::RelayerId;

#[derive(Debug, Clone)]
pub struct RelayerAllowlist {
    client: Arc<HttpClient>,
}

impl RelayerAllowlist {
    pub(crate) fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub async fn add(&self, relayer_id: &RelayerId, address: &Address) -> ApiResult<()> {
        self.client
            .post_status(&format!("relayers/{}/allowlists/{}", relayer_id, address), &())
            .await
    }

    pub async fn delete(&self, relayer_id: &RelayerId, address: &Address) -> ApiResult<()> {
        self.client.delete_status(&format!("relayers/{}/allowlists/{}", relayer_id, address)).await
    }

    pub async fn get_all(
        &self,
        relayer_id: &RelayerId,
        paging: &PagingContext,
    ) -> ApiResult<PagingResult<Address>> {
        self.client
            .get_with_query(
                &format!("relayers/{}/allowlists", relayer_id),
                Some(&ListQuery::from(paging)),
            )
            .await
    }
}
