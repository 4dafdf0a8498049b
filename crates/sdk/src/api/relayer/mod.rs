mod allowlist;

pub use allowlist::RelayerAllowlist;
use std::sync::Arc;

use crate::api::{
    http::HttpClient,
    types::{ApiResult, ListQuery, PagingContext, PagingResult},
};
use crate::types::{CreateRelayerResult, GetRelayerResult, Relayer, RelayerId};

#[derive(Debug, Clone)]
pub struct RelayerApi {
    client: Arc<HttpClient>,
    pub allowlist: RelayerAllowlist,
}

impl RelayerApi {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { allowlist: RelayerAllowlist::new(Arc::clone(&client)), client }
    }

    pub async fn get_all(
        &self,
        chain_id: Option<u64>,
        paging: &PagingContext,
    ) -> ApiResult<PagingResult<Relayer>> {
        let query = ListQuery::new(paging, chain_id);
        self.client.get_with_query("relayers", Some(&query)).await
    }

    pub async fn get(&self, id: &RelayerId) -> ApiResult<Option<GetRelayerResult>> {
        self.client.get_or_none(&format!("relayers/{}", id)).await
    }

    pub async fn create(&self, chain_id: u64, name: &str) -> ApiResult<CreateRelayerResult> {
        self.client
            .post(&format!("relayers/{}/new", chain_id), &serde_json::json!({ "name": name }))
            .await
    }

    pub async fn clone_relayer(
        &self,
        id: &RelayerId,
        chain_id: u64,
        name: &str,
    ) -> ApiResult<CreateRelayerResult> {
        self.client
            .post(
                &format!("relayers/{}/clone", id),
                &serde_json::json!({ "newRelayerName": name, "chainId": chain_id }),
            )
            .await
    }

    pub async fn delete(&self, id: &RelayerId) -> ApiResult<()> {
        self.client.delete_status(&format!("relayers/{}", id)).await
    }

    pub async fn pause(&self, id: &RelayerId) -> ApiResult<()> {
        self.client.put_status(&format!("relayers/{}/pause", id), &()).await
    }

    pub async fn unpause(&self, id: &RelayerId) -> ApiResult<()> {
        self.client.put_status(&format!("relayers/{}/unpause", id), &()).await
    }

    pub async fn update_eip1559_status(&self, id: &RelayerId, status: bool) -> ApiResult<()> {
        self.client.put_status(&format!("relayers/{}/gas/eip1559/{}", id, status), &()).await
    }

    pub async fn update_max_gas_price<T: ToString>(&self, id: &RelayerId, cap: T) -> ApiResult<()> {
        self.client.put_status(&format!("relayers/{}/gas/max/{}", id, cap.to_string()), &()).await
    }

    pub async fn remove_max_gas_price(&self, id: &RelayerId) -> ApiResult<()> {
        self.client.put_status(&format!("relayers/{}/gas/max/0", id), &()).await
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;
    use crate::test_support::StubServer;

    const CREATED: &str = r#"{"id":"r-2","address":"0x5FCD072a0BD58B6fa413031582E450FE724dba6D"}"#;

    #[tokio::test]
    async fn test_clone_and_gas_setting_endpoints() {
        let server = StubServer::json(CREATED).await;
        let client = server.client();
        let id = RelayerId::new("r-1");

        let cloned = client.relayer().clone_relayer(&id, 31337, "copy").await.unwrap();
        client.relayer().update_eip1559_status(&id, false).await.unwrap();
        client.relayer().update_max_gas_price(&id, 2_000_000_000u64).await.unwrap();
        client.relayer().remove_max_gas_price(&id).await.unwrap();
        client.relayer().delete(&cloned.id).await.unwrap();

        assert_eq!(cloned.id, RelayerId::new("r-2"));
        assert_eq!(
            server.request_lines(),
            vec![
                "POST /relayers/r-1/clone",
                "PUT /relayers/r-1/gas/eip1559/false",
                "PUT /relayers/r-1/gas/max/2000000000",
                "PUT /relayers/r-1/gas/max/0",
                "DELETE /relayers/r-2",
            ]
        );
        let body: serde_json::Value = serde_json::from_str(&server.requests()[0].body).unwrap();
        assert_eq!(body, serde_json::json!({ "newRelayerName": "copy", "chainId": 31337 }));
    }

    #[tokio::test]
    async fn test_list_endpoints_send_paging_and_chain_filter() {
        let server = StubServer::json(r#"{"items":[]}"#).await;
        let client = server.client();
        let id = RelayerId::new("r-1");

        client.relayer().get_all(Some(31337), &PagingContext::default()).await.unwrap();
        client.relayer().get_all(None, &PagingContext::new(10, 20)).await.unwrap();
        client.allowlist().get_all(&id, &PagingContext::default()).await.unwrap();

        assert_eq!(
            server.request_lines(),
            vec![
                "GET /relayers?limit=100&offset=0&chainId=31337",
                "GET /relayers?limit=10&offset=20",
                "GET /relayers/r-1/allowlists?limit=100&offset=0",
            ]
        );
    }

    #[tokio::test]
    async fn test_allowlist_add_and_delete_use_the_address_path() {
        let server = StubServer::json("{}").await;
        let client = server.client();
        let id = RelayerId::new("r-1");
        let allowed = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        client.allowlist().add(&id, &allowed).await.unwrap();
        client.allowlist().delete(&id, &allowed).await.unwrap();

        assert_eq!(
            server.request_lines(),
            vec![
                format!("POST /relayers/r-1/allowlists/{}", allowed),
                format!("DELETE /relayers/r-1/allowlists/{}", allowed),
            ]
        );
    }
}
