use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::api::{
    http::HttpClient,
    types::{ApiResult, ApiSdkError, ListQuery, PagingContext, PagingResult},
};
use crate::types::{
    RelayTransactionRequest, RelayTransactionStatusResult, RelayerId, SendTransactionResult,
    Transaction, TransactionId, TransactionStatus,
};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const RECEIPT_MAX_ATTEMPTS: u32 = 120;

#[derive(Debug, Clone)]
pub struct TransactionApi {
    client: Arc<HttpClient>,
}

impl TransactionApi {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, transaction_id: &TransactionId) -> ApiResult<Option<Transaction>> {
        self.client.get_or_none(&format!("transactions/{}", transaction_id)).await
    }

    pub async fn get_by_external_id(&self, external_id: &str) -> ApiResult<Option<Transaction>> {
        self.client.get_or_none(&format!("transactions/external/{}", external_id)).await
    }

    pub async fn get_all(
        &self,
        relayer_id: &RelayerId,
        paging: &PagingContext,
    ) -> ApiResult<PagingResult<Transaction>> {
        self.client
            .get_with_query(
                &format!("transactions/relayers/{}", relayer_id),
                Some(&ListQuery::from(paging)),
            )
            .await
    }

    pub async fn send(
        &self,
        relayer_id: &RelayerId,
        transaction: &RelayTransactionRequest,
    ) -> ApiResult<SendTransactionResult> {
        self.client.post(&format!("transactions/relayers/{}/send", relayer_id), transaction).await
    }

    pub async fn replace(
        &self,
        transaction_id: &TransactionId,
        replacement: &RelayTransactionRequest,
    ) -> ApiResult<SendTransactionResult> {
        self.client.put(&format!("transactions/replace/{}", transaction_id), replacement).await
    }

    pub async fn cancel(&self, transaction_id: &TransactionId) -> ApiResult<()> {
        self.client.put_status(&format!("transactions/cancel/{}", transaction_id), &()).await
    }

    pub async fn get_status(
        &self,
        transaction_id: &TransactionId,
    ) -> ApiResult<Option<RelayTransactionStatusResult>> {
        self.client.get_or_none(&format!("transactions/status/{}", transaction_id)).await
    }

    pub async fn get_inmempool_count(&self, relayer_id: &RelayerId) -> ApiResult<u32> {
        self.client.get(&format!("transactions/relayers/{}/inmempool/count", relayer_id)).await
    }

    pub async fn get_pending_count(&self, relayer_id: &RelayerId) -> ApiResult<u32> {
        self.client.get(&format!("transactions/relayers/{}/pending/count", relayer_id)).await
    }

    /// Polls the status endpoint until the transaction leaves the queue,
    /// checking every 500 ms for up to a minute.
    ///
    /// Mined, confirmed and failed transactions resolve; expired, cancelled,
    /// replaced and dropped ones are reported as errors.
    pub async fn wait_for_transaction_receipt_by_id(
        &self,
        transaction_id: &TransactionId,
    ) -> ApiResult<RelayTransactionStatusResult> {
        self.wait_for_transaction_receipt_with(
            transaction_id,
            RECEIPT_MAX_ATTEMPTS,
            RECEIPT_POLL_INTERVAL,
        )
        .await
    }

    /// Makes at most `max_attempts` status checks (at least one), sleeping
    /// `interval` between them.
    pub async fn wait_for_transaction_receipt_with(
        &self,
        transaction_id: &TransactionId,
        max_attempts: u32,
        interval: Duration,
    ) -> ApiResult<RelayTransactionStatusResult> {
        let max_attempts = max_attempts.max(1);
        let started = Instant::now();

        for attempt in 1..=max_attempts {
            let status_result = self
                .get_status(transaction_id)
                .await?
                .ok_or_else(|| ApiSdkError::TransactionNotFound(transaction_id.clone()))?;

            match status_result.status {
                status if status.is_in_flight() => {
                    if attempt < max_attempts {
                        tokio::time::sleep(interval).await;
                    }
                }
                TransactionStatus::Mined
                | TransactionStatus::Confirmed
                | TransactionStatus::Failed => return Ok(status_result),
                status => {
                    return Err(ApiSdkError::TransactionNotMined {
                        id: transaction_id.clone(),
                        status,
                    });
                }
            }
        }

        Err(ApiSdkError::ReceiptTimeout {
            id: transaction_id.clone(),
            attempts: max_attempts,
            elapsed: started.elapsed(),
        })
    }
}
