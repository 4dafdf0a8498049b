mod api;
mod clients;
#[cfg(test)]
mod test_support;
pub mod types;

pub use api::{
    ApiBaseConfig, ApiResult, ApiSdkError, AuthConfig, AuthenticationApi, CredentialsError,
    HealthApi, ListQuery, NetworkApi, PagingContext, PagingResult, RelayerAllowlist, RelayerApi,
    SignApi, TransactionApi,
    http::{API_KEY_HEADER_NAME, HttpClient, auth_headers},
    types::DEFAULT_PAGING_LIMIT,
};
pub use clients::{Client, CreateClientConfig, create_client};
pub use types::{
    CreateRelayerResult, GetRelayerResult, Network, RelayTransactionRequest,
    RelayTransactionStatusResult, Relayer, RelayerId, SendTransactionResult, SignTextResult,
    SignTypedDataResult, StatusResponse, Transaction, TransactionId, TransactionSpeed,
    TransactionStatus,
};
