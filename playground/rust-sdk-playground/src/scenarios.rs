use std::future::Future;

use anyhow::{Context, Result};
use rrelayer::{Client, PagingContext, RelayTransactionRequest, RelayerId, TransactionSpeed};
use rrelayer_local_node::{DEV_ACCOUNT, EnvironmentOrchestrator, NodeRpc};
use tokio::signal;
use tracing::{info, warn};

use crate::helper::{FundRelayerOptions, create_relayer_and_fund};

const DEFAULT_FUNDING_AMOUNT: &str = "1";

/// What every scenario body needs besides the client.
#[derive(Clone)]
struct ScenarioContext {
    chain_id: u64,
    node: NodeRpc,
    quiet: bool,
}

impl ScenarioContext {
    fn for_orchestrator(orchestrator: &EnvironmentOrchestrator) -> Self {
        let config = orchestrator.config();
        Self {
            chain_id: config.chain_id,
            node: NodeRpc::new(config.provider_url.clone()),
            quiet: config.quiet,
        }
    }

    async fn funded_relayer(
        &self,
        client: &Client,
        name: Option<&str>,
        funding_amount: &str,
    ) -> Result<rrelayer::CreateRelayerResult> {
        create_relayer_and_fund(
            client,
            &self.node,
            FundRelayerOptions { chain_id: self.chain_id, name, funding_amount, quiet: self.quiet },
        )
        .await
    }
}

/// Resolves on Ctrl-C or SIGTERM. A handler that cannot be installed never fires.
async fn interrupted() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl-C"),
            Err(e) => {
                warn!("Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received TERM signal");
            }
            Err(e) => {
                warn!("Could not listen for TERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Runs `body` against a fresh stack; a signal stops it and tears the stack down.
async fn run<F, Fut, T>(orchestrator: &EnvironmentOrchestrator, body: F) -> Result<T>
where
    F: FnOnce(Client) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    orchestrator.run_scenario_until(interrupted(), body).await
}

pub async fn up(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        client.health().check().await.context("Health check failed")?;
        let block = context.node.block_number().await?;
        println!("Environment is up at {} (node at block {})", client.server_url(), block);
        Ok(())
    })
    .await
}

pub async fn test_auth(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    run(orchestrator, |client| async move {
        let status = client.authenticated().await?;
        println!("{:?}", status);
        Ok(())
    })
    .await
}

pub async fn get_all_relayers(
    orchestrator: &EnvironmentOrchestrator,
    chain_id: Option<u64>,
    paging: PagingContext,
) -> Result<()> {
    run(orchestrator, |client| async move {
        let result = client.relayer().get_all(chain_id, &paging).await?;
        for relayer in &result.items {
            println!("{:?}", relayer);
        }
        println!("{} relayer(s), next page: {:?}", result.items.len(), result.next);
        Ok(())
    })
    .await
}

pub async fn create_relayer(
    orchestrator: &EnvironmentOrchestrator,
    name: Option<String>,
    funding_amount: String,
) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let relayer = context.funded_relayer(&client, name.as_deref(), &funding_amount).await?;
        let balance = context.node.balance(&relayer.address).await?;
        println!("{:?} (balance {} wei)", relayer, balance);
        Ok(())
    })
    .await
}

pub async fn get_relayer(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let relayer = client
            .relayer()
            .get(&created.id)
            .await?
            .with_context(|| format!("Relayer {} not found after creation", created.id))?;
        println!("{:?}", relayer);
        Ok(())
    })
    .await
}

pub async fn get_address(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let relayer = client.relayer().get(&created.id).await?.context("Relayer disappeared")?;
        println!("Relayer address: {}", relayer.relayer.address);
        Ok(())
    })
    .await
}

pub async fn get_balance(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let balance = context.node.balance(&created.address).await?;
        println!("Relayer balance: {} wei", balance);
        Ok(())
    })
    .await
}

pub async fn clone_relayer(
    orchestrator: &EnvironmentOrchestrator,
    name: Option<String>,
) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let name = name.unwrap_or_else(|| {
            format!("cloned-relayer-{}", chrono::Utc::now().timestamp_millis())
        });

        let cloned = client.relayer().clone_relayer(&created.id, context.chain_id, &name).await?;
        println!("Cloned {} into {:?}", created.id, cloned);

        client.relayer().delete(&cloned.id).await?;
        info!("Cloned relayer {} cleaned up", cloned.id);
        Ok(())
    })
    .await
}

pub async fn pause_unpause(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;

        client.relayer().pause(&created.id).await?;
        let paused = client.relayer().get(&created.id).await?.context("Relayer disappeared")?;
        info!("Relayer {} paused: {}", created.id, paused.relayer.paused);

        client.relayer().unpause(&created.id).await?;
        let unpaused = client.relayer().get(&created.id).await?.context("Relayer disappeared")?;
        info!("Relayer {} paused: {}", created.id, unpaused.relayer.paused);

        anyhow::ensure!(paused.relayer.paused, "Relayer {} did not pause", created.id);
        anyhow::ensure!(!unpaused.relayer.paused, "Relayer {} did not unpause", created.id);
        println!("Relayer {} paused and unpaused", created.id);
        Ok(())
    })
    .await
}

pub async fn update_eip1559(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;

        for enabled in [true, false] {
            client.relayer().update_eip1559_status(&created.id, enabled).await?;
            println!("EIP1559 status for {} set to {}", created.id, enabled);
        }
        Ok(())
    })
    .await
}

pub async fn update_max_gas_price(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;

        for cap in [2_000_000_000u64, 5_000_000_000] {
            client.relayer().update_max_gas_price(&created.id, cap).await?;
            println!("Max gas price for {} set to {} wei", created.id, cap);
        }

        client.relayer().remove_max_gas_price(&created.id).await?;
        println!("Max gas price for {} removed", created.id);
        Ok(())
    })
    .await
}

pub async fn get_allowlist(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;

        client.allowlist().add(&created.id, &DEV_ACCOUNT).await?;
        let allowlist = client.allowlist().get_all(&created.id, &PagingContext::default()).await?;
        println!("{:?}", allowlist.items);
        Ok(())
    })
    .await
}

pub async fn get_networks(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    run(orchestrator, |client| async move {
        for network in client.network().get_all().await? {
            println!("{:?}", network);
        }
        Ok(())
    })
    .await
}

pub async fn get_gas_price(
    orchestrator: &EnvironmentOrchestrator,
    chain_id: Option<u64>,
) -> Result<()> {
    let chain_id = chain_id.unwrap_or(orchestrator.config().chain_id);

    run(orchestrator, |client| async move {
        match client.network().get_gas_prices(chain_id).await? {
            Some(prices) => println!("{}", prices),
            None => println!("No gas prices for chain {}", chain_id),
        }
        Ok(())
    })
    .await
}

pub async fn sign_text(orchestrator: &EnvironmentOrchestrator, message: String) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let signed = client.sign().sign_text(&created.id, &message).await?;
        println!("{:?}", signed);

        let history = client.sign().get_text_history(&created.id, &PagingContext::default()).await?;
        println!("{} signed message(s) for {}", history.items.len(), created.id);
        Ok(())
    })
    .await
}

pub async fn sign_typed_data(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let typed_data = person_typed_data(context.chain_id, &created.address.to_string());

        let signed = client.sign().sign_typed_data(&created.id, &typed_data).await?;
        println!("Domain: {}", typed_data["domain"]);
        println!("Types: {}", typed_data["types"]);
        println!("Value: {}", typed_data["message"]);
        println!("Signature: {:?}", signed);
        Ok(())
    })
    .await
}

fn person_typed_data(chain_id: u64, wallet: &str) -> serde_json::Value {
    serde_json::json!({
        "types": {
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallet", "type": "address" },
            ],
        },
        "primaryType": "Person",
        "domain": {
            "name": "Test App",
            "version": "1",
            "chainId": chain_id,
            "verifyingContract": "0x1234567890123456789012345678901234567890",
        },
        "message": { "name": "Alice", "wallet": wallet },
    })
}

/// Which signing history a scenario reads back.
#[derive(Debug, Clone, Copy)]
pub enum SigningHistory {
    Text,
    TypedData,
}

pub async fn sign_history(
    orchestrator: &EnvironmentOrchestrator,
    history: SigningHistory,
    paging: PagingContext,
) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let result = match history {
            SigningHistory::Text => client.sign().get_text_history(&created.id, &paging).await?,
            SigningHistory::TypedData => {
                client.sign().get_typed_data_history(&created.id, &paging).await?
            }
        };
        for item in &result.items {
            println!("{}", item);
        }
        println!("{} {:?} record(s) for {}", result.items.len(), history, created.id);
        Ok(())
    })
    .await
}

fn transfer_to_dev_account(
    value: &str,
    speed: Option<TransactionSpeed>,
) -> RelayTransactionRequest {
    let mut request = RelayTransactionRequest::new(DEV_ACCOUNT);
    request.value = Some(value.to_string());
    request.speed = speed;
    request
}

pub async fn send_transaction(orchestrator: &EnvironmentOrchestrator, value: String) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        let request = transfer_to_dev_account(&value, Some(TransactionSpeed::Fast));

        let sent = client.transaction().send(&created.id, &request).await?;
        println!("{:?}", sent);

        let receipt = client.transaction().wait_for_transaction_receipt_by_id(&sent.id).await?;
        println!("{:?}", receipt);
        Ok(())
    })
    .await
}

pub async fn replace_transaction(
    orchestrator: &EnvironmentOrchestrator,
    value: String,
) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;

        let sent = client
            .transaction()
            .send(&created.id, &transfer_to_dev_account(&value, Some(TransactionSpeed::Slow)))
            .await?;
        let replacement = client
            .transaction()
            .replace(&sent.id, &transfer_to_dev_account(&value, Some(TransactionSpeed::Super)))
            .await
            .with_context(|| format!("Could not replace transaction {}", sent.id))?;
        println!("Replaced {} with {:?}", sent.id, replacement);

        let receipt =
            client.transaction().wait_for_transaction_receipt_by_id(&replacement.id).await?;
        println!("{:?}", receipt);
        Ok(())
    })
    .await
}

pub async fn cancel_transaction(
    orchestrator: &EnvironmentOrchestrator,
    value: String,
) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;

        let sent = client
            .transaction()
            .send(&created.id, &transfer_to_dev_account(&value, Some(TransactionSpeed::Slow)))
            .await?;
        client
            .transaction()
            .cancel(&sent.id)
            .await
            .with_context(|| format!("Could not cancel transaction {}", sent.id))?;

        let status = client.transaction().get_status(&sent.id).await?;
        println!("Cancelled {}, status now {:?}", sent.id, status);
        Ok(())
    })
    .await
}

pub async fn transaction_counts(orchestrator: &EnvironmentOrchestrator) -> Result<()> {
    let context = ScenarioContext::for_orchestrator(orchestrator);

    run(orchestrator, |client| async move {
        let created = context.funded_relayer(&client, None, DEFAULT_FUNDING_AMOUNT).await?;
        print_counts(&client, &created.id).await?;

        let request = transfer_to_dev_account("1000", None);
        let sent = client.transaction().send(&created.id, &request).await?;
        info!("Queued transaction {}", sent.id);
        print_counts(&client, &created.id).await?;

        let transactions =
            client.transaction().get_all(&created.id, &PagingContext::default()).await?;
        println!("{} transaction(s) for {}", transactions.items.len(), created.id);
        Ok(())
    })
    .await
}

async fn print_counts(client: &Client, relayer_id: &RelayerId) -> Result<()> {
    let pending = client.transaction().get_pending_count(relayer_id).await?;
    let inmempool = client.transaction().get_inmempool_count(relayer_id).await?;
    println!("{}: {} pending, {} in mempool", relayer_id, pending, inmempool);
    Ok(())
}
