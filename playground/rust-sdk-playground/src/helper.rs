use anyhow::{Context, Result};
use rrelayer::{Client, CreateRelayerResult};
use rrelayer_local_node::{NodeRpc, fund_address};
use tracing::info;

pub struct FundRelayerOptions<'a> {
    pub chain_id: u64,
    pub name: Option<&'a str>,
    pub funding_amount: &'a str,
    pub quiet: bool,
}

fn default_relayer_name() -> String {
    format!("funded-relayer-{}", chrono::Utc::now().timestamp_millis())
}

/// Creates a relayer on `chain_id` and sends it `funding_amount` ETH from the
/// node's first dev account.
pub async fn create_relayer_and_fund(
    client: &Client,
    node: &NodeRpc,
    options: FundRelayerOptions<'_>,
) -> Result<CreateRelayerResult> {
    let name = options.name.map(str::to_string).unwrap_or_else(default_relayer_name);

    if !options.quiet {
        info!("Creating relayer {}", name);
    }

    let relayer = client
        .relayer()
        .create(options.chain_id, &name)
        .await
        .with_context(|| format!("Failed to create relayer {}", name))?;

    if !options.quiet {
        info!("Created relayer {} at address {}", relayer.id, relayer.address);
    }

    fund_address(node, &relayer.address, options.funding_amount, options.quiet)
        .await
        .with_context(|| format!("Failed to fund relayer {}", relayer.id))?;

    Ok(relayer)
}
