use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::Parser;
use rrelayer::PagingContext;
use rrelayer_local_node::{EnvironmentConfig, EnvironmentOrchestrator, logger::setup_info_logger};

use crate::{
    cli_interface::{Cli, Commands},
    scenarios::SigningHistory,
};

mod cli_interface;
mod helper;
mod scenarios;

fn resolve_path(override_path: &Option<String>) -> Result<PathBuf> {
    let path = match override_path {
        Some(path) => PathBuf::from_str(path)
            .with_context(|| format!("Invalid path provided: '{}'", path))?,
        None => env::current_dir().context("Failed to get current directory.")?,
    };

    path.canonicalize().with_context(|| format!("Failed to resolve path '{}'", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_info_logger();

    let project_path = resolve_path(&cli.path)?;
    let mut config = EnvironmentConfig::load(&project_path)?;
    config.quiet |= cli.quiet;

    let orchestrator = EnvironmentOrchestrator::new(config);

    match cli.command {
        Commands::Up => scenarios::up(&orchestrator).await,
        Commands::TestAuth => scenarios::test_auth(&orchestrator).await,
        Commands::GetAllRelayers { chain_id, limit, offset } => {
            scenarios::get_all_relayers(&orchestrator, chain_id, PagingContext::new(limit, offset))
                .await
        }
        Commands::CreateRelayer { name, funding_amount } => {
            scenarios::create_relayer(&orchestrator, name, funding_amount).await
        }
        Commands::GetRelayer => scenarios::get_relayer(&orchestrator).await,
        Commands::GetAddress => scenarios::get_address(&orchestrator).await,
        Commands::GetBalance => scenarios::get_balance(&orchestrator).await,
        Commands::CloneRelayer { name } => scenarios::clone_relayer(&orchestrator, name).await,
        Commands::PauseUnpause => scenarios::pause_unpause(&orchestrator).await,
        Commands::UpdateEip1559 => scenarios::update_eip1559(&orchestrator).await,
        Commands::UpdateMaxGasPrice => scenarios::update_max_gas_price(&orchestrator).await,
        Commands::GetAllowlist => scenarios::get_allowlist(&orchestrator).await,
        Commands::GetNetworks => scenarios::get_networks(&orchestrator).await,
        Commands::GetGasPrice { chain_id } => {
            scenarios::get_gas_price(&orchestrator, chain_id).await
        }
        Commands::SignText { message } => scenarios::sign_text(&orchestrator, message).await,
        Commands::SignTypedData => scenarios::sign_typed_data(&orchestrator).await,
        Commands::SignTextHistory { limit, offset } => {
            let paging = PagingContext::new(limit, offset);
            scenarios::sign_history(&orchestrator, SigningHistory::Text, paging).await
        }
        Commands::SignTypedDataHistory { limit, offset } => {
            let paging = PagingContext::new(limit, offset);
            scenarios::sign_history(&orchestrator, SigningHistory::TypedData, paging).await
        }
        Commands::SendTransaction { value } => {
            scenarios::send_transaction(&orchestrator, value).await
        }
        Commands::ReplaceTransaction { value } => {
            scenarios::replace_transaction(&orchestrator, value).await
        }
        Commands::CancelTransaction { value } => {
            scenarios::cancel_transaction(&orchestrator, value).await
        }
        Commands::TransactionCounts => scenarios::transaction_counts(&orchestrator).await,
    }
}
