use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Runs SDK scenarios against a throwaway local rrelayer stack",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// optional - The directory the stack is started from, default is the current directory.
    #[clap(long, short, global = true)]
    pub path: Option<String>,

    /// Only print warnings, errors and scenario output
    #[clap(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring the stack up, check it, and tear it down again
    Up,
    /// Check the configured credentials against the server
    TestAuth,
    /// List relayers
    GetAllRelayers {
        #[clap(long)]
        chain_id: Option<u64>,
        #[clap(long, default_value_t = 100)]
        limit: u32,
        #[clap(long, default_value_t = 0)]
        offset: u32,
    },
    /// Create a relayer and fund it from the node's dev account
    CreateRelayer {
        /// optional - defaults to funded-relayer-<timestamp>
        #[clap(long)]
        name: Option<String>,
        /// Amount of ETH to send to the new relayer
        #[clap(long, default_value = "1")]
        funding_amount: String,
    },
    /// Create a relayer and read it back
    GetRelayer,
    /// Create a relayer and print its address
    GetAddress,
    /// Create a relayer and print its balance on the node
    GetBalance,
    /// Create a relayer, clone it, then delete the clone
    CloneRelayer {
        /// optional - defaults to cloned-relayer-<timestamp>
        #[clap(long)]
        name: Option<String>,
    },
    /// Create a relayer, pause it, then unpause it
    PauseUnpause,
    /// Create a relayer and switch EIP1559 on and off
    UpdateEip1559,
    /// Create a relayer, cap its gas price at 2 then 5 gwei, then remove the cap
    UpdateMaxGasPrice,
    /// Create a relayer, allow the dev account, and list the allowlist
    GetAllowlist,
    /// List configured networks
    GetNetworks,
    /// Show gas prices for a chain
    GetGasPrice {
        /// optional - defaults to the configured chain id
        #[clap(long)]
        chain_id: Option<u64>,
    },
    /// Create a relayer and sign a text message with it
    SignText {
        #[clap(long, default_value = "hello from the rrelayer playground")]
        message: String,
    },
    /// Create a relayer and sign an EIP-712 document with it
    SignTypedData,
    /// Create a relayer and list its signed text messages
    SignTextHistory {
        #[clap(long, default_value_t = 100)]
        limit: u32,
        #[clap(long, default_value_t = 0)]
        offset: u32,
    },
    /// Create a relayer and list its signed typed data
    SignTypedDataHistory {
        #[clap(long, default_value_t = 100)]
        limit: u32,
        #[clap(long, default_value_t = 0)]
        offset: u32,
    },
    /// Create a relayer, send ETH to the dev account, and wait for the receipt
    SendTransaction {
        /// Amount in wei
        #[clap(long, default_value = "1000000000000000")]
        value: String,
    },
    /// Send a slow transaction and replace it with a faster one
    ReplaceTransaction {
        /// Amount in wei
        #[clap(long, default_value = "1000000000000000")]
        value: String,
    },
    /// Send a slow transaction and cancel it
    CancelTransaction {
        /// Amount in wei
        #[clap(long, default_value = "1000000000000000")]
        value: String,
    },
    /// Show pending and in-mempool counts before and after queueing a transaction
    TransactionCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_commands_default_to_a_small_transfer() {
        let cli = Cli::try_parse_from(["rust-sdk-playground", "send-transaction"]).unwrap();

        assert!(matches!(
            cli.command,
            Commands::SendTransaction { value } if value == "1000000000000000"
        ));
    }

    #[test]
    fn test_history_commands_take_paging() {
        let cli = Cli::try_parse_from([
            "rust-sdk-playground",
            "--quiet",
            "sign-typed-data-history",
            "--limit",
            "5",
            "--offset",
            "10",
        ])
        .unwrap();

        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::SignTypedDataHistory { limit: 5, offset: 10 }));
    }

    #[test]
    fn test_relayer_setting_commands_parse() {
        for name in ["clone-relayer", "update-eip1559", "update-max-gas-price", "get-balance"] {
            assert!(Cli::try_parse_from(["rust-sdk-playground", name]).is_ok(), "{}", name);
        }
    }
}
