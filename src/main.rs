//! FractioNFT Wallet CLI
//!
//! Connects to a HashPack-style wallet and reads the Hedera mirror node.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fractio_wallet::commands;
use fractio_wallet::mirror::MirrorClient;
use fractio_wallet::session::Network;

#[derive(Parser)]
#[command(name = "fractio-wallet")]
#[command(about = "FractioNFT wallet connect and mirror node reader")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Target network
    #[arg(short, long, global = true, default_value = "testnet")]
    network: Network,

    /// Override the mirror node base URL
    #[arg(long, global = true)]
    mirror_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a wallet (extension pairing or view-only)
    Connect {
        /// Enter a view-only session for this account id instead of pairing
        #[arg(long)]
        account: Option<String>,

        /// Pairing timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show account balance and token holdings
    Account {
        /// Account id (0.0.x)
        id: String,
    },

    /// List token balances of an account
    Tokens {
        /// Account id (0.0.x)
        id: String,
    },

    /// List NFTs owned by an account
    Nfts {
        /// Account id (0.0.x)
        id: String,
    },

    /// Show token class information
    Token {
        /// Token id (0.0.x)
        id: String,
    },

    /// Show a single NFT
    Nft {
        /// Token id (0.0.x)
        token_id: String,

        /// Serial number
        serial: u64,
    },

    /// Look up a transaction
    Transaction {
        /// Transaction id
        id: String,

        /// Only report whether the transaction succeeded
        #[arg(long)]
        verify: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mirror = match &cli.mirror_url {
        Some(url) => MirrorClient::with_base_url(url.clone()),
        None => MirrorClient::new(cli.network),
    };

    match cli.command {
        Commands::Connect { account, timeout } => {
            commands::connect::run(cli.network, &mirror, account, timeout).await
        }
        Commands::Account { id } => commands::account::run(&mirror, &id).await,
        Commands::Tokens { id } => commands::account::run_tokens(&mirror, &id).await,
        Commands::Nfts { id } => commands::nft::run_for_account(&mirror, &id).await,
        Commands::Token { id } => commands::token::run(&mirror, &id).await,
        Commands::Nft { token_id, serial } => commands::nft::run(&mirror, &token_id, serial).await,
        Commands::Transaction { id, verify } => {
            commands::transaction::run(&mirror, &id, verify).await
        }
    }
}
