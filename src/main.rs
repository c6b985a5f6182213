//! Ethereum transfer monitor.
//!
//! Usage:
//!   addrwatch 0xYourEthereumAddressHere
//!   addrwatch 0xYourEthereumAddressHere --watch-aave

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use addrwatch::alert::ConsoleAlerter;
use addrwatch::config::{validate_address, Config};
use addrwatch::explorer::EtherscanClient;
use addrwatch::monitor::Monitor;
use addrwatch::onchain::abi;

#[derive(Parser)]
#[command(author, version, about = "Monitor an Ethereum address for incoming ETH, ERC-20, and NFT transfers.")]
struct Cli {
    /// Ethereum wallet address to monitor (0x...)
    address: String,

    /// Also monitor Aave V3 Pool for WETH Supply events
    #[arg(long, default_value_t = false)]
    watch_aave: bool,

    /// Optional TOML config file (used only if it exists)
    #[arg(short, long, default_value = "addrwatch.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let address = validate_address(&cli.address)?;

    let config = if cli.config.exists() {
        Config::load(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        Config::from_env()
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    config
        .require_api_key()
        .context("create a .env file with: ETHERSCAN_API_KEY=your_key_here")?;

    info!("addrwatch v{} starting", env!("CARGO_PKG_VERSION"));
    if cli.watch_aave && !abi::verify_supply_topic() {
        error!("Supply topic hash does not match its event signature");
    }

    let client = EtherscanClient::new(&config.explorer).context("building HTTP client")?;
    let alerter = ConsoleAlerter::new(config.sounds.player.clone());
    let monitor = Monitor::new(address, &config, client, alerter, cli.watch_aave);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C, running until killed");
            std::future::pending::<()>().await;
        }
    };
    monitor.run(shutdown).await;

    println!("\nMonitor stopped. Goodbye.");
    Ok(())
}
