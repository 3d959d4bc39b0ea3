//! Creek Finance Testnet Bot
//!
//! Daily wallet automation for the Creek Finance protocol on Sui testnet.
//! Features:
//! - Native gas funding through the testnet faucet, with per-wallet proxies
//! - Token claims, vault swaps, staking and redemption
//! - Collateral deposits, borrow, repay and withdraw on one obligation
//! - Strictly sequential wallets with a fixed-length daily cycle

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use creek_api::{FaucetClient, DEFAULT_FAUCET_URL};
use creek_chain::{SidecarSignerFactory, SuiRpcClient, DEFAULT_RPC_URL};
use creek_core::{BotConfig, KeySource, ProxySource, Scheduler, WalletPipeline};

/// Environment variable names.
mod env {
    pub const RPC_URL: &str = "RPC_URL";
    pub const SIGNER_URL: &str = "SIGNER_URL";
    pub const FAUCET_URL: &str = "FAUCET_URL";
    pub const PRIVATE_KEYS_FILE: &str = "PRIVATE_KEYS_FILE";
    pub const PROXY_FILE: &str = "PROXY_FILE";
}

const DEFAULT_SIGNER_URL: &str = "http://127.0.0.1:8787";

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,creek_core=debug,creek_chain=debug")),
        )
        .init();

    // BOT_CONFIG (TOML path) wins over BOT_PROFILE
    let config = Arc::new(BotConfig::from_env()?);
    config.log_config();

    let settings = Settings::from_env();
    info!(
        rpc = %settings.rpc_url,
        signer = %settings.signer_url,
        faucet = %settings.faucet_url,
        keys = %settings.keys_file,
        proxies = %settings.proxy_file,
        "Endpoints"
    );

    let scheduler = initialize_components(config, &settings)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, finishing current wallet");
            let _ = shutdown_tx.send(true);
        }
    });

    info!("Starting daily scheduler...");
    if let Err(e) = scheduler.run(shutdown_rx).await {
        error!(error = %e, "Scheduler stopped");
        return Err(e.into());
    }

    info!("Bot stopped");
    Ok(())
}

/// Endpoints and file locations loaded from the environment.
struct Settings {
    rpc_url: String,
    signer_url: String,
    faucet_url: String,
    keys_file: String,
    proxy_file: String,
}

impl Settings {
    fn from_env() -> Self {
        let get_env = |name: &str, default: &str| -> String {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        Self {
            rpc_url: get_env(env::RPC_URL, DEFAULT_RPC_URL),
            signer_url: get_env(env::SIGNER_URL, DEFAULT_SIGNER_URL),
            faucet_url: get_env(env::FAUCET_URL, DEFAULT_FAUCET_URL),
            keys_file: get_env(env::PRIVATE_KEYS_FILE, "privatekey.txt"),
            proxy_file: get_env(env::PROXY_FILE, "proxy.txt"),
        }
    }
}

fn initialize_components(config: Arc<BotConfig>, settings: &Settings) -> Result<Scheduler> {
    info!("Initializing components...");

    let chain = Arc::new(SuiRpcClient::new(&settings.rpc_url)?);
    let faucet = Arc::new(FaucetClient::new(&settings.faucet_url)?);
    let signers = Arc::new(SidecarSignerFactory::new(&settings.signer_url)?);

    let pipeline = WalletPipeline::new(config.clone(), chain, faucet);
    info!(steps = pipeline.plan().len(), "Wallet pipeline configured");

    let scheduler = Scheduler::new(
        config,
        pipeline,
        signers,
        KeySource::new(&settings.keys_file),
        ProxySource::new(&settings.proxy_file),
    );

    info!("All components initialized");
    Ok(scheduler)
}

/// Print startup banner.
fn print_banner() {
    println!(
        r#"
    ╔═╗┬─┐┌─┐┌─┐┬┌─
    ║  ├┬┘├┤ ├┤ ├┴┐
    ╚═╝┴└─└─┘└─┘┴ ┴
    Testnet Bot v0.1.0
    "#
    );
}
