//! Pair Sniper - Uniswap-V2 New Pair Sniper
//!
//! Screens newly listed tokens against GoPlus security reports before buying.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use pair_sniper::adapters::cli::{CheckCmd, CliApp, Command};
use pair_sniper::adapters::evm::EvmChainClient;
use pair_sniper::adapters::goplus::{GoPlusClient, GoPlusConfig};
use pair_sniper::application::{
    AcquisitionExecutor, DiscoveryDispatcher, DispatchMode, DispatcherConfig, PositionMonitor,
    RetryPolicy, Screener,
};
use pair_sniper::config::{load_config, Config};
use pair_sniper::domain::{address_key, SafetyEngine};
use pair_sniper::ports::{ChainPort, RiskReportSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in sniper.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    let config_path = match &app.command {
        Command::Run(cmd) => &cmd.config,
        Command::Watch(cmd) => &cmd.config,
        Command::Check(cmd) => &cmd.config,
    };
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    init_logging(app.verbose, app.debug, &config.logging.level);

    match app.command {
        Command::Run(_) => run_command(config, DispatchMode::Snipe).await,
        Command::Watch(_) => run_command(config, DispatchMode::Watch).await,
        Command::Check(cmd) => check_command(config, cmd).await,
    }
}

/// Flags win over RUST_LOG, RUST_LOG wins over the config level
fn init_logging(verbose: bool, debug: bool, level: &str) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn screener(config: &Config) -> Result<Screener> {
    let source: Arc<dyn RiskReportSource> = Arc::new(
        GoPlusClient::with_config(GoPlusConfig::from(&config.report))
            .context("Failed to create GoPlus client")?,
    );

    Ok(Screener::new(
        source,
        SafetyEngine::from_config(&config.rules),
        RetryPolicy::from(&config.report),
    ))
}

async fn run_command(config: Config, mode: DispatchMode) -> Result<()> {
    tracing::info!("Starting pair sniper ({:?} mode)...", mode);

    let private_key = config.chain.get_private_key()?;
    let chain: Arc<dyn ChainPort> = Arc::new(
        EvmChainClient::connect(config.chain_config(), &private_key)
            .await
            .context("Failed to connect to chain")?,
    );
    tracing::info!("Wallet: {}", address_key(&chain.wallet_address()));

    let thresholds = config.sniper.exit_thresholds()?;
    let buy_amount = config.sniper.buy_amount_wei()?;

    let screener = Arc::new(screener(&config)?);
    let executor = Arc::new(AcquisitionExecutor::new(chain.clone(), config.executor_config()));
    let monitor = Arc::new(PositionMonitor::new(chain.clone(), executor.clone(), thresholds));

    let dispatcher = Arc::new(DiscoveryDispatcher::new(
        chain,
        screener,
        executor,
        monitor,
        DispatcherConfig {
            base_asset: config.chain.base_asset_address,
            buy_amount,
            mode,
            halt_on_fatal: config.sniper.halt_on_fatal,
        },
    ));

    if mode == DispatchMode::Snipe {
        tracing::info!(
            "Buying {} ETH per token, take profit {}x, stop loss {}x",
            config.sniper.buy_amount_eth,
            config.sniper.take_profit,
            config.sniper.stop_loss
        );
        tracing::warn!("Swaps are sent with a zero minimum output; fills are not price protected");
    }

    // Setup Ctrl+C handler
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        shutdown.cancel();
    });

    dispatcher.run(cancel).await.context("Dispatcher failed")?;
    tracing::info!("Pair sniper stopped");
    Ok(())
}

async fn check_command(config: Config, cmd: CheckCmd) -> Result<()> {
    let screener = screener(&config)?;
    let key = address_key(&cmd.token);

    let verdict = screener
        .screen(cmd.token, &CancellationToken::new())
        .await
        .with_context(|| format!("Failed to screen {}", key))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    println!("Token:  {}", key);
    let rules = screener.engine().rules();
    println!("Rules:  {} of {} active", rules.active_count(), rules.rules().len());
    println!("Safe:   {}", if verdict.safe { "yes" } else { "no" });
    if let Some(rule) = verdict.failing_rule {
        println!("Failed: {}", rule);
    }
    println!("{}", verdict.message);

    Ok(())
}
