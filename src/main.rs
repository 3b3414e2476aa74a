// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use clap::Parser;
use presale_racer::app::config::GlobalSettings;
use presale_racer::app::logging::setup_logging;
use presale_racer::domain::error::AppError;
use presale_racer::network::chain::{RpcChainClient, SharedChainReader};
use presale_racer::network::provider::ConnectionFactory;
use presale_racer::network::relay::{FlashbotsRelay, SharedBundleRelay};
use presale_racer::race::{RaceContext, RaceOrchestrator};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about = "presale racer")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Sign and log bundles without posting them to the relay
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// mainnet or sepolia (overrides config/env)
    #[arg(long)]
    network: Option<String>,

    /// Stop after this many seconds
    #[arg(long)]
    max_runtime_secs: Option<u64>,

    /// Skip the startup probe bundle
    #[arg(long, default_value_t = false)]
    no_probe: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    ConnectionFactory::install_tls_provider();

    let mut settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(
        if settings.debug { "debug" } else { "info" },
        settings.log_json,
    );

    if let Some(network) = cli.network {
        settings.network = network;
    }
    if let Some(secs) = cli.max_runtime_secs {
        settings.max_runtime_secs = secs;
    }
    settings.dry_run |= cli.dry_run;
    if cli.no_probe {
        settings.probe_enabled = false;
    }

    // Nothing touches the network until the configuration is complete.
    let config = Arc::new(settings.into_race_config()?);
    tracing::info!(
        target: "config",
        network = %config.network,
        wallet = %config.wallet_address(),
        contract = %config.pattern.contract,
        selector = %config.pattern.selector,
        dry_run = config.dry_run,
        "Configuration loaded"
    );

    let chain: SharedChainReader = Arc::new(RpcChainClient::connect(&config.endpoints.rpc_url)?);
    match chain.chain_id().await {
        Ok(id) if id != config.network.chain_id() => tracing::warn!(
            target: "config",
            rpc_chain_id = id,
            expected = config.network.chain_id(),
            "RPC chain id does not match configured network"
        ),
        Ok(_) => {}
        Err(e) => tracing::warn!(target: "config", error = %e, "Could not verify RPC chain id"),
    }

    let relay: SharedBundleRelay = Arc::new(FlashbotsRelay::new(
        chain.clone(),
        config.endpoints.relay_url.clone(),
        config.bundle_signer.clone(),
        config.inclusion_poll,
        config.dry_run,
    )?);

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "race", "Ctrl-C received; shutting down");
            ctrl_c_token.cancel();
        }
    });

    let orchestrator = RaceOrchestrator::new(RaceContext::new(config, chain, relay), shutdown);
    let stats = orchestrator.run().await?;
    tracing::info!(
        target: "race",
        included = stats.included,
        timed_out = stats.timed_out,
        failed = stats.failed,
        "Run finished"
    );
    Ok(())
}
