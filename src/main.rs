use std::{path::Path, process::ExitCode};

use config::Config;
use constants::{default_chains, CONFIG_FILE_PATH};
use faucet::FaucetApi;
use http::{build_rpc_client, build_session};
use logger::init_default_logger;
use processor::ChainProcessor;
use scheduler::{run_claim_loop, Schedule, StopReason, TokioSleeper};
use tokio::signal;
use tokio_util::sync::CancellationToken;

mod balance;
mod config;
mod constants;
mod faucet;
mod http;
mod logger;
mod processor;
mod scheduler;

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = init_default_logger();

    match run(Path::new(CONFIG_FILE_PATH)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: &Path) -> eyre::Result<()> {
    let config = Config::read_from_file(config_path).await?;

    tracing::info!("Starting multi-chain auto-claim bot...");
    if config.cookie_header.is_empty() {
        tracing::warn!("No cookie header provided. Claims might fail if a session is needed.");
    }

    let processor = ChainProcessor::new(
        build_session(&config.cookie_header)?,
        build_rpc_client()?,
        FaucetApi::default(),
        config.wallet_address,
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(listen_for_interrupts(shutdown.clone()));

    let summary = run_claim_loop(
        &processor,
        &default_chains(),
        Schedule::from(&config),
        &TokioSleeper,
        &shutdown,
    )
    .await;

    if summary.stop_reason == StopReason::Interrupted {
        tracing::info!("Stopped after {} attempt(s). Exiting.", summary.attempts);
    }

    Ok(())
}

/// First Ctrl+C stops the loop at the next safe point, a second one exits immediately.
async fn listen_for_interrupts(shutdown: CancellationToken) {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Unable to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Interrupted by user, stopping... (Ctrl+C again to exit now)");
    shutdown.cancel();

    if signal::ctrl_c().await.is_ok() {
        tracing::info!("Interrupted again. Exiting.");
        std::process::exit(0);
    }
}
