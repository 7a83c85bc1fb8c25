use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{config::Config, constants::ChainConfig, processor::ProcessChain};

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub loop_forever: bool,
    pub retry_interval: Duration,
}

impl From<&Config> for Schedule {
    fn from(config: &Config) -> Self {
        Self {
            loop_forever: config.loop_forever,
            retry_interval: config.retry_interval,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    OneShot,
    Interrupted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub attempts: u64,
    pub stop_reason: StopReason,
}

/// Runs passes over `chains` until a one-shot pass completes or `shutdown` fires.
/// Cancellation is observed between chains, between the requests of a chain and while
/// sleeping, never mid-request.
pub async fn run_claim_loop<P, S>(
    processor: &P,
    chains: &[ChainConfig],
    schedule: Schedule,
    sleeper: &S,
    shutdown: &CancellationToken,
) -> RunSummary
where
    P: ProcessChain + ?Sized,
    S: Sleeper + ?Sized,
{
    let mut attempts = 0;

    loop {
        if shutdown.is_cancelled() {
            return RunSummary {
                attempts,
                stop_reason: StopReason::Interrupted,
            };
        }

        attempts += 1;
        tracing::info!("--- Attempt #{attempts} ---");

        for chain in chains {
            if shutdown.is_cancelled() {
                return RunSummary {
                    attempts,
                    stop_reason: StopReason::Interrupted,
                };
            }

            if let Err(e) = processor.process(chain, shutdown).await {
                tracing::error!("Processing chain {} failed: {e:?}", chain.name);
            }
        }

        if !schedule.loop_forever {
            tracing::info!("Done (one-shot). Exiting.");
            return RunSummary {
                attempts,
                stop_reason: StopReason::OneShot,
            };
        }

        tracing::info!(
            "Sleeping {} seconds before next attempt...",
            schedule.retry_interval.as_secs()
        );

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                return RunSummary {
                    attempts,
                    stop_reason: StopReason::Interrupted,
                };
            }
            _ = sleeper.sleep(schedule.retry_interval) => {}
        }
    }
}
