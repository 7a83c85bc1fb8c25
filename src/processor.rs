use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::{
    balance::{format_wei, read_balance},
    constants::ChainConfig,
    faucet::{classify, resolve_address, ClaimOutcome, FaucetApi},
};

/// One claim attempt on one chain. `Ok(None)` means `shutdown` fired before the claim
/// was sent; it is checked between network calls, never during one.
#[async_trait]
pub trait ProcessChain: Send + Sync {
    async fn process(
        &self,
        chain: &ChainConfig,
        shutdown: &CancellationToken,
    ) -> eyre::Result<Option<ClaimOutcome>>;
}

pub struct ChainProcessor {
    session: Client,
    rpc_client: Client,
    faucet: FaucetApi,
    fallback_address: Option<Address>,
}

impl ChainProcessor {
    pub fn new(
        session: Client,
        rpc_client: Client,
        faucet: FaucetApi,
        fallback_address: Option<Address>,
    ) -> Self {
        Self {
            session,
            rpc_client,
            faucet,
            fallback_address,
        }
    }

    async fn log_balance(&self, chain: &ChainConfig, address: Option<Address>, when: &str) {
        if let Some(balance) = read_balance(&self.rpc_client, &chain.rpc_url, address).await {
            tracing::info!(
                "Balance {when} claim: {balance} wei ({})",
                format_wei(balance)
            );
        }
    }
}

#[async_trait]
impl ProcessChain for ChainProcessor {
    async fn process(
        &self,
        chain: &ChainConfig,
        shutdown: &CancellationToken,
    ) -> eyre::Result<Option<ClaimOutcome>> {
        tracing::info!("=== Processing chain: {} (ID {}) ===", chain.name, chain.chain_id);

        let page = match self.faucet.fetch_page(&self.session, chain.chain_id).await {
            Ok(page) if !page.is_empty() => Some(page),
            Ok(_) => {
                tracing::warn!("Faucet page returned no data, falling back to WALLET_ADDRESS");
                None
            }
            Err(e) => {
                tracing::warn!("Failed to fetch faucet page JSON ({e}), falling back to WALLET_ADDRESS");
                None
            }
        };

        let resolved = resolve_address(page.as_ref(), self.fallback_address);
        match resolved {
            Some((address, source)) => tracing::info!("User address: {address} (from {source})"),
            None => tracing::warn!("No wallet address resolved, skipping balance checks"),
        }
        let address = resolved.map(|(address, _)| address);

        if stop_requested(chain, shutdown) {
            return Ok(None);
        }

        self.log_balance(chain, address, "before").await;

        if stop_requested(chain, shutdown) {
            return Ok(None);
        }

        tracing::info!("Sending claim POST...");
        let response = self.faucet.claim(&self.session, chain.chain_id).await;
        match response.status {
            Some(status) => tracing::info!("Response status: {}", status.as_u16()),
            None => tracing::info!("Response status: none"),
        }
        tracing::info!("Response body: {}", response.body);

        let outcome = classify(&response.body);
        match outcome {
            ClaimOutcome::Success => tracing::info!("Claim Success!"),
            ClaimOutcome::AlreadyClaimed => tracing::info!("Faucet already claimed"),
            ClaimOutcome::Unrecognized => tracing::warn!("JSON response not recognized"),
            ClaimOutcome::Unhandled => {
                tracing::warn!("Unhandled response, may retry next loop")
            }
        }

        if !stop_requested(chain, shutdown) {
            self.log_balance(chain, address, "after").await;
        }

        Ok(Some(outcome))
    }
}

fn stop_requested(chain: &ChainConfig, shutdown: &CancellationToken) -> bool {
    let cancelled = shutdown.is_cancelled();
    if cancelled {
        tracing::info!("Shutdown requested, leaving {} early", chain.name);
    }
    cancelled
}
