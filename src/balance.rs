use alloy::primitives::{Address, U256};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{constants::RPC_TIMEOUT, http::RequestError};

const MICRO_ETHER_IN_WEI: u64 = 1_000_000_000_000;
const DISPLAY_DECIMALS: u64 = 1_000_000;

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (String, &'a str),
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
}

/// Queries `eth_getBalance` at the latest block. `Ok(None)` means the node answered
/// without a usable `result`.
pub async fn request_balance(
    client: &Client,
    rpc_url: &str,
    address: Address,
) -> Result<Option<U256>, RequestError> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method: "eth_getBalance",
        params: (address.to_string(), "latest"),
    };

    let response = client
        .post(rpc_url)
        .json(&request)
        .timeout(RPC_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RequestError::Status(status));
    }

    let text = response.text().await?;
    let body: JsonRpcResponse = serde_json::from_str(&text)?;

    match body.result.filter(|quantity| !quantity.is_empty()) {
        Some(quantity) => parse_quantity(&quantity).map(Some),
        None => Ok(None),
    }
}

/// Balance of `address`, or `None` when there is no address or the call failed.
pub async fn read_balance(client: &Client, rpc_url: &str, address: Option<Address>) -> Option<U256> {
    let address = address?;

    request_balance(client, rpc_url, address)
        .await
        .inspect_err(|e| tracing::error!("Error getting balance of {address} from {rpc_url}: {e}"))
        .ok()
        .flatten()
}

pub fn parse_quantity(quantity: &str) -> Result<U256, RequestError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .unwrap_or(quantity);

    U256::from_str_radix(digits, 16).map_err(|_| RequestError::InvalidQuantity(quantity.to_owned()))
}

/// Renders wei as whole units with six fraction digits, rounding half up.
pub fn format_wei(wei: U256) -> String {
    let micro = wei.saturating_add(U256::from(MICRO_ETHER_IN_WEI / 2)) / U256::from(MICRO_ETHER_IN_WEI);
    let whole = micro / U256::from(DISPLAY_DECIMALS);
    let fraction = micro % U256::from(DISPLAY_DECIMALS);

    format!("{whole}.{:06}", fraction.to::<u64>())
}
