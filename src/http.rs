use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, StatusCode,
};
use thiserror::Error;

use crate::constants::{FAUCET_ORIGIN, FAUCET_REFERER, USER_AGENT};

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("non-successful status code: {0}")]
    Status(StatusCode),

    #[error("malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid quantity {0:?}")]
    InvalidQuantity(String),
}

/// Client for the faucet site. Every request made through it carries the browser
/// headers and, when configured, the session cookie.
pub fn build_session(cookie_header: &str) -> eyre::Result<Client> {
    let client = Client::builder()
        .default_headers(get_headers(cookie_header)?)
        .build()?;

    Ok(client)
}

/// Plain client for RPC nodes; the site cookie never leaves the faucet session.
pub fn build_rpc_client() -> eyre::Result<Client> {
    Ok(Client::builder().build()?)
}

fn get_headers(cookie_header: &str) -> eyre::Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(
        HeaderName::from_static("user-agent"),
        HeaderValue::from_static(USER_AGENT),
    );
    headers.insert(
        HeaderName::from_static("accept"),
        HeaderValue::from_static("*/*"),
    );
    headers.insert(
        HeaderName::from_static("accept-language"),
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        HeaderName::from_static("origin"),
        HeaderValue::from_static(FAUCET_ORIGIN),
    );
    headers.insert(
        HeaderName::from_static("referer"),
        HeaderValue::from_static(FAUCET_REFERER),
    );

    if !cookie_header.is_empty() {
        let cookie = HeaderValue::from_str(cookie_header)
            .map_err(|e| eyre::eyre!("COOKIE_HEADER is not a valid header value: {e}"))?;
        headers.insert(HeaderName::from_static("cookie"), cookie);
    }

    Ok(headers)
}
