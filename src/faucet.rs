use std::{fmt, str::FromStr};

use alloy::primitives::Address;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde_json::{Map, Value};

use crate::{
    constants::{CLAIM_CONTENT_TYPE, CLAIM_TIMEOUT, FAUCET_BASE_URL, PAGE_TIMEOUT},
    http::RequestError,
};

pub type FaucetPage = Map<String, Value>;

#[derive(Clone, Debug)]
pub struct FaucetApi {
    base_url: String,
}

impl Default for FaucetApi {
    fn default() -> Self {
        Self::new(FAUCET_BASE_URL)
    }
}

impl FaucetApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn page_url(&self, chain_id: u64) -> String {
        format!(
            "{}/faucets/{chain_id}?_data=routes%2Ffaucets_.%24chainId",
            self.base_url
        )
    }

    pub fn claim_url(&self, chain_id: u64) -> String {
        format!(
            "{}/chains/{chain_id}/faucets/claim?_data=routes%2F_api.chains.%24chainId.faucets.claim",
            self.base_url
        )
    }

    /// Loads the faucet page data for `chain_id`. The HTTP status is not checked; only
    /// a JSON object body counts as a page.
    pub async fn fetch_page(
        &self,
        session: &Client,
        chain_id: u64,
    ) -> Result<FaucetPage, RequestError> {
        let text = session
            .get(self.page_url(chain_id))
            .timeout(PAGE_TIMEOUT)
            .send()
            .await?
            .text()
            .await?;

        Ok(serde_json::from_str(&text)?)
    }

    /// Posts the claim form. Transport failures become a response without a status
    /// whose text is the error.
    pub async fn claim(&self, session: &Client, chain_id: u64) -> ClaimResponse {
        let result = async {
            let response = session
                .post(self.claim_url(chain_id))
                .header(CONTENT_TYPE, CLAIM_CONTENT_TYPE)
                .body("")
                .timeout(CLAIM_TIMEOUT)
                .send()
                .await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        }
        .await;

        match result {
            Ok((status, text)) => ClaimResponse {
                status: Some(status),
                body: ClaimBody::from_text(text),
            },
            Err(e) => ClaimResponse {
                status: None,
                body: ClaimBody::Text(RequestError::from(e).to_string()),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClaimBody {
    Structured(Map<String, Value>),
    Text(String),
}

impl ClaimBody {
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::Text(text),
        }
    }
}

impl fmt::Display for ClaimBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(map) => write!(f, "{}", Value::Object(map.clone())),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClaimResponse {
    pub status: Option<StatusCode>,
    pub body: ClaimBody,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    Success,
    AlreadyClaimed,
    /// JSON object matching no known shape.
    Unrecognized,
    /// Text body matching no known phrase.
    Unhandled,
}

const ALREADY_CLAIMED: &str = "already claimed";

fn mentions_already_claimed(text: &str) -> bool {
    text.to_lowercase().contains(ALREADY_CLAIMED)
}

/// Success is `status == "success"` or any `tx` key at all, whatever its value.
pub fn classify(body: &ClaimBody) -> ClaimOutcome {
    match body {
        ClaimBody::Structured(map) => {
            if map.get("status").and_then(Value::as_str) == Some("success")
                || map.contains_key("tx")
            {
                ClaimOutcome::Success
            } else if map
                .get("message")
                .and_then(Value::as_str)
                .is_some_and(mentions_already_claimed)
            {
                ClaimOutcome::AlreadyClaimed
            } else {
                ClaimOutcome::Unrecognized
            }
        }
        ClaimBody::Text(text) if mentions_already_claimed(text) => ClaimOutcome::AlreadyClaimed,
        ClaimBody::Text(_) => ClaimOutcome::Unhandled,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressSource {
    PageUserAddress,
    PageAddress,
    Config,
}

impl fmt::Display for AddressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PageUserAddress => "page userAddress",
            Self::PageAddress => "page address",
            Self::Config => "WALLET_ADDRESS from config",
        })
    }
}

fn page_address(page: &FaucetPage, field: &str) -> Option<Address> {
    let raw = page.get(field)?.as_str().filter(|raw| !raw.is_empty())?;

    Address::from_str(raw)
        .inspect_err(|e| tracing::warn!("Ignoring page {field}={raw}: {e}"))
        .ok()
}

/// Picks the wallet: page `userAddress`, then page `address`, then the configured fallback.
pub fn resolve_address(
    page: Option<&FaucetPage>,
    fallback: Option<Address>,
) -> Option<(Address, AddressSource)> {
    let from_page = page.and_then(|page| {
        page_address(page, "userAddress")
            .map(|address| (address, AddressSource::PageUserAddress))
            .or_else(|| page_address(page, "address").map(|address| (address, AddressSource::PageAddress)))
    });

    from_page.or_else(|| fallback.map(|address| (address, AddressSource::Config)))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use serde_json::json;
    use wiremock::{
        matchers::{body_string, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    const PAGE_WALLET: Address = address!("00000000000000000000000000000000000000aa");
    const CONFIG_WALLET: Address = address!("00000000000000000000000000000000000000bb");

    fn structured(value: Value) -> ClaimBody {
        match value {
            Value::Object(map) => ClaimBody::Structured(map),
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn success_by_status_or_tx_key() {
        assert_eq!(
            classify(&structured(json!({ "status": "success", "tx": "0xabc" }))),
            ClaimOutcome::Success
        );
        assert_eq!(
            classify(&structured(json!({ "status": "success" }))),
            ClaimOutcome::Success
        );
        assert_eq!(
            classify(&structured(json!({ "tx": null }))),
            ClaimOutcome::Success
        );
    }

    #[test]
    fn already_claimed_is_case_insensitive() {
        assert_eq!(
            classify(&structured(json!({ "message": "Already Claimed today" }))),
            ClaimOutcome::AlreadyClaimed
        );
        assert_eq!(
            classify(&ClaimBody::Text("Already claimed".to_owned())),
            ClaimOutcome::AlreadyClaimed
        );
    }

    #[test]
    fn unknown_shapes_are_not_classified() {
        assert_eq!(classify(&structured(json!({}))), ClaimOutcome::Unrecognized);
        assert_eq!(
            classify(&structured(json!({ "status": "error", "message": "rate limited" }))),
            ClaimOutcome::Unrecognized
        );
        assert_eq!(
            classify(&ClaimBody::Text("Internal Server Error".to_owned())),
            ClaimOutcome::Unhandled
        );
    }

    #[test]
    fn only_objects_are_structured() {
        assert_eq!(
            ClaimBody::from_text(r#"{"tx":"0x1"}"#.to_owned()),
            structured(json!({ "tx": "0x1" }))
        );
        assert_eq!(
            ClaimBody::from_text(r#""already claimed""#.to_owned()),
            ClaimBody::Text(r#""already claimed""#.to_owned())
        );
        assert_eq!(
            ClaimBody::from_text("<html></html>".to_owned()),
            ClaimBody::Text("<html></html>".to_owned())
        );
    }

    #[test]
    fn address_priority() {
        let page = json!({
            "userAddress": PAGE_WALLET.to_string(),
            "address": CONFIG_WALLET.to_string()
        });
        let page = page.as_object().unwrap();
        assert_eq!(
            resolve_address(Some(page), Some(CONFIG_WALLET)),
            Some((PAGE_WALLET, AddressSource::PageUserAddress))
        );

        let page = json!({ "userAddress": "", "address": PAGE_WALLET.to_string() });
        assert_eq!(
            resolve_address(page.as_object(), None),
            Some((PAGE_WALLET, AddressSource::PageAddress))
        );

        let page = json!({ "user": null });
        assert_eq!(
            resolve_address(page.as_object(), Some(CONFIG_WALLET)),
            Some((CONFIG_WALLET, AddressSource::Config))
        );

        assert_eq!(
            resolve_address(None, Some(CONFIG_WALLET)),
            Some((CONFIG_WALLET, AddressSource::Config))
        );
        assert_eq!(resolve_address(None, None), None);
    }

    #[test]
    fn urls_follow_site_routes() {
        let api = FaucetApi::default();

        assert_eq!(
            api.page_url(10143),
            "https://conft.app/faucets/10143?_data=routes%2Ffaucets_.%24chainId"
        );
        assert_eq!(
            api.claim_url(28802),
            "https://conft.app/chains/28802/faucets/claim?_data=routes%2F_api.chains.%24chainId.faucets.claim"
        );
    }

    #[tokio::test]
    async fn fetches_page_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/faucets/10143"))
            .and(query_param("_data", "routes/faucets_.$chainId"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "userAddress": PAGE_WALLET.to_string() })),
            )
            .mount(&server)
            .await;

        let page = FaucetApi::new(server.uri())
            .fetch_page(&Client::new(), 10143)
            .await
            .unwrap();

        assert_eq!(page["userAddress"], json!(PAGE_WALLET.to_string()));
    }

    #[tokio::test]
    async fn non_json_page_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = FaucetApi::new(server.uri())
            .fetch_page(&Client::new(), 10143)
            .await
            .unwrap_err();

        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[tokio::test]
    async fn claim_posts_empty_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chains/28802/faucets/claim"))
            .and(query_param("_data", "routes/_api.chains.$chainId.faucets.claim"))
            .and(header("content-type", CLAIM_CONTENT_TYPE))
            .and(body_string(""))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "success", "tx": "0xabc" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = FaucetApi::new(server.uri())
            .claim(&Client::new(), 28802)
            .await;

        assert_eq!(response.status, Some(StatusCode::OK));
        assert_eq!(classify(&response.body), ClaimOutcome::Success);
    }

    #[tokio::test]
    async fn claim_keeps_text_bodies() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Already claimed"))
            .mount(&server)
            .await;

        let response = FaucetApi::new(server.uri())
            .claim(&Client::new(), 28802)
            .await;

        assert_eq!(response.status, Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(response.body, ClaimBody::Text("Already claimed".to_owned()));
    }

    #[tokio::test]
    async fn unreachable_claim_has_no_status() {
        let api = FaucetApi::new("http://127.0.0.1:1");

        let response = api.claim(&Client::new(), 28802).await;

        assert_eq!(response.status, None);
        assert_eq!(classify(&response.body), ClaimOutcome::Unhandled);
    }
}
