use std::time::Duration;

// FILES
pub const CONFIG_FILE_PATH: &str = "akun.txt";

// FAUCET SITE
pub const FAUCET_BASE_URL: &str = "https://conft.app";
pub const FAUCET_ORIGIN: &str = "https://conft.app";
pub const FAUCET_REFERER: &str = "https://conft.app/faucets";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";
pub const CLAIM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

pub const RPC_TIMEOUT: Duration = Duration::from_secs(15);
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);
pub const CLAIM_TIMEOUT: Duration = Duration::from_secs(20);

pub const DEFAULT_RETRY_INTERVAL_SECONDS: u64 = 4200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
}

impl ChainConfig {
    pub fn new(name: &str, chain_id: u64, rpc_url: &str) -> Self {
        Self {
            name: name.to_owned(),
            chain_id,
            rpc_url: rpc_url.to_owned(),
        }
    }
}

/// Chains claimed on every pass, in this order.
pub fn default_chains() -> Vec<ChainConfig> {
    vec![
        ChainConfig::new("incentiv", 28802, "https://rpc2.testnet.incentiv.io/"),
        ChainConfig::new("monad", 10143, "https://testnet-rpc.monad.xyz/"),
    ]
}
