use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::explorer::TransferCategory;

/// Environment variable holding the Etherscan API key.
pub const API_KEY_ENV: &str = "ETHERSCAN_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required env var: {0}")]
    MissingEnv(String),
    #[error("invalid Ethereum address {0:?}: must be 42 characters starting with 0x")]
    InvalidAddress(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub sounds: SoundConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    /// Etherscan v2 API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Chain id passed on every request (1 = Ethereum mainnet)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Number of most recent transfers fetched per category
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Max logs fetched per getLogs call
    #[serde(default = "default_log_page_size")]
    pub log_page_size: u32,
    /// API key - loaded from env ETHERSCAN_API_KEY
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Seconds to sleep between poll rounds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Seen-set size that triggers a reset to the current window.
    #[serde(default = "default_max_seen_hashes")]
    pub max_seen_hashes: usize,
    /// Blocks scanned behind the chain head when the Aave channel starts.
    #[serde(default = "default_aave_lookback_blocks")]
    pub aave_lookback_blocks: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoundConfig {
    /// Command used to play a sound file, e.g. "afplay" or "paplay".
    #[serde(default = "default_player")]
    pub player: String,
    #[serde(default = "default_eth_sound")]
    pub eth: String,
    #[serde(default = "default_token_sound")]
    pub token: String,
    #[serde(default = "default_nft_sound")]
    pub nft: String,
    #[serde(default = "default_aave_sound")]
    pub aave: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_api_url() -> String {
    "https://api.etherscan.io/v2/api".to_string()
}
fn default_chain_id() -> u64 {
    1
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_page_size() -> u32 {
    10
}
fn default_log_page_size() -> u32 {
    1000
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_max_seen_hashes() -> usize {
    crate::tracker::MAX_SEEN_HASHES
}
fn default_aave_lookback_blocks() -> u64 {
    // ~40 minutes at ~12s/block
    200
}
fn default_player() -> String {
    "afplay".to_string()
}
fn default_eth_sound() -> String {
    "/System/Library/Sounds/Ping.aiff".to_string()
}
fn default_token_sound() -> String {
    "/System/Library/Sounds/Glass.aiff".to_string()
}
fn default_nft_sound() -> String {
    "/System/Library/Sounds/Funk.aiff".to_string()
}
fn default_aave_sound() -> String {
    "/System/Library/Sounds/Hero.aiff".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            chain_id: default_chain_id(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            log_page_size: default_log_page_size(),
            api_key: String::new(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_seen_hashes: default_max_seen_hashes(),
            aave_lookback_blocks: default_aave_lookback_blocks(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            eth: default_eth_sound(),
            token: default_token_sound(),
            nft: default_nft_sound(),
            aave: default_aave_sound(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl ExplorerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl SoundConfig {
    /// Sound file played for a transfer category.
    pub fn for_category(&self, category: TransferCategory) -> &str {
        match category {
            TransferCategory::Eth => &self.eth,
            TransferCategory::Token => &self.token,
            TransferCategory::Nft => &self.nft,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay the API key from the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Never store the key in the config file
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.explorer.api_key = key;
        }

        Ok(config)
    }

    /// Default config with the API key taken from the environment (no file needed).
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.explorer.api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        config
    }

    /// Fails when no API key was supplied by either the file or the environment.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        if self.explorer.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnv(API_KEY_ENV.to_string()));
        }
        Ok(&self.explorer.api_key)
    }
}

/// Checks the monitored address has the `0x` prefix and is exactly 42 characters.
pub fn validate_address(address: &str) -> Result<String, ConfigError> {
    if !address.starts_with("0x") || address.len() != 42 {
        return Err(ConfigError::InvalidAddress(address.to_string()));
    }
    Ok(address.to_string())
}
