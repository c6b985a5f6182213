//! Block-explorer queries (Etherscan v2).
//!
//! The monitor only talks to the explorer through [`ExplorerApi`], which
//! keeps three outcomes apart for every list endpoint:
//! - `Ok(records)` with data
//! - `Ok(vec![])` when the API explicitly reports nothing found
//! - `Err(ExplorerError)` for transport, HTTP or parse failures
//!
//! Single-value lookups (`get_latest_block`, `get_transaction_sender`) collapse
//! failure into `None`; their callers degrade instead of skipping.

pub mod client;
pub mod types;

pub use client::EtherscanClient;
pub use types::{RawLog, TransferCategory, TransferRecord};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("{endpoint} network error: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("{endpoint} parse error: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint}: {message}")]
    Api { endpoint: String, message: String },
}

impl ExplorerError {
    /// Name of the endpoint (Etherscan action) that failed.
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Parse { endpoint, .. }
            | Self::Api { endpoint, .. } => endpoint,
        }
    }
}

/// Read-only queries against the block explorer.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Most recent transfers of `category` touching `address`, newest first.
    async fn list_transfers(
        &self,
        address: &str,
        category: TransferCategory,
    ) -> Result<Vec<TransferRecord>, ExplorerError>;

    /// Aave V3 WETH `Supply` logs from `from_block` (inclusive) to the head.
    async fn get_supply_logs(&self, from_block: u64) -> Result<Vec<RawLog>, ExplorerError>;

    /// `from` address of a transaction, `None` on any failure.
    async fn get_transaction_sender(&self, tx_hash: &str) -> Option<String>;

    /// Current chain height, `None` on any failure.
    async fn get_latest_block(&self) -> Option<u64>;
}
