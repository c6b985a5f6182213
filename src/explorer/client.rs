//! Etherscan v2 HTTP client.
//!
//! Every request carries `chainid` and the API key, and is bounded by the
//! client-wide timeout. Nothing here panics or retries: failures surface as
//! [`ExplorerError`] and the monitor skips that channel for the round.

use super::types::{ApiEnvelope, ApiTransfer, ProxyEnvelope, RawLog, TransferCategory, TransferRecord};
use super::{ExplorerApi, ExplorerError};
use crate::config::ExplorerConfig;
use crate::onchain::abi;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Highest block accepted by `getLogs` as `toBlock`, effectively "latest".
const LOGS_TO_BLOCK: u64 = 99_999_999;

/// Messages Etherscan uses for a successful query with no rows.
const TRANSFERS_EMPTY: &[&str] = &["No transactions found"];
const LOGS_EMPTY: &[&str] = &["No records found", "No transactions found"];

pub struct EtherscanClient {
    api_url: String,
    api_key: String,
    chain_id: u64,
    page_size: u32,
    log_page_size: u32,
    client: reqwest::Client,
}

impl EtherscanClient {
    pub fn new(config: &ExplorerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            chain_id: config.chain_id,
            page_size: config.page_size,
            log_page_size: config.log_page_size,
            client,
        })
    }

    /// GET the API with the common parameters plus `params`, decoding the body as `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ExplorerError> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("chainid", self.chain_id.to_string())])
            .query(params)
            .query(&[("apikey", &self.api_key)])
            .send()
            .await
            .map_err(|e| ExplorerError::Transport {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(ExplorerError::Status {
                endpoint: endpoint.to_string(),
                status: resp.status(),
            });
        }

        let body = resp.text().await.map_err(|e| ExplorerError::Transport {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        serde_json::from_str(&body).map_err(|e| ExplorerError::Parse {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl ExplorerApi for EtherscanClient {
    async fn list_transfers(
        &self,
        address: &str,
        category: TransferCategory,
    ) -> Result<Vec<TransferRecord>, ExplorerError> {
        let action = category.action();
        let envelope: ApiEnvelope = self
            .get_json(
                action,
                &[
                    ("module", "account".to_string()),
                    ("action", action.to_string()),
                    ("address", address.to_string()),
                    ("page", "1".to_string()),
                    ("offset", self.page_size.to_string()),
                    ("sort", "desc".to_string()),
                ],
            )
            .await?;

        let rows: Vec<ApiTransfer> = interpret_envelope(action, envelope, TRANSFERS_EMPTY)?;
        debug!(endpoint = action, rows = rows.len(), "fetched transfers");

        Ok(rows
            .into_iter()
            .map(|tx| TransferRecord::from_api(category, tx))
            .collect())
    }

    async fn get_supply_logs(&self, from_block: u64) -> Result<Vec<RawLog>, ExplorerError> {
        let endpoint = "getLogs";
        let envelope: ApiEnvelope = self
            .get_json(
                endpoint,
                &[
                    ("module", "logs".to_string()),
                    ("action", endpoint.to_string()),
                    ("address", abi::AAVE_V3_POOL.to_string()),
                    ("fromBlock", from_block.to_string()),
                    ("toBlock", LOGS_TO_BLOCK.to_string()),
                    ("topic0", abi::SUPPLY_EVENT_TOPIC.to_string()),
                    ("topic0_1_opr", "and".to_string()),
                    ("topic1", abi::WETH_RESERVE_TOPIC.to_string()),
                    ("page", "1".to_string()),
                    ("offset", self.log_page_size.to_string()),
                ],
            )
            .await?;

        let logs: Vec<RawLog> = interpret_envelope(endpoint, envelope, LOGS_EMPTY)?;
        debug!(from_block = from_block, logs = logs.len(), "fetched supply logs");
        Ok(logs)
    }

    async fn get_transaction_sender(&self, tx_hash: &str) -> Option<String> {
        let endpoint = "eth_getTransactionByHash";
        let envelope: ProxyEnvelope = match self
            .get_json(
                endpoint,
                &[
                    ("module", "proxy".to_string()),
                    ("action", endpoint.to_string()),
                    ("txhash", tx_hash.to_string()),
                ],
            )
            .await
        {
            Ok(env) => env,
            Err(e) => {
                debug!(tx = tx_hash, error = %e, "sender lookup failed");
                return None;
            }
        };

        envelope
            .result
            .get("from")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    async fn get_latest_block(&self) -> Option<u64> {
        let endpoint = "eth_blockNumber";
        let envelope: ProxyEnvelope = match self
            .get_json(
                endpoint,
                &[
                    ("module", "proxy".to_string()),
                    ("action", endpoint.to_string()),
                ],
            )
            .await
        {
            Ok(env) => env,
            Err(e) => {
                warn!(endpoint = endpoint, error = %e, "latest block lookup failed");
                return None;
            }
        };

        let block = envelope
            .result
            .as_str()
            .and_then(super::types::parse_hex_u64);
        if block.is_none() {
            warn!(endpoint = endpoint, result = %envelope.result, "unexpected result");
        }
        block
    }
}

/// Split an `account`/`logs` envelope into rows, an expected-empty result,
/// or an API failure.
///
/// `status == "1"` means rows; anything else is an empty success only when
/// the message contains one of `empty_markers`.
pub(crate) fn interpret_envelope<T: DeserializeOwned>(
    endpoint: &str,
    envelope: ApiEnvelope,
    empty_markers: &[&str],
) -> Result<Vec<T>, ExplorerError> {
    if envelope.status != "1" {
        if empty_markers.iter().any(|m| envelope.message.contains(m)) {
            return Ok(Vec::new());
        }
        let message = if envelope.message.is_empty() {
            "Unknown error".to_string()
        } else {
            // The detail ("Max rate limit reached", ...) lives in `result`
            match envelope.result.as_str() {
                Some(detail) if !detail.is_empty() => format!("{} ({})", envelope.message, detail),
                _ => envelope.message,
            }
        };
        return Err(ExplorerError::Api {
            endpoint: endpoint.to_string(),
            message,
        });
    }

    if envelope.result.is_null() {
        return Ok(Vec::new());
    }

    serde_json::from_value(envelope.result).map_err(|e| ExplorerError::Parse {
        endpoint: endpoint.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ApiEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rows_on_success() {
        let env = envelope(
            r#"{"status":"1","message":"OK","result":[
                {"hash":"0xa","from":"0x1","to":"0x2","value":"1","isError":"0"},
                {"hash":"0xb","from":"0x1","to":"0x2","value":"2","isError":"1"}
            ]}"#,
        );
        let rows: Vec<ApiTransfer> = interpret_envelope("txlist", env, TRANSFERS_EMPTY).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].is_error.as_deref(), Some("1"));
    }

    #[test]
    fn test_no_transactions_is_empty_success() {
        let env = envelope(r#"{"status":"0","message":"No transactions found","result":[]}"#);
        let rows: Vec<ApiTransfer> = interpret_envelope("tokentx", env, TRANSFERS_EMPTY).unwrap();
        assert!(rows.is_empty());

        let env = envelope(r#"{"status":"0","message":"No records found","result":[]}"#);
        let logs: Vec<RawLog> = interpret_envelope("getLogs", env, LOGS_EMPTY).unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn test_rate_limit_is_failure() {
        let env = envelope(r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#);
        let err = interpret_envelope::<ApiTransfer>("txlist", env, TRANSFERS_EMPTY).unwrap_err();
        assert_eq!(err.endpoint(), "txlist");
        assert!(err.to_string().contains("Max rate limit reached"));
    }

    #[test]
    fn test_missing_status_is_failure() {
        let env = envelope(r#"{}"#);
        let err = interpret_envelope::<RawLog>("getLogs", env, LOGS_EMPTY).unwrap_err();
        assert!(matches!(err, ExplorerError::Api { ref message, .. } if message == "Unknown error"));
    }

    #[test]
    fn test_malformed_rows_are_parse_failure() {
        let env = envelope(r#"{"status":"1","message":"OK","result":"not an array"}"#);
        let err = interpret_envelope::<RawLog>("getLogs", env, LOGS_EMPTY).unwrap_err();
        assert!(matches!(err, ExplorerError::Parse { .. }));
    }
}
