//! Etherscan response shapes and the typed records built from them.

use serde::Deserialize;
use std::fmt;

/// One kind of incoming transfer, each polled through its own account action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferCategory {
    /// Native ETH value transfers (`txlist`).
    Eth,
    /// ERC-20 token transfers (`tokentx`).
    Token,
    /// ERC-721 transfers (`tokennfttx`).
    Nft,
}

impl TransferCategory {
    /// Polling order used by the monitor.
    pub const ALL: [TransferCategory; 3] = [Self::Eth, Self::Token, Self::Nft];

    /// Etherscan `account` module action for this category.
    pub fn action(self) -> &'static str {
        match self {
            Self::Eth => "txlist",
            Self::Token => "tokentx",
            Self::Nft => "tokennfttx",
        }
    }
}

impl fmt::Display for TransferCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eth => write!(f, "ETH"),
            Self::Token => write!(f, "TOKEN"),
            Self::Nft => write!(f, "NFT"),
        }
    }
}

/// Envelope shared by the `account` and `logs` modules.
///
/// `result` is an array on success but a plain string on errors, so it stays
/// untyped until `status` has been checked.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Envelope of the `proxy` module (JSON-RPC passthrough).
#[derive(Debug, Deserialize)]
pub struct ProxyEnvelope {
    #[serde(default)]
    pub result: serde_json::Value,
}

/// A transfer row as returned by `txlist`, `tokentx` and `tokennfttx`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTransfer {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub block_number: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub is_error: Option<String>,
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub token_decimal: Option<String>,
    #[serde(default, rename = "tokenID")]
    pub token_id: Option<String>,
}

/// A raw event log from `logs/getLogs`. Numbers are hex strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub block_number: String,
    #[serde(default)]
    pub transaction_hash: String,
}

impl RawLog {
    /// Block number decoded from its `0x` hex form, 0 when malformed.
    pub fn block(&self) -> u64 {
        parse_hex_u64(&self.block_number).unwrap_or(0)
    }
}

/// One observed value movement into (or out of) the monitored address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub category: TransferCategory,
    pub hash: String,
    pub block_number: u64,
    pub from: String,
    pub to: String,
    /// Raw integer amount, kept as a decimal string.
    pub value: String,
    /// Decimals as reported by the explorer; parsed lazily by the formatter.
    pub decimals: String,
    pub is_error: bool,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub token_id: Option<String>,
}

impl TransferRecord {
    pub fn from_api(category: TransferCategory, tx: ApiTransfer) -> Self {
        let decimals = match category {
            TransferCategory::Eth => "18".to_string(),
            _ => tx.token_decimal.unwrap_or_else(|| "18".to_string()),
        };
        Self {
            category,
            block_number: tx.block_number.parse().unwrap_or(0),
            is_error: tx.is_error.as_deref() == Some("1"),
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            decimals,
            token_name: tx.token_name,
            token_symbol: tx.token_symbol,
            token_id: tx.token_id,
        }
    }

    /// True when the raw amount is a positive integer.
    pub fn has_value(&self) -> bool {
        let digits = self.value.trim();
        !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && digits.bytes().any(|b| b != b'0')
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_hex_u64(s: &str) -> Option<u64> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    if hex.is_empty() {
        return None;
    }
    u64::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_row_deserialize() {
        let json = r#"{
            "blockNumber": "19000000",
            "hash": "0xabc",
            "from": "0xSender",
            "to": "0xReceiver",
            "value": "42",
            "tokenName": "Bored Ape",
            "tokenSymbol": "BAYC",
            "tokenDecimal": "0",
            "tokenID": "7"
        }"#;
        let tx: ApiTransfer = serde_json::from_str(json).unwrap();
        let rec = TransferRecord::from_api(TransferCategory::Nft, tx);
        assert_eq!(rec.hash, "0xabc");
        assert_eq!(rec.block_number, 19_000_000);
        assert_eq!(rec.token_id.as_deref(), Some("7"));
        assert_eq!(rec.decimals, "0");
        assert!(!rec.is_error);
    }

    #[test]
    fn test_has_value() {
        let mut rec = TransferRecord::from_api(TransferCategory::Eth, ApiTransfer::default());
        assert!(!rec.has_value());
        rec.value = "0".into();
        assert!(!rec.has_value());
        rec.value = "000".into();
        assert!(!rec.has_value());
        rec.value = "1000".into();
        assert!(rec.has_value());
    }

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x10"), Some(16));
        assert_eq!(parse_hex_u64("0x"), None);
        assert_eq!(parse_hex_u64("16"), None);
        assert_eq!(parse_hex_u64("0xzz"), None);
    }

    #[test]
    fn test_category_actions() {
        assert_eq!(TransferCategory::Eth.action(), "txlist");
        assert_eq!(TransferCategory::Token.action(), "tokentx");
        assert_eq!(TransferCategory::Nft.action(), "tokennfttx");
        assert_eq!(TransferCategory::Token.to_string(), "TOKEN");
    }
}
