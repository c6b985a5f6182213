//! Supply(address indexed reserve, address user, address indexed onBehalfOf,
//!        uint256 amount, uint16 indexed referralCode)
//!
//! Non-indexed params live in `data`:
//!   [0..32]  user   (address, right-aligned)
//!   [32..64] amount (uint256, big-endian)
//!
//! Short or malformed payloads never fail the record; the affected field
//! degrades to "unknown" / zero instead.

use alloy::primitives::{Address, U256};
use std::str::FromStr;
use tracing::debug;

use super::abi::WETH_DECIMALS;
use super::types::SupplyEvent;
use crate::amount::format_units;
use crate::explorer::{ExplorerApi, RawLog};

/// Hex chars in one ABI word.
const WORD_HEX: usize = 64;

/// Pull `(user, amount)` out of a `0x`-prefixed log payload.
pub fn decode_supply_payload(data: &str) -> (Option<Address>, U256) {
    let body = data.strip_prefix("0x").unwrap_or(data);

    // Low 20 bytes of word 0
    let user = body
        .get(WORD_HEX - 40..WORD_HEX)
        .and_then(|hex| Address::from_str(hex).ok());

    let amount = body
        .get(WORD_HEX..2 * WORD_HEX)
        .and_then(|hex| U256::from_str_radix(hex, 16).ok())
        .unwrap_or(U256::ZERO);

    (user, amount)
}

/// Decode a raw supply log, looking up the originating caller through `api`.
pub async fn decode_supply_event<A>(api: &A, log: &RawLog) -> SupplyEvent
where
    A: ExplorerApi + ?Sized,
{
    let (beneficiary, amount) = decode_supply_payload(&log.data);

    let caller = if log.transaction_hash.is_empty() {
        None
    } else {
        api.get_transaction_sender(&log.transaction_hash).await
    };

    if beneficiary.is_none() {
        debug!(tx = %log.transaction_hash, data_len = log.data.len(), "supply payload too short");
    }

    SupplyEvent {
        tx_hash: log.transaction_hash.clone(),
        block_number: log.block(),
        beneficiary,
        caller,
        amount_display: format_units(&amount.to_string(), WETH_DECIMALS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::{ExplorerError, TransferCategory, TransferRecord};
    use async_trait::async_trait;

    const USER: &str = "1111111111111111111111111111111111111111";

    fn payload(user: &str, amount_hex: &str) -> String {
        format!("0x{:0>64}{:0>64}", user, amount_hex)
    }

    struct SenderOnly(Option<String>);

    #[async_trait]
    impl ExplorerApi for SenderOnly {
        async fn list_transfers(
            &self,
            _address: &str,
            _category: TransferCategory,
        ) -> Result<Vec<TransferRecord>, ExplorerError> {
            Ok(Vec::new())
        }
        async fn get_supply_logs(&self, _from_block: u64) -> Result<Vec<RawLog>, ExplorerError> {
            Ok(Vec::new())
        }
        async fn get_transaction_sender(&self, _tx_hash: &str) -> Option<String> {
            self.0.clone()
        }
        async fn get_latest_block(&self) -> Option<u64> {
            None
        }
    }

    #[test]
    fn test_full_payload() {
        // 1.5 WETH
        let (user, amount) = decode_supply_payload(&payload(USER, "14d1120d7b160000"));
        assert_eq!(user, Some(Address::from_str(USER).unwrap()));
        assert_eq!(amount, U256::from(1_500_000_000_000_000_000u64));
    }

    #[test]
    fn test_short_payload_degrades() {
        // Only word 0 present: user decodes, amount is zero
        let data = format!("0x{:0>64}", USER);
        assert_eq!(data.len(), 66);
        let (user, amount) = decode_supply_payload(&data);
        assert!(user.is_some());
        assert_eq!(amount, U256::ZERO);

        // 129 chars: still one short of the amount word
        let almost = format!("{}{}", data, "f".repeat(63));
        assert_eq!(almost.len(), 129);
        let (_, amount) = decode_supply_payload(&almost);
        assert_eq!(amount, U256::ZERO);

        let (user, amount) = decode_supply_payload("0x1234");
        assert_eq!(user, None);
        assert_eq!(amount, U256::ZERO);

        let (user, amount) = decode_supply_payload("0x");
        assert_eq!(user, None);
        assert_eq!(amount, U256::ZERO);
    }

    #[test]
    fn test_malformed_hex_degrades() {
        let data = format!("0x{}", "zz".repeat(64));
        let (user, amount) = decode_supply_payload(&data);
        assert_eq!(user, None);
        assert_eq!(amount, U256::ZERO);
    }

    #[tokio::test]
    async fn test_decode_event_with_caller() {
        let log = RawLog {
            data: payload(USER, "de0b6b3a7640000"),
            block_number: "0x12d687".to_string(),
            transaction_hash: "0xfeed".to_string(),
            ..Default::default()
        };
        let api = SenderOnly(Some("0x2222222222222222222222222222222222222222".to_string()));
        let event = decode_supply_event(&api, &log).await;

        assert_eq!(event.amount_display, "1");
        assert_eq!(event.block_number, 1_234_567);
        assert_eq!(event.tx_hash, "0xfeed");
        assert!(event.is_delegated());
    }

    #[tokio::test]
    async fn test_decode_event_short_payload_unknown_caller() {
        let log = RawLog {
            data: "0xabcdef".to_string(),
            block_number: "0x10".to_string(),
            transaction_hash: "0xbeef".to_string(),
            ..Default::default()
        };
        let event = decode_supply_event(&SenderOnly(None), &log).await;

        assert_eq!(event.amount_display, "0");
        assert_eq!(event.beneficiary_display(), "unknown");
        assert_eq!(event.caller, None);
        assert!(!event.is_delegated());
    }
}
