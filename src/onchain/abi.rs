//! Aave V3 Pool event constants used by the supply log filter.

use alloy::primitives::{address, b256, keccak256, Address, B256};

/// Aave V3 Pool on Ethereum mainnet.
pub const AAVE_V3_POOL: Address = address!("87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2");

/// Canonical WETH on Ethereum mainnet.
pub const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// keccak256("Supply(address,address,address,uint256,uint16)")
pub const SUPPLY_EVENT_TOPIC: B256 =
    b256!("2b627736bca15cd5381dcf80b0bf11fd197d01a037c52b927a881a10fb73ba61");

/// `reserve` (topic1) filter: WETH left-padded to 32 bytes.
pub const WETH_RESERVE_TOPIC: B256 =
    b256!("000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

pub const SUPPLY_EVENT_SIGNATURE: &str = "Supply(address,address,address,uint256,uint16)";

/// Decimals of the WETH reserve.
pub const WETH_DECIMALS: u32 = 18;

/// Check the pre-computed topic against its event signature.
pub fn verify_supply_topic() -> bool {
    keccak256(SUPPLY_EVENT_SIGNATURE.as_bytes()) == SUPPLY_EVENT_TOPIC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_topic_matches_signature() {
        assert!(verify_supply_topic());
    }

    #[test]
    fn test_weth_topic_is_padded_address() {
        assert_eq!(&WETH_RESERVE_TOPIC[12..], WETH.as_slice());
        assert!(WETH_RESERVE_TOPIC[..12].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_topic_strings_are_full_width() {
        let topic = SUPPLY_EVENT_TOPIC.to_string();
        assert_eq!(topic.len(), 66);
        assert!(topic.starts_with("0x2b6277"));
    }
}
