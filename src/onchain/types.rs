//! Decoded protocol events surfaced by the supply channel.

use alloy::primitives::Address;
use std::fmt;

/// An Aave V3 WETH `Supply` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyEvent {
    pub tx_hash: String,
    pub block_number: u64,
    /// `user` from the event payload; `None` when the payload is too short.
    pub beneficiary: Option<Address>,
    /// `from` of the originating transaction; `None` when the lookup failed.
    pub caller: Option<String>,
    /// Amount in WETH, already scaled by 18 decimals.
    pub amount_display: String,
}

impl SupplyEvent {
    /// Beneficiary as printed in alerts: lowercase hex, as it sits in the payload.
    pub fn beneficiary_display(&self) -> String {
        self.beneficiary
            .map(|a| format!("{:#x}", a))
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// True when the caller supplied on behalf of a different address.
    pub fn is_delegated(&self) -> bool {
        match &self.caller {
            Some(caller) => !caller.eq_ignore_ascii_case(&self.beneficiary_display()),
            None => false,
        }
    }
}

impl fmt::Display for SupplyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Supply({} WETH, block={}, tx={})",
            self.amount_display, self.block_number, self.tx_hash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn event(caller: Option<&str>) -> SupplyEvent {
        SupplyEvent {
            tx_hash: "0xabc".to_string(),
            block_number: 1,
            beneficiary: Some(Address::from_str("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2").unwrap()),
            caller: caller.map(str::to_string),
            amount_display: "1".to_string(),
        }
    }

    #[test]
    fn test_beneficiary_is_lowercase_hex() {
        assert_eq!(
            event(None).beneficiary_display(),
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
        );
        let mut unknown = event(None);
        unknown.beneficiary = None;
        assert_eq!(unknown.beneficiary_display(), "unknown");
    }

    #[test]
    fn test_delegation_ignores_case() {
        assert!(!event(Some("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")).is_delegated());
        assert!(event(Some("0x1111111111111111111111111111111111111111")).is_delegated());
        assert!(!event(None).is_delegated());
    }
}
