//! Aave V3 WETH supply monitoring on Ethereum mainnet.
//!
//! - `abi`: pool address, event topic and reserve filter
//! - `decoder`: fixed-layout decode of `Supply` log payloads
//! - `types`: the decoded `SupplyEvent`

pub mod abi;
pub mod decoder;
pub mod types;

pub use decoder::decode_supply_event;
pub use types::SupplyEvent;
