//! Address watcher: polls Etherscan for incoming ETH, ERC-20 and ERC-721
//! transfers to one address (and optionally Aave V3 WETH supplies) and
//! raises a local alert for each new one.
//!
//! The library holds everything; `main.rs` only wires config, logging and
//! Ctrl+C into [`monitor::Monitor`].

pub mod alert;
pub mod amount;
pub mod config;
pub mod explorer;
pub mod monitor;
pub mod onchain;
pub mod tracker;
