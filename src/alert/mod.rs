//! Operator alerts: a printed summary block plus a per-channel sound.
//!
//! Alerting is best-effort. The sound player is spawned as a detached child
//! process and never awaited, so a slow or missing player cannot stall the
//! poll loop, and spawn failures are swallowed.

use std::process::Stdio;
use tracing::debug;

use crate::amount::format_token_amount;
use crate::explorer::{TransferCategory, TransferRecord};
use crate::onchain::SupplyEvent;

/// Width of the `=` rules framing every alert.
const RULE_WIDTH: usize = 60;

/// Receives one notification per detected event.
pub trait AlertSink: Send + Sync {
    /// Show `summary` and play `sound`. Must not block or fail observably.
    fn notify(&self, summary: &str, sound: &str);
}

impl<T: AlertSink + ?Sized> AlertSink for std::sync::Arc<T> {
    fn notify(&self, summary: &str, sound: &str) {
        (**self).notify(summary, sound)
    }
}

/// Prints to stdout and plays sounds through an external player command.
pub struct ConsoleAlerter {
    player: String,
}

impl ConsoleAlerter {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
        }
    }

    fn play(&self, sound: &str) {
        let spawned = tokio::process::Command::new(&self.player)
            .arg(sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        // Child is dropped without waiting; tokio reaps it in the background.
        if let Err(e) = spawned {
            debug!(player = %self.player, sound = sound, error = %e, "sound playback failed");
        }
    }
}

impl AlertSink for ConsoleAlerter {
    fn notify(&self, summary: &str, sound: &str) {
        println!("{}", summary);
        self.play(sound);
    }
}

fn framed(lines: &[String]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("\n{}\n", rule);
    for line in lines {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// Alert block for an incoming transfer.
pub fn render_transfer(tx: &TransferRecord) -> String {
    let mut lines = vec![format!("NEW {} TRANSFER DETECTED", tx.category)];

    match tx.category {
        TransferCategory::Eth => {
            let amount = format_token_amount(&tx.value, "18");
            lines.push(format!("Amount: {} ETH", amount));
        }
        TransferCategory::Token => {
            let name = tx.token_name.as_deref().unwrap_or("Unknown");
            let symbol = tx.token_symbol.as_deref().unwrap_or("???");
            let amount = format_token_amount(&tx.value, &tx.decimals);
            lines.push(format!("Token:  {} ({})", name, symbol));
            lines.push(format!("Amount: {} {}", amount, symbol));
        }
        TransferCategory::Nft => {
            let name = tx.token_name.as_deref().unwrap_or("Unknown");
            let id = tx.token_id.as_deref().unwrap_or("?");
            lines.push(format!("Token:  {} #{}", name, id));
        }
    }

    let sender = if tx.from.is_empty() { "unknown" } else { tx.from.as_str() };
    lines.push(format!("From:   {}", sender));
    lines.push(format!("Tx:     {}", tx.hash));
    framed(&lines)
}

/// Alert block for an Aave V3 WETH supply.
pub fn render_supply(event: &SupplyEvent) -> String {
    let mut lines = vec![
        "AAVE V3 WETH SUPPLY DETECTED".to_string(),
        format!("Amount: {} WETH", event.amount_display),
    ];

    match &event.caller {
        Some(caller) => {
            lines.push(format!("Sender: {}", caller));
            if event.is_delegated() {
                lines.push(format!("Via:    {}", event.beneficiary_display()));
            }
        }
        None => lines.push(format!("User:   {}", event.beneficiary_display())),
    }

    lines.push(format!("Tx:     {}", event.tx_hash));
    framed(&lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::types::ApiTransfer;
    use alloy::primitives::Address;
    use std::str::FromStr;

    fn record(category: TransferCategory, api: ApiTransfer) -> TransferRecord {
        TransferRecord::from_api(category, api)
    }

    #[test]
    fn test_render_eth() {
        let tx = record(
            TransferCategory::Eth,
            ApiTransfer {
                hash: "0xaaa".into(),
                from: "0xsender".into(),
                value: "1500000000000000000".into(),
                ..Default::default()
            },
        );
        let out = render_transfer(&tx);
        assert!(out.contains("NEW ETH TRANSFER DETECTED"));
        assert!(out.contains("Amount: 1.5 ETH"));
        assert!(out.contains("From:   0xsender"));
        assert!(out.contains("Tx:     0xaaa"));
        assert!(out.contains(&"=".repeat(60)));
    }

    #[test]
    fn test_render_token_defaults() {
        let tx = record(
            TransferCategory::Token,
            ApiTransfer {
                hash: "0xbbb".into(),
                value: "2500000".into(),
                token_decimal: Some("6".into()),
                ..Default::default()
            },
        );
        let out = render_transfer(&tx);
        assert!(out.contains("Token:  Unknown (???)"));
        assert!(out.contains("Amount: 2.5 ???"));
        assert!(out.contains("From:   unknown"));
    }

    #[test]
    fn test_render_nft() {
        let tx = record(
            TransferCategory::Nft,
            ApiTransfer {
                hash: "0xccc".into(),
                token_name: Some("Punks".into()),
                token_id: Some("42".into()),
                ..Default::default()
            },
        );
        let out = render_transfer(&tx);
        assert!(out.contains("NEW NFT TRANSFER DETECTED"));
        assert!(out.contains("Token:  Punks #42"));
        assert!(!out.contains("Amount:"));
    }

    #[test]
    fn test_render_supply_variants() {
        let user = Address::from_str("0x1111111111111111111111111111111111111111").unwrap();
        let mut event = SupplyEvent {
            tx_hash: "0xddd".into(),
            block_number: 1,
            beneficiary: Some(user),
            caller: None,
            amount_display: "3".into(),
        };
        let out = render_supply(&event);
        assert!(out.contains("Amount: 3 WETH"));
        assert!(out.contains(&format!("User:   {}", user)));

        // Caller supplied for itself: no Via line
        event.caller = Some("0x1111111111111111111111111111111111111111".into());
        let out = render_supply(&event);
        assert!(out.contains("Sender: 0x1111"));
        assert!(!out.contains("Via:"));

        event.caller = Some("0x2222222222222222222222222222222222222222".into());
        let out = render_supply(&event);
        assert!(out.contains(&format!("Via:    {}", user)));
    }

    #[tokio::test]
    async fn test_missing_player_is_swallowed() {
        let alerter = ConsoleAlerter::new("definitely-not-a-sound-player-binary");
        alerter.notify("test", "/nonexistent.aiff");
    }
}
