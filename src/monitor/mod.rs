//! The poll loop.
//!
//! One task, one round per tick: each transfer category in turn, then the
//! Aave supply channel when enabled, then sleep. Queries are awaited one
//! after another; a failed query skips that channel until the next tick.
//! All dedup state lives in the `Monitor` value, nothing is global.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::alert::{render_supply, render_transfer, AlertSink};
use crate::config::{Config, SoundConfig};
use crate::explorer::{ExplorerApi, TransferCategory};
use crate::onchain::decode_supply_event;
use crate::tracker::{filter_incoming, BlockCursor, RunPhase, SupplyChannel, TransferChannel};

pub struct Monitor<A, S> {
    address: String,
    api: A,
    sink: S,
    sounds: SoundConfig,
    poll_interval: Duration,
    max_seen: usize,
    aave_lookback_blocks: u64,
    watch_aave: bool,
    phase: RunPhase,
    transfers: Vec<TransferChannel>,
    /// Set up by `start` when Aave watching is enabled.
    supply: Option<SupplyChannel>,
}

impl<A: ExplorerApi, S: AlertSink> Monitor<A, S> {
    pub fn new(address: String, config: &Config, api: A, sink: S, watch_aave: bool) -> Self {
        let max_seen = config.monitor.max_seen_hashes;
        Self {
            address,
            api,
            sink,
            sounds: config.sounds.clone(),
            poll_interval: config.monitor.poll_interval(),
            max_seen,
            aave_lookback_blocks: config.monitor.aave_lookback_blocks,
            watch_aave,
            phase: RunPhase::Seeding,
            transfers: TransferCategory::ALL
                .iter()
                .map(|c| TransferChannel::new(*c, max_seen))
                .collect(),
            supply: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn transfer_channel(&self, category: TransferCategory) -> Option<&TransferChannel> {
        self.transfers.iter().find(|c| c.category() == category)
    }

    pub fn supply_channel(&self) -> Option<&SupplyChannel> {
        self.supply.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Position the supply cursor behind the chain head and print the banner.
    pub async fn start(&mut self) {
        if self.watch_aave && self.supply.is_none() {
            let head = self.api.get_latest_block().await;
            if head.is_none() {
                warn!("could not fetch current block, Aave monitoring starts from block 0");
            }
            let cursor = BlockCursor::from_head(head, self.aave_lookback_blocks);
            info!(from_block = cursor.get(), "Aave supply channel enabled");
            self.supply = Some(SupplyChannel::new(cursor, self.max_seen));
        }

        let mut features = "ETH, ERC-20 tokens, ERC-721 NFTs".to_string();
        if self.watch_aave {
            features.push_str(", Aave V3 WETH Supply events");
        }
        println!("Monitoring address: {}", self.address);
        println!("Tracking: {}", features);
        println!(
            "Polling every {} seconds. Press Ctrl+C to stop.\n",
            self.poll_interval.as_secs()
        );
    }

    /// One pass over every channel. The first call only seeds.
    pub async fn poll_round(&mut self) {
        self.poll_transfers().await;
        self.poll_supply().await;

        if self.phase == RunPhase::Seeding {
            info!(
                seeded = self.transfers.iter().map(|c| c.seen().len()).sum::<usize>()
                    + self.supply.as_ref().map_or(0, |s| s.seen().len()),
                "baseline recorded, watching for new events"
            );
            self.phase = RunPhase::Steady;
        }
    }

    async fn poll_transfers(&mut self) {
        let phase = self.phase;
        for channel in self.transfers.iter_mut() {
            let category = channel.category();
            let transfers = match self.api.list_transfers(&self.address, category).await {
                Ok(t) => t,
                Err(e) => {
                    warn!(endpoint = e.endpoint(), error = %e, "transfer query failed, skipping");
                    continue;
                }
            };

            let incoming = filter_incoming(transfers, &self.address);
            for tx in channel.observe(phase, incoming) {
                info!(category = %category, tx = %tx.hash, from = %tx.from, "incoming transfer");
                self.sink
                    .notify(&render_transfer(&tx), self.sounds.for_category(category));
            }
        }
    }

    async fn poll_supply(&mut self) {
        let phase = self.phase;
        let Some(channel) = self.supply.as_mut() else {
            return;
        };

        let logs = match self.api.get_supply_logs(channel.cursor().get()).await {
            Ok(logs) => logs,
            Err(e) => {
                warn!(endpoint = e.endpoint(), error = %e, "supply log query failed, skipping");
                return;
            }
        };

        for log in channel.observe(phase, logs) {
            let event = decode_supply_event(&self.api, &log).await;
            info!(%event, "Aave WETH supply");
            self.sink.notify(&render_supply(&event), &self.sounds.aave);
        }
    }

    /// Poll until `shutdown` resolves. Shutdown is only observed between
    /// rounds, while sleeping.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.start().await;
        tokio::pin!(shutdown);

        loop {
            self.poll_round().await;

            tokio::select! {
                _ = &mut shutdown => {
                    info!("monitor stopped");
                    return;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}
