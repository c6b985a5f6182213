//! Change detection over overlapping explorer windows.
//!
//! Every poll returns the most recent N items for a channel, so consecutive
//! windows overlap heavily. A channel remembers which transaction hashes it
//! has already seen and only surfaces the rest.
//!
//! The first round (`RunPhase::Seeding`) only records what is already there:
//! something present at startup is not news. The seen set is bounded by
//! replacing it wholesale with the current window once it grows past
//! `max_seen`; an item that scrolled out of the window before a reset can
//! therefore alert again, which the window size makes practically moot.

use std::collections::HashSet;
use tracing::debug;

use crate::explorer::{RawLog, TransferCategory, TransferRecord};

/// Seen-set size past which a channel resets to its current window.
pub const MAX_SEEN_HASHES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// First round: learn the baseline, emit nothing.
    Seeding,
    /// Every later round: diff against the seen set and alert.
    Steady,
}

/// Bounded set of transaction hashes already accounted for.
#[derive(Debug, Clone)]
pub struct SeenSet {
    hashes: HashSet<String>,
    max: usize,
}

impl SeenSet {
    pub fn new(max: usize) -> Self {
        Self {
            hashes: HashSet::new(),
            max,
        }
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    /// Returns `true` if the hash was not present before.
    pub fn insert(&mut self, hash: &str) -> bool {
        self.hashes.insert(hash.to_string())
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// If over the bound, replace the contents with exactly `window`.
    /// Returns `true` when a reset happened.
    pub fn enforce_bound<'a, I>(&mut self, window: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.hashes.len() <= self.max {
            return false;
        }
        self.hashes = window
            .into_iter()
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
        true
    }
}

/// Inclusive lower bound of the next supply log query. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCursor(u64);

impl BlockCursor {
    pub fn new(block: u64) -> Self {
        Self(block)
    }

    /// Start `lookback` blocks behind `head`, or at genesis when the head is unknown.
    pub fn from_head(head: Option<u64>, lookback: u64) -> Self {
        Self(head.map(|h| h.saturating_sub(lookback)).unwrap_or(0))
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Move forward to `block` if it is ahead of the cursor.
    pub fn advance(&mut self, block: u64) {
        if block > self.0 {
            self.0 = block;
        }
    }
}

/// Keep transfers received by `address`. Native ETH additionally has to have
/// succeeded and carried value.
pub fn filter_incoming(transfers: Vec<TransferRecord>, address: &str) -> Vec<TransferRecord> {
    transfers
        .into_iter()
        .filter(|tx| tx.to.eq_ignore_ascii_case(address))
        .filter(|tx| tx.category != TransferCategory::Eth || (!tx.is_error && tx.has_value()))
        .collect()
}

/// Dedup state for one transfer category.
#[derive(Debug, Clone)]
pub struct TransferChannel {
    category: TransferCategory,
    seen: SeenSet,
}

impl TransferChannel {
    pub fn new(category: TransferCategory, max_seen: usize) -> Self {
        Self {
            category,
            seen: SeenSet::new(max_seen),
        }
    }

    pub fn category(&self) -> TransferCategory {
        self.category
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Feed one window of incoming transfers (newest first) and get back the
    /// ones never seen before, oldest first. Always empty while seeding.
    pub fn observe(&mut self, phase: RunPhase, incoming: Vec<TransferRecord>) -> Vec<TransferRecord> {
        let window: Vec<String> = incoming.iter().map(|tx| tx.hash.clone()).collect();

        let mut fresh = Vec::new();
        match phase {
            RunPhase::Seeding => {
                for tx in &incoming {
                    self.seen.insert(&tx.hash);
                }
            }
            RunPhase::Steady => {
                for tx in incoming {
                    if self.seen.insert(&tx.hash) {
                        fresh.push(tx);
                    }
                }
                fresh.reverse();
            }
        }

        if self.seen.enforce_bound(window.iter().map(String::as_str)) {
            debug!(category = %self.category, size = self.seen.len(), "seen set reset to current window");
        }

        fresh
    }
}

/// Dedup state and block cursor for the Aave supply channel.
#[derive(Debug, Clone)]
pub struct SupplyChannel {
    seen: SeenSet,
    cursor: BlockCursor,
}

impl SupplyChannel {
    pub fn new(cursor: BlockCursor, max_seen: usize) -> Self {
        Self {
            seen: SeenSet::new(max_seen),
            cursor,
        }
    }

    pub fn cursor(&self) -> BlockCursor {
        self.cursor
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Feed one batch of logs and get back the unseen ones in query order.
    /// Logs without a transaction hash are never surfaced. The cursor moves
    /// to the highest block in the batch regardless of phase.
    pub fn observe(&mut self, phase: RunPhase, logs: Vec<RawLog>) -> Vec<RawLog> {
        let window: Vec<String> = logs.iter().map(|l| l.transaction_hash.clone()).collect();
        if let Some(max_block) = logs.iter().map(RawLog::block).max() {
            self.cursor.advance(max_block);
        }

        let mut fresh = Vec::new();
        for log in logs {
            if log.transaction_hash.is_empty() {
                continue;
            }
            let novel = self.seen.insert(&log.transaction_hash);
            if novel && phase == RunPhase::Steady {
                fresh.push(log);
            }
        }

        if self.seen.enforce_bound(window.iter().map(String::as_str)) {
            debug!(size = self.seen.len(), "supply seen set reset to current window");
        }

        fresh
    }
}
