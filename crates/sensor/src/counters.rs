use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Session-wide tallies of eth traffic, shared by every connection.
///
/// Counters only ever grow; wrap-around at `u64::MAX` is not handled.
#[derive(Debug, Default)]
pub struct MessageCounters {
    pub block_hashes: AtomicU64,
    pub block_headers: AtomicU64,
    pub block_header_requests: AtomicU64,
    pub block_bodies: AtomicU64,
    pub block_body_requests: AtomicU64,
    pub blocks: AtomicU64,
    pub transactions: AtomicU64,
    pub transaction_hashes: AtomicU64,
    pub transaction_requests: AtomicU64,
}

/// Point-in-time copy of [`MessageCounters`] for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageCountsSnapshot {
    pub block_hashes: u64,
    pub block_headers: u64,
    pub block_header_requests: u64,
    pub block_bodies: u64,
    pub block_body_requests: u64,
    pub blocks: u64,
    pub transactions: u64,
    pub transaction_hashes: u64,
    pub transaction_requests: u64,
}

pub(crate) fn add(counter: &AtomicU64, n: usize) {
    counter.fetch_add(n as u64, Ordering::Relaxed);
}

impl MessageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MessageCountsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MessageCountsSnapshot {
            block_hashes: load(&self.block_hashes),
            block_headers: load(&self.block_headers),
            block_header_requests: load(&self.block_header_requests),
            block_bodies: load(&self.block_bodies),
            block_body_requests: load(&self.block_body_requests),
            blocks: load(&self.blocks),
            transactions: load(&self.transactions),
            transaction_hashes: load(&self.transaction_hashes),
            transaction_requests: load(&self.transaction_requests),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn snapshot_reflects_adds() {
        let counters = MessageCounters::new();
        add(&counters.blocks, 1);
        add(&counters.transactions, 3);
        add(&counters.transactions, 2);

        let snap = counters.snapshot();
        assert_eq!(snap.blocks, 1);
        assert_eq!(snap.transactions, 5);
        assert_eq!(snap.block_bodies, 0);
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let counters = Arc::new(MessageCounters::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&counters);
                std::thread::spawn(move || {
                    for _ in 0..10_000 {
                        add(&c.block_hashes, 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counters.snapshot().block_hashes, 80_000);
    }

    #[test]
    fn snapshot_serializes_as_flat_object() {
        let json = serde_json::to_value(MessageCountsSnapshot::default()).unwrap();
        assert_eq!(json["transaction_requests"], 0);
    }
}
