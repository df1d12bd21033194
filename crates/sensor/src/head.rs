use alloy_primitives::{B256, U256};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::info;

/// Best block this sensor has heard about, reported in every Status we send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadBlock {
    pub hash: B256,
    pub total_difficulty: U256,
    pub number: u64,
}

impl HeadBlock {
    /// Head of a chain that only has its genesis block.
    pub fn genesis(hash: B256, difficulty: U256) -> Self {
        Self {
            hash,
            total_difficulty: difficulty,
            number: 0,
        }
    }
}

/// Session-wide head shared by all connections.
///
/// The head only moves when a candidate beats it on both number and total
/// difficulty. A report that improves just one of the two is ignored.
#[derive(Debug)]
pub struct HeadTracker {
    head: RwLock<HeadBlock>,
}

impl HeadTracker {
    pub fn new(initial: HeadBlock) -> Self {
        Self {
            head: RwLock::new(initial),
        }
    }

    /// Shared guard, held by handshakes for the whole status exchange.
    pub async fn read(&self) -> RwLockReadGuard<'_, HeadBlock> {
        self.head.read().await
    }

    pub async fn snapshot(&self) -> HeadBlock {
        *self.head.read().await
    }

    /// Replace the head with `candidate` if it is strictly ahead on number
    /// and total difficulty. Returns whether the head changed.
    pub async fn propose(&self, candidate: HeadBlock) -> bool {
        let mut head = self.head.write().await;
        if candidate.number > head.number && candidate.total_difficulty > head.total_difficulty {
            *head = candidate;
            info!(
                hash = %candidate.hash,
                number = candidate.number,
                td = %candidate.total_difficulty,
                "Setting head block"
            );
            true
        } else {
            false
        }
    }
}
