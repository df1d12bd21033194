use std::future::Future;

use alloy_primitives::{B256, U256};
use chain::types::{Block, BlockBody, SealedHeader, Transaction};
use devp2p::NodeInfo;

/// Storage collaborator the sensor forwards everything it observes to.
///
/// Writes are best effort: failures are the implementor's to log and
/// swallow. The protocol core never retries.
pub trait Database: Send + Sync {
    fn should_write_blocks(&self) -> bool;

    fn should_write_block_events(&self) -> bool;

    fn should_write_transactions(&self) -> bool;

    fn should_write_transaction_events(&self) -> bool;

    fn has_block(&self, hash: B256) -> impl Future<Output = bool> + Send;

    fn write_block(
        &self,
        peer: &NodeInfo,
        block: &Block,
        total_difficulty: U256,
    ) -> impl Future<Output = ()> + Send;

    fn write_block_headers(&self, headers: &[SealedHeader]) -> impl Future<Output = ()> + Send;

    fn write_block_body(&self, body: &BlockBody, hash: B256) -> impl Future<Output = ()> + Send;

    fn write_block_hashes(&self, peer: &NodeInfo, hashes: &[B256])
        -> impl Future<Output = ()> + Send;

    fn write_transactions(
        &self,
        peer: &NodeInfo,
        transactions: &[Transaction],
    ) -> impl Future<Output = ()> + Send;
}

/// Wants nothing, stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDatabase;

impl Database for NoopDatabase {
    fn should_write_blocks(&self) -> bool {
        false
    }

    fn should_write_block_events(&self) -> bool {
        false
    }

    fn should_write_transactions(&self) -> bool {
        false
    }

    fn should_write_transaction_events(&self) -> bool {
        false
    }

    async fn has_block(&self, _hash: B256) -> bool {
        false
    }

    async fn write_block(&self, _peer: &NodeInfo, _block: &Block, _total_difficulty: U256) {}

    async fn write_block_headers(&self, _headers: &[SealedHeader]) {}

    async fn write_block_body(&self, _body: &BlockBody, _hash: B256) {}

    async fn write_block_hashes(&self, _peer: &NodeInfo, _hashes: &[B256]) {}

    async fn write_transactions(&self, _peer: &NodeInfo, _transactions: &[Transaction]) {}
}
