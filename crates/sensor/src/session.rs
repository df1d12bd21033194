use std::sync::Arc;

use alloy_primitives::B256;
use chain::genesis::Genesis;
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigError, SensorConfig};
use crate::counters::MessageCounters;
use crate::discovery::PeerSink;
use crate::head::{HeadBlock, HeadTracker};

/// Parameters fixed for the lifetime of a sensor session, shared by every
/// connection. Only `head` and `counters` are mutated after start.
pub struct SessionConfig<D> {
    pub network_id: u64,
    pub genesis: Genesis,
    pub genesis_hash: B256,
    pub sensor_id: String,
    pub head: Arc<HeadTracker>,
    pub counters: Arc<MessageCounters>,
    pub database: Arc<D>,
    pub peers: PeerSink,
    pub cancel: CancellationToken,
}

impl<D> SessionConfig<D> {
    /// A session whose head starts at genesis, with fresh counters and its
    /// own cancellation token.
    pub fn new(
        network_id: u64,
        genesis: Genesis,
        genesis_hash: B256,
        sensor_id: impl Into<String>,
        database: Arc<D>,
        peers: PeerSink,
    ) -> Self {
        let head = HeadBlock::genesis(genesis_hash, genesis.difficulty);
        Self {
            network_id,
            genesis,
            genesis_hash,
            sensor_id: sensor_id.into(),
            head: Arc::new(HeadTracker::new(head)),
            counters: Arc::new(MessageCounters::new()),
            database,
            peers,
            cancel: CancellationToken::new(),
        }
    }

    /// Build a session from a loaded config file, reading its genesis.
    pub fn from_config(
        config: &SensorConfig,
        database: Arc<D>,
        peers: PeerSink,
    ) -> Result<Self, ConfigError> {
        let genesis = config.load_genesis()?;
        Ok(Self::new(
            config.network_id,
            genesis,
            config.genesis_hash,
            config.sensor_id.clone(),
            database,
            peers,
        ))
    }

    pub fn with_head(mut self, head: Arc<HeadTracker>) -> Self {
        self.head = head;
        self
    }

    pub fn with_counters(mut self, counters: Arc<MessageCounters>) -> Self {
        self.counters = counters;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn fork_blocks(&self) -> Vec<u64> {
        self.genesis.config.fork_blocks()
    }
}
