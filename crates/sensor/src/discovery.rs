use std::collections::HashSet;
use std::path::PathBuf;

use devp2p::constants::NODE_ID_LEN;
use devp2p::NodeInfo;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEFAULT_PEER_QUEUE_CAPACITY: usize = 256;

/// Producer side of the discovery output. Every connection holds a clone.
#[derive(Debug, Clone)]
pub struct PeerSink {
    tx: mpsc::Sender<NodeInfo>,
}

/// Bounded discovery queue. Publishers wait while it is full.
pub fn channel(capacity: usize) -> (PeerSink, mpsc::Receiver<NodeInfo>) {
    let (tx, rx) = mpsc::channel(capacity);
    (PeerSink { tx }, rx)
}

impl PeerSink {
    /// Hand a handshaken peer to the collector, waiting for queue space.
    /// A closed queue is not an error for the connection.
    pub async fn publish(&self, node: NodeInfo) {
        if self.tx.send(node).await.is_err() {
            debug!("peer queue closed, dropping discovered node");
        }
    }
}

/// Consumer of the discovery queue: keeps the distinct peers seen during the
/// session and mirrors them into a JSON nodes file.
pub struct NodeCollector {
    rx: mpsc::Receiver<NodeInfo>,
    nodes_file: Option<PathBuf>,
    seen: HashSet<[u8; NODE_ID_LEN]>,
    nodes: Vec<NodeInfo>,
}

impl NodeCollector {
    pub fn new(rx: mpsc::Receiver<NodeInfo>, nodes_file: Option<PathBuf>) -> Self {
        Self {
            rx,
            nodes_file,
            seen: HashSet::new(),
            nodes: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }

    /// Remember `node`. Returns false if its node id was already known.
    pub fn record(&mut self, node: NodeInfo) -> bool {
        if !self.seen.insert(node.pubkey) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Drain the queue until every sink is dropped or `cancel` fires.
    /// The nodes file is rewritten after each new peer.
    pub async fn run(mut self, cancel: CancellationToken) -> Vec<NodeInfo> {
        loop {
            let node = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                node = self.rx.recv() => match node {
                    Some(node) => node,
                    None => break,
                },
            };

            if self.record(node) {
                self.persist().await;
            }
        }
        self.nodes
    }

    async fn persist(&self) {
        let Some(path) = &self.nodes_file else {
            return;
        };
        let urls: Vec<String> = self.nodes.iter().map(NodeInfo::enode_url).collect();
        let json = match serde_json::to_string_pretty(&urls) {
            Ok(json) => json,
            Err(e) => {
                warn!(err = %e, "failed to encode nodes file");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(path, json).await {
            warn!(err = %e, path = %path.display(), "failed to write nodes file");
        }
    }
}
