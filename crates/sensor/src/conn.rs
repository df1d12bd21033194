use std::future::Future;
use std::sync::Arc;

use alloy_primitives::B256;
use chain::types::SealedHeader;
use devp2p::eth::{
    self, BlockBodiesPacket, BlockHeadersPacket, GetBlockHeadersRequest, HashListRequest,
    PooledTransactionsPacket,
};
use devp2p::{Msg, MsgReadWriter, NodeInfo};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::backfill::{Backfill, BackfillStep};
use crate::counters::add;
use crate::database::Database;
use crate::decode::{self, DecodeError};
use crate::error::Error;
use crate::handshake;
use crate::head::HeadBlock;
use crate::requests::RequestTracker;
use crate::session::SessionConfig;

/// Wait for a storage write, unless the session is shutting down first.
async fn store<F: Future<Output = ()>>(cancel: &CancellationToken, what: &'static str, write: F) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => debug!(what, "storage write abandoned on shutdown"),
        _ = write => {}
    }
}

/// One remote peer speaking eth/66.
///
/// Messages are handled strictly in arrival order. The request tracker and
/// backfill floor live and die with the connection.
pub struct Connection<T, D> {
    peer: NodeInfo,
    rw: T,
    session: Arc<SessionConfig<D>>,
    requests: RequestTracker,
    backfill: Backfill,
}

impl<T: MsgReadWriter, D: Database> Connection<T, D> {
    pub fn new(peer: NodeInfo, rw: T, session: Arc<SessionConfig<D>>) -> Self {
        Self {
            peer,
            rw,
            session,
            requests: RequestTracker::new(),
            backfill: Backfill::new(),
        }
    }

    /// Handshake, announce the peer to discovery, then dispatch until the
    /// peer goes away, a message is bad, or the session is cancelled.
    pub async fn run(mut self) -> Result<(), Error> {
        let fork_blocks = self.session.fork_blocks();
        handshake::handshake(
            &mut self.rw,
            self.session.network_id,
            self.session.genesis_hash,
            &fork_blocks,
            &self.session.head,
        )
        .await?;

        self.session.peers.publish(self.peer.clone()).await;

        self.dispatch().await
    }

    /// The message loop. Every handler error, read error or discard error
    /// ends the connection.
    pub async fn dispatch(&mut self) -> Result<(), Error> {
        let cancel = self.session.cancel.clone();
        loop {
            // Cancellation wins over messages already queued.
            let msg = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("session cancelled, closing connection");
                    return Ok(());
                }
                msg = self.rw.read_msg() => msg?,
            };

            if let Err(e) = self.handle(&msg).await {
                error!(err = %e, msg = eth::message_name(msg.code), "dropping peer");
                return Err(e);
            }

            self.rw.discard(msg).await?;
        }
    }

    async fn handle(&mut self, msg: &Msg) -> Result<(), Error> {
        match msg.code {
            eth::NEW_BLOCK_HASHES_MSG_ID => self.handle_new_block_hashes(&msg.payload).await,
            eth::TRANSACTIONS_MSG_ID => self.handle_transactions(&msg.payload).await,
            eth::GET_BLOCK_HEADERS_MSG_ID => self.handle_get_block_headers(&msg.payload).await,
            eth::BLOCK_HEADERS_MSG_ID => self.handle_block_headers(&msg.payload).await,
            eth::GET_BLOCK_BODIES_MSG_ID => self.handle_get_block_bodies(&msg.payload).await,
            eth::BLOCK_BODIES_MSG_ID => self.handle_block_bodies(&msg.payload).await,
            eth::NEW_BLOCK_MSG_ID => self.handle_new_block(&msg.payload).await,
            eth::NEW_POOLED_TRANSACTION_HASHES_MSG_ID => {
                self.handle_new_pooled_transaction_hashes(&msg.payload)
                    .await
            }
            eth::GET_POOLED_TRANSACTIONS_MSG_ID => {
                self.handle_get_pooled_transactions(&msg.payload).await
            }
            eth::POOLED_TRANSACTIONS_MSG_ID => self.handle_pooled_transactions(&msg.payload).await,
            eth::GET_RECEIPTS_MSG_ID => self.handle_get_receipts(&msg.payload).await,
            code => {
                trace!(code, msg = eth::message_name(code), size = msg.size(), "unhandled message");
                Ok(())
            }
        }
    }

    // ========================================================================
    // Outbound requests
    // ========================================================================

    /// Ask for the header and body of `hash`. Both requests carry the same
    /// id; the body response is matched back to `hash` through it.
    async fn get_block_data(&mut self, hash: B256) -> Result<(), Error> {
        let request_id = self.requests.allocate();

        let headers = GetBlockHeadersRequest::by_hash(request_id, hash.0);
        self.rw
            .write_msg(eth::GET_BLOCK_HEADERS_MSG_ID, headers.encode())
            .await?;

        self.requests.track(request_id, hash);
        let bodies = HashListRequest::new(request_id, vec![hash.0]);
        self.rw
            .write_msg(eth::GET_BLOCK_BODIES_MSG_ID, bodies.encode())
            .await?;
        Ok(())
    }

    async fn fetch_parent(&mut self, header: &SealedHeader) -> Result<(), Error> {
        let db = &self.session.database;
        let enabled = db.should_write_blocks() && db.should_write_block_events();

        let parent = match self.backfill.observe(header, enabled) {
            BackfillStep::FetchParent(parent) => parent,
            BackfillStep::Skip | BackfillStep::FloorSet => return Ok(()),
        };
        if self.session.database.has_block(parent).await {
            return Ok(());
        }

        info!(
            hash = %parent,
            number = header.number().saturating_sub(1),
            "Fetching missing parent block"
        );
        self.get_block_data(parent).await
    }

    async fn reply_empty(&mut self, code: u8, request_id: u64) -> Result<(), Error> {
        self.rw
            .write_msg(code, eth::encode_empty_response(request_id))
            .await?;
        Ok(())
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    async fn handle_new_block_hashes(&mut self, payload: &[u8]) -> Result<(), Error> {
        let announced = eth::decode_new_block_hashes(payload).map_err(DecodeError::from)?;
        add(&self.session.counters.block_hashes, announced.len());

        let mut hashes = Vec::with_capacity(announced.len());
        for (hash, _number) in announced {
            let hash = B256::from(hash);
            hashes.push(hash);
            self.get_block_data(hash).await?;
        }

        let db = &self.session.database;
        store(
            &self.session.cancel,
            "block hashes",
            db.write_block_hashes(&self.peer, &hashes),
        )
        .await;
        Ok(())
    }

    async fn handle_transactions(&mut self, payload: &[u8]) -> Result<(), Error> {
        let items = eth::decode_transactions(payload).map_err(DecodeError::from)?;
        let txs = decode::decode_transactions(&items)?;
        add(&self.session.counters.transactions, txs.len());

        let db = &self.session.database;
        store(
            &self.session.cancel,
            "transactions",
            db.write_transactions(&self.peer, &txs),
        )
        .await;
        Ok(())
    }

    async fn handle_get_block_headers(&mut self, payload: &[u8]) -> Result<(), Error> {
        let request = GetBlockHeadersRequest::decode(payload).map_err(DecodeError::from)?;
        add(&self.session.counters.block_header_requests, 1);
        self.reply_empty(eth::BLOCK_HEADERS_MSG_ID, request.request_id)
            .await
    }

    async fn handle_block_headers(&mut self, payload: &[u8]) -> Result<(), Error> {
        let packet = BlockHeadersPacket::decode(payload).map_err(DecodeError::from)?;
        let headers = packet
            .headers
            .iter()
            .map(|raw| decode::decode_block_header(raw))
            .collect::<Result<Vec<_>, _>>()?;
        add(&self.session.counters.block_headers, headers.len());

        for header in &headers {
            self.fetch_parent(header).await?;
        }

        let db = &self.session.database;
        store(
            &self.session.cancel,
            "block headers",
            db.write_block_headers(&headers),
        )
        .await;
        Ok(())
    }

    async fn handle_get_block_bodies(&mut self, payload: &[u8]) -> Result<(), Error> {
        let request = HashListRequest::decode(payload).map_err(DecodeError::from)?;
        add(&self.session.counters.block_body_requests, request.hashes.len());
        self.reply_empty(eth::BLOCK_BODIES_MSG_ID, request.request_id)
            .await
    }

    async fn handle_block_bodies(&mut self, payload: &[u8]) -> Result<(), Error> {
        let packet = BlockBodiesPacket::decode(payload).map_err(DecodeError::from)?;
        let mut bodies = packet
            .bodies
            .iter()
            .map(|raw| decode::decode_block_body(raw))
            .collect::<Result<Vec<_>, _>>()?;
        if bodies.is_empty() {
            return Ok(());
        }
        add(&self.session.counters.block_bodies, bodies.len());

        let Some(hash) = self.requests.resolve(packet.request_id) else {
            warn!(request_id = packet.request_id, "No block hash found for block body");
            return Ok(());
        };

        let body = bodies.swap_remove(0);
        let db = &self.session.database;
        store(
            &self.session.cancel,
            "block body",
            db.write_block_body(&body, hash),
        )
        .await;
        Ok(())
    }

    async fn handle_new_block(&mut self, payload: &[u8]) -> Result<(), Error> {
        let (block, td) = decode::decode_new_block(payload)?;
        add(&self.session.counters.blocks, 1);

        self.session
            .head
            .propose(HeadBlock {
                hash: block.hash(),
                total_difficulty: td,
                number: block.number(),
            })
            .await;

        self.fetch_parent(&block.header).await?;

        let db = &self.session.database;
        store(
            &self.session.cancel,
            "block",
            db.write_block(&self.peer, &block, td),
        )
        .await;
        Ok(())
    }

    async fn handle_new_pooled_transaction_hashes(&mut self, payload: &[u8]) -> Result<(), Error> {
        let hashes = eth::decode_pooled_transaction_hashes(payload).map_err(DecodeError::from)?;
        add(&self.session.counters.transaction_hashes, hashes.len());

        let db = &self.session.database;
        if !db.should_write_transactions() || !db.should_write_transaction_events() {
            return Ok(());
        }

        let request = HashListRequest::new(self.requests.allocate(), hashes);
        self.rw
            .write_msg(eth::GET_POOLED_TRANSACTIONS_MSG_ID, request.encode())
            .await?;
        Ok(())
    }

    async fn handle_get_pooled_transactions(&mut self, payload: &[u8]) -> Result<(), Error> {
        let request = HashListRequest::decode(payload).map_err(DecodeError::from)?;
        add(&self.session.counters.transaction_requests, request.hashes.len());
        self.reply_empty(eth::POOLED_TRANSACTIONS_MSG_ID, request.request_id)
            .await
    }

    async fn handle_pooled_transactions(&mut self, payload: &[u8]) -> Result<(), Error> {
        let packet = PooledTransactionsPacket::decode(payload).map_err(DecodeError::from)?;
        let txs = decode::decode_transactions(&packet.transactions)?;
        add(&self.session.counters.transactions, txs.len());

        let db = &self.session.database;
        store(
            &self.session.cancel,
            "pooled transactions",
            db.write_transactions(&self.peer, &txs),
        )
        .await;
        Ok(())
    }

    async fn handle_get_receipts(&mut self, payload: &[u8]) -> Result<(), Error> {
        let request = HashListRequest::decode(payload).map_err(DecodeError::from)?;
        self.reply_empty(eth::RECEIPTS_MSG_ID, request.request_id)
            .await
    }
}
