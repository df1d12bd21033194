use std::sync::Arc;

use devp2p::constants::{ETH_PROTOCOL_LENGTH, ETH_PROTOCOL_NAME, ETH_PROTOCOL_VERSION};
use devp2p::{MsgReadWriter, NodeInfo};
use tracing::{debug, info_span, Instrument};

use crate::conn::Connection;
use crate::database::Database;
use crate::error::Error;
use crate::session::SessionConfig;

/// The eth/66 subprotocol as registered with the transport. The transport
/// calls [`Eth66Protocol::run`] once per peer that negotiated it.
pub struct Eth66Protocol<D> {
    session: Arc<SessionConfig<D>>,
}

impl<D> Clone for Eth66Protocol<D> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<D: Database> Eth66Protocol<D> {
    pub const NAME: &'static str = ETH_PROTOCOL_NAME;
    pub const VERSION: u32 = ETH_PROTOCOL_VERSION;
    pub const LENGTH: u8 = ETH_PROTOCOL_LENGTH;

    pub fn new(session: Arc<SessionConfig<D>>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionConfig<D>> {
        &self.session
    }

    /// Serve one peer until its connection ends.
    pub async fn run<T: MsgReadWriter>(&self, peer: NodeInfo, rw: T) -> Result<(), Error> {
        let span = info_span!(
            "peer",
            peer = %peer.enode_url(),
            sensor = %self.session.sensor_id
        );
        let conn = Connection::new(peer, rw, Arc::clone(&self.session));

        async move {
            let result = conn.run().await;
            if let Err(e) = &result {
                debug!(err = %e, useless = e.is_useless_peer(), "peer disconnected");
            }
            result
        }
        .instrument(span)
        .await
    }
}
