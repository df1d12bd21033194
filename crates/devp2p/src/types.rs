use std::fmt;
use std::net::SocketAddr;

use crate::constants::NODE_ID_LEN;

/// Identity of a remote peer as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub pubkey: [u8; NODE_ID_LEN],
    pub addr: SocketAddr,
}

impl NodeInfo {
    pub fn new(pubkey: [u8; NODE_ID_LEN], addr: SocketAddr) -> Self {
        Self { pubkey, addr }
    }

    pub fn enode_url(&self) -> String {
        format!(
            "enode://{}@{}:{}",
            hex::encode(self.pubkey),
            self.addr.ip(),
            self.addr.port()
        )
    }

    /// First 8 bytes of the node id, hex encoded, for log lines.
    pub fn short_id(&self) -> String {
        hex::encode(&self.pubkey[..8])
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.enode_url())
    }
}

/// devp2p disconnect reasons (p2p Disconnect message, code 0x01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Requested,
    NetworkError,
    ProtocolError,
    UselessPeer,
    TooManyPeers,
    AlreadyConnected,
    IncompatibleVersion,
    ClientQuitting,
    SubprotocolError,
}

impl DisconnectReason {
    pub fn description(&self) -> &'static str {
        match self {
            DisconnectReason::Requested => "disconnect requested",
            DisconnectReason::NetworkError => "network error",
            DisconnectReason::ProtocolError => "breach of protocol",
            DisconnectReason::UselessPeer => "useless peer",
            DisconnectReason::TooManyPeers => "too many peers",
            DisconnectReason::AlreadyConnected => "already connected",
            DisconnectReason::IncompatibleVersion => "incompatible p2p protocol version",
            DisconnectReason::ClientQuitting => "client quitting",
            DisconnectReason::SubprotocolError => "subprotocol error",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
