use devp2p::DisconnectReason;
use thiserror::Error;

use crate::decode::DecodeError;

/// Errors that terminate a single peer connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] devp2p::Error),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("expected {expected} message code, got 0x{got:02x}")]
    UnexpectedMessage { expected: &'static str, got: u8 },
    #[error("disconnect: {0}")]
    Disconnect(DisconnectReason),
}

impl Error {
    /// Whether the error signals an incompatible peer rather than a fault.
    pub fn is_useless_peer(&self) -> bool {
        matches!(self, Error::Disconnect(DisconnectReason::UselessPeer))
    }
}
