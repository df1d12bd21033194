use thiserror::Error;

/// Errors crossing the transport seam and the eth payload codecs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("RLP error: {0}")]
    Rlp(String),
    #[error("eth error: {0}")]
    Eth(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("connection closed")]
    ConnectionClosed,
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
