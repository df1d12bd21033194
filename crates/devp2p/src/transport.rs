use std::future::Future;

use tokio::sync::mpsc;

use crate::constants::PIPE_CAPACITY;
use crate::error::Error;

/// A decoded subprotocol message: protocol-relative code plus RLP payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Msg {
    pub code: u8,
    pub payload: Vec<u8>,
}

impl Msg {
    pub fn new(code: u8, payload: Vec<u8>) -> Self {
        Self { code, payload }
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Message-level duplex stream handed to a subprotocol by the transport.
///
/// Framing, compression and encryption are the implementor's concern;
/// payloads crossing this seam are plain RLP.
pub trait MsgReadWriter: Send {
    fn read_msg(&mut self) -> impl Future<Output = Result<Msg, Error>> + Send;

    fn write_msg(&mut self, code: u8, payload: Vec<u8>)
        -> impl Future<Output = Result<(), Error>> + Send;

    /// Release whatever the transport still buffers for `msg`.
    fn discard(&mut self, msg: Msg) -> impl Future<Output = Result<(), Error>> + Send {
        drop(msg);
        async { Ok(()) }
    }
}

/// One end of an in-memory message pipe.
pub struct PipeEnd {
    tx: mpsc::Sender<Msg>,
    rx: mpsc::Receiver<Msg>,
}

/// Create a connected pair of in-memory ends. Messages written on one end are
/// read from the other. Dropping an end closes the pipe for its peer.
pub fn pipe() -> (PipeEnd, PipeEnd) {
    let (a_tx, b_rx) = mpsc::channel(PIPE_CAPACITY);
    let (b_tx, a_rx) = mpsc::channel(PIPE_CAPACITY);
    (
        PipeEnd { tx: a_tx, rx: a_rx },
        PipeEnd { tx: b_tx, rx: b_rx },
    )
}

impl PipeEnd {
    /// Non-blocking read, for draining whatever the other side already sent.
    pub fn try_read_msg(&mut self) -> Option<Msg> {
        self.rx.try_recv().ok()
    }
}

impl MsgReadWriter for PipeEnd {
    async fn read_msg(&mut self) -> Result<Msg, Error> {
        self.rx.recv().await.ok_or(Error::ConnectionClosed)
    }

    async fn write_msg(&mut self, code: u8, payload: Vec<u8>) -> Result<(), Error> {
        self.tx
            .send(Msg::new(code, payload))
            .await
            .map_err(|_| Error::ConnectionClosed)
    }
}
