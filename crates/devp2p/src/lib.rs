pub mod bytes;
pub mod constants;
pub mod error;
pub mod eth;
pub mod forkid;
pub mod rlp;
pub mod transport;
pub mod types;

pub use error::Error;
pub use transport::{Msg, MsgReadWriter};
pub use types::{DisconnectReason, NodeInfo};
