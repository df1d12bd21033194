//! eth/66 sensor core: observes a devp2p network through the eth
//! subprotocol, tracks the best head it hears about, backfills missing
//! ancestors and forwards everything it sees to a storage collaborator.

pub mod backfill;
pub mod config;
pub mod conn;
pub mod counters;
pub mod database;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod handshake;
pub mod head;
pub mod protocol;
pub mod requests;
pub mod session;

pub use config::{load_config_file, ConfigError, SensorConfig};
pub use conn::Connection;
pub use counters::{MessageCounters, MessageCountsSnapshot};
pub use database::{Database, NoopDatabase};
pub use discovery::{NodeCollector, PeerSink};
pub use error::Error;
pub use head::{HeadBlock, HeadTracker};
pub use protocol::Eth66Protocol;
pub use session::SessionConfig;
