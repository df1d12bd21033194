/// Name of the application subprotocol advertised in the devp2p Hello.
pub const ETH_PROTOCOL_NAME: &str = "eth";
pub const ETH_PROTOCOL_VERSION: u32 = 66;
/// Number of message codes reserved by eth/66 (0x00..=0x10).
pub const ETH_PROTOCOL_LENGTH: u8 = 17;

pub const NODE_ID_LEN: usize = 64;
pub const HASH_SIZE: usize = 32;

/// Capacity of each direction of an in-memory message pipe.
pub const PIPE_CAPACITY: usize = 256;
