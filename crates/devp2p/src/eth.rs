use crate::bytes::{decode_u32, decode_u64, encode_u32, encode_u64, to_hash};
use crate::error::Error;
use crate::forkid::ForkId;
use crate::rlp::{self, RlpItem};

// eth/66 message codes, relative to the subprotocol offset.
pub const STATUS_MSG_ID: u8 = 0x00;
pub const NEW_BLOCK_HASHES_MSG_ID: u8 = 0x01;
pub const TRANSACTIONS_MSG_ID: u8 = 0x02;
pub const GET_BLOCK_HEADERS_MSG_ID: u8 = 0x03;
pub const BLOCK_HEADERS_MSG_ID: u8 = 0x04;
pub const GET_BLOCK_BODIES_MSG_ID: u8 = 0x05;
pub const BLOCK_BODIES_MSG_ID: u8 = 0x06;
pub const NEW_BLOCK_MSG_ID: u8 = 0x07;
pub const NEW_POOLED_TRANSACTION_HASHES_MSG_ID: u8 = 0x08;
pub const GET_POOLED_TRANSACTIONS_MSG_ID: u8 = 0x09;
pub const POOLED_TRANSACTIONS_MSG_ID: u8 = 0x0a;
pub const GET_NODE_DATA_MSG_ID: u8 = 0x0d;
pub const NODE_DATA_MSG_ID: u8 = 0x0e;
pub const GET_RECEIPTS_MSG_ID: u8 = 0x0f;
pub const RECEIPTS_MSG_ID: u8 = 0x10;

/// Human readable name of an eth/66 message code, for logs.
pub fn message_name(code: u8) -> &'static str {
    match code {
        STATUS_MSG_ID => "Status",
        NEW_BLOCK_HASHES_MSG_ID => "NewBlockHashes",
        TRANSACTIONS_MSG_ID => "Transactions",
        GET_BLOCK_HEADERS_MSG_ID => "GetBlockHeaders",
        BLOCK_HEADERS_MSG_ID => "BlockHeaders",
        GET_BLOCK_BODIES_MSG_ID => "GetBlockBodies",
        BLOCK_BODIES_MSG_ID => "BlockBodies",
        NEW_BLOCK_MSG_ID => "NewBlock",
        NEW_POOLED_TRANSACTION_HASHES_MSG_ID => "NewPooledTransactionHashes",
        GET_POOLED_TRANSACTIONS_MSG_ID => "GetPooledTransactions",
        POOLED_TRANSACTIONS_MSG_ID => "PooledTransactions",
        GET_NODE_DATA_MSG_ID => "GetNodeData",
        NODE_DATA_MSG_ID => "NodeData",
        GET_RECEIPTS_MSG_ID => "GetReceipts",
        RECEIPTS_MSG_ID => "Receipts",
        _ => "Unknown",
    }
}

/// Split an eth/66 request-tagged payload `[request_id, inner]`.
fn split_request(data: &[u8], what: &str) -> Result<(u64, RlpItem), Error> {
    let items = rlp::decode(data)?.into_list()?;
    if items.len() < 2 {
        return Err(Error::Eth(format!("{}: too few fields", what)));
    }
    let mut iter = items.into_iter();
    let request_id = match iter.next() {
        Some(item) => decode_u64(item.as_bytes()?)?,
        None => return Err(Error::Eth(format!("{}: missing request id", what))),
    };
    match iter.next() {
        Some(inner) => Ok((request_id, inner)),
        None => Err(Error::Eth(format!("{}: missing body", what))),
    }
}

fn encode_request(request_id: u64, inner: Vec<u8>) -> Vec<u8> {
    rlp::encode_list_of_encoded(&[rlp::encode_bytes(&encode_u64(request_id)), inner])
}

fn decode_hashes(items: Vec<RlpItem>, what: &str) -> Result<Vec<[u8; 32]>, Error> {
    let mut hashes = Vec::with_capacity(items.len());
    for item in items {
        hashes.push(to_hash(item.as_bytes()?, what)?);
    }
    Ok(hashes)
}

fn encode_hashes(hashes: &[[u8; 32]]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = hashes.iter().map(|h| rlp::encode_bytes(h)).collect();
    rlp::encode_list_of_encoded(&encoded)
}

/// Extract the request id from any eth/66 request payload.
pub fn extract_request_id(payload: &[u8]) -> Result<u64, Error> {
    let items = rlp::decode(payload)?.into_list()?;
    match items.first() {
        Some(item) => decode_u64(item.as_bytes()?),
        None => Err(Error::Eth("empty request".to_string())),
    }
}

/// Encode an empty response: `[request_id, []]`.
pub fn encode_empty_response(request_id: u64) -> Vec<u8> {
    encode_request(request_id, rlp::encode_list_payload(&[]))
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthStatus {
    pub protocol_version: u32,
    pub network_id: u64,
    /// Big-endian total difficulty with no leading zeros.
    pub total_difficulty: Vec<u8>,
    pub best_hash: [u8; 32],
    pub genesis_hash: [u8; 32],
    pub fork_id: ForkId,
}

impl EthStatus {
    pub fn from_rlp(data: &[u8]) -> Result<EthStatus, Error> {
        let items: Vec<RlpItem> = rlp::decode(data)?.into_list()?;

        if items.len() < 6 {
            return Err(Error::Eth("status missing fields".to_string()));
        }

        let protocol_version: u32 = decode_u32(items[0].as_bytes()?)?;
        let network_id: u64 = decode_u64(items[1].as_bytes()?)?;
        let total_difficulty: Vec<u8> = items[2].as_bytes()?.to_vec();
        let best_hash = to_hash(items[3].as_bytes()?, "bestHash")?;
        let genesis_hash = to_hash(items[4].as_bytes()?, "genesisHash")?;
        let fork_id: ForkId = ForkId::from_rlp(&items[5])?;

        Ok(EthStatus {
            protocol_version,
            network_id,
            total_difficulty,
            best_hash,
            genesis_hash,
            fork_id,
        })
    }

    pub fn to_rlp(&self) -> Vec<u8> {
        let mut payload: Vec<u8> = Vec::new();
        payload.extend(rlp::encode_bytes(&encode_u32(self.protocol_version)));
        payload.extend(rlp::encode_bytes(&encode_u64(self.network_id)));
        payload.extend(rlp::encode_bytes(&self.total_difficulty));
        payload.extend(rlp::encode_bytes(&self.best_hash));
        payload.extend(rlp::encode_bytes(&self.genesis_hash));
        payload.extend(self.fork_id.to_rlp());

        rlp::encode_list_payload(&payload)
    }
}

// ============================================================================
// Block headers
// ============================================================================

/// Start of a GetBlockHeaders request: by number or by hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderStart {
    ByNumber(u64),
    ByHash([u8; 32]),
}

/// GetBlockHeaders: `[request_id, [start, limit, skip, reverse]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBlockHeadersRequest {
    pub request_id: u64,
    pub start: HeaderStart,
    pub limit: u64,
    pub skip: u64,
    pub reverse: bool,
}

impl GetBlockHeadersRequest {
    /// A request for the single header with the given hash.
    pub fn by_hash(request_id: u64, hash: [u8; 32]) -> Self {
        Self {
            request_id,
            start: HeaderStart::ByHash(hash),
            limit: 1,
            skip: 0,
            reverse: false,
        }
    }

    pub fn decode(payload: &[u8]) -> Result<Self, Error> {
        let (request_id, inner) = split_request(payload, "GetBlockHeaders")?;
        let inner = inner.into_list()?;
        if inner.len() < 4 {
            return Err(Error::Eth(
                "GetBlockHeaders inner: too few fields".to_string(),
            ));
        }

        let start_bytes = inner[0].as_bytes()?;
        let start = if start_bytes.len() == 32 {
            HeaderStart::ByHash(to_hash(start_bytes, "origin")?)
        } else {
            HeaderStart::ByNumber(decode_u64(start_bytes)?)
        };

        let limit = decode_u64(inner[1].as_bytes()?)?;
        let skip = decode_u64(inner[2].as_bytes()?)?;
        let reverse_bytes = inner[3].as_bytes()?;
        let reverse = !reverse_bytes.is_empty() && reverse_bytes[0] != 0;

        Ok(Self {
            request_id,
            start,
            limit,
            skip,
            reverse,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let start = match &self.start {
            HeaderStart::ByHash(hash) => hash.to_vec(),
            HeaderStart::ByNumber(number) => encode_u64(*number),
        };
        let reverse_bytes = if self.reverse { vec![1u8] } else { vec![] };

        let inner = RlpItem::List(vec![
            RlpItem::Bytes(start),
            RlpItem::Bytes(encode_u64(self.limit)),
            RlpItem::Bytes(encode_u64(self.skip)),
            RlpItem::Bytes(reverse_bytes),
        ]);
        encode_request(self.request_id, inner.encode())
    }
}

/// BlockHeaders: `[request_id, [header₁, header₂, ...]]`. Headers stay raw RLP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeadersPacket {
    pub request_id: u64,
    pub headers: Vec<Vec<u8>>,
}

impl BlockHeadersPacket {
    pub fn decode(payload: &[u8]) -> Result<Self, Error> {
        let (request_id, inner) = split_request(payload, "BlockHeaders")?;
        let headers = inner.into_list()?.iter().map(RlpItem::encode).collect();
        Ok(Self {
            request_id,
            headers,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_request(self.request_id, rlp::encode_list_of_encoded(&self.headers))
    }
}

// ============================================================================
// Hash-list requests (GetBlockBodies, GetPooledTransactions, GetReceipts, GetNodeData)
// ============================================================================

/// `[request_id, [hash₁, hash₂, ...]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashListRequest {
    pub request_id: u64,
    pub hashes: Vec<[u8; 32]>,
}

pub type GetBlockBodiesRequest = HashListRequest;
pub type GetPooledTransactionsRequest = HashListRequest;
pub type GetReceiptsRequest = HashListRequest;

impl HashListRequest {
    pub fn new(request_id: u64, hashes: Vec<[u8; 32]>) -> Self {
        Self { request_id, hashes }
    }

    pub fn decode(payload: &[u8]) -> Result<Self, Error> {
        let (request_id, inner) = split_request(payload, "hash request")?;
        let hashes = decode_hashes(inner.into_list()?, "requested hash")?;
        Ok(Self { request_id, hashes })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_request(self.request_id, encode_hashes(&self.hashes))
    }
}

// ============================================================================
// Bodies and pooled transactions
// ============================================================================

/// BlockBodies: `[request_id, [body₁, ...]]`. Each body stays raw `[txs, uncles]` RLP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBodiesPacket {
    pub request_id: u64,
    pub bodies: Vec<Vec<u8>>,
}

impl BlockBodiesPacket {
    pub fn decode(payload: &[u8]) -> Result<Self, Error> {
        let (request_id, inner) = split_request(payload, "BlockBodies")?;
        let bodies = inner.into_list()?.iter().map(RlpItem::encode).collect();
        Ok(Self { request_id, bodies })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_request(self.request_id, rlp::encode_list_of_encoded(&self.bodies))
    }
}

/// PooledTransactions: `[request_id, [tx₁, ...]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PooledTransactionsPacket {
    pub request_id: u64,
    pub transactions: Vec<RlpItem>,
}

impl PooledTransactionsPacket {
    pub fn decode(payload: &[u8]) -> Result<Self, Error> {
        let (request_id, inner) = split_request(payload, "PooledTransactions")?;
        Ok(Self {
            request_id,
            transactions: inner.into_list()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        encode_request(self.request_id, RlpItem::List(self.transactions.clone()).encode())
    }
}

/// Transactions broadcast: `[tx₁, tx₂, ...]`.
pub fn decode_transactions(payload: &[u8]) -> Result<Vec<RlpItem>, Error> {
    rlp::decode(payload)?.into_list()
}

// ============================================================================
// Announcements
// ============================================================================

/// NewBlockHashes: `[[hash₁, number₁], [hash₂, number₂], ...]`.
pub fn decode_new_block_hashes(payload: &[u8]) -> Result<Vec<([u8; 32], u64)>, Error> {
    let entries = rlp::decode(payload)?.into_list()?;

    let mut result = Vec::with_capacity(entries.len());
    for entry in entries {
        let fields = entry.into_list()?;
        if fields.len() < 2 {
            return Err(Error::Eth("NewBlockHashes entry: too few fields".to_string()));
        }
        let hash = to_hash(fields[0].as_bytes()?, "block hash")?;
        let number = decode_u64(fields[1].as_bytes()?)?;
        result.push((hash, number));
    }

    Ok(result)
}

pub fn encode_new_block_hashes(entries: &[([u8; 32], u64)]) -> Vec<u8> {
    let items: Vec<RlpItem> = entries
        .iter()
        .map(|(hash, number)| {
            RlpItem::List(vec![
                RlpItem::Bytes(hash.to_vec()),
                RlpItem::Bytes(encode_u64(*number)),
            ])
        })
        .collect();

    RlpItem::List(items).encode()
}

/// NewPooledTransactionHashes in its eth/66 form: `[hash₁, hash₂, ...]`.
pub fn decode_pooled_transaction_hashes(payload: &[u8]) -> Result<Vec<[u8; 32]>, Error> {
    decode_hashes(rlp::decode(payload)?.into_list()?, "transaction hash")
}

pub fn encode_pooled_transaction_hashes(hashes: &[[u8; 32]]) -> Vec<u8> {
    encode_hashes(hashes)
}
