use alloy_primitives::{Address, B256, U256};
use sha3::{Digest, Keccak256};

/// 8-byte nonce used in PoW.
pub type BlockNonce = [u8; 8];

/// 256-byte bloom filter.
pub type Bloom = [u8; 256];

/// Block header. Fields after `base_fee` (withdrawals root and later) are
/// not modelled; the hash of a received header is taken from its raw RLP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub parent_hash: B256,
    pub uncle_hash: B256,
    pub coinbase: Address,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub mix_hash: B256,
    pub nonce: BlockNonce,
    pub base_fee: Option<U256>,
}

/// Compute the empty uncle hash (keccak256 of RLP-encoded empty list).
pub fn empty_uncle_hash() -> B256 {
    B256::from_slice(&Keccak256::digest([0xc0]))
}

pub fn keccak256(data: &[u8]) -> B256 {
    B256::from_slice(&Keccak256::digest(data))
}

impl BlockHeader {
    /// Compute the hash of this header (keccak256 of RLP encoding).
    pub fn hash(&self) -> B256 {
        keccak256(&self.rlp_encode())
    }

    /// RLP-encode the header following the Ethereum header layout.
    pub fn rlp_encode(&self) -> Vec<u8> {
        let mut fields: Vec<Vec<u8>> = Vec::with_capacity(16);

        fields.push(rlp_encode_bytes(self.parent_hash.as_slice()));
        fields.push(rlp_encode_bytes(self.uncle_hash.as_slice()));
        fields.push(rlp_encode_bytes(self.coinbase.as_slice()));
        fields.push(rlp_encode_bytes(self.state_root.as_slice()));
        fields.push(rlp_encode_bytes(self.transactions_root.as_slice()));
        fields.push(rlp_encode_bytes(self.receipts_root.as_slice()));
        fields.push(rlp_encode_bytes(&self.logs_bloom));
        fields.push(rlp_encode_u256(&self.difficulty));
        fields.push(rlp_encode_u64(self.number));
        fields.push(rlp_encode_u64(self.gas_limit));
        fields.push(rlp_encode_u64(self.gas_used));
        fields.push(rlp_encode_u64(self.timestamp));
        fields.push(rlp_encode_bytes(&self.extra_data));
        fields.push(rlp_encode_bytes(self.mix_hash.as_slice()));
        fields.push(rlp_encode_bytes(&self.nonce));

        if let Some(ref base_fee) = self.base_fee {
            fields.push(rlp_encode_u256(base_fee));
        }

        rlp_encode_list_from_encoded(&fields)
    }
}

/// A header together with the hash of the exact bytes it arrived as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedHeader {
    pub header: BlockHeader,
    pub hash: B256,
}

impl SealedHeader {
    /// Seal a locally built header by hashing its own encoding.
    pub fn seal(header: BlockHeader) -> Self {
        let hash = header.hash();
        Self { header, hash }
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn parent_hash(&self) -> B256 {
        self.header.parent_hash
    }
}

/// A transaction kept in its canonical encoding: the RLP list for legacy
/// transactions, the `type || payload` envelope for typed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub encoded: Vec<u8>,
    pub hash: B256,
}

impl Transaction {
    pub fn new(encoded: Vec<u8>) -> Self {
        let hash = keccak256(&encoded);
        Self { encoded, hash }
    }

    /// EIP-2718 type byte, `None` for legacy transactions.
    pub fn tx_type(&self) -> Option<u8> {
        match self.encoded.first() {
            Some(&b) if b <= 0x7f => Some(b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockBody {
    pub transactions: Vec<Transaction>,
    pub uncles: Vec<BlockHeader>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: SealedHeader,
    pub body: BlockBody,
}

impl Block {
    pub fn hash(&self) -> B256 {
        self.header.hash
    }

    pub fn number(&self) -> u64 {
        self.header.number()
    }
}

// ============================================================================
// RLP encoding helpers
// ============================================================================

/// RLP-encode a single byte string (already raw bytes).
pub fn rlp_encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }
    let mut out = rlp_length_prefix(data.len(), 0x80);
    out.extend_from_slice(data);
    out
}

/// RLP-encode a U256 as big-endian bytes with no leading zeros.
pub fn rlp_encode_u256(v: &U256) -> Vec<u8> {
    rlp_encode_bytes(&u256_to_be_trimmed(v))
}

/// RLP-encode a u64 as big-endian bytes with no leading zeros.
pub fn rlp_encode_u64(v: u64) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(8);
    rlp_encode_bytes(&bytes[start..])
}

/// Build an RLP list from already-encoded items.
pub fn rlp_encode_list_from_encoded(items: &[Vec<u8>]) -> Vec<u8> {
    let total_len: usize = items.iter().map(|i| i.len()).sum();
    let mut out = rlp_length_prefix(total_len, 0xc0);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

fn rlp_length_prefix(len: usize, offset: u8) -> Vec<u8> {
    if len < 56 {
        vec![offset + len as u8]
    } else {
        let bytes = (len as u64).to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        let mut out = vec![offset + 55 + (8 - start) as u8];
        out.extend_from_slice(&bytes[start..]);
        out
    }
}

/// Big-endian bytes of `v` with leading zeros stripped. Zero is empty.
pub fn u256_to_be_trimmed(v: &U256) -> Vec<u8> {
    let buf = v.to_be_bytes::<32>();
    let start = buf.iter().position(|&b| b != 0).unwrap_or(32);
    buf[start..].to_vec()
}

/// Convert big-endian bytes to U256. Values wider than 32 bytes keep their
/// low 32 bytes.
pub fn bytes_to_u256(bytes: &[u8]) -> U256 {
    if bytes.is_empty() {
        return U256::ZERO;
    }
    let mut buf = [0u8; 32];
    let offset = 32usize.saturating_sub(bytes.len());
    let len = bytes.len().min(32);
    buf[offset..offset + len].copy_from_slice(&bytes[bytes.len() - len..]);
    U256::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            parent_hash: B256::ZERO,
            uncle_hash: empty_uncle_hash(),
            coinbase: Address::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: [0u8; 256],
            difficulty: U256::from(1),
            number: 0,
            gas_limit: 5000,
            gas_used: 0,
            timestamp: 0,
            extra_data: vec![],
            mix_hash: B256::ZERO,
            nonce: [0u8; 8],
            base_fee: None,
        }
    }

    #[test]
    fn rlp_encode_scalars() {
        assert_eq!(rlp_encode_bytes(&[]), vec![0x80]);
        assert_eq!(rlp_encode_u64(0), vec![0x80]);
        assert_eq!(rlp_encode_u64(1024), vec![0x82, 0x04, 0x00]);
        assert_eq!(rlp_encode_u256(&U256::ZERO), vec![0x80]);
    }

    #[test]
    fn long_list_prefix() {
        // A header with an empty bloom is still > 55 bytes, so it takes a
        // long-list prefix: 0xf9 followed by a two byte length.
        let encoded = sample_header().rlp_encode();
        assert_eq!(encoded[0], 0xf9);
        let len = ((encoded[1] as usize) << 8) | encoded[2] as usize;
        assert_eq!(len, encoded.len() - 3);
    }

    #[test]
    fn sealed_header_hash_matches() {
        let header = sample_header();
        let sealed = SealedHeader::seal(header.clone());
        assert_eq!(sealed.hash, header.hash());
        assert_ne!(sealed.hash, B256::ZERO);
    }

    #[test]
    fn transaction_type_detection() {
        let legacy = Transaction::new(vec![0xc1, 0x80]);
        assert_eq!(legacy.tx_type(), None);
        let typed = Transaction::new(vec![0x02, 0xc0]);
        assert_eq!(typed.tx_type(), Some(2));
        assert_ne!(legacy.hash, typed.hash);
    }

    #[test]
    fn u256_byte_conversions() {
        let td = U256::from(0x0100u64);
        assert_eq!(u256_to_be_trimmed(&td), vec![0x01, 0x00]);
        assert_eq!(bytes_to_u256(&[0x01, 0x00]), td);
        assert_eq!(bytes_to_u256(&[]), U256::ZERO);
    }
}
