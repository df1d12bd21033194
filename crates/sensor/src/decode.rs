use alloy_primitives::{Address, B256, U256};

use chain::types::{
    keccak256, Block, BlockBody, BlockHeader, BlockNonce, Bloom, SealedHeader, Transaction,
};
use devp2p::rlp::{self, RlpItem};

#[derive(Debug)]
pub enum DecodeError {
    Rlp(String),
    FieldCount {
        expected_min: usize,
        got: usize,
    },
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    InvalidTransaction(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Rlp(s) => write!(f, "RLP decode error: {}", s),
            DecodeError::FieldCount { expected_min, got } => {
                write!(f, "expected at least {} fields, got {}", expected_min, got)
            }
            DecodeError::InvalidLength {
                field,
                expected,
                got,
            } => {
                write!(f, "{}: expected {} bytes, got {}", field, expected, got)
            }
            DecodeError::InvalidTransaction(s) => write!(f, "invalid transaction: {}", s),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<devp2p::Error> for DecodeError {
    fn from(e: devp2p::Error) -> Self {
        DecodeError::Rlp(e.to_string())
    }
}

fn field<'a>(fields: &'a [RlpItem], index: usize) -> Result<&'a RlpItem, DecodeError> {
    fields
        .get(index)
        .ok_or(DecodeError::Rlp("unexpected end of RLP fields".to_string()))
}

fn fixed<const N: usize>(item: &RlpItem, field: &'static str) -> Result<[u8; N], DecodeError> {
    let bytes = item.as_bytes()?;
    if bytes.len() != N {
        return Err(DecodeError::InvalidLength {
            field,
            expected: N,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

fn to_b256(item: &RlpItem, field: &'static str) -> Result<B256, DecodeError> {
    Ok(B256::from(fixed::<32>(item, field)?))
}

fn to_address(item: &RlpItem) -> Result<Address, DecodeError> {
    Ok(Address::from(fixed::<20>(item, "coinbase")?))
}

fn to_bloom(item: &RlpItem) -> Result<Bloom, DecodeError> {
    fixed::<256>(item, "bloom")
}

fn to_nonce(item: &RlpItem) -> Result<BlockNonce, DecodeError> {
    fixed::<8>(item, "nonce")
}

fn to_u256(item: &RlpItem) -> Result<U256, DecodeError> {
    let bytes = item.as_bytes()?;
    if bytes.len() > 32 {
        return Err(DecodeError::InvalidLength {
            field: "u256",
            expected: 32,
            got: bytes.len(),
        });
    }
    Ok(chain::types::bytes_to_u256(bytes))
}

fn to_u64(item: &RlpItem) -> Result<u64, DecodeError> {
    Ok(devp2p::bytes::decode_u64(item.as_bytes()?)?)
}

/// Decode a header list item. The hash is computed over the item's own
/// encoding, so unmodelled trailing fields still hash correctly.
pub fn decode_header_item(item: &RlpItem) -> Result<SealedHeader, DecodeError> {
    let fields = item.as_list()?;

    // Pre-London: 15 fields, Post-London: 16 or more.
    if fields.len() < 15 {
        return Err(DecodeError::FieldCount {
            expected_min: 15,
            got: fields.len(),
        });
    }

    let header = BlockHeader {
        parent_hash: to_b256(field(fields, 0)?, "parent_hash")?,
        uncle_hash: to_b256(field(fields, 1)?, "uncle_hash")?,
        coinbase: to_address(field(fields, 2)?)?,
        state_root: to_b256(field(fields, 3)?, "state_root")?,
        transactions_root: to_b256(field(fields, 4)?, "transactions_root")?,
        receipts_root: to_b256(field(fields, 5)?, "receipts_root")?,
        logs_bloom: to_bloom(field(fields, 6)?)?,
        difficulty: to_u256(field(fields, 7)?)?,
        number: to_u64(field(fields, 8)?)?,
        gas_limit: to_u64(field(fields, 9)?)?,
        gas_used: to_u64(field(fields, 10)?)?,
        timestamp: to_u64(field(fields, 11)?)?,
        extra_data: field(fields, 12)?.as_bytes()?.to_vec(),
        mix_hash: to_b256(field(fields, 13)?, "mix_hash")?,
        nonce: to_nonce(field(fields, 14)?)?,
        base_fee: fields.get(15).map(to_u256).transpose()?,
    };

    Ok(SealedHeader {
        header,
        hash: keccak256(&item.encode()),
    })
}

/// Decode a block header from raw RLP bytes.
pub fn decode_block_header(data: &[u8]) -> Result<SealedHeader, DecodeError> {
    decode_header_item(&rlp::decode(data)?)
}

/// Legacy transactions travel as RLP lists, typed ones as a byte string
/// wrapping the `type || payload` envelope.
pub fn decode_transaction(item: &RlpItem) -> Result<Transaction, DecodeError> {
    match item {
        RlpItem::List(_) => Ok(Transaction::new(item.encode())),
        RlpItem::Bytes(envelope) => match envelope.first() {
            Some(&ty) if ty <= 0x7f => Ok(Transaction::new(envelope.clone())),
            Some(&ty) => Err(DecodeError::InvalidTransaction(format!(
                "unknown envelope type 0x{:02x}",
                ty
            ))),
            None => Err(DecodeError::InvalidTransaction("empty envelope".to_string())),
        },
    }
}

pub fn decode_transactions(items: &[RlpItem]) -> Result<Vec<Transaction>, DecodeError> {
    items.iter().map(decode_transaction).collect()
}

fn decode_body_fields(fields: &[RlpItem]) -> Result<BlockBody, DecodeError> {
    if fields.len() < 2 {
        return Err(DecodeError::FieldCount {
            expected_min: 2,
            got: fields.len(),
        });
    }

    let transactions = decode_transactions(fields[0].as_list()?)?;
    let uncles = fields[1]
        .as_list()?
        .iter()
        .map(|uncle| decode_header_item(uncle).map(|sealed| sealed.header))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BlockBody {
        transactions,
        uncles,
    })
}

/// Decode a block body from raw RLP bytes.
/// Body = [transactions_list, uncles_list]
pub fn decode_block_body(data: &[u8]) -> Result<BlockBody, DecodeError> {
    let item = rlp::decode(data)?;
    decode_body_fields(item.as_list()?)
}

/// Decode a NewBlock payload: `[[header, [tx...], [uncle...]], td]`.
pub fn decode_new_block(payload: &[u8]) -> Result<(Block, U256), DecodeError> {
    let outer = rlp::decode(payload)?.into_list()?;
    if outer.len() < 2 {
        return Err(DecodeError::FieldCount {
            expected_min: 2,
            got: outer.len(),
        });
    }

    let block_fields = outer[0].as_list()?;
    if block_fields.len() < 3 {
        return Err(DecodeError::FieldCount {
            expected_min: 3,
            got: block_fields.len(),
        });
    }

    let header = decode_header_item(&block_fields[0])?;
    let body = decode_body_fields(&block_fields[1..])?;
    let td = to_u256(&outer[1])?;

    Ok((Block { header, body }, td))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::types::{empty_uncle_hash, rlp_encode_list_from_encoded, rlp_encode_u256};

    fn header(number: u64, base_fee: Option<U256>) -> BlockHeader {
        BlockHeader {
            parent_hash: B256::repeat_byte(0x11),
            uncle_hash: empty_uncle_hash(),
            coinbase: Address::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: [0u8; 256],
            difficulty: U256::from(131072u64),
            number,
            gas_limit: 8_000_000,
            gas_used: 21000,
            timestamp: 1_438_270_000,
            extra_data: b"test".to_vec(),
            mix_hash: B256::ZERO,
            nonce: [0, 0, 0, 0, 0, 0, 0, 42],
            base_fee,
        }
    }

    #[test]
    fn decode_header_roundtrip() {
        let original = header(1, None);
        let decoded = decode_block_header(&original.rlp_encode()).unwrap();
        assert_eq!(decoded.header, original);
        assert_eq!(decoded.hash, original.hash());
    }

    #[test]
    fn decode_header_with_base_fee() {
        let original = header(100, Some(U256::from(7u64)));
        let decoded = decode_block_header(&original.rlp_encode()).unwrap();
        assert_eq!(decoded.header.base_fee, Some(U256::from(7u64)));
    }

    #[test]
    fn trailing_fields_are_hashed() {
        // Append a withdrawals root the header type does not model.
        let original = header(5, Some(U256::from(7u64)));
        let encoded = original.rlp_encode();
        let mut items = rlp::decode(&encoded).unwrap().into_list().unwrap();
        items.push(RlpItem::Bytes(vec![0x22; 32]));
        let extended = RlpItem::List(items).encode();

        let decoded = decode_block_header(&extended).unwrap();
        assert_eq!(decoded.header, original);
        assert_eq!(decoded.hash, keccak256(&extended));
        assert_ne!(decoded.hash, original.hash());
    }

    #[test]
    fn short_header_rejected() {
        let encoded = RlpItem::List(vec![RlpItem::Bytes(vec![1]); 10]).encode();
        assert!(matches!(
            decode_block_header(&encoded),
            Err(DecodeError::FieldCount { expected_min: 15, got: 10 })
        ));
    }

    #[test]
    fn decode_transactions_legacy_and_typed() {
        let legacy = RlpItem::List(vec![RlpItem::Bytes(vec![0x01]), RlpItem::Bytes(vec![])]);
        let typed = RlpItem::Bytes(vec![0x02, 0xc0]);
        let txs = decode_transactions(&[legacy.clone(), typed]).unwrap();

        assert_eq!(txs[0].encoded, legacy.encode());
        assert_eq!(txs[0].tx_type(), None);
        assert_eq!(txs[1].encoded, vec![0x02, 0xc0]);
        assert_eq!(txs[1].hash, keccak256(&[0x02, 0xc0]));
    }

    #[test]
    fn decode_transaction_rejects_bad_envelope() {
        assert!(decode_transaction(&RlpItem::Bytes(vec![])).is_err());
        assert!(decode_transaction(&RlpItem::Bytes(vec![0x90, 0x01])).is_err());
    }

    #[test]
    fn decode_empty_body() {
        let body = RlpItem::List(vec![RlpItem::List(vec![]), RlpItem::List(vec![])]);
        let decoded = decode_block_body(&body.encode()).unwrap();
        assert!(decoded.transactions.is_empty());
        assert!(decoded.uncles.is_empty());
    }

    #[test]
    fn decode_new_block_with_uncle() {
        let main = header(10, None);
        let uncle = header(9, None);
        let tx = RlpItem::List(vec![RlpItem::Bytes(vec![0x05])]).encode();

        let block = rlp_encode_list_from_encoded(&[
            main.rlp_encode(),
            rlp_encode_list_from_encoded(&[tx]),
            rlp_encode_list_from_encoded(&[uncle.rlp_encode()]),
        ]);
        let payload = rlp_encode_list_from_encoded(&[block, rlp_encode_u256(&U256::from(5000u64))]);

        let (decoded, td) = decode_new_block(&payload).unwrap();
        assert_eq!(td, U256::from(5000u64));
        assert_eq!(decoded.number(), 10);
        assert_eq!(decoded.hash(), main.hash());
        assert_eq!(decoded.body.transactions.len(), 1);
        assert_eq!(decoded.body.uncles, vec![uncle]);
    }
}
