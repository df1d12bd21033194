use crate::constants::HASH_SIZE;
use crate::error::Error;

pub fn encode_u32(value: u32) -> Vec<u8> {
    trim_leading_zeros(&value.to_be_bytes())
}

pub fn decode_u32(bytes: &[u8]) -> Result<u32, Error> {
    if bytes.len() > 4 {
        return Err(Error::Rlp(format!("u32 overflow: {} bytes", bytes.len())));
    }
    Ok(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
}

pub fn encode_u64(value: u64) -> Vec<u8> {
    trim_leading_zeros(&value.to_be_bytes())
}

pub fn decode_u64(bytes: &[u8]) -> Result<u64, Error> {
    if bytes.len() > 8 {
        return Err(Error::Rlp(format!("u64 overflow: {} bytes", bytes.len())));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

/// Strip leading zero bytes, as RLP requires for scalars. Zero becomes empty.
pub fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start: usize = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

pub fn to_hash(bytes: &[u8], field: &str) -> Result<[u8; HASH_SIZE], Error> {
    if bytes.len() != HASH_SIZE {
        return Err(Error::Eth(format!(
            "{} must be {} bytes, got {}",
            field,
            HASH_SIZE,
            bytes.len()
        )));
    }
    let mut hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(bytes);
    Ok(hash)
}
