use crate::error::Error;

const MAX_RLP_DEPTH: usize = 16;

mod consts {
    pub const SINGLE_BYTE_MAX: u8 = 0x7f;
    pub const SHORT_STRING_PREFIX: u8 = 0x80;
    pub const LONG_STRING_PREFIX: u8 = 0xb7;
    pub const SHORT_STRING_MAX: u8 = 0xb7;
    pub const LONG_STRING_MAX: u8 = 0xbf;
    pub const SHORT_LIST_PREFIX: u8 = 0xc0;
    pub const LONG_LIST_PREFIX: u8 = 0xf7;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RlpItem::Bytes(bytes) => encode_bytes(bytes),
            RlpItem::List(items) => {
                let mut payload: Vec<u8> = Vec::new();
                for item in items {
                    payload.extend(item.encode());
                }
                encode_list_payload(&payload)
            }
        }
    }

    pub fn into_list(self) -> Result<Vec<RlpItem>, Error> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(Error::Rlp("expected list, got bytes".to_string())),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            RlpItem::Bytes(bytes) => Ok(bytes),
            RlpItem::List(_) => Err(Error::Rlp("expected bytes, got list".to_string())),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem], Error> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(Error::Rlp("expected list, got bytes".to_string())),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], Error> {
        match self {
            RlpItem::Bytes(bytes) => Ok(bytes),
            RlpItem::List(_) => Err(Error::Rlp("expected bytes, got list".to_string())),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, RlpItem::List(_))
    }
}

pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] <= consts::SINGLE_BYTE_MAX {
        vec![bytes[0]]
    } else if bytes.len() < 56 {
        let mut result: Vec<u8> = vec![consts::SHORT_STRING_PREFIX + bytes.len() as u8];
        result.extend_from_slice(bytes);
        result
    } else {
        let len_bytes: Vec<u8> = encode_length(bytes.len());
        let mut result: Vec<u8> = vec![consts::LONG_STRING_PREFIX + len_bytes.len() as u8];
        result.extend(len_bytes);
        result.extend_from_slice(bytes);
        result
    }
}

pub fn encode_list_payload(payload: &[u8]) -> Vec<u8> {
    if payload.len() < 56 {
        let mut result: Vec<u8> = vec![consts::SHORT_LIST_PREFIX + payload.len() as u8];
        result.extend_from_slice(payload);
        result
    } else {
        let len_bytes: Vec<u8> = encode_length(payload.len());
        let mut result: Vec<u8> = vec![consts::LONG_LIST_PREFIX + len_bytes.len() as u8];
        result.extend(len_bytes);
        result.extend_from_slice(payload);
        result
    }
}

/// Wrap already-encoded items in a list header.
pub fn encode_list_of_encoded(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.concat();
    encode_list_payload(&payload)
}

fn encode_length(len: usize) -> Vec<u8> {
    let bytes = (len as u64).to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

/// Decode exactly one item. Trailing bytes after it are an error.
pub fn decode(data: &[u8]) -> Result<RlpItem, Error> {
    if data.is_empty() {
        return Err(Error::Rlp("empty data".to_string()));
    }

    let (item, consumed) = decode_with_depth(data, 0)?;
    if consumed != data.len() {
        return Err(Error::Rlp(format!(
            "{} trailing bytes after RLP item",
            data.len() - consumed
        )));
    }
    Ok(item)
}

fn decode_with_depth(data: &[u8], depth: usize) -> Result<(RlpItem, usize), Error> {
    if depth > MAX_RLP_DEPTH {
        return Err(Error::Rlp("RLP nesting too deep".to_string()));
    }

    if data.is_empty() {
        return Err(Error::Rlp("empty data".to_string()));
    }

    let first: u8 = data[0];

    if first <= consts::SINGLE_BYTE_MAX {
        Ok((RlpItem::Bytes(vec![first]), 1))
    } else if first <= consts::SHORT_STRING_MAX {
        let len: usize = (first - consts::SHORT_STRING_PREFIX) as usize;
        let body = slice_body(data, 1, len, "bytes")?;
        Ok((RlpItem::Bytes(body.to_vec()), 1 + len))
    } else if first <= consts::LONG_STRING_MAX {
        let len_of_len: usize = (first - consts::LONG_STRING_PREFIX) as usize;
        let len: usize = read_length(data, len_of_len)?;
        let body = slice_body(data, 1 + len_of_len, len, "long bytes")?;
        Ok((RlpItem::Bytes(body.to_vec()), 1 + len_of_len + len))
    } else if first <= consts::LONG_LIST_PREFIX {
        let len: usize = (first - consts::SHORT_LIST_PREFIX) as usize;
        let payload = slice_body(data, 1, len, "list")?;
        let items: Vec<RlpItem> = decode_list_payload(payload, depth + 1)?;
        Ok((RlpItem::List(items), 1 + len))
    } else {
        let len_of_len: usize = (first - consts::LONG_LIST_PREFIX) as usize;
        let len: usize = read_length(data, len_of_len)?;
        let payload = slice_body(data, 1 + len_of_len, len, "long list")?;
        let items: Vec<RlpItem> = decode_list_payload(payload, depth + 1)?;
        Ok((RlpItem::List(items), 1 + len_of_len + len))
    }
}

fn read_length(data: &[u8], len_of_len: usize) -> Result<usize, Error> {
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(Error::Rlp(format!("length of length {} too large", len_of_len)));
    }
    if data.len() < 1 + len_of_len {
        return Err(Error::Rlp("data too short for length".to_string()));
    }
    let mut result: usize = 0;
    for byte in &data[1..1 + len_of_len] {
        result = (result << 8) | (*byte as usize);
    }
    Ok(result)
}

fn slice_body<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    what: &str,
) -> Result<&'a [u8], Error> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| Error::Rlp(format!("{} length overflow", what)))?;
    if data.len() < end {
        return Err(Error::Rlp(format!("data too short for {}", what)));
    }
    Ok(&data[offset..end])
}

fn decode_list_payload(payload: &[u8], depth: usize) -> Result<Vec<RlpItem>, Error> {
    let mut items: Vec<RlpItem> = Vec::new();
    let mut offset: usize = 0;

    while offset < payload.len() {
        let (item, consumed) = decode_with_depth(&payload[offset..], depth)?;
        items.push(item);
        offset += consumed;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_empty_bytes() {
        let item = RlpItem::Bytes(vec![]);
        let encoded = item.encode();
        assert_eq!(encoded, vec![0x80]);
        assert_eq!(decode(&encoded).unwrap(), item);
    }

    #[test]
    fn test_encode_decode_nested_list() {
        let item = RlpItem::List(vec![
            RlpItem::List(vec![RlpItem::Bytes(vec![1])]),
            RlpItem::Bytes(b"dog".to_vec()),
        ]);
        let encoded = item.encode();
        assert_eq!(decode(&encoded).unwrap(), item);
    }

    #[test]
    fn test_long_string_and_list() {
        let long_data = vec![0xAA; 100];
        let item = RlpItem::List(vec![RlpItem::Bytes(long_data.clone()); 3]);
        let encoded = item.encode();
        // 3 * (2 + 100) = 306 bytes of payload needs a two byte length.
        assert_eq!(&encoded[..3], &[0xf9, 0x01, 0x32]);
        let decoded = decode(&encoded).unwrap().into_list().unwrap();
        assert_eq!(decoded[2].as_bytes().unwrap(), long_data.as_slice());
    }

    #[test]
    fn test_encode_list_of_encoded() {
        let encoded = encode_list_of_encoded(&[encode_bytes(b"cat"), encode_bytes(b"dog")]);
        let list = decode(&encoded).unwrap().into_list().unwrap();
        assert_eq!(list[0].as_bytes().unwrap(), b"cat");
        assert_eq!(list[1].as_bytes().unwrap(), b"dog");
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut encoded = RlpItem::Bytes(b"cat".to_vec()).encode();
        encoded.push(0x01);
        assert!(decode(&encoded).is_err());
    }

    #[test]
    fn test_rejects_truncated_list() {
        // Declares a 5 byte list but carries only 2.
        assert!(decode(&[0xc5, 0x01, 0x02]).is_err());
    }

    #[test]
    fn test_rejects_huge_length_prefix() {
        let data = [0xbf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert!(decode(&data).is_err());
    }
}
