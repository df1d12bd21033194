use crate::bytes::{decode_u64, encode_u64};
use crate::error::Error;
use crate::rlp::{self, RlpItem};

/// EIP-2124 fork identifier exchanged in the eth Status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkId {
    pub fork_hash: [u8; 4],
    pub fork_next: u64,
}

impl ForkId {
    /// Compute the fork id of a node at `head` on the chain described by
    /// `genesis_hash` and its block-based fork activations.
    pub fn new(genesis_hash: &[u8; 32], fork_blocks: &[u64], head: u64) -> ForkId {
        let mut hash = crc32fast::hash(genesis_hash);

        for fork in normalize_forks(fork_blocks) {
            if fork <= head {
                hash = checksum_update(hash, fork);
                continue;
            }
            return ForkId {
                fork_hash: hash.to_be_bytes(),
                fork_next: fork,
            };
        }

        ForkId {
            fork_hash: hash.to_be_bytes(),
            fork_next: 0,
        }
    }

    pub fn from_rlp(item: &RlpItem) -> Result<ForkId, Error> {
        let items = item.as_list()?;

        if items.len() < 2 {
            return Err(Error::Eth("forkId missing fields".to_string()));
        }

        let hash_bytes = items[0].as_bytes()?;
        if hash_bytes.len() != 4 {
            return Err(Error::Eth("forkHash must be 4 bytes".to_string()));
        }

        let mut fork_hash: [u8; 4] = [0u8; 4];
        fork_hash.copy_from_slice(hash_bytes);

        let fork_next: u64 = decode_u64(items[1].as_bytes()?)?;

        Ok(ForkId {
            fork_hash,
            fork_next,
        })
    }

    pub fn to_rlp(&self) -> Vec<u8> {
        let mut payload: Vec<u8> = Vec::new();
        payload.extend(rlp::encode_bytes(&self.fork_hash));
        payload.extend(rlp::encode_bytes(&encode_u64(self.fork_next)));

        rlp::encode_list_payload(&payload)
    }
}

/// Sort, deduplicate, and drop block 0 (genesis is not a fork).
fn normalize_forks(fork_blocks: &[u64]) -> Vec<u64> {
    let mut forks: Vec<u64> = fork_blocks.to_vec();
    forks.sort_unstable();
    forks.dedup();
    forks.retain(|&b| b != 0);
    forks
}

fn checksum_update(hash: u32, fork: u64) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(hash);
    hasher.update(&fork.to_be_bytes());
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mainnet_genesis() -> [u8; 32] {
        let bytes =
            hex::decode("d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3")
                .unwrap();
        let mut genesis = [0u8; 32];
        genesis.copy_from_slice(&bytes);
        genesis
    }

    // Mainnet block forks up to London.
    const MAINNET_FORKS: &[u64] = &[
        1_150_000, 1_920_000, 2_463_000, 2_675_000, 2_675_000, 4_370_000, 7_280_000, 7_280_000,
        9_069_000, 9_200_000, 12_244_000, 12_965_000,
    ];

    #[test]
    fn test_fork_id_roundtrip() {
        let fork_id = ForkId {
            fork_hash: [0xfc, 0x64, 0xec, 0x04],
            fork_next: 1150000,
        };

        let encoded = fork_id.to_rlp();
        let decoded = ForkId::from_rlp(&rlp::decode(&encoded).unwrap()).unwrap();
        assert_eq!(decoded, fork_id);
    }

    #[test]
    fn test_mainnet_unsynced() {
        let id = ForkId::new(&mainnet_genesis(), MAINNET_FORKS, 0);
        assert_eq!(id.fork_hash, [0xfc, 0x64, 0xec, 0x04]);
        assert_eq!(id.fork_next, 1_150_000);
    }

    #[test]
    fn test_mainnet_homestead() {
        let id = ForkId::new(&mainnet_genesis(), MAINNET_FORKS, 1_150_000);
        assert_eq!(id.fork_hash, [0x97, 0xc2, 0xc3, 0x4c]);
        assert_eq!(id.fork_next, 1_920_000);
    }

    #[test]
    fn test_mainnet_london() {
        let id = ForkId::new(&mainnet_genesis(), MAINNET_FORKS, 12_965_000);
        assert_eq!(id.fork_hash, [0xb7, 0x15, 0x07, 0x7d]);
        assert_eq!(id.fork_next, 0);
    }

    #[test]
    fn test_ignores_genesis_and_duplicates() {
        let genesis = [0xAA; 32];
        let plain = ForkId::new(&genesis, &[100, 200], 150);
        let noisy = ForkId::new(&genesis, &[0, 200, 100, 100], 150);
        assert_eq!(plain, noisy);
        assert_eq!(plain.fork_next, 200);
    }
}
