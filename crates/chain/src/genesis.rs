//! Genesis descriptor in the geth `genesis.json` layout.
//!
//! Only what the eth handshake needs is modelled: the block-based fork
//! activations (for the EIP-2124 fork id) and the genesis difficulty (the
//! initial total difficulty of the chain head).

use std::path::Path;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("genesis parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid difficulty {0:?}")]
    Difficulty(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    #[serde(default)]
    pub chain_id: u64,
    pub homestead_block: Option<u64>,
    pub dao_fork_block: Option<u64>,
    pub eip150_block: Option<u64>,
    pub eip155_block: Option<u64>,
    pub eip158_block: Option<u64>,
    pub byzantium_block: Option<u64>,
    pub constantinople_block: Option<u64>,
    pub petersburg_block: Option<u64>,
    pub istanbul_block: Option<u64>,
    pub muir_glacier_block: Option<u64>,
    pub berlin_block: Option<u64>,
    pub london_block: Option<u64>,
    pub arrow_glacier_block: Option<u64>,
    pub gray_glacier_block: Option<u64>,
    pub merge_netsplit_block: Option<u64>,
}

impl ChainConfig {
    /// Block-based fork activations in schedule order. Unset forks are
    /// skipped; the fork id computation sorts and deduplicates the rest.
    pub fn fork_blocks(&self) -> Vec<u64> {
        [
            self.homestead_block,
            self.dao_fork_block,
            self.eip150_block,
            self.eip155_block,
            self.eip158_block,
            self.byzantium_block,
            self.constantinople_block,
            self.petersburg_block,
            self.istanbul_block,
            self.muir_glacier_block,
            self.berlin_block,
            self.london_block,
            self.arrow_glacier_block,
            self.gray_glacier_block,
            self.merge_netsplit_block,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GenesisFile {
    #[serde(default)]
    config: ChainConfig,
    #[serde(default)]
    difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genesis {
    pub config: ChainConfig,
    pub difficulty: U256,
}

impl Genesis {
    pub fn from_json(json: &str) -> Result<Genesis, GenesisError> {
        let file: GenesisFile = serde_json::from_str(json)?;
        let difficulty = match file.difficulty {
            Some(raw) => parse_quantity(&raw)?,
            None => U256::ZERO,
        };
        Ok(Genesis {
            config: file.config,
            difficulty,
        })
    }

    pub fn load(path: &Path) -> Result<Genesis, GenesisError> {
        let content = std::fs::read_to_string(path)?;
        Genesis::from_json(&content)
    }
}

/// Accepts `0x`-prefixed hex or plain decimal, as geth does.
fn parse_quantity(raw: &str) -> Result<U256, GenesisError> {
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) if hex.is_empty() => Ok(U256::ZERO),
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str(trimmed),
    };
    parsed.map_err(|_| GenesisError::Difficulty(raw.to_string()))
}
