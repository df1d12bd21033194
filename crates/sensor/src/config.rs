use std::path::{Path, PathBuf};

use alloy_primitives::B256;
use chain::genesis::{Genesis, GenesisError};
use serde::Deserialize;
use thiserror::Error;

use crate::discovery::DEFAULT_PEER_QUEUE_CAPACITY;

// ============================================================================
// CONFIG FILE
// ============================================================================

/// Sensor settings as written in the TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub network_id: Option<u64>,
    pub sensor_id: Option<String>,
    pub genesis_file: Option<String>,
    pub genesis_hash: Option<String>,
    pub peer_queue_capacity: Option<usize>,
    pub nodes_file: Option<String>,
}

// ============================================================================
// RESOLVED CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    pub network_id: u64,
    pub sensor_id: String,
    pub genesis_file: PathBuf,
    pub genesis_hash: B256,
    pub peer_queue_capacity: usize,
    pub nodes_file: Option<PathBuf>,
}

impl SensorConfig {
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let network_id = file
            .network_id
            .ok_or(ConfigError::MissingRequired("network_id"))?;

        let sensor_id = file
            .sensor_id
            .ok_or(ConfigError::MissingRequired("sensor_id"))?;

        let genesis_file = file
            .genesis_file
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingRequired("genesis_file"))?;

        let genesis_hash = file
            .genesis_hash
            .as_deref()
            .ok_or(ConfigError::MissingRequired("genesis_hash"))
            .and_then(parse_hash)?;

        let peer_queue_capacity = file
            .peer_queue_capacity
            .unwrap_or(DEFAULT_PEER_QUEUE_CAPACITY);
        if peer_queue_capacity == 0 {
            return Err(ConfigError::Invalid("peer_queue_capacity must be positive"));
        }

        Ok(SensorConfig {
            network_id,
            sensor_id,
            genesis_file,
            genesis_hash,
            peer_queue_capacity,
            nodes_file: file.nodes_file.map(PathBuf::from),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    /// Read the genesis descriptor named by `genesis_file`.
    pub fn load_genesis(&self) -> Result<Genesis, ConfigError> {
        Ok(Genesis::load(&self.genesis_file)?)
    }
}

fn parse_hash(raw: &str) -> Result<B256, ConfigError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(digits).map_err(|_| ConfigError::InvalidHash(raw.to_string()))?;
    if bytes.len() != 32 {
        return Err(ConfigError::InvalidHash(raw.to_string()));
    }
    Ok(B256::from_slice(&bytes))
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingRequired(&'static str),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
    #[error("invalid genesis hash {0:?}")]
    InvalidHash(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("genesis: {0}")]
    Genesis(#[from] GenesisError),
}

// ============================================================================
// LOADING
// ============================================================================

pub fn load_config_file(path: &Path) -> Result<SensorConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    SensorConfig::from_toml_str(&content)
}
