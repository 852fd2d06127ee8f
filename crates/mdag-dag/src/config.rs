use std::path::Path;

use mdag_crypto::{HashAlgorithm, ObjectHasher};
use mdag_types::{CHUNK_SIZE, MAX_FANOUT};
use serde::{Deserialize, Serialize};

use crate::error::{DagError, DagResult};

/// Parameters that shape a DAG.
///
/// Two builds produce the same digests only if they use the same
/// configuration. The defaults are the canonical values; smaller values are
/// for tests and small-object stores and do not change the algorithm.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DagConfig {
    /// Bytes per file chunk.
    pub chunk_size: usize,
    /// Maximum links per list node.
    pub max_fanout: usize,
    /// Hash primitive for object digests.
    pub hash: HashAlgorithm,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            max_fanout: MAX_FANOUT,
            hash: HashAlgorithm::Blake3,
        }
    }
}

impl DagConfig {
    /// Check that the configuration can build a DAG.
    pub fn validate(&self) -> DagResult<()> {
        if self.chunk_size == 0 {
            return Err(DagError::InvalidConfig("chunk_size must be at least 1".into()));
        }
        if self.max_fanout < 2 {
            return Err(DagError::InvalidConfig("max_fanout must be at least 2".into()));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> DagResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| DagError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> DagResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DagError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    /// The object hasher this configuration selects.
    pub fn hasher(&self) -> ObjectHasher {
        ObjectHasher::with_algorithm(self.hash)
    }
}
