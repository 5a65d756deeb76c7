//! Engine configuration with TOML file support.

use crate::error::ConsensusError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use verity_types::ProtocolParams;
use verity_utils::LogConfig;

/// Configuration for a consensus engine.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Missing sections fall back to the
/// protocol defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub params: ProtocolParams,

    #[serde(default)]
    pub logging: LogConfig,
}

impl EngineConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConsensusError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConsensusError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration.
    pub fn from_toml_str(s: &str) -> Result<Self, ConsensusError> {
        let config: Self = toml::from_str(s).map_err(|e| ConsensusError::Config(e.to_string()))?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConsensusError> {
        toml::to_string_pretty(self).map_err(|e| ConsensusError::Config(e.to_string()))
    }
}
