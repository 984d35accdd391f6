use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub exclusions: ExclusionConfig,
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    pub delimiter: char,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        ExclusionConfig { delimiter: ';' }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Initial size of the BuDDy node table.
    pub node_table_size: usize,
    /// Size of the BuDDy operation cache.
    pub cache_size: usize,
    /// Queries needing more BDD variables than this come back unknown.
    pub max_variables: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            node_table_size: 10000,
            cache_size: 10000,
            max_variables: None,
        }
    }
}

impl AuditConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AuditConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.node_table_size == 0 || self.solver.cache_size == 0 {
            return Err(ConfigError::Invalid(
                "solver.node_table_size and solver.cache_size must be positive".into(),
            ));
        }
        if self.solver.node_table_size > i32::MAX as usize || self.solver.cache_size > i32::MAX as usize {
            return Err(ConfigError::Invalid("solver table sizes must fit in 32 bits".into()));
        }
        if self.exclusions.delimiter.is_whitespace() {
            return Err(ConfigError::Invalid("exclusions.delimiter must not be whitespace".into()));
        }
        Ok(())
    }
}
