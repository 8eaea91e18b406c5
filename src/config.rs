//! Chain configuration loaded from YAML
//!
//! ```yaml
//! chains:
//!   - name: greet
//!     handlers: [hello, upper]
//! ```
//!
//! Handler names are resolved against a
//! [`HandlerCatalog`](crate::chain::HandlerCatalog) when the registry is
//! built; this module only checks structure.

use crate::error::{HandlerError, HandlerResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One named chain: handler names in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    pub name: String,
    #[serde(default)]
    pub handlers: Vec<String>,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsConfig {
    #[serde(default)]
    pub chains: Vec<ChainEntry>,
}

impl ChainsConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> HandlerResult<Self> {
        let config: ChainsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> HandlerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HandlerError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Find a chain by name.
    pub fn chain(&self, name: &str) -> Option<&ChainEntry> {
        self.chains.iter().find(|c| c.name == name)
    }

    /// Reject empty and duplicate chain names.
    pub fn validate(&self) -> HandlerResult<()> {
        let mut seen = HashSet::new();
        for chain in &self.chains {
            if chain.name.trim().is_empty() {
                return Err(HandlerError::Config("chain name must not be empty".to_string()));
            }
            if !seen.insert(chain.name.as_str()) {
                return Err(HandlerError::Config(format!(
                    "chain '{}' is defined more than once",
                    chain.name
                )));
            }
        }
        Ok(())
    }
}

/// Default config location (~/.config/handlers/chains.yaml on Linux).
pub fn default_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"));
    config_dir.join("handlers").join("chains.yaml")
}
