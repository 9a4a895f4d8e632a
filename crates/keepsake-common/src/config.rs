//! Configuration structures for Keepsake.

use crate::error::{KeepsakeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest number of arena slots an index can address (slot ids are `u32`).
pub const MAX_INITIAL_CAPACITY: usize = u32::MAX as usize;

/// How `Catalog::remove` treats the price index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Remove from the ring only. Price range queries keep returning the
    /// removed record.
    #[default]
    RingOnly,
    /// Remove from the ring and retire the record in the store, so price
    /// range queries skip it. The price tree is left untouched.
    Symmetric,
}

/// Catalog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Removal behavior for `Catalog::remove`.
    pub removal: RemovalPolicy,
    /// Number of records to pre-size the store and index arenas for.
    pub initial_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            removal: RemovalPolicy::RingOnly,
            initial_capacity: 64,
        }
    }
}

impl CatalogConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CatalogConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {}
            other => {
                return Err(KeepsakeError::ConfigError(format!(
                    "unsupported config format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )));
            }
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(KeepsakeError::InvalidParameter {
                name: "initial_capacity".to_string(),
                value: self.initial_capacity.to_string(),
            });
        }
        Ok(())
    }
}
