//! Configuration for flashts
//!
//! Everything `Database::make` needs to format a device. The geometry itself
//! (block size, block count) always comes from the device.

use serde_json::{Map, Value};

/// Default description stored in the header
pub const DEFAULT_DESCRIPTION: &str = "Time Series DataBase";

/// Format-time configuration for a flashts database
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Directory Configuration
    // -------------------------------------------------------------------------
    /// Minimum number of series records the directory must hold.
    /// Rounded up to whole directory blocks at format time.
    pub directory_capacity: usize,

    // -------------------------------------------------------------------------
    // Header Configuration
    // -------------------------------------------------------------------------
    /// Human readable description written to the header
    pub description: String,

    /// Opaque caller metadata stored alongside the header fields.
    /// Keys that collide with reserved header fields are overridden.
    pub metadata: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_capacity: 64,
            description: DEFAULT_DESCRIPTION.to_string(),
            metadata: Map::new(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory capacity (number of series records)
    pub fn directory_capacity(mut self, records: usize) -> Self {
        self.config.directory_capacity = records;
        self
    }

    /// Set the header description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = description.into();
        self
    }

    /// Add one metadata entry
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace all metadata
    pub fn metadata_map(mut self, metadata: Map<String, Value>) -> Self {
        self.config.metadata = metadata;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
