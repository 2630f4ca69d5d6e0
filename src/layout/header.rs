//! Header block
//!
//! Block 0 holds a JSON object. Flash erases to `0xFF`, which never occurs in
//! UTF-8 text, so the first `0xFF` byte marks the end of the header.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{Config, DEFAULT_DESCRIPTION};
use crate::device::ERASED_BYTE;
use crate::error::{Result, TsdbError};

/// Current on-flash format version
pub const FORMAT_VERSION: &str = "1.0";

/// Magic number identifying a flashts header
pub const MAGIC: u32 = 0x07fd_abbc;

/// Header field names that caller metadata may not shadow
const RESERVED_FIELDS: [&str; 5] = [
    "description",
    "version",
    "magic",
    "block_size",
    "num_dir_blocks",
];

/// Parsed contents of block 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default = "default_description")]
    pub description: String,
    pub version: String,
    pub magic: u32,
    pub block_size: usize,
    pub num_dir_blocks: usize,
    /// Everything else in the object: caller metadata
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

impl Header {
    /// Build the header `make` writes for the given geometry
    pub fn new(config: &Config, block_size: usize, num_dir_blocks: usize) -> Self {
        let mut metadata = config.metadata.clone();
        for field in RESERVED_FIELDS {
            metadata.remove(field);
        }

        Self {
            description: config.description.clone(),
            version: FORMAT_VERSION.to_string(),
            magic: MAGIC,
            block_size,
            num_dir_blocks,
            metadata,
        }
    }

    /// Serialize to the bytes stored in block 0
    ///
    /// Fails with `ConfigTooLarge` if the encoding does not fit one block.
    pub fn encode(&self, block_size: usize) -> Result<Vec<u8>> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| TsdbError::Serialization(e.to_string()))?;

        if bytes.len() > block_size {
            return Err(TsdbError::ConfigTooLarge {
                size: bytes.len(),
                block_size,
            });
        }
        Ok(bytes)
    }

    /// Parse the contents of block 0
    pub fn decode(block: &[u8]) -> Result<Self> {
        match block.first() {
            None | Some(&ERASED_BYTE) => {
                return Err(TsdbError::CorruptDatabase(
                    "no valid database found on block device".to_string(),
                ))
            }
            Some(_) => {}
        }

        let end = block
            .iter()
            .position(|&b| b == ERASED_BYTE)
            .unwrap_or(block.len());

        serde_json::from_slice(&block[..end])
            .map_err(|e| TsdbError::CorruptDatabase(format!("unreadable header: {}", e)))
    }

    /// Check the header against the device it was read from
    pub fn validate(&self, block_size: usize) -> Result<()> {
        if self.version != FORMAT_VERSION {
            return Err(TsdbError::CorruptDatabase(format!(
                "version {} not supported",
                self.version
            )));
        }
        if self.magic != MAGIC {
            return Err(TsdbError::CorruptDatabase(format!(
                "wrong magic number, {:08x}",
                self.magic
            )));
        }
        if self.block_size != block_size {
            return Err(TsdbError::CorruptDatabase(format!(
                "header block size {} does not match device block size {}",
                self.block_size, block_size
            )));
        }
        if self.num_dir_blocks == 0 {
            return Err(TsdbError::CorruptDatabase(
                "header declares an empty directory".to_string(),
            ));
        }
        Ok(())
    }
}
