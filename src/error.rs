//! Error types for flashts
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TsdbError
pub type Result<T> = std::result::Result<T, TsdbError>;

/// Unified error type for flashts operations
#[derive(Debug, Error)]
pub enum TsdbError {
    // -------------------------------------------------------------------------
    // Device Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Block {index} out of range (device has {count} blocks)")]
    BlockOutOfRange { index: usize, count: usize },

    #[error("Write of {len} bytes at offset {offset} exceeds block size {block_size}")]
    WriteOutOfBounds {
        offset: usize,
        len: usize,
        block_size: usize,
    },

    #[error("Program error at block {index}, offset {offset}: byte is not erased")]
    NotErased { index: usize, offset: usize },

    #[error("Invalid device geometry: {0}")]
    InvalidGeometry(String),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt database: {0}")]
    CorruptDatabase(String),

    #[error("Configuration data ({size} bytes) exceeds block size ({block_size} bytes)")]
    ConfigTooLarge { size: usize, block_size: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Allocation Errors
    // -------------------------------------------------------------------------
    #[error("Directory full ({capacity} records)")]
    DirectoryFull { capacity: usize },

    #[error("Insufficient space: need {needed} blocks, {free} free")]
    InsufficientSpace { needed: usize, free: usize },

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Record '{0}' not in database")]
    RecordNotFound(String),

    #[error("Key is {len} bytes, at most {max} allowed")]
    KeyTooLong { len: usize, max: usize },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Item encodes to the blank pattern and cannot be stored")]
    ReservedItem,
}
