//! Database Module
//!
//! The database handle that coordinates all components.
//!
//! ## Responsibilities
//! - Format a device (`make`)
//! - Verify the header and load the directory on open
//! - Route series operations to the allocator and ring engine
//!
//! ## Lifecycle
//! ```text
//!   make ──► open ──► create_record / append / values / delete_record ...
//!                 └─► (drop or close; nothing to persist)
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::device::{check_geometry, BlockDevice};
use crate::directory::{guaranteed_capacity, Directory};
use crate::error::{Result, TsdbError};
use crate::layout::{validate_key, Header, Item, DIR_RECORD_SIZE, HEADER_BLOCK};
use crate::ring::{Ring, Values};

/// A time-series database on a block device
///
/// ## Concurrency Model
/// No internal locking. Mutating calls take `&mut self`; callers sharing a
/// handle across threads must serialize access themselves.
pub struct Database<D: BlockDevice> {
    /// Underlying flash
    device: D,

    /// Parsed block 0
    header: Header,

    /// Series records and their runtime cursors
    directory: Directory,
}

impl<D: BlockDevice> Database<D> {
    /// Format `device`: write a fresh header and erase the directory
    ///
    /// Existing data on the device becomes unreachable. Series data blocks
    /// are erased lazily when a series is created.
    pub fn make(device: &D, config: &Config) -> Result<()> {
        let block_size = device.block_size();
        check_geometry(block_size, DIR_RECORD_SIZE)?;

        if config.directory_capacity == 0 {
            return Err(TsdbError::InvalidGeometry(
                "directory capacity must be at least one record".to_string(),
            ));
        }

        let num_dir_blocks = Directory::blocks_for(config.directory_capacity, block_size);
        let first_data = Directory::first_data_block(num_dir_blocks);
        if first_data > device.block_count() {
            return Err(TsdbError::InvalidGeometry(format!(
                "header and {} directory blocks need {} blocks, device has {}",
                num_dir_blocks,
                first_data,
                device.block_count()
            )));
        }

        let header = Header::new(config, block_size, num_dir_blocks);
        let encoded = header.encode(block_size)?;

        device.erase_block(HEADER_BLOCK)?;
        device.write_block(HEADER_BLOCK, &encoded, 0)?;
        Directory::format(device, num_dir_blocks)?;

        tracing::info!(
            "Formatted device: {} blocks of {} bytes, {} directory blocks",
            device.block_count(),
            block_size,
            num_dir_blocks
        );
        Ok(())
    }

    /// Open a database previously created with [`Database::make`]
    ///
    /// On open:
    /// 1. Read and verify the header
    /// 2. Load the directory
    /// 3. Recover each series' cursors from flash contents
    pub fn open(device: D) -> Result<Self> {
        let (header, directory) = Self::load(&device)?;

        tracing::info!(
            "Opened database: {} record(s), {} free blocks",
            directory.len(),
            directory.free_blocks()
        );

        Ok(Self {
            device,
            header,
            directory,
        })
    }

    /// Open, formatting the device with `config` first if it holds no valid database
    pub fn open_or_make(device: D, config: &Config) -> Result<Self> {
        match Self::load(&device) {
            Ok(_) => {}
            Err(TsdbError::CorruptDatabase(reason)) => {
                tracing::warn!("No usable database ({}), creating a new one", reason);
                Self::make(&device, config)?;
            }
            Err(e) => return Err(e),
        }
        Self::open(device)
    }

    fn load(device: &D) -> Result<(Header, Directory)> {
        let block_size = device.block_size();
        if block_size == 0 || device.block_count() == 0 {
            return Err(TsdbError::InvalidGeometry(
                "device reports no blocks".to_string(),
            ));
        }

        let mut buf = vec![0u8; block_size];
        device.read_block(HEADER_BLOCK, &mut buf)?;

        let header = Header::decode(&buf)?;
        header.validate(block_size)?;

        let directory = Directory::load(device, &header)?;
        Ok((header, directory))
    }

    // =========================================================================
    // Series Operations
    // =========================================================================

    /// Create a series holding at least `capacity` items
    ///
    /// Does nothing if a live series named `key` already exists.
    pub fn create_record(&mut self, key: &str, capacity: usize) -> Result<()> {
        if self.directory.find_live(key).is_some() {
            return Ok(());
        }
        validate_key(key)?;

        self.directory.create(&self.device, key, capacity)?;
        Ok(())
    }

    /// Append one sample, overwriting the oldest block when the ring is full
    pub fn append(&mut self, key: &str, timestamp: u32, value: f32) -> Result<()> {
        let item = Item::new(timestamp, value);
        if item.is_reserved() {
            return Err(TsdbError::ReservedItem);
        }

        let block_size = self.header.block_size;
        let entry = self
            .directory
            .find_live_mut(key)
            .ok_or_else(|| TsdbError::RecordNotFound(key.to_string()))?;

        Ring::new(&self.device, &entry.series, block_size).append(&mut entry.cursor, item)
    }

    /// Stored history of `key`, oldest first
    ///
    /// With `include_deleted`, the first record named `key` in creation order
    /// is used whether or not it was deleted.
    pub fn values(&self, key: &str, include_deleted: bool) -> Result<Values> {
        let entry = if include_deleted {
            self.directory.find_any(key)
        } else {
            self.directory.find_live(key)
        }
        .ok_or_else(|| TsdbError::RecordNotFound(key.to_string()))?;

        Ring::new(&self.device, &entry.series, self.header.block_size).read(&entry.cursor)
    }

    /// Tombstone a series; its blocks are never reused
    pub fn delete_record(&mut self, key: &str) -> Result<()> {
        self.directory.delete(&self.device, key)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Keys of all live series in creation order
    pub fn keys(&self) -> Vec<&str> {
        self.directory
            .entries()
            .iter()
            .filter(|e| e.live)
            .map(|e| e.series.key.as_str())
            .collect()
    }

    /// Number of records the directory can hold
    pub fn capacity(&self) -> usize {
        self.directory.capacity()
    }

    /// Minimum number of items the live series `key` holds
    pub fn record_capacity(&self, key: &str) -> Result<usize> {
        self.directory
            .find_live(key)
            .map(|e| guaranteed_capacity(e.series.nblocks, self.header.block_size))
            .ok_or_else(|| TsdbError::RecordNotFound(key.to_string()))
    }

    /// Blocks still available to new series
    pub fn free_blocks(&self) -> usize {
        self.directory.free_blocks()
    }

    /// Used directory slots, tombstones included
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// The directory (entries in physical order)
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Caller metadata stored at format time
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.header.metadata
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Sync the device and hand it back
    pub fn close(self) -> Result<D> {
        self.device.sync()?;
        Ok(self.device)
    }
}

impl<D: BlockDevice> fmt::Display for Database<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block_size = self.header.block_size;
        let capacity = self.capacity();

        writeln!(
            f,
            "{} Version {}",
            self.header.description, self.header.version
        )?;
        writeln!(
            f,
            "Blocks:  {:4} total, {:4} free",
            self.device.block_count(),
            self.free_blocks()
        )?;
        writeln!(
            f,
            "Records: {:4} total, {:4} free",
            capacity,
            capacity.saturating_sub(self.len())
        )?;
        writeln!(f, "{} Record(s)", self.len())?;

        for entry in self.directory.entries() {
            writeln!(
                f,
                "  {:30} capacity: {} @ block address {:4}{}",
                entry.series.key,
                guaranteed_capacity(entry.series.nblocks, block_size),
                entry.series.block_addr,
                if entry.live { "" } else { " (deleted)" }
            )?;
        }
        Ok(())
    }
}
