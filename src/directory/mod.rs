//! Directory Module
//!
//! Append-only table of series records stored right after the header.
//!
//! ## Responsibilities
//! - Load records in physical (creation) order until the first blank slot
//! - Recover each series' cursors on load
//! - Append new records without touching existing slots
//! - Tombstone records by clearing their type field in place
//!
//! Slot `i` lives at byte `i * 64` of the directory region, so a record never
//! straddles two blocks (block sizes are powers of two, at least 64).

mod allocator;

use crate::device::BlockDevice;
use crate::error::{Result, TsdbError};
use crate::layout::{
    slot_location, DirRecord, Header, SeriesRecord, DIR_RECORD_SIZE, DIR_TYPE_DELETED,
    FIRST_DIR_BLOCK,
};
use crate::ring::{Cursor, Ring};

pub use allocator::{blocks_for_capacity, guaranteed_capacity, Allocation, Allocator};

/// One allocated series with its runtime cursors
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Directory slot index
    pub slot: usize,
    pub series: SeriesRecord,
    /// False once tombstoned
    pub live: bool,
    pub cursor: Cursor,
}

impl Entry {
    /// The on-flash form of this entry
    pub fn record(&self) -> DirRecord {
        if self.live {
            DirRecord::CircularBuffer(self.series.clone())
        } else {
            DirRecord::Deleted(self.series.clone())
        }
    }
}

/// In-memory directory
pub struct Directory {
    block_size: usize,
    num_dir_blocks: usize,
    /// Entries in physical order (never contains blank slots)
    entries: Vec<Entry>,
    allocator: Allocator,
}

impl Directory {
    /// Directory blocks needed for `records` records
    pub fn blocks_for(records: usize, block_size: usize) -> usize {
        (records * DIR_RECORD_SIZE).div_ceil(block_size)
    }

    /// Index of the first block after the directory
    pub fn first_data_block(num_dir_blocks: usize) -> usize {
        FIRST_DIR_BLOCK + num_dir_blocks
    }

    /// Erase all directory blocks
    pub fn format<D: BlockDevice + ?Sized>(device: &D, num_dir_blocks: usize) -> Result<()> {
        for block in FIRST_DIR_BLOCK..Self::first_data_block(num_dir_blocks) {
            device.erase_block(block)?;
        }
        Ok(())
    }

    /// Read the directory described by `header` and recover every series
    pub fn load<D: BlockDevice + ?Sized>(device: &D, header: &Header) -> Result<Self> {
        let block_size = header.block_size;
        let num_blocks = device.block_count();
        let first_data = Self::first_data_block(header.num_dir_blocks);

        if first_data > num_blocks {
            return Err(TsdbError::CorruptDatabase(format!(
                "directory of {} blocks does not fit a device of {} blocks",
                header.num_dir_blocks, num_blocks
            )));
        }

        let mut entries = Vec::new();
        let mut next_free = first_data;
        let mut buf = vec![0u8; block_size];

        'blocks: for block in FIRST_DIR_BLOCK..first_data {
            device.read_block(block, &mut buf)?;

            for chunk in buf.chunks_exact(DIR_RECORD_SIZE) {
                let (series, live) = match DirRecord::decode(chunk)? {
                    DirRecord::Blank => break 'blocks,
                    DirRecord::CircularBuffer(series) => (series, true),
                    DirRecord::Deleted(series) => (series, false),
                };

                if series.nblocks < 2
                    || series.block_addr < next_free
                    || series.block_addr + series.nblocks > num_blocks
                {
                    return Err(TsdbError::CorruptDatabase(format!(
                        "record '{}' has invalid extent {}+{}",
                        series.key, series.block_addr, series.nblocks
                    )));
                }
                next_free = series.block_addr + series.nblocks;

                let cursor = Ring::new(device, &series, block_size).recover()?;
                tracing::debug!(
                    "Recovered '{}' (live={}): start={}, next={}",
                    series.key,
                    live,
                    cursor.start,
                    cursor.next
                );

                entries.push(Entry {
                    slot: entries.len(),
                    series,
                    live,
                    cursor,
                });
            }
        }

        Ok(Self {
            block_size,
            num_dir_blocks: header.num_dir_blocks,
            entries,
            allocator: Allocator::new(next_free, num_blocks),
        })
    }

    /// Number of records the directory can hold
    pub fn capacity(&self) -> usize {
        self.num_dir_blocks * self.block_size / DIR_RECORD_SIZE
    }

    /// Number of used slots (tombstones included)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity()
    }

    /// All entries in physical order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn free_blocks(&self) -> usize {
        self.allocator.free_blocks()
    }

    /// Live entry for `key`
    pub fn find_live(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.live && e.series.key == key)
    }

    pub fn find_live_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.live && e.series.key == key)
    }

    /// First entry for `key` in creation order, live or not
    pub fn find_any(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.series.key == key)
    }

    /// Allocate, erase, and record a new series
    ///
    /// Checks run before anything is written, so a failed call leaves the
    /// device untouched.
    pub fn create<D: BlockDevice + ?Sized>(
        &mut self,
        device: &D,
        key: &str,
        capacity: usize,
    ) -> Result<&Entry> {
        if self.is_full() {
            return Err(TsdbError::DirectoryFull {
                capacity: self.capacity(),
            });
        }

        let allocation = self.allocator.plan(capacity, self.block_size)?;
        let series = SeriesRecord {
            key: key.to_string(),
            block_addr: allocation.block_addr,
            nblocks: allocation.nblocks,
        };

        for block in allocation.block_addr..allocation.block_addr + allocation.nblocks {
            device.erase_block(block)?;
        }

        let slot = self.entries.len();
        let (block, offset) = slot_location(slot, self.block_size);
        device.write_block(
            block,
            &DirRecord::CircularBuffer(series.clone()).encode(),
            offset,
        )?;

        self.allocator.claim(allocation);
        tracing::debug!(
            "Created '{}' in slot {}: blocks {}..{}",
            key,
            slot,
            allocation.block_addr,
            allocation.block_addr + allocation.nblocks
        );

        self.entries.push(Entry {
            slot,
            series,
            live: true,
            cursor: Cursor::default(),
        });
        Ok(&self.entries[slot])
    }

    /// Tombstone the live record for `key`
    pub fn delete<D: BlockDevice + ?Sized>(&mut self, device: &D, key: &str) -> Result<()> {
        let block_size = self.block_size;
        let entry = self
            .find_live_mut(key)
            .ok_or_else(|| TsdbError::RecordNotFound(key.to_string()))?;

        let (block, offset) = slot_location(entry.slot, block_size);
        device.write_block(block, &DIR_TYPE_DELETED.to_le_bytes(), offset)?;
        entry.live = false;

        tracing::debug!("Deleted '{}' (slot {})", key, entry.slot);
        Ok(())
    }
}
