//! In-memory NOR flash
//!
//! RAM-backed block device that behaves like NOR flash: erase sets every byte
//! of a block to `0xFF`, programming can only clear bits. Attempting to set a
//! cleared bit fails with `NotErased` instead of silently corrupting data.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{Result, TsdbError};

use super::{check_index, check_write, BlockDevice, ERASED_BYTE};

/// RAM-backed flash simulator
///
/// ## Concurrency:
/// - `data`: RwLock (concurrent reads, exclusive program/erase)
/// - counters: atomics, for tests and benchmarks
pub struct MemBlockDevice {
    block_size: usize,
    num_blocks: usize,
    data: RwLock<Vec<u8>>,
    erase_count: AtomicU64,
    write_count: AtomicU64,
}

impl MemBlockDevice {
    /// Create a fully erased device
    pub fn new(block_size: usize, num_blocks: usize) -> Self {
        Self::from_image(vec![ERASED_BYTE; block_size * num_blocks], block_size)
    }

    /// Wrap an existing raw image (length must be a multiple of `block_size`)
    pub fn from_image(image: Vec<u8>, block_size: usize) -> Self {
        let num_blocks = if block_size == 0 { 0 } else { image.len() / block_size };
        Self {
            block_size,
            num_blocks,
            data: RwLock::new(image),
            erase_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
        }
    }

    /// Copy of the raw device contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Number of block erases performed
    pub fn erase_count(&self) -> u64 {
        self.erase_count.load(Ordering::Relaxed)
    }

    /// Number of program operations performed
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }
}

impl BlockDevice for MemBlockDevice {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<()> {
        check_index(index, self.num_blocks)?;
        check_write(0, buf.len(), self.block_size)?;

        let start = index * self.block_size;
        let data = self.data.read();
        buf.copy_from_slice(&data[start..start + buf.len()]);
        Ok(())
    }

    fn write_block(&self, index: usize, bytes: &[u8], offset: usize) -> Result<()> {
        check_index(index, self.num_blocks)?;
        check_write(offset, bytes.len(), self.block_size)?;

        let start = index * self.block_size + offset;
        let mut data = self.data.write();
        let target = &mut data[start..start + bytes.len()];

        // Validate the whole range before touching anything
        if let Some(pos) = target
            .iter()
            .zip(bytes)
            .position(|(old, new)| old & new != *new)
        {
            return Err(TsdbError::NotErased {
                index,
                offset: offset + pos,
            });
        }

        for (old, new) in target.iter_mut().zip(bytes) {
            *old &= *new;
        }
        self.write_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn erase_block(&self, index: usize) -> Result<()> {
        check_index(index, self.num_blocks)?;

        let start = index * self.block_size;
        let mut data = self.data.write();
        data[start..start + self.block_size].fill(ERASED_BYTE);
        self.erase_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
