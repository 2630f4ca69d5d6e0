//! Block Device Module
//!
//! The storage contract the database runs on: raw flash with no filesystem.
//!
//! ## Contract
//! - Fixed-size blocks, addressed by index `0..block_count()`
//! - `read_block` fills a whole block
//! - `write_block` programs `data` at a byte offset inside one block
//! - `erase_block` resets a whole block to all-ones (`0xFF`)
//!
//! Programming may only clear bits. The database only ever writes into erased
//! bytes, except for the tombstone rewrite of a directory record's type field,
//! which turns a tag into `0x00000000`.
//!
//! All methods take `&self`; implementations use interior mutability so a
//! device can be shared (see the `Arc<D>` and `&D` impls).

mod file;
mod memory;

use std::sync::Arc;

use crate::error::{Result, TsdbError};

pub use file::FileBlockDevice;
pub use memory::MemBlockDevice;

/// Value of every byte of an erased block
pub const ERASED_BYTE: u8 = 0xFF;

/// Raw block-erase storage
pub trait BlockDevice: Send + Sync {
    /// Size of each block in bytes
    fn block_size(&self) -> usize;

    /// Number of blocks on the device
    fn block_count(&self) -> usize;

    /// Read block `index` into `buf` (`buf.len()` must equal `block_size()`)
    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<()>;

    /// Program `data` into block `index` starting at byte `offset`
    fn write_block(&self, index: usize, data: &[u8], offset: usize) -> Result<()>;

    /// Erase block `index` to all-ones
    fn erase_block(&self, index: usize) -> Result<()>;

    /// Flush any buffered state to the medium
    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

impl<D: BlockDevice + ?Sized> BlockDevice for &D {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn block_count(&self) -> usize {
        (**self).block_count()
    }

    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(index, buf)
    }

    fn write_block(&self, index: usize, data: &[u8], offset: usize) -> Result<()> {
        (**self).write_block(index, data, offset)
    }

    fn erase_block(&self, index: usize) -> Result<()> {
        (**self).erase_block(index)
    }

    fn sync(&self) -> Result<()> {
        (**self).sync()
    }
}

impl<D: BlockDevice + ?Sized> BlockDevice for Arc<D> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn block_count(&self) -> usize {
        (**self).block_count()
    }

    fn read_block(&self, index: usize, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(index, buf)
    }

    fn write_block(&self, index: usize, data: &[u8], offset: usize) -> Result<()> {
        (**self).write_block(index, data, offset)
    }

    fn erase_block(&self, index: usize) -> Result<()> {
        (**self).erase_block(index)
    }

    fn sync(&self) -> Result<()> {
        (**self).sync()
    }
}

/// Bounds checks shared by the device implementations
pub(crate) fn check_index(index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(TsdbError::BlockOutOfRange { index, count });
    }
    Ok(())
}

pub(crate) fn check_write(offset: usize, len: usize, block_size: usize) -> Result<()> {
    if offset.checked_add(len).map_or(true, |end| end > block_size) {
        return Err(TsdbError::WriteOutOfBounds {
            offset,
            len,
            block_size,
        });
    }
    Ok(())
}

/// Geometry rules every formatted device must satisfy
pub(crate) fn check_geometry(block_size: usize, min_block_size: usize) -> Result<()> {
    if !block_size.is_power_of_two() {
        return Err(TsdbError::InvalidGeometry(format!(
            "block size ({}) must be a power of two",
            block_size
        )));
    }
    if block_size < min_block_size {
        return Err(TsdbError::InvalidGeometry(format!(
            "block size ({}) must be at least {}",
            block_size, min_block_size
        )));
    }
    Ok(())
}
