//! Circular Buffer Module
//!
//! One series is a ring of `nblocks` contiguous flash blocks holding 8-byte
//! items. The write cursor runs through the ring; whenever it is about to fill
//! a block, the following block is erased first. Space is therefore reclaimed
//! one erase block at a time, and there is always at least one erased item
//! slot at the write cursor, which is how both read-back and recovery find the
//! end of the data.
//!
//! ## Ring State
//! ```text
//!   block:    0          1          2          3
//!          ┌──────────┬──────────┬──────────┬──────────┐
//!          │ ######## │ ###..... │ ........ │ ######## │
//!          └──────────┴──────────┴──────────┴──────────┘
//!                         ▲ next               ▲ start
//! ```
//! Cursors are never written to flash; see [`recovery`] for how they are
//! rebuilt on open.

mod cursor;
mod reader;
pub mod recovery;
mod writer;

use crate::device::BlockDevice;
use crate::error::Result;
use crate::layout::{SeriesRecord, ITEM_SIZE};

pub use cursor::Cursor;
pub use reader::Values;

/// Items per block for a given block size
pub fn items_per_block(block_size: usize) -> usize {
    block_size / ITEM_SIZE
}

/// Item count a ring of `nblocks` always holds once it has wrapped:
/// the count `values` reports for a full ring
pub fn retained_items(nblocks: usize, block_size: usize) -> usize {
    nblocks.saturating_sub(1) * items_per_block(block_size)
}

/// View of one series' block extent on a device
pub struct Ring<'a, D: ?Sized> {
    device: &'a D,
    block_addr: usize,
    nblocks: usize,
    block_size: usize,
}

impl<'a, D: BlockDevice + ?Sized> Ring<'a, D> {
    pub fn new(device: &'a D, record: &SeriesRecord, block_size: usize) -> Self {
        Self {
            device,
            block_addr: record.block_addr,
            nblocks: record.nblocks,
            block_size,
        }
    }

    /// Number of blocks in the ring
    pub fn nblocks(&self) -> usize {
        self.nblocks
    }

    /// Size of the ring in bytes
    pub fn span(&self) -> usize {
        self.nblocks * self.block_size
    }

    /// Read ring-relative block `block`
    fn read_block(&self, block: usize, buf: &mut [u8]) -> Result<()> {
        self.device.read_block(self.block_addr + block, buf)
    }

    fn erase_block(&self, block: usize) -> Result<()> {
        self.device.erase_block(self.block_addr + block)
    }

    fn program(&self, block: usize, data: &[u8], offset: usize) -> Result<()> {
        self.device.write_block(self.block_addr + block, data, offset)
    }
}
