//! Ring append with erase-ahead

use crate::device::BlockDevice;
use crate::error::Result;
use crate::layout::{Item, ITEM_SIZE};

use super::{Cursor, Ring};

impl<'a, D: BlockDevice + ?Sized> Ring<'a, D> {
    /// Program `item` at `cursor.next` and advance the cursor
    ///
    /// Before the last slot of a block is programmed, the following block is
    /// erased. If that block held the oldest data, `start` moves to the block
    /// after it.
    pub fn append(&self, cursor: &mut Cursor, item: Item) -> Result<()> {
        let block = cursor.next_block(self.block_size);
        let offset = cursor.next % self.block_size;

        if self.block_size - offset <= ITEM_SIZE {
            let ahead = (block + 1) % self.nblocks;
            self.erase_block(ahead)?;

            if cursor.start_block(self.block_size) == ahead {
                cursor.start = ((ahead + 1) % self.nblocks) * self.block_size;
            }

            tracing::debug!(
                "Erased ring block {} (device block {}), start now at {}",
                ahead,
                self.block_addr + ahead,
                cursor.start
            );
        }

        self.program(block, &item.encode(), offset)?;
        cursor.next = (cursor.next + ITEM_SIZE) % self.span();

        Ok(())
    }
}
