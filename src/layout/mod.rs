//! On-Flash Layout Module
//!
//! Binary layout of a formatted device.
//!
//! ## Device Layout
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Block 0: Header                                              │
//! │   JSON text, terminated by the first 0xFF (erased) byte      │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Blocks 1..=num_dir_blocks: Directory                         │
//! │   64-byte records, packed, in creation order                 │
//! │   ┌──────────┬────────────────┬─────────────┬──────────────┐ │
//! │   │ Type (4) │ BlockAddr (4)  │ NBlocks (4) │  Key (52)    │ │
//! │   └──────────┴────────────────┴─────────────┴──────────────┘ │
//! │   Type 0xFFFFFFFF = blank, 0x01A2B3C4 = series, 0 = deleted  │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Data blocks: one contiguous extent per series                │
//! │   8-byte items, 0xFF x 8 = blank slot                        │
//! │   ┌─────────────────┬─────────────┐                          │
//! │   │ Timestamp (u32) │ Value (f32) │   (little-endian)        │
//! │   └─────────────────┴─────────────┘                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod header;
mod item;
mod record;

pub use header::{Header, FORMAT_VERSION, MAGIC};
pub use item::{is_blank, Item, BLANK_ITEM, ITEM_SIZE};
pub use record::{
    validate_key, DirRecord, SeriesRecord, DIR_RECORD_SIZE, DIR_TYPE_BLANK, DIR_TYPE_CBUF,
    DIR_TYPE_DELETED, KEY_SIZE,
};

/// Index of the header block
pub const HEADER_BLOCK: usize = 0;

/// Index of the first directory block
pub const FIRST_DIR_BLOCK: usize = 1;

/// Block location of a directory slot: (block index, byte offset)
pub fn slot_location(slot: usize, block_size: usize) -> (usize, usize) {
    let byte_addr = slot * DIR_RECORD_SIZE;
    (FIRST_DIR_BLOCK + byte_addr / block_size, byte_addr % block_size)
}
