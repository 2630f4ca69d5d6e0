//! Runtime cursors of a series

/// Read/write position inside a ring, in bytes from the ring's first block.
///
/// Both offsets are multiples of the item size and smaller than the ring span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Offset of the oldest retained block
    pub start: usize,
    /// Offset of the next item slot to program
    pub next: usize,
}

impl Cursor {
    pub fn new(start: usize, next: usize) -> Self {
        Self { start, next }
    }

    /// Ring block holding `start`
    pub fn start_block(&self, block_size: usize) -> usize {
        self.start / block_size
    }

    /// Ring block holding `next`
    pub fn next_block(&self, block_size: usize) -> usize {
        self.next / block_size
    }
}
