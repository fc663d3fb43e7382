//! Fixed-capacity LIFO frame arena.
//!
//! One arena backs one task family. Nested routine frames are pushed when a
//! routine calls a sub-routine and popped when it returns or is abandoned,
//! so live blocks always form a stack. The arena is index based: a capacity,
//! a cursor and the start offsets of live blocks. Blocks are rounded up to
//! [`ARENA_UNIT_BYTES`].
//!
//! Every contract breach (over-allocation, freeing anything but the top
//! block) is reported as an [`ArenaError`]; callers treat it as fatal.

use heapless::Vec;
use pallet_common::consts::{ARENA_UNIT_BYTES, MAX_CALL_DEPTH};

use crate::error::ArenaError;

/// Start offset of a live block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameAddr(usize);

impl FrameAddr {
    /// Byte offset from the arena base.
    #[inline]
    pub const fn offset(self) -> usize {
        self.0
    }
}

/// Bump allocator with strictly LIFO frees.
#[derive(Debug, Clone)]
pub struct FrameArena {
    capacity: usize,
    cursor: usize,
    blocks: Vec<usize, MAX_CALL_DEPTH>,
    high_water: usize,
}

impl FrameArena {
    /// Create an empty arena of `capacity` bytes.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cursor: 0,
            blocks: Vec::new(),
            high_water: 0,
        }
    }

    /// Round `size` up to whole arena units (at least one unit).
    #[inline]
    pub const fn rounded(size: usize) -> usize {
        let size = if size == 0 { 1 } else { size };
        size.div_ceil(ARENA_UNIT_BYTES) * ARENA_UNIT_BYTES
    }

    /// Reserve a block of at least `size` bytes and return its address.
    ///
    /// # Errors
    /// [`ArenaError::Exhausted`] if the rounded block does not fit or the
    /// block table is full.
    pub fn allocate(&mut self, size: usize) -> Result<FrameAddr, ArenaError> {
        let requested = Self::rounded(size);
        let available = self.capacity.saturating_sub(self.cursor);
        if requested > available || self.blocks.is_full() {
            return Err(ArenaError::Exhausted {
                requested,
                available,
                capacity: self.capacity,
            });
        }

        let addr = self.cursor;
        // Cannot fail: fullness checked above.
        let _ = self.blocks.push(addr);
        self.cursor += requested;
        self.high_water = self.high_water.max(self.cursor);
        Ok(FrameAddr(addr))
    }

    /// Free the block at `addr`, which must be the most recent allocation.
    ///
    /// # Errors
    /// [`ArenaError::OutOfOrder`] if `addr` is not the top block,
    /// [`ArenaError::Empty`] if nothing is allocated.
    pub fn deallocate(&mut self, addr: FrameAddr) -> Result<(), ArenaError> {
        let Some(&top) = self.blocks.last() else {
            return Err(ArenaError::Empty { freed: addr.0 });
        };
        if addr.0 != top {
            return Err(ArenaError::OutOfOrder { freed: addr.0, top });
        }
        self.blocks.pop();
        self.cursor = addr.0;
        Ok(())
    }

    /// Total capacity [bytes].
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently allocated.
    #[inline]
    pub const fn used(&self) -> usize {
        self.cursor
    }

    /// Number of live blocks.
    #[inline]
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Peak usage since creation [bytes].
    #[inline]
    pub const fn high_water(&self) -> usize {
        self.high_water
    }
}
