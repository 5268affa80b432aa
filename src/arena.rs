//! The backing byte buffer and raw header/footer access.
//!
//! Per SPEC_FULL.md §9's design notes, blocks are addressed by offset, not by
//! raw pointer: every accessor below hands back a plain `Word`, never a
//! reference into `bytes` that could outlive the next mutation. There is
//! exactly one live "view" at a time — it is read, used, and discarded before
//! the next call touches the buffer.

use crate::align::{QUANTUM, round_down};
use crate::block::{self, BlockRef, Color, Word, NIL, WORD};
use crate::error::ArenaError;

/// Owns the managed byte segment. Bounds are fixed at construction and never
/// change for the lifetime of the arena (no growth, no shrinkage — Non-goals
/// in SPEC_FULL.md §1).
pub struct Arena {
    bytes: Box<[u8]>,
    /// Offset of the rightmost sentinel block.
    end: BlockRef,
}

impl Arena {
    /// Builds a new arena of (approximately) `capacity` bytes.
    ///
    /// `capacity` is rounded down to the quantum; construction fails if the
    /// result cannot host one minimum-size free block plus the sentinel word.
    pub fn new(capacity: u64, min_block_size: u64) -> Result<Self, ArenaError> {
        let rounded = round_down(capacity, QUANTUM);
        let minimum = min_block_size + WORD;
        if rounded < minimum {
            return Err(ArenaError::CapacityTooSmall {
                requested: capacity,
                minimum,
                minimum_block: min_block_size,
            });
        }

        let bytes = vec![0u8; rounded as usize].into_boxed_slice();
        let end = rounded - WORD;

        let mut arena = Arena { bytes, end };
        // Sentinel: allocated, size 0. Its left-allocated bit tracks whatever
        // sits immediately to its left, same as any other block's bit 1; the
        // initial left neighbor is the one big free block, so it starts
        // clear and the splitter/coalescer keep it in sync from here on.
        arena.set_header(end, block::pack(0, true, false, Color::Black));

        // One free block spans the whole usable span.
        arena.write_free_block(0, end, true, Color::Black);

        Ok(arena)
    }

    /// Offset of the sentinel block (one past the last usable byte).
    pub fn end(&self) -> BlockRef {
        self.end
    }

    /// Total bytes under management, sentinel word included.
    pub fn total_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Bytes available to blocks, sentinel excluded.
    pub fn usable_size(&self) -> u64 {
        self.end
    }

    fn word_at(&self, offset: BlockRef) -> Word {
        let o = offset as usize;
        Word::from_le_bytes(self.bytes[o..o + 8].try_into().unwrap())
    }

    fn set_word_at(&mut self, offset: BlockRef, value: Word) {
        let o = offset as usize;
        self.bytes[o..o + 8].copy_from_slice(&value.to_le_bytes());
    }

    /// Reads the header word at `block`.
    pub fn header(&self, block: BlockRef) -> Word {
        self.word_at(block)
    }

    /// Overwrites the header word at `block`, leaving the rest of the block
    /// untouched.
    pub fn set_header(&mut self, block: BlockRef, header: Word) {
        self.set_word_at(block, header);
    }

    /// Reads the footer word of a free block of the given `size`, located at
    /// the block's last word. Only meaningful while the block is free.
    pub fn footer(&self, block: BlockRef, size: u64) -> Word {
        self.word_at(block + size - WORD)
    }

    /// Writes the footer word of a free block of the given `size`.
    pub fn set_footer(&mut self, block: BlockRef, size: u64, footer: Word) {
        self.set_word_at(block + size - WORD, footer);
    }

    /// Writes header (and, for a free block, footer) for a block of `size`
    /// at `block`, per write-order discipline (SPEC_FULL.md §5): header
    /// first, footer second. An allocated block's would-be footer slot is
    /// left untouched for the caller to use as payload.
    pub fn write_block(
        &mut self,
        block: BlockRef,
        size: u64,
        allocated: bool,
        left_allocated: bool,
        color: Color,
    ) {
        let header = block::pack(size, allocated, left_allocated, color);
        self.set_header(block, header);
        if !allocated {
            self.set_footer(block, size, header);
        }
    }

    /// Convenience for constructing a free block during arena initialization.
    fn write_free_block(&mut self, block: BlockRef, size: u64, left_allocated: bool, color: Color) {
        self.write_block(block, size, false, left_allocated, color);
    }

    /// Offset of `block`'s right neighbor (may be the sentinel).
    pub fn right_neighbor(&self, block: BlockRef) -> BlockRef {
        block + block::size_of(self.header(block))
    }

    /// `true` if `block` is the arena-leftmost block (offset 0), which by
    /// invariant always carries `left-allocated = true` regardless of
    /// whether there really is a left neighbor.
    pub fn is_leftmost(&self, block: BlockRef) -> bool {
        block == 0
    }

    /// Offset of `block`'s left neighbor, if `block` is not leftmost and its
    /// left-free bit says the neighbor is free. Recovered via the footer
    /// word immediately preceding `block` (SPEC_FULL.md §4.1).
    pub fn left_free_neighbor(&self, block: BlockRef) -> Option<BlockRef> {
        if self.is_leftmost(block) {
            return None;
        }
        let header = self.header(block);
        if !block::left_is_free(header) {
            return None;
        }
        let left_footer = self.word_at(block - WORD);
        let left_size = block::size_of(left_footer);
        Some(block - left_size)
    }

    /// Reads the in-band `(first, second)` link pair stored right after a
    /// free block's header — used by every index as the slot for whichever
    /// two-pointer role applies (list `next`/`prev`, tree `links[L]`/
    /// `links[R]`, or duplicate-list `links[P]`/`links[N]`).
    pub fn links(&self, block: BlockRef) -> (BlockRef, BlockRef) {
        (self.word_at(block + WORD), self.word_at(block + 2 * WORD))
    }

    pub fn set_links(&mut self, block: BlockRef, first: BlockRef, second: BlockRef) {
        self.set_word_at(block + WORD, first);
        self.set_word_at(block + 2 * WORD, second);
    }

    /// Reads the third in-band word after a free block's header — the tree's
    /// `list_start`, or a duplicate-list node's `parent`.
    pub fn third_field(&self, block: BlockRef) -> BlockRef {
        self.word_at(block + 3 * WORD)
    }

    pub fn set_third_field(&mut self, block: BlockRef, value: BlockRef) {
        self.set_word_at(block + 3 * WORD, value);
    }

    /// Sets the left-allocated bit of whichever block currently sits at
    /// `block`, without disturbing size or the allocated/color bits. Used by
    /// the splitter and coalescer to keep a changed neighbor's bit in sync
    /// (SPEC_FULL.md §4.1's "sole cross-block invariant").
    pub fn set_left_allocated_bit(&mut self, block: BlockRef, left_allocated: bool) {
        let header = self.header(block);
        self.set_header(block, block::with_left_allocated(header, left_allocated));
    }

    /// Iterates every block from the arena-leftmost block to, and including,
    /// the sentinel. Used by the validator's linear walk.
    pub fn walk(&self) -> ArenaWalk<'_> {
        ArenaWalk { arena: self, next: Some(0) }
    }

    /// Copies `len` bytes from `src` to `dst`, memmove-safe for overlapping
    /// ranges — used by `reallocate` when a coalesced run's start moves left
    /// of the original payload (SPEC_FULL.md §4.3).
    pub fn copy_bytes(&mut self, src: BlockRef, dst: BlockRef, len: u64) {
        let (s, d, l) = (src as usize, dst as usize, len as usize);
        self.bytes.copy_within(s..s + l, d);
    }

    /// Reads `len` bytes starting at `offset` into an owned buffer — used by
    /// `reallocate`'s allocate-copy-free fallback, where the destination
    /// isn't known until after a fresh `allocate` call that may itself reuse
    /// the source's own storage.
    pub fn read_bytes(&self, offset: BlockRef, len: u64) -> Vec<u8> {
        let o = offset as usize;
        self.bytes[o..o + len as usize].to_vec()
    }

    pub fn write_bytes(&mut self, offset: BlockRef, data: &[u8]) {
        let o = offset as usize;
        self.bytes[o..o + data.len()].copy_from_slice(data);
    }
}

/// Iterator over every block in address order, sentinel included.
pub struct ArenaWalk<'a> {
    arena: &'a Arena,
    next: Option<BlockRef>,
}

impl Iterator for ArenaWalk<'_> {
    type Item = BlockRef;

    fn next(&mut self) -> Option<BlockRef> {
        let block = self.next?;
        let header = self.arena.header(block);
        if block::is_sentinel(header) {
            self.next = None;
        } else {
            self.next = Some(block + block::size_of(header));
        }
        Some(block)
    }
}

/// Sentinel marker re-exported for callers that want to compare a `BlockRef`
/// against "no block" without importing `crate::block`.
pub const NO_BLOCK: BlockRef = NIL;
