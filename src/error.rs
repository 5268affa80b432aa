//! Error taxonomy (SPEC_FULL.md §7).
//!
//! `allocate`/`reallocate`/`free` never panic or raise on a legal request —
//! failures there are silent `None`s, matching the distilled spec's "silent
//! nulls" policy. The only place structured errors surface is construction
//! (`ArenaError`) and validation (`ValidationFault`).

use crate::block::{BlockRef, Word};

/// Why [`crate::heap::Heap::new`] refused to build an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error(
        "requested capacity {requested} is too small: need at least {minimum} bytes \
         ({minimum_block} for one free block plus the sentinel word)"
    )]
    CapacityTooSmall {
        requested: u64,
        minimum: u64,
        minimum_block: u64,
    },
}

/// A structured description of a single validator failure
/// (SPEC_FULL.md §4.9, §7). `Heap::validate_heap` collapses this to a
/// `bool`; `Heap::validate_heap_detailed` returns the fault itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFault {
    #[error("block at {block:#x} has a corrupted header {header:#018x}: {reason}")]
    CorruptedHeader {
        block: BlockRef,
        header: Word,
        reason: &'static str,
    },

    #[error(
        "forward walk landed on a zero-sized non-sentinel block at {block:#x} \
         (previous block at {previous:#x})"
    )]
    BadJump { previous: BlockRef, block: BlockRef },

    #[error(
        "accounting mismatch: linear walk found {linear_total} free bytes across \
         {linear_count} blocks, index reports {index_total} bytes across {index_count} blocks"
    )]
    UnbalancedAccounting {
        linear_total: u64,
        linear_count: u64,
        index_total: u64,
        index_count: u64,
    },

    #[error("two adjacent free blocks were not coalesced: {first:#x} and {second:#x}")]
    AdjacentFreeBlocks { first: BlockRef, second: BlockRef },

    #[error("index structural violation: {reason}")]
    IndexStructure { reason: &'static str },
}

impl ValidationFault {
    /// Emits this fault at `log::error!` with the offending offsets, then
    /// returns `self` unchanged — used at every fault's construction site so
    /// a caller that only wants the `bool` from `validate_heap` doesn't lose
    /// the diagnostic.
    pub fn logged(self) -> Self {
        log::error!("heap validation failed: {self}");
        self
    }
}
