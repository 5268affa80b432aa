//! Validator (§4.9): a linear heap walk cross-checked against the configured
//! index's own walk and structural invariants, plus the `heap_state`
//! diagnostic comparison hook (§6).

use crate::arena::Arena;
use crate::block::{self, BlockRef, Color};
use crate::error::ValidationFault;
use crate::index::FreeIndex;

/// Walks every block from the arena-leftmost block to the sentinel, checking
/// the universal per-block invariants (§3's "Invariants" list) and the
/// accounting match against `index`, then delegates to the index's own
/// [`FreeIndex::validate_structure`] for its index-specific shape checks.
pub fn validate_heap<I: FreeIndex>(
    arena: &Arena,
    index: &I,
    min_block_size: u64,
) -> Result<(), ValidationFault> {
    let mut previous: Option<BlockRef> = None;
    let mut previous_was_free = false;
    let mut linear_free_count = 0u64;
    let mut linear_free_bytes = 0u64;

    for block in arena.walk() {
        let header = arena.header(block);
        let is_sentinel = block::is_sentinel(header);
        let size = block::size_of(header);

        if !is_sentinel {
            if size == 0 {
                return Err(ValidationFault::BadJump {
                    previous: previous.unwrap_or(block),
                    block,
                }
                .logged());
            }
            if size % 8 != 0 {
                return Err(ValidationFault::CorruptedHeader {
                    block,
                    header,
                    reason: "block size is not a multiple of the quantum",
                }
                .logged());
            }
            if size < min_block_size {
                return Err(ValidationFault::CorruptedHeader {
                    block,
                    header,
                    reason: "block smaller than the active index's minimum block size",
                }
                .logged());
            }
            if !I::ALLOWS_COLOR && block::color(header) == Color::Red {
                return Err(ValidationFault::CorruptedHeader {
                    block,
                    header,
                    reason: "color bit set outside the splay-tree index",
                }
                .logged());
            }
        }

        if block == 0 {
            if !block::is_left_allocated(header) {
                return Err(ValidationFault::CorruptedHeader {
                    block,
                    header,
                    reason: "arena-leftmost block must carry left-allocated = true",
                }
                .logged());
            }
        } else if block::is_left_allocated(header) == previous_was_free {
            return Err(ValidationFault::CorruptedHeader {
                block,
                header,
                reason: "left-allocated bit disagrees with the actual left neighbor",
            }
            .logged());
        }

        let is_free = !is_sentinel && !block::is_allocated(header);
        if is_free {
            if previous_was_free {
                return Err(ValidationFault::AdjacentFreeBlocks {
                    first: previous.unwrap(),
                    second: block,
                }
                .logged());
            }
            linear_free_count += 1;
            linear_free_bytes += size;
        }

        previous = Some(block);
        previous_was_free = is_free;
    }

    if linear_free_count != index.free_count() || linear_free_bytes != index.free_bytes() {
        return Err(ValidationFault::UnbalancedAccounting {
            linear_total: linear_free_bytes,
            linear_count: linear_free_count,
            index_total: index.free_bytes(),
            index_count: index.free_count(),
        }
        .logged());
    }

    index.validate_structure(arena)
}

/// One block the caller expects to exist, for [`heap_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedBlock {
    pub offset: BlockRef,
    pub size: u64,
    pub allocated: bool,
}

/// A single block's actual state compared against what the caller expected
/// to find there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReport {
    pub offset: BlockRef,
    pub actual_size: u64,
    pub actual_allocated: bool,
    pub expected: Option<ExpectedBlock>,
    pub matches: bool,
}

/// Walks the heap and reports, block by block, whether it matches an entry
/// in `expected` — the `heap_state` hook external test harnesses use to
/// assert on exact heap shape after a request script (§6).
pub fn heap_state(arena: &Arena, expected: &[ExpectedBlock]) -> Vec<BlockReport> {
    arena
        .walk()
        .map(|block| {
            let header = arena.header(block);
            let actual_size = block::size_of(header);
            let actual_allocated = block::is_allocated(header);
            let expected_here = expected.iter().find(|e| e.offset == block).copied();
            let matches = matches!(expected_here, Some(e) if e.size == actual_size && e.allocated == actual_allocated);
            BlockReport { offset: block, actual_size, actual_allocated, expected: expected_here, matches }
        })
        .collect()
}
