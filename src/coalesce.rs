//! Coalescer (§4.4): merges a block about to become free with whichever of
//! its immediate neighbors are already free, in O(1).

use crate::arena::Arena;
use crate::block::{self, BlockRef, Color};
use crate::index::FreeIndex;

/// Absorbs `block`'s free neighbors and returns the leftmost block of the
/// resulting maximal free run, with every absorbed neighbor already removed
/// from `index` via [`FreeIndex::remove_specific`].
///
/// The returned block's header is rewritten to the summed size, still
/// marked free; its footer is intentionally left unwritten — the caller
/// (the splitter, or `Heap::free`'s reinsertion step) writes it once the
/// final size is settled.
pub fn coalesce<I: FreeIndex>(arena: &mut Arena, index: &mut I, block: BlockRef) -> BlockRef {
    let mut start = block;
    let mut size = block::size_of(arena.header(block));
    let mut left_allocated = block::is_left_allocated(arena.header(block));

    let right = arena.right_neighbor(start);
    let right_header = arena.header(right);
    if !block::is_sentinel(right_header) && !block::is_allocated(right_header) {
        index.remove_specific(arena, right);
        size += block::size_of(right_header);
    }

    if let Some(left) = arena.left_free_neighbor(block) {
        let left_header = arena.header(left);
        index.remove_specific(arena, left);
        size += block::size_of(left_header);
        left_allocated = block::is_left_allocated(left_header);
        start = left;
    }

    arena.set_header(start, block::pack(size, false, left_allocated, Color::Black));
    start
}
