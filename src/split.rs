//! Splitter (§4.5): serves a request from a chosen free block, splitting off
//! the slack when there's enough of it to host another minimum-size block.

use crate::arena::Arena;
use crate::block::{self, BlockRef, Color};
use crate::index::FreeIndex;

/// Carves `req` bytes out of `block` (already removed from `index` by the
/// caller) and returns its offset, now allocated.
///
/// If the remainder is at least `min_block_size`, it becomes a fresh free
/// block inserted back into `index`; otherwise the whole block is handed
/// out, internal-fragmentation slack included.
pub fn split<I: FreeIndex>(
    arena: &mut Arena,
    index: &mut I,
    block: BlockRef,
    req: u64,
    min_block_size: u64,
) -> BlockRef {
    let header = arena.header(block);
    let size = block::size_of(header);
    let left_allocated = block::is_left_allocated(header);

    if size >= req + min_block_size {
        arena.write_block(block, req, true, left_allocated, Color::Black);

        let remainder = block + req;
        let remainder_size = size - req;
        arena.write_block(remainder, remainder_size, false, true, Color::Black);
        index.insert(arena, remainder);

        let right = arena.right_neighbor(remainder);
        arena.set_left_allocated_bit(right, false);
    } else {
        arena.write_block(block, size, true, left_allocated, Color::Black);
        let right = arena.right_neighbor(block);
        arena.set_left_allocated_bit(right, true);
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BLOCK_SIZE_LIST;
    use crate::index::list::{LinkedFreeList, Ordering};

    #[test]
    fn splits_off_a_remainder_when_there_is_enough_slack() {
        let mut arena = Arena::new(4096, MIN_BLOCK_SIZE_LIST).unwrap();
        let mut list = LinkedFreeList::new(Ordering::ByAddress);

        let allocated = split(&mut arena, &mut list, 0, 64, MIN_BLOCK_SIZE_LIST);
        assert_eq!(allocated, 0);
        assert_eq!(block::size_of(arena.header(0)), 64);
        assert!(block::is_allocated(arena.header(0)));

        assert_eq!(list.free_count(), 1);
        let remainder = arena.right_neighbor(0);
        assert!(!block::is_allocated(arena.header(remainder)));
        assert!(block::is_left_allocated(arena.header(remainder)));
    }

    #[test]
    fn takes_the_whole_block_when_the_remainder_would_be_too_small() {
        let mut arena = Arena::new(4096, MIN_BLOCK_SIZE_LIST).unwrap();
        let mut list = LinkedFreeList::new(Ordering::ByAddress);
        let whole = arena.end();

        let allocated = split(&mut arena, &mut list, 0, whole - 16, MIN_BLOCK_SIZE_LIST);
        assert_eq!(allocated, 0);
        assert_eq!(block::size_of(arena.header(0)), whole);
        assert_eq!(list.free_count(), 0);
        assert!(block::is_left_allocated(arena.header(arena.end())));
    }
}
