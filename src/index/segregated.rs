//! Segregated-fits free index (§4.7): 15 size-class buckets, each a
//! doubly-linked free list with LIFO insertion, scanned from the
//! request's own bucket upward for the first sufficient node.
//!
//! Bucket boundary resolution: the distilled spec's table labels buckets
//! "4–13" (ten buckets) for the power-of-two classes but only enumerates nine
//! explicit boundary values before the "…", then gives bucket 14's lower
//! bound as 32768 — one bucket short of what the stated index range needs.
//! This crate keeps every explicitly-named boundary (`32, 40, 48, 56, 64,
//! 128, …, 16384`) and extends the doubling by one more step to `32768` for
//! bucket 13, pushing the ceiling bucket's threshold to `65536`. Recorded in
//! DESIGN.md.

use crate::arena::Arena;
use crate::block::{self, BlockRef, NIL};
use crate::error::ValidationFault;
use crate::index::FreeIndex;

pub const BUCKET_COUNT: usize = 15;

/// Lower bound of each bucket; bucket `i` (for `i < 14`) spans
/// `[LOWER_BOUNDS[i], LOWER_BOUNDS[i + 1])`. Bucket 14 is the ceiling bucket,
/// `[LOWER_BOUNDS[14], ∞)`.
const LOWER_BOUNDS: [u64; BUCKET_COUNT] = [
    32, 40, 48, 56, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536,
];

fn bucket_of(size: u64) -> usize {
    for i in (0..BUCKET_COUNT).rev() {
        if size >= LOWER_BOUNDS[i] {
            return i;
        }
    }
    0
}

pub struct SegregatedFits {
    heads: [BlockRef; BUCKET_COUNT],
    count: u64,
    bytes: u64,
}

impl SegregatedFits {
    pub fn new() -> Self {
        Self { heads: [NIL; BUCKET_COUNT], count: 0, bytes: 0 }
    }

    fn next_of(arena: &Arena, block: BlockRef) -> BlockRef {
        arena.links(block).0
    }

    fn prev_of(arena: &Arena, block: BlockRef) -> BlockRef {
        arena.links(block).1
    }

    fn set_next(arena: &mut Arena, block: BlockRef, value: BlockRef) {
        let prev = Self::prev_of(arena, block);
        arena.set_links(block, value, prev);
    }

    fn set_prev(arena: &mut Arena, block: BlockRef, value: BlockRef) {
        let next = Self::next_of(arena, block);
        arena.set_links(block, next, value);
    }

    fn bucket_nodes(&self, arena: &Arena, bucket: usize) -> Vec<BlockRef> {
        let mut out = Vec::new();
        let mut cur = self.heads[bucket];
        while cur != NIL {
            out.push(cur);
            cur = Self::next_of(arena, cur);
        }
        out
    }
}

impl Default for SegregatedFits {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeIndex for SegregatedFits {
    fn insert(&mut self, arena: &mut Arena, block: BlockRef) {
        let size = block::size_of(arena.header(block));
        let bucket = bucket_of(size);
        let old_head = self.heads[bucket];

        arena.set_links(block, old_head, NIL);
        if old_head != NIL {
            Self::set_prev(arena, old_head, block);
        }
        self.heads[bucket] = block;

        self.count += 1;
        self.bytes += size;
    }

    fn remove_specific(&mut self, arena: &mut Arena, block: BlockRef) {
        let size = block::size_of(arena.header(block));
        let bucket = bucket_of(size);
        let (next, prev) = arena.links(block);

        if prev == NIL {
            self.heads[bucket] = next;
        } else {
            Self::set_next(arena, prev, next);
        }
        if next != NIL {
            Self::set_prev(arena, next, prev);
        }

        self.count -= 1;
        self.bytes -= size;
    }

    fn find_fit(&mut self, arena: &mut Arena, req: u64) -> Option<BlockRef> {
        let start = bucket_of(req);
        for bucket in start..BUCKET_COUNT {
            let mut cur = self.heads[bucket];
            while cur != NIL {
                let size = block::size_of(arena.header(cur));
                if size >= req {
                    self.remove_specific(arena, cur);
                    return Some(cur);
                }
                cur = Self::next_of(arena, cur);
            }
        }
        None
    }

    fn free_count(&self) -> u64 {
        self.count
    }

    fn free_bytes(&self) -> u64 {
        self.bytes
    }

    fn walk(&self, arena: &Arena) -> Vec<BlockRef> {
        (0..BUCKET_COUNT).flat_map(|b| self.bucket_nodes(arena, b)).collect()
    }

    fn validate_structure(&self, arena: &Arena) -> Result<(), ValidationFault> {
        let mut total = 0u64;
        for bucket in 0..BUCKET_COUNT {
            let lower = LOWER_BOUNDS[bucket];
            let upper = LOWER_BOUNDS.get(bucket + 1).copied();

            for node in self.bucket_nodes(arena, bucket) {
                let size = block::size_of(arena.header(node));
                let in_range = size >= lower && upper.is_none_or(|u| size < u);
                if !in_range {
                    return Err(ValidationFault::IndexStructure {
                        reason: "free block sits in the wrong segregated-fits bucket",
                    }
                    .logged());
                }
                total += 1;
            }
        }

        if total != self.count {
            return Err(ValidationFault::IndexStructure {
                reason: "segregated-fits bucket lengths disagree with tracked count",
            }
            .logged());
        }

        Ok(())
    }

    fn dump(&self, arena: &Arena) {
        log::debug!("segregated fits, {} blocks, {} bytes:", self.count, self.bytes);
        for bucket in 0..BUCKET_COUNT {
            let nodes = self.bucket_nodes(arena, bucket);
            if !nodes.is_empty() {
                log::debug!("  bucket {bucket} (>= {}): {:?}", LOWER_BOUNDS[bucket], nodes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BLOCK_SIZE_LIST;

    fn carve_free(arena: &mut Arena, offset: BlockRef, size: u64, left_allocated: bool) -> BlockRef {
        arena.write_block(offset, size, false, left_allocated, block::Color::Black);
        offset
    }

    #[test]
    fn bucket_assignment_matches_table() {
        assert_eq!(bucket_of(32), 0);
        assert_eq!(bucket_of(56), 3);
        assert_eq!(bucket_of(64), 4);
        assert_eq!(bucket_of(127), 4);
        assert_eq!(bucket_of(128), 5);
        assert_eq!(bucket_of(16384), 12);
        assert_eq!(bucket_of(32767), 12);
        assert_eq!(bucket_of(32768), 13);
        assert_eq!(bucket_of(100_000), 14);
    }

    #[test]
    fn lifo_insertion_order_within_a_bucket() {
        let mut arena = Arena::new(4096, MIN_BLOCK_SIZE_LIST).unwrap();
        let mut fits = SegregatedFits::new();

        let a = carve_free(&mut arena, 0, 64, true);
        let b = carve_free(&mut arena, 64, 64, false);

        fits.insert(&mut arena, a);
        fits.insert(&mut arena, b);

        assert_eq!(fits.bucket_nodes(&arena, bucket_of(64)), vec![b, a]);
    }

    #[test]
    fn find_fit_scans_upward_through_buckets() {
        let mut arena = Arena::new(8192, MIN_BLOCK_SIZE_LIST).unwrap();
        let mut fits = SegregatedFits::new();
        let big = carve_free(&mut arena, 0, 256, true);
        fits.insert(&mut arena, big);

        let fit = fits.find_fit(&mut arena, 100).unwrap();
        assert_eq!(fit, big);
        assert_eq!(fits.free_count(), 0);
    }

    #[test]
    fn validate_structure_rejects_misplaced_block() {
        let mut arena = Arena::new(4096, MIN_BLOCK_SIZE_LIST).unwrap();
        let mut fits = SegregatedFits::new();
        let block = carve_free(&mut arena, 0, 64, true);
        fits.insert(&mut arena, block);
        // Corrupt: claim it lives in bucket 0 (exact size 32) instead.
        fits.heads[0] = block;
        fits.heads[bucket_of(64)] = NIL;
        assert!(fits.validate_structure(&arena).is_err());
    }
}
