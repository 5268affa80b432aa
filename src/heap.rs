//! `Heap<I>` (§4.3, §6): the generic engine wiring one [`Arena`] to one
//! [`FreeIndex`] implementation, and the four concrete aliases callers
//! actually construct.

use crate::align::{QUANTUM, round_up};
use crate::arena::Arena;
use crate::block::{self, BlockRef, NIL, WORD};
use crate::coalesce;
use crate::config::{HeapConfig, IndexKind, MAX_REQUEST};
use crate::error::{ArenaError, ValidationFault};
use crate::index::list::{LinkedFreeList, Ordering};
use crate::index::segregated::SegregatedFits;
use crate::index::splay::SplayTree;
use crate::index::FreeIndex;
use crate::split;
use crate::validate::{self, BlockReport, ExpectedBlock};

/// A heap over a single contiguous arena, generic over which free-block
/// index places and reclaims its blocks.
pub struct Heap<I: FreeIndex> {
    arena: Arena,
    index: I,
    min_block_size: u64,
}

impl<I: FreeIndex> Heap<I> {
    /// Builds an arena of `capacity` bytes and seeds `index` with the one
    /// big free block spanning it (§4.2).
    pub fn new(capacity: u64, min_block_size: u64, mut index: I) -> Result<Self, ArenaError> {
        let mut arena = Arena::new(capacity, min_block_size)?;
        index.insert(&mut arena, 0);
        Ok(Self { arena, index, min_block_size })
    }

    /// Serves `n` payload bytes, returning the payload's offset. `None` on
    /// `n == 0`, `n > MAX_REQUEST`, or exhaustion (§4.3).
    pub fn allocate(&mut self, n: u64) -> Option<BlockRef> {
        if n == 0 || n > MAX_REQUEST {
            return None;
        }
        let req = round_up(n + WORD, QUANTUM).max(self.min_block_size);
        let block = self.index.find_fit(&mut self.arena, req)?;
        let allocated = split::split(&mut self.arena, &mut self.index, block, req, self.min_block_size);
        Some(allocated + WORD)
    }

    /// Returns a payload to the heap. `BlockRef::NIL` is a no-op (§4.3).
    pub fn free(&mut self, p: BlockRef) {
        if p == NIL {
            return;
        }
        self.free_block(p - WORD);
    }

    /// Resizes an existing allocation in place when possible, else
    /// allocates fresh and copies the old payload across (§4.3).
    pub fn reallocate(&mut self, p: BlockRef, n: u64) -> Option<BlockRef> {
        if p == NIL {
            return self.allocate(n);
        }
        if n == 0 {
            self.free(p);
            return None;
        }
        if n > MAX_REQUEST {
            return None;
        }

        let req = round_up(n + WORD, QUANTUM).max(self.min_block_size);
        let old_block = p - WORD;
        let old_payload_len = block::size_of(self.arena.header(old_block)) - WORD;

        let merged = coalesce::coalesce(&mut self.arena, &mut self.index, old_block);
        let merged_size = block::size_of(self.arena.header(merged));

        if merged_size >= req {
            if merged != old_block {
                self.arena.copy_bytes(old_block + WORD, merged + WORD, old_payload_len);
            }
            let allocated =
                split::split(&mut self.arena, &mut self.index, merged, req, self.min_block_size);
            return Some(allocated + WORD);
        }

        // Even the coalesced run is too small: finish freeing it, save the
        // old payload to a temporary buffer (its final destination isn't
        // known until `allocate` below runs, and may even be `merged`
        // itself), then allocate fresh and copy back in.
        self.arena.set_footer(merged, merged_size, self.arena.header(merged));
        let right = self.arena.right_neighbor(merged);
        self.arena.set_left_allocated_bit(right, false);
        let saved = self.arena.read_bytes(merged + WORD, old_payload_len.min(n));
        self.index.insert(&mut self.arena, merged);

        let new_p = self.allocate(n)?;
        self.arena.write_bytes(new_p, &saved);
        Some(new_p)
    }

    fn free_block(&mut self, block: BlockRef) {
        let merged = coalesce::coalesce(&mut self.arena, &mut self.index, block);
        let size = block::size_of(self.arena.header(merged));
        self.arena.set_footer(merged, size, self.arena.header(merged));
        let right = self.arena.right_neighbor(merged);
        self.arena.set_left_allocated_bit(right, false);
        self.index.insert(&mut self.arena, merged);
    }

    /// Reads `len` payload bytes at `p`. A thin wrapper over the arena's raw
    /// byte access, exposed so a request-script test harness can assert on
    /// payload contents without reaching into the crate's internals.
    pub fn read_payload(&self, p: BlockRef, len: u64) -> Vec<u8> {
        self.arena.read_bytes(p, len)
    }

    /// Writes payload bytes at `p`, for the same reason.
    pub fn write_payload(&mut self, p: BlockRef, data: &[u8]) {
        self.arena.write_bytes(p, data);
    }

    /// Number of free blocks currently indexed.
    pub fn free_total(&self) -> u64 {
        self.index.free_count()
    }

    /// Total free bytes currently indexed (§6's `capacity()`).
    pub fn capacity(&self) -> u64 {
        self.index.free_bytes()
    }

    /// `true` iff every invariant in SPEC_FULL.md §4.9 holds.
    pub fn validate_heap(&self) -> bool {
        self.validate_heap_detailed().is_ok()
    }

    /// As [`Heap::validate_heap`], but returns the specific fault found.
    pub fn validate_heap_detailed(&self) -> Result<(), ValidationFault> {
        validate::validate_heap(&self.arena, &self.index, self.min_block_size)
    }

    /// Compares the heap's actual block layout against `expected`.
    pub fn heap_state(&self, expected: &[ExpectedBlock]) -> Vec<BlockReport> {
        validate::heap_state(&self.arena, expected)
    }

    /// Dumps every block in address order at `log::debug!`.
    pub fn dump_heap(&self) {
        log::debug!(
            "heap: {} usable bytes, {} free blocks, {} free bytes",
            self.arena.usable_size(),
            self.index.free_count(),
            self.index.free_bytes(),
        );
        for block in self.arena.walk() {
            let header = self.arena.header(block);
            log::debug!(
                "  block {block:#x} size {} allocated={}",
                block::size_of(header),
                block::is_allocated(header),
            );
        }
    }

    /// Dumps the free index's own internal structure at `log::debug!`.
    pub fn print_free_index(&self) {
        self.index.dump(&self.arena);
    }
}

/// A heap over the address-ordered or size-ordered doubly-linked free list.
pub type ListHeap = Heap<LinkedFreeList>;

/// A heap over the segregated-fits table.
pub type SegregatedHeap = Heap<SegregatedFits>;

/// A heap over the splay tree with duplicate side-lists.
pub type SplayHeap = Heap<SplayTree>;

impl ListHeap {
    pub fn with_address_order(capacity: u64) -> Result<Self, ArenaError> {
        let min = IndexKind::AddressOrderedList.min_block_size();
        Heap::new(capacity, min, LinkedFreeList::new(Ordering::ByAddress))
    }

    pub fn with_size_order(capacity: u64) -> Result<Self, ArenaError> {
        let min = IndexKind::SizeOrderedList.min_block_size();
        Heap::new(capacity, min, LinkedFreeList::new(Ordering::BySize))
    }
}

impl SegregatedHeap {
    pub fn with_segregated_fits(capacity: u64) -> Result<Self, ArenaError> {
        let min = IndexKind::SegregatedFits.min_block_size();
        Heap::new(capacity, min, SegregatedFits::new())
    }
}

impl SplayHeap {
    pub fn with_splay_tree(capacity: u64) -> Result<Self, ArenaError> {
        let min = IndexKind::SplayTree.min_block_size();
        Heap::new(capacity, min, SplayTree::new())
    }
}

/// Builds the heap variant named by `config.index`, boxing it behind a
/// single return type so callers that accept runtime-chosen configuration
/// don't need to be generic over `I` themselves.
pub fn build(config: HeapConfig) -> Result<AnyHeap, ArenaError> {
    Ok(match config.index {
        IndexKind::AddressOrderedList => AnyHeap::List(ListHeap::with_address_order(config.capacity)?),
        IndexKind::SizeOrderedList => AnyHeap::List(ListHeap::with_size_order(config.capacity)?),
        IndexKind::SegregatedFits => {
            AnyHeap::Segregated(SegregatedHeap::with_segregated_fits(config.capacity)?)
        }
        IndexKind::SplayTree => AnyHeap::Splay(SplayHeap::with_splay_tree(config.capacity)?),
    })
}

/// A heap over any one of the three index families, chosen at runtime from
/// a [`HeapConfig`]. Each call site matches on the variant it needs; there is
/// deliberately no blanket `Deref` to a common interface, since the index
/// families differ in which placement policy they offer, not just in type.
pub enum AnyHeap {
    List(ListHeap),
    Segregated(SegregatedHeap),
    Splay(SplayHeap),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_free_roundtrip_on_each_index() {
        let mut list = ListHeap::with_address_order(4096).unwrap();
        let mut seg = SegregatedHeap::with_segregated_fits(4096).unwrap();
        let mut tree = SplayHeap::with_splay_tree(4096).unwrap();

        for heap in [&mut list as &mut dyn HeapLike, &mut seg, &mut tree] {
            let p = heap.allocate(100).unwrap();
            assert!(heap.validate_heap());
            heap.free(p);
            assert!(heap.validate_heap());
            assert_eq!(heap.free_total(), 1);
        }
    }

    #[test]
    fn allocate_rejects_zero_and_oversized_requests() {
        let mut heap = ListHeap::with_address_order(4096).unwrap();
        assert_eq!(heap.allocate(0), None);
        assert_eq!(heap.allocate(MAX_REQUEST + 1), None);
    }

    #[test]
    fn reallocate_nil_behaves_like_allocate() {
        let mut heap = ListHeap::with_address_order(4096).unwrap();
        let p = heap.reallocate(NIL, 64).unwrap();
        assert!(heap.validate_heap());
        heap.free(p);
    }

    #[test]
    fn reallocate_to_zero_frees_and_returns_none() {
        let mut heap = ListHeap::with_address_order(4096).unwrap();
        let p = heap.allocate(64).unwrap();
        assert_eq!(heap.reallocate(p, 0), None);
        assert_eq!(heap.free_total(), 1);
    }

    #[test]
    fn reallocate_grows_by_coalescing_with_the_right_neighbor() {
        let mut heap = ListHeap::with_address_order(4096).unwrap();
        let p = heap.allocate(32).unwrap();
        let q = heap.allocate(32).unwrap();
        heap.free(q);

        let grown = heap.reallocate(p, 100).unwrap();
        assert_eq!(grown, p);
        assert!(heap.validate_heap());
    }

    #[test]
    fn reallocate_falls_back_to_copy_when_no_room_remains() {
        let mut heap = ListHeap::with_address_order(256).unwrap();
        let p = heap.allocate(32).unwrap();
        let payload = b"0123456789abcdef";
        heap.dump_heap(); // exercised for coverage of the diagnostic path
        heap.write_payload(p, payload);
        let q = heap.allocate(32).unwrap();

        let grown = heap.reallocate(p, 64).unwrap();
        assert_ne!(grown, p);
        assert_eq!(&heap.read_payload(grown, payload.len() as u64), payload);
        assert!(heap.validate_heap());
        heap.free(q);
    }

    /// A small object-safety shim purely to let the first test iterate all
    /// three concrete heap types uniformly without a shared `FreeIndex`.
    trait HeapLike {
        fn allocate(&mut self, n: u64) -> Option<BlockRef>;
        fn free(&mut self, p: BlockRef);
        fn validate_heap(&self) -> bool;
        fn free_total(&self) -> u64;
    }

    impl<I: FreeIndex> HeapLike for Heap<I> {
        fn allocate(&mut self, n: u64) -> Option<BlockRef> {
            Heap::allocate(self, n)
        }
        fn free(&mut self, p: BlockRef) {
            Heap::free(self, p)
        }
        fn validate_heap(&self) -> bool {
            Heap::validate_heap(self)
        }
        fn free_total(&self) -> u64 {
            Heap::free_total(self)
        }
    }
}
