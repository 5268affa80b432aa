//! End-to-end scenarios from SPEC_FULL.md §8, replayed against every index
//! configuration that scenario applies to. The splay-tree duplicate-side-list
//! scenario lives in `index::splay`'s own test module instead, since it's
//! specific to that one index.

use heapforge::heap::{Heap, ListHeap, SegregatedHeap, SplayHeap};
use heapforge::index::FreeIndex;

/// `a 1 24; a 2 24; f 1; a 3 24` — block 3 must reuse block 1's address.
fn reuses_freed_block<I: FreeIndex>(heap: &mut Heap<I>) {
    let b1 = heap.allocate(24).unwrap();
    let _b2 = heap.allocate(24).unwrap();
    heap.free(b1);
    let b3 = heap.allocate(24).unwrap();
    assert_eq!(b3, b1);
    assert!(heap.validate_heap());
}

#[test]
fn reuses_freed_block_address_ordered_list() {
    reuses_freed_block(&mut ListHeap::with_address_order(1 << 20).unwrap());
}

#[test]
fn reuses_freed_block_size_ordered_list() {
    reuses_freed_block(&mut ListHeap::with_size_order(1 << 20).unwrap());
}

#[test]
fn reuses_freed_block_segregated_fits() {
    reuses_freed_block(&mut SegregatedHeap::with_segregated_fits(1 << 20).unwrap());
}

#[test]
fn reuses_freed_block_splay_tree() {
    reuses_freed_block(&mut SplayHeap::with_splay_tree(1 << 20).unwrap());
}

/// `a 1 24; a 2 24; a 3 24; f 2; a 4 16` — block 4 splits block 2's slot; the
/// leftover slack is re-indexed rather than lost.
fn splits_a_freed_slot<I: FreeIndex>(heap: &mut Heap<I>) {
    let _b1 = heap.allocate(24).unwrap();
    let b2 = heap.allocate(24).unwrap();
    let _b3 = heap.allocate(24).unwrap();
    heap.free(b2);

    let free_before = heap.free_total();
    let b4 = heap.allocate(16).unwrap();
    assert_eq!(b4, b2, "the smaller request should reuse b2's freed slot");
    // b2's slot (32 bytes) minus b4's need (24 bytes) leaves 8 bytes, too
    // small to host another minimum-size block, so it's folded into b4
    // rather than split off as its own free block.
    assert_eq!(heap.free_total(), free_before - 1);
    assert!(heap.validate_heap());
}

#[test]
fn splits_a_freed_slot_address_ordered_list() {
    splits_a_freed_slot(&mut ListHeap::with_address_order(1 << 20).unwrap());
}

#[test]
fn splits_a_freed_slot_segregated_fits() {
    splits_a_freed_slot(&mut SegregatedHeap::with_segregated_fits(1 << 20).unwrap());
}

/// `a 1 24; a 2 24; f 1; f 2` — with nothing else carved out of the arena,
/// freeing both blocks coalesces them with each other and with the
/// remaining tail free region into the arena's original single free run.
fn double_free_coalesces_into_one_free_block<I: FreeIndex>(heap: &mut Heap<I>) {
    let b1 = heap.allocate(24).unwrap();
    let b2 = heap.allocate(24).unwrap();
    heap.free(b1);
    heap.free(b2);

    assert_eq!(heap.free_total(), 1);
    assert!(heap.validate_heap());
}

#[test]
fn double_free_coalesces_address_ordered_list() {
    double_free_coalesces_into_one_free_block(&mut ListHeap::with_address_order(1 << 20).unwrap());
}

#[test]
fn double_free_coalesces_splay_tree() {
    double_free_coalesces_into_one_free_block(&mut SplayHeap::with_splay_tree(1 << 20).unwrap());
}

/// `a 1 1000; r 1 2000` with an adjacent free region big enough: reallocate
/// grows in place and returns the same offset.
#[test]
fn reallocate_grows_in_place_when_room_is_adjacent() {
    let mut heap = ListHeap::with_address_order(1 << 20).unwrap();
    let b1 = heap.allocate(1000).unwrap();
    let grown = heap.reallocate(b1, 2000).unwrap();
    assert_eq!(grown, b1);
    assert!(heap.validate_heap());
}

/// `a 1 1000; r 1 2000` with no adjacent room: reallocate returns a new
/// offset and preserves the old payload's first 1000 bytes verbatim.
#[test]
fn reallocate_copies_when_no_adjacent_room_exists() {
    let mut heap = ListHeap::with_address_order(1 << 20).unwrap();
    let b1 = heap.allocate(1000).unwrap();
    // Wall off the adjacent free region so the coalesced run can't grow.
    let wall = heap.allocate(16).unwrap();

    let pattern: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
    heap.write_payload(b1, &pattern);

    let grown = heap.reallocate(b1, 2000).unwrap();
    assert_ne!(grown, b1);
    assert_eq!(heap.read_payload(grown, pattern.len() as u64), pattern);
    assert!(heap.validate_heap());
    heap.free(wall);
}
