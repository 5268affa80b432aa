//! Same walkthrough shape again, over the splay-tree index, with a step
//! that pushes two same-sized free blocks into a duplicate side-list and
//! then drains it to show the O(1) duplicate reuse path.

use heapforge::heap::SplayHeap;

fn print_state(label: &str, heap: &SplayHeap) {
    println!(
        "[{label}] free blocks = {}, free bytes = {}, valid = {}",
        heap.free_total(),
        heap.capacity(),
        heap.validate_heap(),
    );
}

fn main() {
    env_logger::init();

    let mut heap = SplayHeap::with_splay_tree(1 << 16).unwrap();
    println!("Fresh heap over 64 KiB, splay tree of free sizes.");
    print_state("start", &heap);

    // --------------------------------------------------------------------
    // 1) Two equal-sized allocations, freed in turn, land the second free
    //    in the first's duplicate side-list instead of a new tree node.
    // --------------------------------------------------------------------
    let a = heap.allocate(128).unwrap();
    let b = heap.allocate(128).unwrap();
    let wall = heap.allocate(16).unwrap(); // keeps a and b from coalescing
    println!("\n[1] Allocated a={a:#x} b={b:#x} wall={wall:#x}");

    heap.free(a);
    println!("\n[2] Freed a");
    print_state("one free size-128 node", &heap);

    heap.free(b);
    println!("\n[3] Freed b — same size as a, joins a's duplicate list");
    print_state("size-128 node now has one duplicate", &heap);

    // --------------------------------------------------------------------
    // 2) Two requests of that size drain the duplicate list in turn.
    // --------------------------------------------------------------------
    let c = heap.allocate(120).unwrap();
    let d = heap.allocate(120).unwrap();
    println!("\n[4] Allocated c={c:#x} d={d:#x} (drained the duplicate list)");
    print_state("duplicate list drained", &heap);

    heap.free(wall);
    heap.free(c);
    heap.free(d);
    println!("\n[5] Freed everything else");
    print_state("fully idle", &heap);

    heap.print_free_index();
}
