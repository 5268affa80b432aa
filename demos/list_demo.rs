//! Walks through the address-ordered free-list heap the way `rallocator`'s
//! own example walked through its bump allocator: one allocation at a time,
//! with the heap's state printed after each step.
//!
//! Run with `cargo run --example list_demo` (the crate root's `[[example]]`
//! table in Cargo.toml points this path outside the reserved examples/ tree).

use heapforge::heap::ListHeap;

fn print_state(label: &str, heap: &ListHeap) {
    println!(
        "[{label}] free blocks = {}, free bytes = {}, valid = {}",
        heap.free_total(),
        heap.capacity(),
        heap.validate_heap(),
    );
}

fn main() {
    env_logger::init();

    let mut heap = ListHeap::with_address_order(4096).unwrap();
    println!("Fresh heap over 4096 bytes, address-ordered free list.");
    print_state("start", &heap);

    // --------------------------------------------------------------------
    // 1) Three small allocations in a row.
    // --------------------------------------------------------------------
    let a = heap.allocate(64).unwrap();
    let b = heap.allocate(64).unwrap();
    let c = heap.allocate(64).unwrap();
    println!("\n[1] Allocated a={a:#x} b={b:#x} c={c:#x}");
    print_state("after three allocations", &heap);

    // --------------------------------------------------------------------
    // 2) Free the middle block. First-fit should pick it up again below.
    // --------------------------------------------------------------------
    heap.free(b);
    println!("\n[2] Freed b");
    print_state("after freeing b", &heap);

    // --------------------------------------------------------------------
    // 3) A request that fits in b's freed slot reuses its address.
    // --------------------------------------------------------------------
    let d = heap.allocate(32).unwrap();
    println!("\n[3] Allocated d={d:#x}, reused b's slot? {}", d == b);
    print_state("after reusing b's slot", &heap);

    // --------------------------------------------------------------------
    // 4) Free everything and watch the list coalesce back to one run.
    // --------------------------------------------------------------------
    heap.free(a);
    heap.free(c);
    heap.free(d);
    println!("\n[4] Freed everything else");
    print_state("fully idle", &heap);

    heap.print_free_index();
}
