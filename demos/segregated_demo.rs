//! Same walkthrough shape as `list_demo.rs`, but over the segregated-fits
//! table, with a step added to show requests landing in different buckets.

use heapforge::heap::SegregatedHeap;

fn print_state(label: &str, heap: &SegregatedHeap) {
    println!(
        "[{label}] free blocks = {}, free bytes = {}, valid = {}",
        heap.free_total(),
        heap.capacity(),
        heap.validate_heap(),
    );
}

fn main() {
    env_logger::init();

    let mut heap = SegregatedHeap::with_segregated_fits(1 << 20).unwrap();
    println!("Fresh heap over 1 MiB, segregated-fits table.");
    print_state("start", &heap);

    // --------------------------------------------------------------------
    // 1) Requests of very different sizes land in different buckets.
    // --------------------------------------------------------------------
    let small = heap.allocate(16).unwrap();
    let medium = heap.allocate(500).unwrap();
    let large = heap.allocate(20_000).unwrap();
    println!("\n[1] Allocated small={small:#x} medium={medium:#x} large={large:#x}");
    print_state("after three differently-sized allocations", &heap);

    // --------------------------------------------------------------------
    // 2) Free the large block, then request something that only the large
    //    block's bucket (or above) can satisfy.
    // --------------------------------------------------------------------
    heap.free(large);
    println!("\n[2] Freed large");
    print_state("after freeing large", &heap);

    let reused = heap.allocate(18_000).unwrap();
    println!("\n[3] Allocated reused={reused:#x}, reused large's slot? {}", reused == large);
    print_state("after reusing large's bucket", &heap);

    heap.free(small);
    heap.free(medium);
    heap.free(reused);
    println!("\n[4] Freed everything else");
    print_state("fully idle", &heap);

    heap.print_free_index();
}
