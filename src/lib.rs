//! `heapforge` — boundary-tag heap allocators over a caller-supplied byte
//! segment, with a choice of three free-block indexes sharing one block
//! layout and one coalescing protocol:
//!
//! - [`index::list`]: an address-ordered doubly-linked free list
//!   (first-fit), plus a size-ordered sibling of the same structure
//!   (best-fit).
//! - [`index::segregated`]: a 15-bucket segregated-fits table
//!   (approximate best-fit, O(1) insert/remove).
//! - [`index::splay`]: a top-down splay tree of free sizes with duplicate
//!   side-lists (true best-fit, amortized O(log n)).
//!
//! Construct a [`heap::Heap`] over whichever index fits — `ListHeap`,
//! `SegregatedHeap`, or `SplayHeap` — or build one from a runtime-chosen
//! [`config::HeapConfig`] via [`heap::build`]. All three speak the same
//! `allocate`/`reallocate`/`free` surface.
//!
//! ```
//! use heapforge::heap::ListHeap;
//!
//! let mut heap = ListHeap::with_address_order(4096).unwrap();
//! let p = heap.allocate(128).unwrap();
//! heap.free(p);
//! assert!(heap.validate_heap());
//! ```

pub mod align;
pub mod arena;
pub mod block;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod heap;
pub mod index;
pub mod split;
pub mod validate;

pub use config::{HeapConfig, IndexKind};
pub use error::{ArenaError, ValidationFault};
pub use heap::{AnyHeap, Heap, ListHeap, SegregatedHeap, SplayHeap};
