//! Construction-time configuration.
//!
//! This crate has no persisted state and nothing to read from the
//! environment (SPEC_FULL.md §6), but the one knob a caller does choose —
//! how big the arena is and which free index backs it — is still a typed
//! value rather than a bag of positional constructor arguments.

/// Minimum block size a free block must satisfy for the chosen index to host
/// its link record (header + footer + link words).
pub const MIN_BLOCK_SIZE_LIST: u64 = 32;
pub const MIN_BLOCK_SIZE_TREE: u64 = 40;

/// Upper bound on a single `allocate`/`reallocate` request, in payload bytes.
/// Implementation-defined per SPEC_FULL.md §6: far above anything a real
/// arena could back, but safely below the header's reserved low bits.
pub const MAX_REQUEST: u64 = 1 << 40;

/// Which free-index structure a [`crate::heap::Heap`] is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// First-fit over an address-ordered doubly-linked list.
    AddressOrderedList,
    /// Best-fit over a size-ordered doubly-linked list.
    SizeOrderedList,
    /// Approximate best-fit over a 15-bucket segregated-fits table.
    SegregatedFits,
    /// True best-fit over a top-down splay tree with duplicate side-lists.
    SplayTree,
}

impl IndexKind {
    /// Minimum block size this index can host.
    pub const fn min_block_size(self) -> u64 {
        match self {
            IndexKind::SplayTree => MIN_BLOCK_SIZE_TREE,
            _ => MIN_BLOCK_SIZE_LIST,
        }
    }
}

/// Construction-time parameters for a [`crate::heap::Heap`].
#[derive(Debug, Clone, Copy)]
pub struct HeapConfig {
    /// Total byte capacity of the backing arena, before rounding.
    pub capacity: u64,
    /// Which free index to build the heap over.
    pub index: IndexKind,
}

impl HeapConfig {
    pub const fn new(capacity: u64, index: IndexKind) -> Self {
        Self { capacity, index }
    }
}
