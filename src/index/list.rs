//! Doubly-linked free list, ordered either by address (first-fit, §4.6) or
//! by size (best-fit: a size-ascending list's first hit during a scan is the
//! smallest block that fits, i.e. a best fit).
//!
//! One struct backs both orderings — they differ only in the comparison
//! `insert` uses to find the splice point; everything else (removal,
//! scanning, validation shape) is identical, which is also true of the
//! distilled spec's two variants.

use crate::arena::Arena;
use crate::block::{self, BlockRef, NIL};
use crate::error::ValidationFault;
use crate::index::FreeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    ByAddress,
    BySize,
}

pub struct LinkedFreeList {
    order: Ordering,
    head: BlockRef,
    tail: BlockRef,
    count: u64,
    bytes: u64,
}

impl LinkedFreeList {
    pub fn new(order: Ordering) -> Self {
        Self { order, head: NIL, tail: NIL, count: 0, bytes: 0 }
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

    /// `true` if the walk should stop *before* `candidate`, i.e. `block`
    /// belongs immediately to candidate's left under this list's ordering.
    fn belongs_before(&self, arena: &Arena, candidate: BlockRef, block: BlockRef) -> bool {
        match self.order {
            Ordering::ByAddress => candidate > block,
            Ordering::BySize => {
                block::size_of(arena.header(candidate)) > block::size_of(arena.header(block))
            }
        }
    }
}

impl FreeIndex for LinkedFreeList {
    fn insert(&mut self, arena: &mut Arena, block: BlockRef) {
        let mut prev = NIL;
        let mut cur = self.head;
        while cur != NIL && !self.belongs_before(arena, cur, block) {
            prev = cur;
            cur = Self::next_of(arena, cur);
        }

        arena.set_links(block, cur, prev);

        if prev == NIL {
            self.head = block;
        } else {
            Self::set_next(arena, prev, block);
        }
        if cur == NIL {
            self.tail = block;
        } else {
            Self::set_prev(arena, cur, block);
        }

        self.count += 1;
        self.bytes += block::size_of(arena.header(block));
    }

    fn remove_specific(&mut self, arena: &mut Arena, block: BlockRef) {
        let (next, prev) = arena.links(block);

        if prev == NIL {
            self.head = next;
        } else {
            Self::set_next(arena, prev, next);
        }
        if next == NIL {
            self.tail = prev;
        } else {
            Self::set_prev(arena, next, prev);
        }

        self.count -= 1;
        self.bytes -= block::size_of(arena.header(block));
    }

    fn find_fit(&mut self, arena: &mut Arena, req: u64) -> Option<BlockRef> {
        let mut cur = self.head;
        while cur != NIL {
            let size = block::size_of(arena.header(cur));
            if size >= req {
                self.remove_specific(arena, cur);
                return Some(cur);
            }
            cur = Self::next_of(arena, cur);
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
        let mut out = Vec::with_capacity(self.count as usize);
        let mut cur = self.head;
        while cur != NIL {
            out.push(cur);
            cur = Self::next_of(arena, cur);
        }
        out
    }

    fn validate_structure(&self, arena: &Arena) -> Result<(), ValidationFault> {
        let nodes = self.walk(arena);

        if nodes.len() as u64 != self.count {
            return Err(ValidationFault::IndexStructure {
                reason: "free list length disagrees with tracked count",
            }
            .logged());
        }

        for pair in nodes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let ordered = match self.order {
                Ordering::ByAddress => a < b,
                Ordering::BySize => block::size_of(arena.header(a)) <= block::size_of(arena.header(b)),
            };
            if !ordered {
                return Err(ValidationFault::IndexStructure {
                    reason: "free list is not sorted under its declared ordering",
                }
                .logged());
            }
        }

        if self.order == Ordering::ByAddress {
            for pair in nodes.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if arena.right_neighbor(a) == b {
                    return Err(ValidationFault::AdjacentFreeBlocks { first: a, second: b }.logged());
                }
            }
        }

        match (self.head, self.tail, nodes.first(), nodes.last()) {
            (NIL, NIL, None, None) => {}
            (h, t, Some(&first), Some(&last)) if h == first && t == last => {}
            _ => {
                return Err(ValidationFault::IndexStructure {
                    reason: "head/tail do not match the ends of the walked list",
                }
                .logged());
            }
        }

        Ok(())
    }

    fn dump(&self, arena: &Arena) {
        log::debug!("free list ({:?}), {} blocks, {} bytes:", self.order, self.count, self.bytes);
        for block in self.walk(arena) {
            log::debug!("  block {:#x} size {}", block, block::size_of(arena.header(block)));
        }
    }
}
