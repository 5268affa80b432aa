//! Alignment helpers.
//!
//! The engine only ever aligns to the 8-byte quantum (§3 invariants), but the
//! rounding primitive is kept generic over any power-of-two multiple so the
//! index modules can reuse it for their own bucket-boundary arithmetic.

/// The allocator's alignment quantum. Every block size is a multiple of this.
pub const QUANTUM: u64 = 8;

/// Rounds `value` up to the next multiple of `multiple`, which must be a
/// power of two.
///
/// ```
/// use heapforge::align::round_up;
/// assert_eq!(round_up(13, 8), 16);
/// assert_eq!(round_up(16, 8), 16);
/// assert_eq!(round_up(0, 8), 0);
/// ```
pub const fn round_up(value: u64, multiple: u64) -> u64 {
    (value + multiple - 1) & !(multiple - 1)
}

/// Rounds `value` down to the previous multiple of `multiple`, which must be
/// a power of two. Used once, at arena construction, to trim a caller's
/// requested capacity to the quantum (SPEC_FULL.md §4.2 step 1).
pub const fn round_down(value: u64, multiple: u64) -> u64 {
    value & !(multiple - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_quantum() {
        for i in 0u64..40 {
            let expected = if i % QUANTUM == 0 {
                i
            } else {
                i + (QUANTUM - i % QUANTUM)
            };
            assert_eq!(round_up(i, QUANTUM), expected, "i = {i}");
        }
    }

    #[test]
    fn rounds_up_to_power_of_two_buckets() {
        assert_eq!(round_up(1, 64), 64);
        assert_eq!(round_up(64, 64), 64);
        assert_eq!(round_up(65, 64), 128);
    }

    #[test]
    fn rounds_down_to_quantum() {
        assert_eq!(round_down(15, QUANTUM), 8);
        assert_eq!(round_down(16, QUANTUM), 16);
        assert_eq!(round_down(7, QUANTUM), 0);
    }
}
