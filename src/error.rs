use thiserror::Error as ThisError;

/// A broken structural invariant reported by
/// [`OrderedTree::check_invariants`](crate::OrderedTree::check_invariants).
///
/// Positions are zero-based offsets in key order. None of these can arise
/// through the public API; seeing one means the tree was corrupted.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum InvariantViolation {
    #[error("node at position {position} caches size {cached}, but its children account for {expected}")]
    SizeMismatch { position: usize, cached: usize, expected: usize },

    #[error("key at position {position} is not greater than its predecessor")]
    OutOfOrder { position: usize },

    #[error("{reachable} nodes are reachable from the root, but {allocated} are allocated")]
    OrphanedNodes { reachable: usize, allocated: usize },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_position() {
        let mismatch = InvariantViolation::SizeMismatch {
            position: 4,
            cached: 9,
            expected: 3,
        };
        assert_eq!(
            mismatch.to_string(),
            "node at position 4 caches size 9, but its children account for 3"
        );
        assert_eq!(
            InvariantViolation::OutOfOrder { position: 2 }.to_string(),
            "key at position 2 is not greater than its predecessor"
        );
    }
}
