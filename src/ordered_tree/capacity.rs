use super::OrderedTree;
use crate::raw::RawOrderedTree;

impl<K, V> OrderedTree<K, V> {
    /// Creates an empty tree with node storage for at least `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree: OrderedTree<i32, i32> = OrderedTree::with_capacity(32);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedTree {
            raw: RawOrderedTree::with_capacity(capacity),
        }
    }

    /// Returns the number of entries the tree can hold without reallocating.
    ///
    /// Slots freed by removals are reused before the storage grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
