use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use super::OrderedTree;
use crate::Rank;

impl<K, V> OrderedTree<K, V> {
    /// Returns the key at position `rank` in sorted order.
    ///
    /// The rank is zero-based. Returns `None` if `rank >= len()`.
    ///
    /// # Complexity
    ///
    /// O(height)
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([("c", 3), ("a", 1), ("b", 2)]);
    /// assert_eq!(tree.select(1), Some(&"b"));
    /// assert_eq!(tree.select(3), None);
    /// ```
    #[must_use]
    pub fn select(&self, rank: usize) -> Option<&K> {
        self.select_entry(rank).map(|(key, _)| key)
    }

    /// Returns the key-value pair at position `rank` in sorted order.
    #[must_use]
    pub fn select_entry(&self, rank: usize) -> Option<(&K, &V)> {
        self.raw.select(rank).map(|handle| self.entry(handle))
    }

    /// Returns the key and a mutable reference to the value at position `rank`.
    ///
    /// The key stays shared because changing it could break the ordering.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(10, "a"), (5, "b")]);
    /// if let Some((key, value)) = tree.select_entry_mut(0) {
    ///     assert_eq!(*key, 5);
    ///     *value = "updated";
    /// }
    /// assert_eq!(tree.get(&5), Some(&"updated"));
    /// ```
    #[must_use]
    pub fn select_entry_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let handle = self.raw.select(rank)?;
        Some(self.raw.node_mut(handle).entry_mut())
    }
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Returns the number of keys strictly less than `key`.
    ///
    /// `key` does not need to be present; for a present key this is its
    /// zero-based position, so `rank(select(k)) == k`.
    ///
    /// # Complexity
    ///
    /// O(height)
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(tree.rank(&20), 1);
    /// assert_eq!(tree.rank(&25), 2);
    /// assert_eq!(tree.rank(&5), 0);
    /// ```
    #[must_use]
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank(key)
    }

    /// Returns the number of keys in `[lo, hi]`, or zero when `hi < lo`.
    ///
    /// Computed from two ranks, without visiting the keys in between.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(1, ()), (3, ()), (5, ()), (7, ())]);
    /// assert_eq!(tree.count_in(&3, &7), 3);
    /// assert_eq!(tree.count_in(&2, &6), 2);
    /// assert_eq!(tree.count_in(&7, &3), 0);
    /// ```
    #[must_use]
    pub fn count_in<Q>(&self, lo: &Q, hi: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.count_in(lo, hi)
    }
}

/// Indexes into the tree by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use size_bst::{OrderedTree, Rank};
///
/// let tree = OrderedTree::from([("a", 1), ("b", 2)]);
/// assert_eq!(tree[Rank(1)], 2);
/// ```
impl<K, V> Index<Rank> for OrderedTree<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &V {
        self.select_entry(rank.0).map(|(_, value)| value).expect("rank out of bounds")
    }
}

/// Mutably indexes into the tree by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use size_bst::{OrderedTree, Rank};
///
/// let mut tree = OrderedTree::from([("a", 1), ("b", 2)]);
/// tree[Rank(1)] = 5;
/// assert_eq!(tree.get(&"b"), Some(&5));
/// ```
impl<K, V> IndexMut<Rank> for OrderedTree<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut V {
        self.select_entry_mut(rank.0).map(|(_, value)| value).expect("rank out of bounds")
    }
}
