use alloc::collections::VecDeque;
use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Bound, Index, RangeBounds};

use crate::error::InvariantViolation;
use crate::raw::{Handle, RawOrderedTree, Stack};

mod capacity;
mod order_statistic;

pub use crate::Rank;

/// Validates that the start bound does not exceed the end bound.
///
/// # Panics
///
/// Panics if `start > end` or if `start == end` and both bounds are `Excluded`.
fn validate_range_bounds<T, R>(range: &R)
where
    T: ?Sized + Ord,
    R: RangeBounds<T>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let valid =
            if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                start < end
            } else {
                start <= end
            };
        assert!(valid, "range start is greater than range end in OrderedTree");
    }
}

/// An ordered symbol table backed by an unbalanced binary search tree.
///
/// Every node caches the size of its subtree, which makes rank and select
/// queries O(height). The tree never restructures itself while it is mutated:
/// insertion order determines its shape, and sorted input degrades it to a
/// list. Call [`balance`](OrderedTree::balance) to rebuild it into
/// minimum height in one O(n) pass.
///
/// Keys must implement [`Ord`]. It is a logic error for a key to be modified
/// in a way that changes its ordering relative to other keys while it is in
/// the tree.
///
/// # Examples
///
/// ```
/// use size_bst::OrderedTree;
///
/// let mut tree = OrderedTree::new();
/// tree.insert(10, "TEN");
/// tree.insert(3, "THREE");
/// tree.insert(1, "ONE");
/// tree.insert(5, "FIVE");
/// tree.insert(2, "TWO");
/// tree.insert(7, "SEVEN");
///
/// assert_eq!(tree.len(), 6);
/// assert_eq!(tree.min_key(), Some(&1));
/// assert_eq!(tree.max_key(), Some(&10));
/// assert_eq!(tree.rank(&7), 4);
/// assert_eq!(tree.select(0), Some(&1));
/// assert_eq!(tree.floor(&6), Some(&5));
/// assert_eq!(tree.ceiling(&6), Some(&7));
/// assert!(tree.keys().copied().eq([1, 2, 3, 5, 7, 10]));
///
/// tree.remove(&3);
/// assert!(!tree.contains_key(&3));
/// assert!(tree.keys().copied().eq([1, 2, 5, 7, 10]));
///
/// // Insertion order left the tree four levels deep.
/// assert_eq!(tree.height(), 4);
/// tree.balance();
/// assert_eq!(tree.height(), 3);
/// ```
pub struct OrderedTree<K, V> {
    raw: RawOrderedTree<K, V>,
}

/// An iterator over the entries of an `OrderedTree`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`OrderedTree`].
///
/// [`iter`]: OrderedTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawOrderedTree<K, V>,
    stack: Stack,
    remaining: usize,
}

/// An iterator over the keys of an `OrderedTree`, in ascending order.
///
/// This `struct` is created by the [`keys`] and [`keys_in`] methods on
/// [`OrderedTree`]. A clone is an independent cursor at the same position.
///
/// # Examples
///
/// ```
/// use size_bst::OrderedTree;
///
/// let tree = OrderedTree::from([(2, "b"), (1, "a"), (3, "c")]);
/// let keys: Vec<_> = tree.keys_in(&2, &9).copied().collect();
/// assert_eq!(keys, [2, 3]);
/// ```
///
/// [`keys`]: OrderedTree::keys
/// [`keys_in`]: OrderedTree::keys_in
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `OrderedTree`, in key order.
///
/// This `struct` is created by the [`values`] method on [`OrderedTree`].
///
/// [`values`]: OrderedTree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over a sub-range of entries in an `OrderedTree`.
///
/// This `struct` is created by the [`range`] method on [`OrderedTree`].
///
/// [`range`]: OrderedTree::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A breadth-first iterator over the keys of an `OrderedTree` or one of its
/// subtrees.
///
/// This `struct` is created by the [`level_order`] and
/// [`subtree_level_order`] methods on [`OrderedTree`].
///
/// [`level_order`]: OrderedTree::level_order
/// [`subtree_level_order`]: OrderedTree::subtree_level_order
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LevelOrder<'a, K, V> {
    tree: &'a RawOrderedTree<K, V>,
    queue: VecDeque<Handle>,
}

impl<K, V> OrderedTree<K, V> {
    /// Makes a new, empty `OrderedTree`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> OrderedTree<K, V> {
        OrderedTree {
            raw: RawOrderedTree::new(),
        }
    }

    /// Returns the number of entries in the tree.
    ///
    /// This reads the root's cached subtree size.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1, "a");
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the tree, removing all entries.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let (first_key, first_value) = tree.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::spanning(&self.raw, 0, self.raw.len())
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    ///
    /// An empty tree yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(2, "b"), (1, "a")]);
    /// let keys: Vec<_> = tree.keys().copied().collect();
    /// assert_eq!(keys, [1, 2]);
    ///
    /// let empty: OrderedTree<i32, &str> = OrderedTree::new();
    /// assert_eq!(empty.keys().next(), None);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns the first entry in the tree, the one with the minimum key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.entry(handle))
    }

    /// Returns the last entry in the tree, the one with the maximum key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.entry(handle))
    }

    /// Returns the smallest key, or `None` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.min_key(), None);
    /// tree.insert(5, ());
    /// tree.insert(2, ());
    /// assert_eq!(tree.min_key(), Some(&2));
    /// ```
    #[must_use]
    pub fn min_key(&self) -> Option<&K> {
        self.first_key_value().map(|(key, _)| key)
    }

    /// Returns the largest key, or `None` if the tree is empty.
    #[must_use]
    pub fn max_key(&self) -> Option<&K> {
        self.last_key_value().map(|(key, _)| key)
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// The removed node's right subtree takes its place. Returns `None` if the
    /// tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(2, "b"), (1, "a")]);
    /// assert_eq!(tree.remove_min(), Some((1, "a")));
    /// assert_eq!(tree.remove_min(), Some((2, "b")));
    /// assert_eq!(tree.remove_min(), None);
    /// ```
    pub fn remove_min(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the entry with the largest key.
    ///
    /// The removed node's left subtree takes its place. Returns `None` if the
    /// tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(2, "b"), (1, "a")]);
    /// assert_eq!(tree.remove_max(), Some((2, "b")));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn remove_max(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    ///
    /// An empty tree has height 0.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Rebuilds the tree into minimum height.
    ///
    /// Nodes are collected in key order and relinked around the median of each
    /// run, taking the upper median when a run has even length. Keys, values
    /// and their order are unchanged; afterwards `height()` is
    /// `⌈log2(len + 1)⌉`.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree: OrderedTree<u32, ()> = (0..7).map(|key| (key, ())).collect();
    /// assert_eq!(tree.height(), 7);
    ///
    /// tree.balance();
    /// assert_eq!(tree.height(), 3);
    /// assert!(tree.level_order().copied().eq([3, 1, 5, 0, 2, 4, 6]));
    /// ```
    pub fn balance(&mut self) {
        self.raw.balance();
    }

    /// Gets an iterator over all keys in breadth-first order, root first.
    ///
    /// Within a level keys come left to right. An empty tree yields nothing.
    pub fn level_order(&self) -> LevelOrder<'_, K, V> {
        LevelOrder::from_root(&self.raw, self.raw.root())
    }

    fn entry(&self, handle: Handle) -> (&K, &V) {
        let node = self.raw.node(handle);
        (node.key(), node.value())
    }
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.get(&1), Some(&"a"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.entry(handle))
    }

    /// Returns `true` if the tree contains a value for the specified key.
    ///
    /// An empty tree contains nothing.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the key was absent, a new leaf is attached where the search ended and
    /// `None` is returned. Otherwise the value is replaced and the old one
    /// returned; the key itself is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new();
    /// assert_eq!(tree.insert(37, "a"), None);
    /// assert_eq!(tree.insert(37, "b"), Some("a"));
    /// assert_eq!(tree[&37], "b");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the tree, returning its value if it was present.
    ///
    /// A node with two children is replaced by the smallest node of its right
    /// subtree (Hibbard deletion).
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from([(1, "a")]);
    /// assert_eq!(tree.remove(&1), Some("a"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the tree, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Returns the greatest key less than or equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(1, ()), (5, ()), (9, ())]);
    /// assert_eq!(tree.floor(&6), Some(&5));
    /// assert_eq!(tree.floor(&5), Some(&5));
    /// assert_eq!(tree.floor(&0), None);
    /// ```
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.floor(key).map(|handle| self.raw.node(handle).key())
    }

    /// Returns the least key greater than or equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(1, ()), (5, ()), (9, ())]);
    /// assert_eq!(tree.ceiling(&6), Some(&9));
    /// assert_eq!(tree.ceiling(&10), None);
    /// ```
    pub fn ceiling<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.ceiling(key).map(|handle| self.raw.node(handle).key())
    }

    /// Gets an iterator over the keys in `[lo, hi]`, in sorted order.
    ///
    /// Yields nothing when `hi < lo`.
    pub fn keys_in<Q>(&self, lo: &Q, hi: &Q) -> Keys<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (start, end) = if hi < lo {
            (0, 0)
        } else {
            self.raw.rank_span::<Q, _>(&(Bound::Included(lo), Bound::Included(hi)))
        };
        Keys {
            inner: Iter::spanning(&self.raw, start, end),
        }
    }

    /// Constructs a double-bounded iterator over a sub-range of entries.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds are
    /// `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(3, "a"), (5, "b"), (8, "c")]);
    /// let inside: Vec<_> = tree.range(4..).map(|(key, _)| *key).collect();
    /// assert_eq!(inside, [5, 8]);
    /// ```
    pub fn range<T, R>(&self, range: R) -> Range<'_, K, V>
    where
        T: ?Sized + Ord,
        K: Borrow<T>,
        R: RangeBounds<T>,
    {
        validate_range_bounds(&range);
        let (start, end) = self.raw.rank_span::<T, R>(&range);
        Range {
            inner: Iter::spanning(&self.raw, start, end),
        }
    }

    /// Gets a breadth-first iterator over the subtree rooted at `key`.
    ///
    /// Returns `None` if `key` is not in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use size_bst::OrderedTree;
    ///
    /// let tree = OrderedTree::from([(10, ()), (3, ()), (1, ()), (5, ()), (2, ()), (7, ())]);
    /// assert!(tree.subtree_level_order(&3).unwrap().copied().eq([3, 1, 5, 2, 7]));
    /// assert!(tree.subtree_level_order(&4).is_none());
    /// ```
    pub fn subtree_level_order<Q>(&self, key: &Q) -> Option<LevelOrder<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let root = self.raw.search(key)?;
        Some(LevelOrder::from_root(&self.raw, Some(root)))
    }

    /// Checks that every cached subtree size matches the node's children and
    /// that keys are strictly ascending in order.
    ///
    /// The public API maintains both invariants, so this returns `Ok(())`
    /// for any tree built through it.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found in key order.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.raw.check_invariants()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedTree<K, V> {
    fn clone(&self) -> Self {
        OrderedTree { raw: self.raw.clone() }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedTree<K, V> {
    fn eq(&self, other: &OrderedTree<K, V>) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for OrderedTree<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        OrderedTree::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = OrderedTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, Q, V> Index<&Q> for OrderedTree<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the tree.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedTree<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Iterates the entries whose ranks fall in `start..end`.
    fn spanning(tree: &'a RawOrderedTree<K, V>, start: usize, end: usize) -> Self {
        let remaining = end.saturating_sub(start);
        let stack = if remaining == 0 { Stack::new() } else { tree.seek(start) };
        Iter { tree, stack, remaining }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.tree.advance(&mut self.stack)?;
        self.remaining -= 1;
        let node = self.tree.node(handle);
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Range<'_, K, V> {}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> LevelOrder<'a, K, V> {
    fn from_root(tree: &'a RawOrderedTree<K, V>, root: Option<Handle>) -> Self {
        LevelOrder {
            tree,
            queue: root.into_iter().collect(),
        }
    }
}

impl<'a, K, V> Iterator for LevelOrder<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let handle = self.queue.pop_front()?;
        let node = self.tree.node(handle);
        self.queue.extend(node.left());
        self.queue.extend(node.right());
        Some(node.key())
    }
}

impl<K, V> FusedIterator for LevelOrder<'_, K, V> {}

impl<K, V> Clone for LevelOrder<'_, K, V> {
    fn clone(&self) -> Self {
        LevelOrder {
            tree: self.tree,
            queue: self.queue.clone(),
        }
    }
}

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for OrderedTree<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedTreeVisitor<K, V> {
    marker: core::marker::PhantomData<fn() -> OrderedTree<K, V>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for OrderedTreeVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    type Value = OrderedTree<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut entries = alloc::vec::Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
        while let Some(entry) = access.next_entry()? {
            entries.push(entry);
        }
        Ok(OrderedTree {
            raw: RawOrderedTree::from_entries(entries),
        })
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for OrderedTree<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedTreeVisitor {
            marker: core::marker::PhantomData,
        })
    }
}
