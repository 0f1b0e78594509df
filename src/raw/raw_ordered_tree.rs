use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;
use core::ops::{Bound, RangeBounds};

use smallvec::SmallVec;
use tracing::{Level, debug, enabled, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use super::size::Size;
use crate::error::InvariantViolation;

/// The unbalanced, size-augmented binary search tree backing `OrderedTree`.
#[derive(Clone)]
pub(crate) struct RawOrderedTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

/// One step of a descent: the node visited and the child link taken from it.
#[derive(Clone, Copy)]
struct PathElement {
    node: Handle,
    side: Side,
}

/// Ancestors of the node a mutation works on, root first.
type Path = SmallVec<[PathElement; 32]>;

/// Pending nodes of an in-order walk; the top is the next node to yield.
pub(crate) type Stack = SmallVec<[Handle; 32]>;

impl<K, V> RawOrderedTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of key-value pairs, read from the root's cached size.
    pub(crate) fn len(&self) -> usize {
        self.size_of(self.root)
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        trace!(len = self.len(), "clearing tree");
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Returns a mutable reference to a node by handle.
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Size of the subtree behind a child link; an empty link holds nothing.
    #[inline]
    fn size_of(&self, link: Option<Handle>) -> usize {
        link.map_or(0, |handle| self.nodes.get(handle).size().to_usize())
    }

    /// Recomputes a node's size from its children's cached sizes.
    fn update_size(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let size = Size::joining(self.size_of(node.left()), self.size_of(node.right()));
        self.nodes.get_mut(handle).set_size(size);
    }

    /// Restores the size invariant on every ancestor, deepest first.
    fn update_sizes_along_path(&mut self, path: &Path) {
        for element in path.iter().rev() {
            self.update_size(element.node);
        }
    }

    /// Points the parent's link (or the root) at `child`.
    fn link(&mut self, parent: Option<PathElement>, child: Option<Handle>) {
        match parent {
            Some(parent) => self.nodes.get_mut(parent.node).set_child(parent.side, child),
            None => self.root = child,
        }
    }

    /// Follows `side` links from `from` to the end of the spine.
    fn extreme(&self, from: Handle, side: Side) -> Handle {
        let mut current = from;
        while let Some(next) = self.nodes.get(current).child(side) {
            current = next;
        }
        current
    }

    /// Handle of the smallest key.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Left))
    }

    /// Handle of the largest key.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Right))
    }

    /// Unlinks the outermost node on the `side` spine of `subtree`.
    ///
    /// Returns the detached node and the handle that now roots what is left of
    /// the subtree. The detached node keeps its stale links; callers either
    /// relink it or free it.
    fn detach_extreme(&mut self, subtree: Handle, side: Side) -> (Handle, Option<Handle>) {
        let mut path = Path::new();
        let mut current = subtree;
        while let Some(next) = self.nodes.get(current).child(side) {
            path.push(PathElement { node: current, side });
            current = next;
        }

        let remainder = self.nodes.get(current).child(side.opposite());
        let Some(parent) = path.last().copied() else {
            return (current, remainder);
        };

        self.link(Some(parent), remainder);
        self.update_sizes_along_path(&path);
        (current, Some(subtree))
    }

    fn pop_extreme(&mut self, side: Side) -> Option<(K, V)> {
        let root = self.root?;
        let (extreme, rest) = self.detach_extreme(root, side);
        self.root = rest;
        Some(self.nodes.take(extreme).into_entry())
    }

    /// Removes and returns the entry with the smallest key.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        self.pop_extreme(Side::Left)
    }

    /// Removes and returns the entry with the largest key.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        self.pop_extreme(Side::Right)
    }

    /// Returns the handle at zero-based position `rank` in key order.
    ///
    /// The left subtree's size says how many keys precede the current node, so
    /// every step either stops or discards one whole side.
    pub(crate) fn select(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }

        let mut current = self.root;
        let mut remaining = rank;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let preceding = self.size_of(node.left());
            match remaining.cmp(&preceding) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    remaining -= preceding + 1;
                    current = node.right();
                }
                Ordering::Equal => return Some(handle),
            }
        }

        debug_assert!(false, "select: size invariant violated - rank {rank} not found");
        None
    }

    /// Pushes `from` and its whole left spine.
    pub(crate) fn descend_left(&self, from: Option<Handle>, stack: &mut Stack) {
        let mut current = from;
        while let Some(handle) = current {
            stack.push(handle);
            current = self.nodes.get(handle).left();
        }
    }

    /// Builds the in-order stack positioned at `rank`, so the first call to
    /// [`advance`](Self::advance) yields the node of that rank.
    pub(crate) fn seek(&self, rank: usize) -> Stack {
        let mut stack = Stack::new();
        let mut current = self.root;
        let mut remaining = rank;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let preceding = self.size_of(node.left());
            match remaining.cmp(&preceding) {
                Ordering::Less => {
                    stack.push(handle);
                    current = node.left();
                }
                Ordering::Greater => {
                    remaining -= preceding + 1;
                    current = node.right();
                }
                Ordering::Equal => {
                    stack.push(handle);
                    break;
                }
            }
        }
        stack
    }

    /// Pops the next node in key order and queues its in-order successors.
    pub(crate) fn advance(&self, stack: &mut Stack) -> Option<Handle> {
        let handle = stack.pop()?;
        self.descend_left(self.nodes.get(handle).right(), stack);
        Some(handle)
    }

    /// Every node handle in ascending key order.
    fn in_order(&self) -> Vec<Handle> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = Stack::new();
        self.descend_left(self.root, &mut stack);
        while let Some(handle) = self.advance(&mut stack) {
            order.push(handle);
        }
        order
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut deepest = 0;
        let mut pending: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        if let Some(root) = self.root {
            pending.push((root, 1));
        }

        while let Some((handle, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            let node = self.nodes.get(handle);
            for child in [node.left(), node.right()].into_iter().flatten() {
                pending.push((child, depth + 1));
            }
        }
        deepest
    }

    /// Rebuilds the tree into minimum height from its sorted node sequence.
    ///
    /// Nodes are reused in place: only child links change, then every size is
    /// counted again from scratch.
    pub(crate) fn balance(&mut self) {
        let order = self.in_order();
        let height_before = enabled!(Level::DEBUG).then(|| self.height());

        self.root = self.build(&order);
        if let Some(root) = self.root {
            self.recount(root);
        }

        if let Some(height_before) = height_before {
            debug!(
                len = order.len(),
                height_before,
                height_after = self.height(),
                "rebuilt tree into minimum-height shape"
            );
        }
    }

    /// Links `order` into a subtree rooted at its upper median.
    ///
    /// For an even-length run the right-hand middle element becomes the root,
    /// which makes every rebuild of the same key set produce the same shape.
    fn build(&mut self, order: &[Handle]) -> Option<Handle> {
        if order.is_empty() {
            return None;
        }

        let mid = order.len() / 2;
        let root = order[mid];
        let left = self.build(&order[..mid]);
        let right = self.build(&order[mid + 1..]);
        self.nodes.get_mut(root).set_children(left, right);
        Some(root)
    }

    /// Recounts the subtree at `handle` without trusting any cached size.
    fn recount(&mut self, handle: Handle) -> usize {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());
        let left = left.map_or(0, |child| self.recount(child));
        let right = right.map_or(0, |child| self.recount(child));

        let size = Size::joining(left, right);
        self.nodes.get_mut(handle).set_size(size);
        size.to_usize()
    }
}

impl<K: Ord, V> RawOrderedTree<K, V> {
    /// Builds a minimum-height tree from entries in any order.
    ///
    /// Entries are sorted stably, so the last value given for a key wins, then
    /// linked around upper medians exactly like [`balance`](Self::balance).
    #[cfg_attr(not(feature = "serde"), allow(dead_code))]
    pub(crate) fn from_entries(mut entries: Vec<(K, V)>) -> Self {
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut tree = Self::with_capacity(entries.len());
        let mut order: Vec<Handle> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if let Some(&last) = order.last() {
                let node = tree.nodes.get_mut(last);
                if *node.key() == key {
                    *node.value_mut() = value;
                    continue;
                }
            }
            order.push(tree.nodes.alloc(Node::leaf(key, value)));
        }

        tree.root = tree.build(&order);
        if let Some(root) = tree.root {
            tree.recount(root);
        }
        tree
    }

    /// Searches for a key and returns its node handle if found.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Like [`search`](Self::search), recording every ancestor passed through.
    ///
    /// On a miss the last path element names the empty link where `key` belongs.
    fn search_with_path<Q>(&self, key: &Q, path: &mut Path) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let side = match key.cmp(node.key().borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(handle),
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        }
        None
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|handle| self.nodes.get(handle).value())
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut())
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Inserts a key-value pair, returning the previous value if the key was present.
    ///
    /// A new key becomes a leaf at the empty link where the search ended, and
    /// every ancestor's size is recomputed on the way back up.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut path = Path::new();
        if let Some(existing) = self.search_with_path(&key, &mut path) {
            return Some(mem::replace(self.nodes.get_mut(existing).value_mut(), value));
        }

        let leaf = self.nodes.alloc(Node::leaf(key, value));
        self.link(path.last().copied(), Some(leaf));
        self.update_sizes_along_path(&path);
        None
    }

    /// Removes a key using Hibbard deletion and returns its entry.
    ///
    /// A node with two children is replaced by the minimum of its right
    /// subtree, which is unlinked from that subtree first.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let target = self.search_with_path(key, &mut path)?;

        let node = self.nodes.get(target);
        let replacement = match (node.left(), node.right()) {
            (left, None) => left,
            (None, right) => right,
            (Some(left), Some(right)) => {
                let (successor, rest) = self.detach_extreme(right, Side::Left);
                self.nodes.get_mut(successor).set_children(Some(left), rest);
                self.update_size(successor);
                Some(successor)
            }
        };

        self.link(path.last().copied(), replacement);
        self.update_sizes_along_path(&path);
        Some(self.nodes.take(target).into_entry())
    }

    /// Number of keys strictly less than `key`.
    pub(crate) fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut rank = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    rank += self.size_of(node.left()) + 1;
                    current = node.right();
                }
                Ordering::Equal => return rank + self.size_of(node.left()),
            }
        }
        rank
    }

    /// Handle of the greatest key less than or equal to `key`.
    pub(crate) fn floor<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    // Anything better lies in the right subtree.
                    best = Some(handle);
                    current = node.right();
                }
            }
        }
        best
    }

    /// Handle of the least key greater than or equal to `key`.
    pub(crate) fn ceiling<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => {
                    // Every node below here is smaller than the current bound.
                    best = Some(handle);
                    current = node.left();
                }
                Ordering::Greater => current = node.right(),
            }
        }
        best
    }

    /// Number of keys in `[lo, hi]`; zero when `hi < lo`.
    pub(crate) fn count_in<Q>(&self, lo: &Q, hi: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if hi < lo {
            return 0;
        }
        self.rank(hi) - self.rank(lo) + usize::from(self.contains_key(hi))
    }

    /// Converts key bounds into the half-open rank interval they cover.
    pub(crate) fn rank_span<Q, R>(&self, range: &R) -> (usize, usize)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        let start = match range.start_bound() {
            Bound::Included(lo) => self.rank(lo),
            Bound::Excluded(lo) => self.rank(lo) + usize::from(self.contains_key(lo)),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(hi) => self.rank(hi) + usize::from(self.contains_key(hi)),
            Bound::Excluded(hi) => self.rank(hi),
            Bound::Unbounded => self.len(),
        };
        (start, end.max(start))
    }

    /// Verifies the size and ordering invariants of every node.
    ///
    /// Each node is checked against its children's cached sizes; since leaves
    /// anchor the recurrence, passing everywhere means every cached size is exact.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut stack = Stack::new();
        self.descend_left(self.root, &mut stack);

        let mut previous: Option<&K> = None;
        let mut position = 0;
        while let Some(handle) = self.advance(&mut stack) {
            let node = self.nodes.get(handle);
            let cached = node.size().to_usize();
            let expected = self.size_of(node.left()) + self.size_of(node.right()) + 1;
            if cached != expected {
                return Err(InvariantViolation::SizeMismatch {
                    position,
                    cached,
                    expected,
                });
            }
            if previous.is_some_and(|previous| previous >= node.key()) {
                return Err(InvariantViolation::OutOfOrder { position });
            }

            previous = Some(node.key());
            position += 1;
        }

        if position != self.nodes.len() {
            return Err(InvariantViolation::OrphanedNodes {
                reachable: position,
                allocated: self.nodes.len(),
            });
        }
        Ok(())
    }
}
