/// A zero-based position in the key order of an [`OrderedTree`](crate::OrderedTree).
///
/// Used to index a tree by rank instead of by key.
///
/// # Examples
///
/// ```
/// use size_bst::{OrderedTree, Rank};
///
/// let mut tree = OrderedTree::new();
/// tree.insert("b", 20);
/// tree.insert("a", 10);
///
/// assert_eq!(tree[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
