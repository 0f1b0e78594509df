mod arena;
mod handle;
mod node;
mod raw_ordered_tree;
mod size;

pub(crate) use handle::Handle;
pub(crate) use raw_ordered_tree::{RawOrderedTree, Stack};
