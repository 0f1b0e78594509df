//! An ordered symbol table on a size-augmented binary search tree.
//!
//! [`OrderedTree`] maps keys to values and answers order queries on top of the
//! usual point operations:
//!
//! - [`rank`](OrderedTree::rank) - how many keys are smaller than a given key
//! - [`select`](OrderedTree::select) - the key at a given sorted position
//! - [`floor`](OrderedTree::floor) / [`ceiling`](OrderedTree::ceiling) - the nearest key below / above
//! - [`keys_in`](OrderedTree::keys_in) / [`count_in`](OrderedTree::count_in) - inclusive key ranges
//! - [`balance`](OrderedTree::balance) - rebuild into minimum height in one pass
//!
//! # Example
//!
//! ```
//! use size_bst::{OrderedTree, Rank};
//!
//! let mut scores = OrderedTree::new();
//! scores.insert("Carol", 92);
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//!
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.select(1), Some(&"Bob"));
//! assert_eq!(scores.rank(&"Carol"), 2);
//! assert_eq!(scores[Rank(0)], 100);
//! ```
//!
//! # Implementation
//!
//! Nodes live in an index arena and point at their children by handle. Every
//! node caches the size of its subtree, which every insertion and removal
//! repairs along the path it walked. Nothing rebalances the tree
//! automatically: its shape follows insertion order until
//! [`balance`](OrderedTree::balance) is called.
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **`serde`** - Serializes as a map in key order

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod ordered_tree;

pub use error::InvariantViolation;
pub use order_statistic::Rank;
pub use ordered_tree::OrderedTree;
