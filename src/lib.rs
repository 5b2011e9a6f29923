//! This crate exposes two node-linked binary trees over any ordered value type: a Binary Search
//! Tree and a binary max-heap.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored values. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a value and
//! will sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). [`Tree`] never rebalances by itself but
//! [`Tree::balance`] rebuilds it with height `O(lg N)`. BSTs also naturally support sorted
//! iteration by visiting the left subtree, then the subtree root, then the right subtree.
//!
//! ## Heap
//!
//! [`Heap`] keeps the largest value at its root: every `Node` is larger than its children. It is
//! also always *complete*, every level is full except the last, which fills left to right. This
//! keeps its height at `O(lg N)` without any rebalancing.
//!
//! ## Text
//!
//! Both containers print as `[v1,v2,...]` and parse back from it. [`Format`] picks one of the six
//! [`Traversal`] orders (optionally bracketing every value by its position), and `to_pairs`
//! writes a `[(child:parent),...]` list that `from_pairs` rebuilds node for node.
//!
//! ```
//! use bintree::{Heap, Tree};
//!
//! let tree: Tree<i32> = "[10,20,5,15,25,30]".parse().unwrap();
//! assert_eq!(tree.to_string(), "[5,10,15,20,25,30]");
//!
//! let heap: Heap<i32> = "[10,20,5,15]".parse().unwrap();
//! assert_eq!(heap.to_string(), "[20,15,5,10]");
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod codec;
mod error;
pub mod heap;
mod node;
pub mod traversal;
pub mod tree;

pub use codec::Format;
pub use error::Error;
pub use heap::Heap;
pub use node::Side;
pub use traversal::{LevelOrder, Role, Traversal, Traverse};
pub use tree::Tree;

#[cfg(test)]
mod test {
    pub(crate) mod quick;
}
