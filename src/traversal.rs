//! The six depth-first visiting orders and the iterators that walk them.
//!
//! Every order is a permutation of three steps: visit the subtree root, walk the left subtree,
//! walk the right subtree. [`Traversal::steps`] is the one table mapping each order to its
//! permutation; the walker just follows the table with an explicit stack, so even a completely
//! unbalanced tree is walked without recursion.
//!
//! # Examples
//!
//! ```
//! use bintree::{Traversal, Tree};
//!
//! let tree: Tree<i32> = [2, 1, 3].into_iter().collect();
//!
//! let pre: Vec<_> = tree.traverse(Traversal::PreOrder).copied().collect();
//! assert_eq!(pre, [2, 1, 3]);
//!
//! let rev: Vec<_> = tree.traverse(Traversal::ReverseInOrder).copied().collect();
//! assert_eq!(rev, [3, 2, 1]);
//! ```

use crate::node::{Breadth, Link, Node};

/// A depth-first visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Root, left, right.
    PreOrder,
    /// Left, root, right.
    InOrder,
    /// Left, right, root.
    PostOrder,
    /// Root, right, left.
    ReversePreOrder,
    /// Right, root, left.
    ReverseInOrder,
    /// Right, left, root.
    ReversePostOrder,
}

/// One of the three steps of a traversal, and equally the position a node holds relative to its
/// parent (the root of the whole structure has the `Root` role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The subtree root itself.
    Root,
    /// The left subtree.
    Left,
    /// The right subtree.
    Right,
}

impl Traversal {
    /// Every traversal, non-reversed ones first.
    pub const ALL: [Traversal; 6] = [
        Traversal::PreOrder,
        Traversal::InOrder,
        Traversal::PostOrder,
        Traversal::ReversePreOrder,
        Traversal::ReverseInOrder,
        Traversal::ReversePostOrder,
    ];

    /// The order in which this traversal performs its three steps.
    pub fn steps(self) -> [Role; 3] {
        use Role::*;
        match self {
            Traversal::PreOrder => [Root, Left, Right],
            Traversal::InOrder => [Left, Root, Right],
            Traversal::PostOrder => [Left, Right, Root],
            Traversal::ReversePreOrder => [Root, Right, Left],
            Traversal::ReverseInOrder => [Right, Root, Left],
            Traversal::ReversePostOrder => [Right, Left, Root],
        }
    }

    /// The traversal performing `steps`, if they are a permutation of the three roles.
    pub fn from_steps(steps: [Role; 3]) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.steps() == steps)
    }

    /// The same permutation with the left and right steps swapped.
    pub fn reversed(self) -> Self {
        let steps = self.steps().map(|role| match role {
            Role::Root => Role::Root,
            Role::Left => Role::Right,
            Role::Right => Role::Left,
        });
        // Swapping sides of a permutation is always another permutation.
        Self::from_steps(steps).unwrap_or(self)
    }
}

enum Frame<'a, T> {
    Expand(Role, &'a Node<T>),
    Emit(Role, &'a Node<T>),
}

/// Depth-first walk yielding each node with the role it holds under its parent.
pub(crate) struct Walk<'a, T> {
    steps: [Role; 3],
    stack: Vec<Frame<'a, T>>,
}

impl<'a, T> Walk<'a, T> {
    pub(crate) fn new(root: &'a Link<T>, order: Traversal) -> Self {
        Self {
            steps: order.steps(),
            stack: root
                .as_deref()
                .map(|n| Frame::Expand(Role::Root, n))
                .into_iter()
                .collect(),
        }
    }
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = (Role, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Emit(role, node) => return Some((role, node)),
                Frame::Expand(role, node) => {
                    // Pushed backwards so the first step is popped first.
                    for step in self.steps.iter().rev() {
                        match step {
                            Role::Root => self.stack.push(Frame::Emit(role, node)),
                            Role::Left => {
                                if let Some(left) = node.left.as_deref() {
                                    self.stack.push(Frame::Expand(Role::Left, left));
                                }
                            }
                            Role::Right => {
                                if let Some(right) = node.right.as_deref() {
                                    self.stack.push(Frame::Expand(Role::Right, right));
                                }
                            }
                        }
                    }
                }
            }
        }
        None
    }
}

/// Iterator over the values of a container in one of the six depth-first orders. Created by
/// [`Tree::traverse`](crate::Tree::traverse) and [`Heap::traverse`](crate::Heap::traverse).
pub struct Traverse<'a, T> {
    walk: Walk<'a, T>,
}

impl<'a, T> Traverse<'a, T> {
    pub(crate) fn new(root: &'a Link<T>, order: Traversal) -> Self {
        Self {
            walk: Walk::new(root, order),
        }
    }
}

impl<'a, T> Iterator for Traverse<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next().map(|(_, node)| &node.value)
    }
}

/// Iterator over the values of a container level by level, each level left to right. Created by
/// [`Heap::iter`](crate::Heap::iter) and [`Tree::level_order`](crate::Tree::level_order).
pub struct LevelOrder<'a, T> {
    nodes: Breadth<'a, T>,
}

impl<'a, T> LevelOrder<'a, T> {
    pub(crate) fn new(root: &'a Link<T>) -> Self {
        Self {
            nodes: Breadth::new(root),
        }
    }
}

impl<'a, T> Iterator for LevelOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next().map(|node| &node.value)
    }
}
