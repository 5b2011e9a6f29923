//! The node graph both containers are built from, and the structural algorithms that only care
//! about shape and values (never about order).

use std::collections::VecDeque;
use std::fmt;

/// An owning, nullable link to a subtree.
pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// Which child link of a parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left child.
    Left,
    /// The right child.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

// TODO stack based Debug
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    pub(crate) fn new_boxed(value: T) -> Box<Self> {
        Box::new(Node {
            value,
            left: None,
            right: None,
        })
    }

    pub(crate) fn child(&self, side: Side) -> Option<&Self> {
        match side {
            Side::Left => self.left.as_deref(),
            Side::Right => self.right.as_deref(),
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Link<T> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// The value and one child link, borrowed at the same time.
    pub(crate) fn split_mut(&mut self, side: Side) -> (&mut T, &mut Link<T>) {
        match side {
            Side::Left => (&mut self.value, &mut self.left),
            Side::Right => (&mut self.value, &mut self.right),
        }
    }
}

/// Copies every node of the subtree. The children are copied by `clone_link`, so a degenerate
/// subtree is copied without deep recursion too.
impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        Node {
            value: self.value.clone(),
            left: clone_link(&self.left),
            right: clone_link(&self.right),
        }
    }
}

/// Deep copy of the subtree under `link`, built bottom-up with an explicit stack.
pub(crate) fn clone_link<T: Clone>(link: &Link<T>) -> Link<T> {
    enum Step<'a, T> {
        Visit(&'a Node<T>),
        Build(&'a Node<T>),
    }

    let mut steps: Vec<Step<'_, T>> = link.as_deref().map(Step::Visit).into_iter().collect();
    // Copies of finished subtrees, the most recently finished on top.
    let mut built: Vec<Box<Node<T>>> = Vec::new();
    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(node) => {
                steps.push(Step::Build(node));
                steps.extend(node.right.as_deref().map(Step::Visit));
                steps.extend(node.left.as_deref().map(Step::Visit));
            }
            Step::Build(node) => {
                // The right subtree finished last.
                let right = node.right.as_ref().and_then(|_| built.pop());
                let left = node.left.as_ref().and_then(|_| built.pop());
                built.push(Box::new(Node {
                    value: node.value.clone(),
                    left,
                    right,
                }));
            }
        }
    }
    built.pop()
}

/// Drops every node under `link` without recursing, so a degenerate (list shaped) tree can't blow
/// the stack.
pub(crate) fn destroy<T>(link: &mut Link<T>) {
    let mut stack: Vec<Box<Node<T>>> = link.take().into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

/// Same shape and the same value at every position.
pub(crate) fn identical<T: PartialEq>(a: Option<&Node<T>>, b: Option<&Node<T>>) -> bool {
    let mut stack = vec![(a, b)];
    while let Some(pair) = stack.pop() {
        match pair {
            (None, None) => {}
            (Some(a), Some(b)) if a.value == b.value => {
                stack.push((a.right.as_deref(), b.right.as_deref()));
                stack.push((a.left.as_deref(), b.left.as_deref()));
            }
            _ => return false,
        }
    }
    true
}

/// Whether some node of `haystack` roots a subtree identical to `needle`. An empty needle is
/// contained in everything.
pub(crate) fn contains<T: PartialEq>(haystack: &Link<T>, needle: &Link<T>) -> bool {
    let Some(needle) = needle.as_deref() else {
        return true;
    };
    Breadth::new(haystack).any(|n| n.value == needle.value && identical(Some(n), Some(needle)))
}

/// Number of levels, `0` for an empty link.
pub(crate) fn height<T>(link: &Link<T>) -> usize {
    let mut height = 0;
    let mut queue: VecDeque<(usize, &Node<T>)> =
        link.as_deref().map(|n| (1, n)).into_iter().collect();
    while let Some((depth, node)) = queue.pop_front() {
        height = height.max(depth);
        queue.extend(node.left.as_deref().map(|n| (depth + 1, n)));
        queue.extend(node.right.as_deref().map(|n| (depth + 1, n)));
    }
    height
}

/// The values of every level, top to bottom, each level left to right.
pub(crate) fn levels<T>(link: &Link<T>) -> Vec<Vec<&T>> {
    let mut levels: Vec<Vec<&T>> = Vec::new();
    let mut queue: VecDeque<(usize, &Node<T>)> =
        link.as_deref().map(|n| (0, n)).into_iter().collect();
    while let Some((depth, node)) = queue.pop_front() {
        if levels.len() == depth {
            levels.push(Vec::new());
        }
        levels[depth].push(&node.value);
        queue.extend(node.left.as_deref().map(|n| (depth + 1, n)));
        queue.extend(node.right.as_deref().map(|n| (depth + 1, n)));
    }
    levels
}

/// Breadth-first walk over nodes.
pub(crate) struct Breadth<'a, T> {
    queue: VecDeque<&'a Node<T>>,
}

impl<'a, T> Breadth<'a, T> {
    pub(crate) fn new(link: &'a Link<T>) -> Self {
        Self {
            queue: link.as_deref().into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for Breadth<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.left.as_deref());
        self.queue.extend(node.right.as_deref());
        Some(node)
    }
}
