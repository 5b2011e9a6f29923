//! A Binary Search Tree storing each value at most once.
//!
//! Values are kept in plain `Box`ed nodes. Nothing rebalances the tree on its own, so inserting
//! sorted values produces a list shaped tree; [`Tree::balance`] rebuilds it with minimal height.
//!
//! # Examples
//!
//! ```
//! use bintree::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert!(!tree.contains(&1));
//!
//! assert!(tree.insert(1));
//! assert!(tree.contains(&1));
//!
//! // Inserting the same value again changes nothing.
//! assert!(!tree.insert(1));
//! assert_eq!(tree.len(), 1);
//!
//! // Removing reports whether the value was there.
//! assert!(tree.remove(&1));
//! assert!(!tree.remove(&1));
//! assert!(tree.is_empty());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::codec::{self, Format, PairGraph, RootRule};
use crate::error::Error;
use crate::node::{self, Breadth, Link, Node, Side};
use crate::traversal::{LevelOrder, Traversal, Traverse};

/// A Binary Search Tree. Every value in a node's left subtree is smaller than the node's value and
/// every value in its right subtree is larger.
pub struct Tree<T> {
    root: Link<T>,
    len: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        node::destroy(&mut self.root);
    }
}

impl<T> Clone for Tree<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            root: node::clone_link(&self.root),
            len: self.len,
        }
    }
}

impl<T> fmt::Debug for Tree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

/// Two trees are equal when they have the same shape and the same value at every position. Trees
/// holding the same values in different shapes are *not* equal.
impl<T> PartialEq for Tree<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && node::identical(self.root.as_deref(), other.root.as_deref())
    }
}

impl<T> Eq for Tree<T> where T: Eq {}

impl<T> Tree<T> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// The number of values in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        node::destroy(&mut self.root);
        self.len = 0;
    }

    /// The number of levels in the tree. An empty tree has height 0, a single node height 1.
    pub fn height(&self) -> usize {
        node::height(&self.root)
    }

    /// The values of each level, top to bottom.
    pub fn levels(&self) -> Vec<Vec<&T>> {
        node::levels(&self.root)
    }

    /// Iterates over the values in sorted order.
    pub fn iter(&self) -> Traverse<'_, T> {
        self.traverse(Traversal::InOrder)
    }

    /// Iterates over the values in the given depth-first order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::{Traversal, Tree};
    ///
    /// let tree: Tree<i32> = [2, 1, 3].into_iter().collect();
    /// let post: Vec<_> = tree.traverse(Traversal::PostOrder).collect();
    /// assert_eq!(post, [&1, &3, &2]);
    /// ```
    pub fn traverse(&self, order: Traversal) -> Traverse<'_, T> {
        Traverse::new(&self.root, order)
    }

    /// Iterates over the values level by level.
    pub fn level_order(&self) -> LevelOrder<'_, T> {
        LevelOrder::new(&self.root)
    }

    /// The smallest value.
    pub fn min(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.value)
    }

    /// The largest value.
    pub fn max(&self) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.value)
    }

    /// Folds the values from smallest to largest.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let tree: Tree<i32> = [3, 1, 2].into_iter().collect();
    /// let digits = tree.reduce(0, |acc, x| acc * 10 + x);
    /// assert_eq!(digits, 123);
    /// ```
    pub fn reduce<A, F>(&self, initial: A, f: F) -> A
    where
        F: FnMut(A, &T) -> A,
    {
        self.iter().fold(initial, f)
    }
}

impl<T> Tree<T>
where
    T: Ord,
{
    /// Inserts `value` into the tree. Returns `false`, leaving the tree untouched, when the value
    /// is already present.
    pub fn insert(&mut self, value: T) -> bool {
        let slot = Self::find_slot(&mut self.root, &value);
        if slot.is_some() {
            trace!("insert: value already present");
            return false;
        }
        *slot = Some(Node::new_boxed(value));
        self.len += 1;
        true
    }

    /// Whether the tree holds `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find_node(value).is_some()
    }

    /// Removes `value` from the tree, returning whether it was present.
    ///
    /// A node with two children takes the value of its in-order successor (the smallest value of
    /// its right subtree) and the successor's node is unlinked instead.
    pub fn remove(&mut self, value: &T) -> bool {
        let slot = Self::find_slot(&mut self.root, value);
        let Some(mut node) = slot.take() else {
            return false;
        };

        *slot = match (node.left.take(), node.right.take()) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(left), Some(right)) => {
                let mut right = Some(right);
                if let Some(successor) = Self::take_min(&mut right) {
                    node.value = successor;
                }
                node.left = Some(left);
                node.right = right;
                Some(node)
            }
        };
        self.len -= 1;
        true
    }

    /// Rebuilds the tree so it has the minimal height for its number of values. The root of every
    /// subtree is the middle value (rounding down) of the sorted values it holds.
    pub fn balance(&mut self) {
        let before = self.height();
        let values = Self::drain_in_order(&mut self.root);
        let len = values.len();
        self.root = Self::build_balanced(&mut values.into_iter(), len);
        debug!(len, before, after = self.height(), "balanced tree");
    }

    /// A new tree holding `f` applied to every value. Values are inserted smallest first, so when
    /// `f` maps two values to the same result only the first one is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let tree: Tree<i32> = [-2, 1, 2].into_iter().collect();
    /// let squares = tree.map(|x| x * x);
    /// assert_eq!(squares.iter().collect::<Vec<_>>(), [&1, &4]);
    /// ```
    pub fn map<U, F>(&self, f: F) -> Tree<U>
    where
        U: Ord,
        F: FnMut(&T) -> U,
    {
        self.iter().map(f).collect()
    }

    /// A new tree holding the values `predicate` accepts. The result is built by insertion, not
    /// copied, so its shape follows the sorted insertion order.
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        self.iter().filter(|value| predicate(*value)).cloned().collect()
    }

    /// A copy of the subtree rooted at `value`, or an empty tree if `value` isn't present.
    pub fn extract_subtree(&self, value: &T) -> Self
    where
        T: Clone,
    {
        match self.find_node(value) {
            None => Self::new(),
            Some(node) => {
                let root = Some(Box::new(node.clone()));
                let len = Breadth::new(&root).count();
                Self { root, len }
            }
        }
    }

    /// Whether some node of this tree roots a subtree identical, in shape and values, to `other`.
    /// The empty tree is contained in every tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let tree: Tree<i32> = [5, 3, 8, 1, 4].into_iter().collect();
    ///
    /// assert!(tree.contains_subtree(&tree.extract_subtree(&3)));
    /// assert!(tree.contains_subtree(&Tree::new()));
    ///
    /// // 3 is there, but it has children in `tree`.
    /// let three: Tree<i32> = [3].into_iter().collect();
    /// assert!(!tree.contains_subtree(&three));
    /// ```
    pub fn contains_subtree(&self, other: &Self) -> bool {
        match other.root.as_deref() {
            None => true,
            // Values are unique, so the search path leads to the only candidate.
            Some(needle) => self
                .find_node(&needle.value)
                .map_or(false, |node| node::identical(Some(node), Some(needle))),
        }
    }

    /// Rebuilds a tree from `(child, parent)` pairs. The root is either paired with itself or is
    /// the one parent that is never a child. Children smaller than their parent become left
    /// children, larger ones right children.
    pub fn from_pair_list(pairs: Vec<(T, T)>) -> Result<Self, Error>
    where
        T: fmt::Display,
    {
        if pairs.is_empty() {
            return Ok(Self::new());
        }
        let build = || -> Result<Self, Error> {
            let graph = PairGraph::new(pairs, RootRule::SelfParentOrOrphan)?;
            let slots = graph.slots_by_order()?;
            let (root, len) = graph.assemble(slots)?;
            let tree = Self {
                root: Some(root),
                len,
            };
            if !tree.is_ordered() {
                return Err(Error::InvariantViolated("search tree order"));
            }
            Ok(tree)
        };
        build().map_err(|e| {
            debug!(error = %e, "rejected pair list");
            e
        })
    }

    /// Clears the tree and inserts `count` values drawn uniformly from `low..=high`. Duplicates are
    /// dropped as usual, so the tree may end up with fewer than `count` values.
    #[cfg(feature = "random")]
    pub fn fill_random<R>(&mut self, rng: &mut R, count: usize, low: T, high: T)
    where
        R: rand::Rng + ?Sized,
        T: rand::distributions::uniform::SampleUniform,
    {
        use rand::distributions::{Distribution, Uniform};

        let (low, high) = if high < low { (high, low) } else { (low, high) };
        let range = Uniform::new_inclusive(low, high);
        self.clear();
        for _ in 0..count {
            self.insert(range.sample(rng));
        }
    }

    fn find_node(&self, value: &T) -> Option<&Node<T>> {
        let mut link = self.root.as_deref();
        while let Some(node) = link {
            link = match value.cmp(&node.value) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Equal => return Some(node),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// The link holding `value`, or the empty link where it belongs.
    fn find_slot<'a>(mut link: &'a mut Link<T>, value: &T) -> &'a mut Link<T> {
        loop {
            let side = match link.as_deref() {
                Some(node) => match value.cmp(&node.value) {
                    Ordering::Less => Side::Left,
                    Ordering::Equal => break,
                    Ordering::Greater => Side::Right,
                },
                None => break,
            };
            match link {
                Some(node) => link = node.child_mut(side),
                None => break,
            }
        }
        link
    }

    /// Unlinks the leftmost node under `link` and returns its value. The node has no left child so
    /// its right child takes its place.
    fn take_min(mut link: &mut Link<T>) -> Option<T> {
        while link.as_ref()?.left.is_some() {
            link = &mut link.as_mut()?.left;
        }
        let Node { value, right, .. } = *link.take()?;
        *link = right;
        Some(value)
    }

    fn drain_in_order(link: &mut Link<T>) -> Vec<T> {
        let mut values = Vec::new();
        let mut stack: Vec<Box<Node<T>>> = Vec::new();
        let mut current = link.take();
        loop {
            while let Some(mut node) = current {
                current = node.left.take();
                stack.push(node);
            }
            let Some(node) = stack.pop() else {
                break;
            };
            let Node { value, right, .. } = *node;
            values.push(value);
            current = right;
        }
        values
    }

    /// Builds a minimal height tree out of the next `len` values of a sorted iterator.
    fn build_balanced<I>(values: &mut I, len: usize) -> Link<T>
    where
        I: Iterator<Item = T>,
    {
        if len == 0 {
            return None;
        }
        let mid = (len - 1) / 2;
        let left = Self::build_balanced(values, mid);
        let value = values.next()?;
        let right = Self::build_balanced(values, len - mid - 1);
        Some(Box::new(Node { value, left, right }))
    }

    fn is_ordered(&self) -> bool {
        self.iter().zip(self.iter().skip(1)).all(|(a, b)| a < b)
    }
}

impl<T> Tree<T>
where
    T: fmt::Display,
{
    /// Encodes the tree with the given [`Format`].
    pub fn to_formatted(&self, format: &Format) -> String {
        codec::encode_formatted(&self.root, format)
    }

    /// Encodes the tree as `[(child:parent),...]` in pre-order, the root paired with itself.
    pub fn to_pairs(&self) -> String {
        codec::encode_pairs(&self.root)
    }
}

impl<T> Tree<T>
where
    T: Ord + FromStr,
    T::Err: fmt::Display,
{
    /// Decodes a tree written by [`Tree::to_formatted`] with the same `format`. The values are
    /// inserted in the order they were written, which in general gives a differently shaped tree
    /// than the encoded one.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::{Format, Tree};
    ///
    /// let format: Format = "{К}(Л)[П]".parse().unwrap();
    /// let tree = Tree::<i32>::from_formatted("{2}(1)[3]", &format).unwrap();
    /// assert_eq!(tree.to_string(), "[1,2,3]");
    /// ```
    pub fn from_formatted(input: &str, format: &Format) -> Result<Self, Error> {
        codec::decode_formatted(input, format)
            .map(|values: Vec<T>| values.into_iter().collect())
            .map_err(|e| {
                debug!(error = %e, "rejected formatted tree");
                e
            })
    }

    /// Decodes a `[(child:parent),...]` pair list. See [`Tree::from_pair_list`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Tree;
    ///
    /// let tree = Tree::<i32>::from_pairs("[(20:20),(10:20),(15:10)]").unwrap();
    /// assert_eq!(tree.len(), 3);
    /// assert_eq!(tree.to_pairs(), "[(20:20),(10:20),(15:10)]");
    /// ```
    pub fn from_pairs(input: &str) -> Result<Self, Error>
    where
        T: fmt::Display,
    {
        Self::from_pair_list(codec::parse_pairs(input)?)
    }
}

/// Writes the values in sorted order, `[1,2,3]`.
impl<T> fmt::Display for Tree<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        codec::write_listing(f, self.iter())
    }
}

/// Reads a `[v1,v2,...]` listing, inserting the values in the order listed.
impl<T> FromStr for Tree<T>
where
    T: Ord + FromStr,
    T::Err: fmt::Display,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::parse_listing(s).map(|values: Vec<T>| values.into_iter().collect())
    }
}

impl<T> FromIterator<T> for Tree<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Extend<T> for Tree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}
