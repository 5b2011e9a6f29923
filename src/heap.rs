//! A binary max-heap built from linked nodes instead of an array.
//!
//! The heap is always a complete tree: every level is full except possibly the last, which fills
//! left to right. That makes the position of the `n`th node (counting from 1 in level order) a
//! function of `n` alone. Writing `n` in binary, the bits after the leading one spell out the path
//! from the root, `0` for left and `1` for right:
//!
//! ```text
//!            1
//!        /       \
//!      10         11
//!     /  \       /  \
//!   100  101   110  111
//! ```
//!
//! So inserting appends at the path of `len + 1` and removing always unlinks the node at `len`.
//!
//! # Examples
//!
//! ```
//! use bintree::Heap;
//!
//! let mut heap: Heap<i32> = [10, 20, 5, 15].into_iter().collect();
//!
//! assert_eq!(heap.top(), Ok(&20));
//! assert_eq!(heap.extract_max(), Ok(20));
//! assert_eq!(heap.len(), 3);
//! assert_eq!(heap.top(), Ok(&15));
//! ```
//!
//! The order is always the value type's own [`Ord`]. For a min-heap, wrap the values in
//! [`Reverse`](std::cmp::Reverse) (or in any newtype with the order you need):
//!
//! ```
//! use std::cmp::Reverse;
//!
//! use bintree::Heap;
//!
//! let mut heap: Heap<Reverse<i32>> = [10, 20, 5, 15].into_iter().map(Reverse).collect();
//!
//! assert_eq!(heap.extract_max(), Ok(Reverse(5)));
//! assert_eq!(heap.top(), Ok(&Reverse(10)));
//! ```

use std::fmt;
use std::mem;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::codec::{self, Format, PairGraph, RootRule};
use crate::error::Error;
use crate::node::{self, Breadth, Link, Node, Side};
use crate::traversal::{LevelOrder, Traversal, Traverse};

/// A binary max-heap. Every node's value is larger than the values of its children.
pub struct Heap<T> {
    root: Link<T>,
    len: usize,
}

/// Path from the root to the node at 1-based level order position `index`.
fn path_to(index: usize) -> Vec<Side> {
    let steps = (usize::BITS - 1).saturating_sub(index.leading_zeros());
    (0..steps)
        .rev()
        .map(|bit| {
            if (index >> bit) & 1 == 0 {
                Side::Left
            } else {
                Side::Right
            }
        })
        .collect()
}

/// The link at the end of `path`, or the last link that exists along it.
fn slot_mut<'a, T>(mut link: &'a mut Link<T>, path: &[Side]) -> &'a mut Link<T> {
    for &side in path {
        match link {
            Some(node) => link = node.child_mut(side),
            None => break,
        }
    }
    link
}

/// Moves a value that is larger than its parent up along `path`.
fn sift_up<T: Ord>(link: &mut Link<T>, path: &[Side]) {
    let (Some(node), Some((&side, rest))) = (link, path.split_first()) else {
        return;
    };
    let (value, child) = node.split_mut(side);
    sift_up(child, rest);
    if let Some(child) = child {
        if child.value > *value {
            mem::swap(&mut child.value, value);
        }
    }
}

/// Moves the value at `link` down, always swapping with the larger child, until neither child is
/// larger.
fn sift_down<T: Ord>(mut link: &mut Link<T>) {
    loop {
        let Some(node) = link else {
            return;
        };
        let side = match (&node.left, &node.right) {
            (Some(left), Some(right)) if right.value > left.value => Side::Right,
            (Some(_), _) => Side::Left,
            (None, Some(_)) => Side::Right,
            (None, None) => return,
        };
        let (value, child) = node.split_mut(side);
        let Some(larger) = child.as_mut() else {
            return;
        };
        if larger.value <= *value {
            return;
        }
        mem::swap(&mut larger.value, value);
        link = child;
    }
}

impl<T> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Heap<T> {
    fn drop(&mut self) {
        node::destroy(&mut self.root);
    }
}

impl<T> Clone for Heap<T>
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

impl<T> fmt::Debug for Heap<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}

/// Heaps are equal when every level order position holds the same value.
impl<T> PartialEq for Heap<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && node::identical(self.root.as_deref(), other.root.as_deref())
    }
}

impl<T> Eq for Heap<T> where T: Eq {}

impl<T> Heap<T> {
    /// Generate a new, empty `Heap`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// The number of values in the heap.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the heap holds no values.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        node::destroy(&mut self.root);
        self.len = 0;
    }

    /// The largest value.
    pub fn top(&self) -> Result<&T, Error> {
        self.root.as_deref().map(|n| &n.value).ok_or(Error::Empty)
    }

    /// The number of levels in the heap.
    pub fn height(&self) -> usize {
        node::height(&self.root)
    }

    /// The values of each level, top to bottom.
    pub fn levels(&self) -> Vec<Vec<&T>> {
        node::levels(&self.root)
    }

    /// Iterates over the values level by level, which is also the order they are listed in.
    pub fn iter(&self) -> LevelOrder<'_, T> {
        LevelOrder::new(&self.root)
    }

    /// Iterates over the values in the given depth-first order.
    pub fn traverse(&self, order: Traversal) -> Traverse<'_, T> {
        Traverse::new(&self.root, order)
    }

    fn node_at(&self, path: &[Side]) -> Option<&Node<T>> {
        path.iter()
            .try_fold(self.root.as_deref()?, |node, &side| node.child(side))
    }
}

impl<T> Heap<T>
where
    T: PartialEq,
{
    /// Whether the heap holds `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.path_of(value).is_some()
    }

    /// Whether some node of this heap roots a subheap identical, in shape and values, to `other`.
    /// The empty heap is contained in every heap.
    pub fn contains_subheap(&self, other: &Self) -> bool {
        node::contains(&self.root, &other.root)
    }

    /// A copy of the subheap rooted at `value`, or an empty heap if `value` isn't present.
    ///
    /// Every subtree of a complete tree is complete, so the copy is a valid heap.
    pub fn extract_subheap(&self, value: &T) -> Self
    where
        T: Clone,
    {
        match self.path_of(value).and_then(|path| self.node_at(&path)) {
            None => Self::new(),
            Some(node) => {
                let root = Some(Box::new(node.clone()));
                let len = Breadth::new(&root).count();
                Self { root, len }
            }
        }
    }

    /// Pre-order search for the path to `value`.
    fn path_of(&self, value: &T) -> Option<Vec<Side>> {
        let mut path = Vec::new();
        let mut stack: Vec<(usize, Option<Side>, &Node<T>)> = self
            .root
            .as_deref()
            .map(|n| (0, None, n))
            .into_iter()
            .collect();
        while let Some((depth, side, node)) = stack.pop() {
            // The first `depth` steps still lead to this node's parent.
            path.truncate(depth);
            path.extend(side);
            if node.value == *value {
                return Some(path);
            }
            let depth = path.len();
            stack.extend(node.right.as_deref().map(|n| (depth, Some(Side::Right), n)));
            stack.extend(node.left.as_deref().map(|n| (depth, Some(Side::Left), n)));
        }
        None
    }
}

impl<T> Heap<T>
where
    T: Ord,
{
    /// Inserts `value` into the heap. Returns `false`, leaving the heap untouched, when the value
    /// is already present.
    ///
    /// Looking for the duplicate visits every node, so this is `O(n)` rather than `O(lg n)`.
    pub fn insert(&mut self, value: T) -> bool {
        if self.contains(&value) {
            trace!("insert: value already present");
            return false;
        }
        self.len += 1;
        let path = path_to(self.len);
        trace!(len = self.len, ?path, "insert: appending");
        *slot_mut(&mut self.root, &path) = Some(Node::new_boxed(value));
        sift_up(&mut self.root, &path);
        true
    }

    /// Removes and returns the largest value.
    pub fn extract_max(&mut self) -> Result<T, Error> {
        self.remove_at(&[]).ok_or(Error::Empty)
    }

    /// Removes `value` from the heap, returning whether it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.path_of(value) {
            Some(path) => self.remove_at(&path).is_some(),
            None => false,
        }
    }

    /// Removes the value at `path`. The last node is unlinked and its value moved into the
    /// vacated slot, which is then sifted whichever way it needs to go.
    fn remove_at(&mut self, path: &[Side]) -> Option<T> {
        let last_path = path_to(self.len);
        let Node { value: last, .. } = *slot_mut(&mut self.root, &last_path).take()?;
        self.len -= 1;
        if last_path == path {
            return Some(last);
        }

        let slot = slot_mut(&mut self.root, path);
        let removed = mem::replace(&mut slot.as_mut()?.value, last);
        sift_down(slot);
        sift_up(&mut self.root, path);
        trace!(len = self.len, ?path, "removed");
        Some(removed)
    }

    /// Rebuilds a heap from `(child, parent)` pairs. The root must be paired with itself. The first
    /// child listed for a parent becomes its left child, the second its right child.
    pub fn from_pair_list(pairs: Vec<(T, T)>) -> Result<Self, Error>
    where
        T: fmt::Display,
    {
        if pairs.is_empty() {
            return Ok(Self::new());
        }
        let build = || -> Result<Self, Error> {
            let graph = PairGraph::new(pairs, RootRule::SelfParent)?;
            let slots = graph.slots_in_listed_order()?;
            let (root, len) = graph.assemble(slots)?;
            let heap = Self {
                root: Some(root),
                len,
            };
            match heap.violation() {
                Some(invariant) => Err(Error::InvariantViolated(invariant)),
                None => Ok(heap),
            }
        };
        build().map_err(|e| {
            debug!(error = %e, "rejected pair list");
            e
        })
    }

    /// Clears the heap and inserts `count` values drawn uniformly from `low..=high`. Duplicates are
    /// dropped as usual, so the heap may end up with fewer than `count` values.
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

    /// The heap invariant this heap breaks, if any.
    fn violation(&self) -> Option<&'static str> {
        let mut gap = false;
        for node in Breadth::new(&self.root) {
            for child in [node.left.as_deref(), node.right.as_deref()] {
                match child {
                    // A node after the first missing child in level order.
                    Some(_) if gap => return Some("heap shape"),
                    Some(child) if child.value > node.value => return Some("heap order"),
                    Some(_) => {}
                    None => gap = true,
                }
            }
        }
        None
    }
}

impl<T> Heap<T>
where
    T: fmt::Display,
{
    /// Encodes the heap with the given [`Format`].
    pub fn to_formatted(&self, format: &Format) -> String {
        codec::encode_formatted(&self.root, format)
    }

    /// Encodes the heap as `[(child:parent),...]` in pre-order, the root paired with itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use bintree::Heap;
    ///
    /// let heap: Heap<i32> = [1, 2, 3].into_iter().collect();
    /// assert_eq!(heap.to_pairs(), "[(3:3),(1:3),(2:3)]");
    /// ```
    pub fn to_pairs(&self) -> String {
        codec::encode_pairs(&self.root)
    }
}

impl<T> Heap<T>
where
    T: Ord + FromStr,
    T::Err: fmt::Display,
{
    /// Decodes a heap written by [`Heap::to_formatted`] with the same `format`, inserting the
    /// values in the order they were written.
    pub fn from_formatted(input: &str, format: &Format) -> Result<Self, Error> {
        codec::decode_formatted(input, format)
            .map(|values: Vec<T>| values.into_iter().collect())
            .map_err(|e| {
                debug!(error = %e, "rejected formatted heap");
                e
            })
    }

    /// Decodes a `[(child:parent),...]` pair list. See [`Heap::from_pair_list`].
    pub fn from_pairs(input: &str) -> Result<Self, Error>
    where
        T: fmt::Display,
    {
        Self::from_pair_list(codec::parse_pairs(input)?)
    }
}

/// Writes the values in level order, `[3,1,2]`.
impl<T> fmt::Display for Heap<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        codec::write_listing(f, self.iter())
    }
}

/// Reads a `[v1,v2,...]` listing, inserting the values in the order listed.
impl<T> FromStr for Heap<T>
where
    T: Ord + FromStr,
    T::Err: fmt::Display,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::parse_listing(s).map(|values: Vec<T>| values.into_iter().collect())
    }
}

impl<T> FromIterator<T> for Heap<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<T> Extend<T> for Heap<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Reverse;

    use super::*;

    fn heap_of(values: &[i32]) -> Heap<i32> {
        values.iter().copied().collect()
    }

    fn level_order(heap: &Heap<i32>) -> Vec<i32> {
        heap.iter().copied().collect()
    }

    #[test]
    fn paths_follow_index_bits() {
        use Side::*;

        assert!(path_to(1).is_empty());
        assert_eq!(path_to(2), [Left]);
        assert_eq!(path_to(3), [Right]);
        assert_eq!(path_to(4), [Left, Left]);
        assert_eq!(path_to(6), [Right, Left]);
        assert_eq!(path_to(11), [Left, Right, Right]);
    }

    #[test]
    fn insert_then_extract() {
        let mut heap = heap_of(&[10, 20, 5, 15]);

        assert_eq!(heap.len(), 4);
        assert_eq!(heap.top(), Ok(&20));
        assert_eq!(level_order(&heap), [20, 15, 5, 10]);

        assert_eq!(heap.extract_max(), Ok(20));
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.top(), Ok(&15));
        assert_eq!(level_order(&heap), [15, 10, 5]);
    }

    #[test]
    fn extract_drains_in_descending_order() {
        let mut heap = heap_of(&[3, 9, 1, 7, 4, 8, 2, 6, 5]);
        let mut drained = Vec::new();
        while let Ok(max) = heap.extract_max() {
            drained.push(max);
            assert_eq!(heap.violation(), None);
        }

        assert_eq!(drained, [9, 8, 7, 6, 5, 4, 3, 2, 1]);
        assert!(heap.is_empty());
    }

    #[test]
    fn empty_heap() {
        let mut heap = Heap::<i32>::new();

        assert_eq!(heap.top(), Err(Error::Empty));
        assert_eq!(heap.extract_max(), Err(Error::Empty));
        assert!(!heap.remove(&1));
        assert_eq!(heap.height(), 0);
        assert_eq!(heap.to_string(), "[]");
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut heap = heap_of(&[5, 3, 4]);

        assert!(!heap.insert(3));
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn remove_inner_value() {
        // 9
        // 7 8
        // 1 2 3 4
        let mut heap = heap_of(&[9, 7, 8, 1, 2, 3, 4]);
        assert_eq!(level_order(&heap), [9, 7, 8, 1, 2, 3, 4]);

        // 4 moves into 7's slot and stays there, having children 1 and 2.
        assert!(heap.remove(&7));
        assert_eq!(level_order(&heap), [9, 4, 8, 1, 2, 3]);

        // 3 moves into the root slot and sifts down below 8.
        assert!(heap.remove(&9));
        assert_eq!(level_order(&heap), [8, 4, 3, 1, 2]);

        assert!(!heap.remove(&9));
        assert!(!heap.contains(&9));
        assert_eq!(heap.len(), 5);
    }

    #[test]
    fn remove_can_sift_up() {
        // 10
        // 5 9
        // 4 3 8 7
        let mut heap = Heap::from_pairs("[(10:10),(5:10),(4:5),(3:5),(9:10),(8:9),(7:9)]").unwrap();

        // 7 replaces 4, which is larger than its new parent 5.
        assert!(heap.remove(&4));
        assert_eq!(level_order(&heap), [10, 7, 9, 5, 3, 8]);
        assert_eq!(heap.violation(), None);
    }

    #[test]
    fn remove_last_and_only() {
        let mut heap = heap_of(&[2, 1]);

        assert!(heap.remove(&1));
        assert_eq!(level_order(&heap), [2]);
        assert!(heap.remove(&2));
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
    }

    #[test]
    fn subheaps() {
        let heap = heap_of(&[9, 7, 8, 1, 2, 3, 4]);

        let seven = heap.extract_subheap(&7);
        assert_eq!(level_order(&seven), [7, 1, 2]);
        assert_eq!(seven.len(), 3);
        assert!(heap.contains_subheap(&seven));
        assert!(heap.contains_subheap(&heap.clone()));
        assert!(heap.contains_subheap(&Heap::new()));
        assert!(heap.extract_subheap(&42).is_empty());

        let mut pruned = seven.clone();
        pruned.remove(&2);
        assert!(!heap.contains_subheap(&pruned));
    }

    #[test]
    fn traversals() {
        let heap = heap_of(&[9, 7, 8, 1, 2]);

        let pre: Vec<_> = heap.traverse(Traversal::PreOrder).copied().collect();
        assert_eq!(pre, [9, 7, 1, 2, 8]);
        let post: Vec<_> = heap.traverse(Traversal::PostOrder).copied().collect();
        assert_eq!(post, [1, 2, 7, 8, 9]);
        assert_eq!(heap.levels(), vec![vec![&9], vec![&7, &8], vec![&1, &2]]);
    }

    #[test]
    fn listing_round_trip() {
        let heap = heap_of(&[4, 8, 1, 6]);
        assert_eq!(heap.to_string(), "[8,6,1,4]");

        // Level order replays a valid insertion order.
        let parsed: Heap<i32> = heap.to_string().parse().unwrap();
        assert_eq!(parsed, heap);

        assert!("[1,2".parse::<Heap<i32>>().is_err());
    }

    #[test]
    fn reversed_values_pop_smallest_first() {
        let mut heap: Heap<Reverse<i32>> = [4, 8, 1, 6, 3].into_iter().map(Reverse).collect();
        assert_eq!(heap.top(), Ok(&Reverse(1)));

        let mut popped = Vec::new();
        while let Ok(Reverse(value)) = heap.extract_max() {
            popped.push(value);
        }
        assert_eq!(popped, [1, 3, 4, 6, 8]);
        assert!(heap.is_empty());
    }

    #[test]
    fn text_values_with_delimiters() {
        let values = ["a,b", "x)", "y:z", "[q]", "{<>}", "back\\slash"];
        let heap: Heap<String> = values.iter().map(|s| s.to_string()).collect();

        let listed: Heap<String> = heap.to_string().parse().unwrap();
        assert_eq!(listed.len(), values.len());
        assert!(listed.iter().eq(heap.iter()));

        let paired = Heap::<String>::from_pairs(&heap.to_pairs()).unwrap();
        assert_eq!(paired, heap);

        let format: Format = "{К}(Л)[П]".parse().unwrap();
        let encoded = heap.to_formatted(&format);
        let decoded = Heap::<String>::from_formatted(&encoded, &format).unwrap();
        assert_eq!(decoded.len(), values.len());
        assert!(values.iter().all(|v| decoded.contains(&v.to_string())));
    }

    #[test]
    fn formatted_round_trip() {
        let heap = heap_of(&[4, 8, 1, 6]);
        let format: Format = "{К}(Л)[П]".parse().unwrap();

        let encoded = heap.to_formatted(&format);
        assert_eq!(encoded, "{8}(6)(4)[1]");

        let decoded = Heap::<i32>::from_formatted(&encoded, &format).unwrap();
        assert_eq!(decoded.top(), Ok(&8));
        assert_eq!(decoded.len(), 4);
    }

    #[test]
    fn pair_list_round_trip() {
        let heap = heap_of(&[3, 9, 1, 7, 4, 8, 2, 6, 5]);
        let decoded = Heap::<i32>::from_pairs(&heap.to_pairs()).unwrap();

        assert_eq!(decoded, heap);
    }

    #[test]
    fn pair_list_rejections() {
        // 15 is larger than its parent.
        assert_eq!(
            Heap::<i32>::from_pairs("[(10:10),(15:10),(5:10)]").unwrap_err(),
            Error::InvariantViolated("heap order")
        );
        // 5 has a child while 9 still misses its right one.
        assert_eq!(
            Heap::<i32>::from_pairs("[(9:9),(7:9),(5:7)]").unwrap_err(),
            Error::InvariantViolated("heap shape")
        );
        // The root must be listed as its own parent.
        assert_eq!(
            Heap::<i32>::from_pairs("[(7:9),(8:9)]").unwrap_err(),
            Error::MissingRoot
        );
        assert_eq!(
            Heap::<i32>::from_pairs("[(9:9),(1:9),(2:9),(3:9)]").unwrap_err(),
            Error::TooManyChildren("9".to_string())
        );
    }

    #[cfg(feature = "random")]
    #[test]
    fn fill_random_builds_a_heap() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(11);
        let mut heap = Heap::new();
        heap.fill_random(&mut rng, 200, -50, 50);

        assert_eq!(heap.violation(), None);
        assert!(heap.len() <= 101);
        assert!(heap.iter().all(|x| (-50..=50).contains(x)));
        assert_eq!(heap.top().ok(), heap.iter().max());
    }
}

#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a heap and a `BTreeSet`, checking after every step that the
    /// two agree on the largest value and the count and that the heap is still valid.
    fn do_ops(ops: &[Op<i8>], heap: &mut Heap<i8>, set: &mut BTreeSet<i8>) {
        for op in ops {
            match op {
                Op::Insert(v) => {
                    assert_eq!(heap.insert(*v), set.insert(*v));
                }
                Op::Remove(v) => {
                    assert_eq!(heap.remove(v), set.remove(v));
                }
                Op::Pop => {
                    assert_eq!(heap.extract_max().ok(), set.pop_last());
                }
                Op::Rebuild => {
                    *heap = Heap::from_pairs(&heap.to_pairs()).unwrap();
                }
            }
            assert_eq!(heap.len(), set.len());
            assert_eq!(heap.top().ok(), set.last());
            assert_eq!(heap.violation(), None);
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut heap = Heap::new();
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut heap, &mut set);
            let mut values: Vec<i8> = heap.iter().copied().collect();
            values.sort_unstable();
            values.into_iter().eq(set.into_iter())
        }
    }
}
