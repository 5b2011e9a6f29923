use bintree::{Format, Traversal, Tree};
use quickcheck_macros::quickcheck;

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same values in both.
fn do_ops<V>(ops: &[Op<V>], bst: &mut Tree<V>, set: &mut BTreeSet<V>)
where
    V: Ord + Clone,
{
    for op in ops {
        match op {
            Op::Insert(v) => {
                bst.insert(v.clone());
                set.insert(v.clone());
            }
            Op::Remove(v) => {
                bst.remove(v);
                set.remove(v);
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.len() == set.len() && tree.iter().eq(set.iter())
}

#[quickcheck]
fn in_order_is_strictly_increasing(xs: Vec<i32>) -> bool {
    let tree: Tree<i32> = xs.into_iter().collect();
    let values: Vec<_> = tree.iter().collect();

    values.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !tree.contains(x))
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<i8> = xs.iter().copied().collect();
    for delete in &deletes {
        tree.remove(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| !tree.contains(x)) && still_present.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn balance_keeps_values(xs: Vec<i16>) -> bool {
    let mut tree: Tree<i16> = xs.into_iter().collect();
    let before: Vec<i16> = tree.iter().copied().collect();
    tree.balance();

    let bound = (usize::BITS - tree.len().leading_zeros()) as usize;
    tree.height() <= bound && tree.iter().copied().eq(before)
}

#[quickcheck]
fn listing_round_trip(xs: Vec<i32>) -> bool {
    let tree: Tree<i32> = xs.into_iter().collect();
    let parsed: Tree<i32> = match tree.to_string().parse() {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    parsed.iter().eq(tree.iter())
}

#[quickcheck]
fn pair_list_round_trip(xs: Vec<i32>) -> bool {
    let tree: Tree<i32> = xs.into_iter().collect();

    Tree::<i32>::from_pairs(&tree.to_pairs()) == Ok(tree)
}

#[quickcheck]
fn formatted_round_trip(xs: Vec<u16>) -> bool {
    let tree: Tree<u16> = xs.into_iter().collect();

    Traversal::ALL.into_iter().all(|order| {
        let format = Format::bracketed(order, ('{', '}'), ('(', ')'), ('[', ']'));
        Tree::<u16>::from_formatted(&tree.to_formatted(&format), &format)
            .map_or(false, |decoded| decoded.iter().eq(tree.iter()))
    })
}

#[quickcheck]
fn subtrees_are_contained(xs: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();

    tree.contains_subtree(&Tree::new())
        && tree.contains_subtree(&tree.clone())
        && xs
            .iter()
            .all(|x| tree.contains_subtree(&tree.extract_subtree(x)))
}
