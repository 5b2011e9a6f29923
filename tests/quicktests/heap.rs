use bintree::Heap;
use quickcheck_macros::quickcheck;

use std::collections::BTreeSet;

use crate::Op;

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut heap = Heap::new();
    let mut set = BTreeSet::new();

    for op in &ops {
        match op {
            Op::Insert(v) => {
                heap.insert(*v);
                set.insert(*v);
            }
            Op::Remove(v) => {
                heap.remove(v);
                set.remove(v);
            }
        }
        if heap.top().ok() != set.last() {
            return false;
        }
    }
    heap.len() == set.len() && heap.iter().count() == set.len()
}

#[quickcheck]
fn root_is_largest(xs: Vec<i32>) -> bool {
    let heap: Heap<i32> = xs.into_iter().collect();

    match heap.top() {
        Ok(top) => heap.iter().all(|x| x <= top),
        Err(_) => heap.is_empty(),
    }
}

#[quickcheck]
fn extract_max_sorts(xs: Vec<i16>) -> bool {
    let mut heap: Heap<i16> = xs.iter().copied().collect();
    let mut expected: Vec<i16> = xs.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    expected.reverse();

    let mut drained = Vec::new();
    while let Ok(max) = heap.extract_max() {
        drained.push(max);
    }
    drained == expected
}

#[quickcheck]
fn removed_values_are_gone(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut heap: Heap<i8> = xs.iter().copied().collect();
    for delete in &deletes {
        heap.remove(delete);
    }

    deletes.iter().all(|x| !heap.contains(x))
        && xs
            .iter()
            .filter(|x| !deletes.contains(x))
            .all(|x| heap.contains(x))
}

#[quickcheck]
fn listing_round_trip(xs: Vec<i32>) -> bool {
    let heap: Heap<i32> = xs.into_iter().collect();

    heap.to_string().parse::<Heap<i32>>() == Ok(heap)
}

#[quickcheck]
fn pair_list_round_trip(xs: Vec<i32>) -> bool {
    let heap: Heap<i32> = xs.into_iter().collect();

    Heap::<i32>::from_pairs(&heap.to_pairs()) == Ok(heap)
}

#[quickcheck]
fn subheaps_are_contained(xs: Vec<i8>) -> bool {
    let heap: Heap<i8> = xs.iter().copied().collect();

    heap.contains_subheap(&Heap::new())
        && heap.contains_subheap(&heap.clone())
        && xs
            .iter()
            .all(|x| heap.contains_subheap(&heap.extract_subheap(x)))
}
