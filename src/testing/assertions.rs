//! Assertion functions for comparing combine outputs.
//!
//! Combine results come out of a shuffle, so their order is unspecified;
//! every helper here compares without regard to order.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections contain the same elements with the same
/// multiplicities, ignoring order.
///
/// # Panics
///
/// Panics if the collections differ in content.
///
/// # Example
///
/// ```
/// use ironcombine::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 2, 1], &[1, 1, 2, 3]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    fn counts<T: Eq + Hash>(xs: &[T]) -> HashMap<&T, usize> {
        let mut m = HashMap::new();
        for x in xs {
            *m.entry(x).or_insert(0) += 1;
        }
        m
    }

    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );
    assert!(
        counts(actual) == counts(expected),
        "Collection content mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that two keyed collections are equal after sorting by key.
///
/// Also fails if `actual` holds the same key twice, which a combine must
/// never produce.
///
/// # Panics
///
/// Panics if the collections differ after sorting, or on a duplicate key.
///
/// # Example
///
/// ```
/// use ironcombine::testing::assert_kv_collections_equal;
///
/// assert_kv_collections_equal(vec![("b", 2), ("a", 1)], vec![("a", 1), ("b", 2)]);
/// ```
pub fn assert_kv_collections_equal<K, V>(mut actual: Vec<(K, V)>, mut expected: Vec<(K, V)>)
where
    K: Debug + Ord,
    V: Debug + PartialEq,
{
    actual.sort_by(|a, b| a.0.cmp(&b.0));
    expected.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(w) = actual.windows(2).find(|w| w[0].0 == w[1].0) {
        panic!("Duplicate key in output: {:?}\n  Actual: {actual:?}", w[0].0);
    }

    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, ((ak, av), (ek, ev))) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            ak == ek && av == ev,
            "Collection mismatch at index {i} after sorting:\n  Expected: ({ek:?}, {ev:?})\n  Actual: ({ak:?}, {av:?})\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}
