//! Assertion functions for testing stream outputs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_collections_equal;
///
/// assert_collections_equal(&[1, 2, 3], &[1, 2, 3]);
/// ```
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order. Use it for outputs of `for_each` or
/// collectors on parallel streams, where arrival order is not fixed.
///
/// # Panics
///
/// Panics if some element occurs a different number of times.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 2, 1], &[1, 1, 2, 3]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    let actual_counts = multiplicities(actual);
    let expected_counts = multiplicities(expected);
    if actual_counts != expected_counts {
        let missing: Vec<_> = expected_counts
            .iter()
            .filter(|(item, n)| actual_counts.get(*item).copied().unwrap_or(0) < **n)
            .map(|(item, _)| item)
            .collect();
        let extra: Vec<_> = actual_counts
            .iter()
            .filter(|(item, n)| expected_counts.get(*item).copied().unwrap_or(0) < **n)
            .map(|(item, _)| item)
            .collect();
        panic!(
            "Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
}

fn multiplicities<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Assert that a vector is sorted by `cmp`.
///
/// # Panics
///
/// Panics at the first adjacent pair that is out of order.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_sorted_by;
///
/// assert_sorted_by(&[3, 2, 2, 1], |a, b| b.cmp(a));
/// ```
pub fn assert_sorted_by<T: Debug>(collection: &[T], cmp: impl Fn(&T, &T) -> std::cmp::Ordering) {
    for (i, pair) in collection.windows(2).enumerate() {
        assert!(
            cmp(&pair[0], &pair[1]) != std::cmp::Ordering::Greater,
            "Collection out of order at index {i}:\n  {:?} before {:?}\n  Collection: {collection:?}",
            pair[0],
            pair[1]
        );
    }
}

/// Assert that two hashmaps are equal.
///
/// # Panics
///
/// Panics if the hashmaps differ in keys or values.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_maps_equal;
/// use std::collections::HashMap;
///
/// let actual = HashMap::from([("a", 1), ("b", 2)]);
/// let expected = HashMap::from([("b", 2), ("a", 1)]);
/// assert_maps_equal(&actual, &expected);
/// ```
pub fn assert_maps_equal<K, V, S: BuildHasher>(
    actual: &HashMap<K, V, S>,
    expected: &HashMap<K, V, S>,
) where
    K: Debug + Eq + Hash,
    V: Debug + PartialEq,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "HashMap size mismatch:\n  Expected size: {}\n  Actual size: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (key, expected_value) in expected {
        match actual.get(key) {
            Some(actual_value) if actual_value == expected_value => {}
            Some(actual_value) => {
                panic!(
                    "HashMap value mismatch for key {key:?}:\n  Expected: {expected_value:?}\n  Actual: {actual_value:?}"
                );
            }
            None => {
                panic!("HashMap missing key: {key:?}");
            }
        }
    }
}

/// Assert that two maps of groups hold the same keys and, per key, the same
/// values in any order. Matches the output of `grouping_by_to_vec` on a
/// parallel stream.
///
/// # Panics
///
/// Panics if the key sets differ or a group differs in content.
///
/// # Example
///
/// ```
/// use ironstream::testing::assert_groups_equal;
/// use std::collections::HashMap;
///
/// let actual = HashMap::from([(1, vec!["b", "a"]), (2, vec!["cc"])]);
/// let expected = HashMap::from([(1, vec!["a", "b"]), (2, vec!["cc"])]);
/// assert_groups_equal(&actual, &expected);
/// ```
pub fn assert_groups_equal<K, V, S: BuildHasher>(
    actual: &HashMap<K, Vec<V>, S>,
    expected: &HashMap<K, Vec<V>, S>,
) where
    K: Debug + Eq + Hash,
    V: Debug + Eq + Hash,
{
    assert_eq!(
        actual.len(),
        expected.len(),
        "Group count mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (key, expected_group) in expected {
        let Some(actual_group) = actual.get(key) else {
            panic!("Missing group for key {key:?}");
        };
        assert_collections_unordered_equal(actual_group, expected_group);
    }
}
