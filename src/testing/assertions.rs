//! Assertion functions for comparing records read from sources.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
///
/// # Example
///
/// ```
/// use ironbeam_source::testing::assert_collections_equal;
///
/// assert_collections_equal(&["aaa", "aab"], &["aaa", "aab"]);
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

/// Assert that two collections hold the same elements with the same multiplicities,
/// ignoring order.
///
/// Duplicates count: a record read twice by overlapping shards fails this check even
/// when every expected record is present.
///
/// # Panics
///
/// Panics if any element occurs a different number of times in each collection.
///
/// # Example
///
/// ```
/// use ironbeam_source::testing::assert_collections_unordered_equal;
///
/// assert_collections_unordered_equal(&[3, 1, 2], &[1, 2, 3]);
/// ```
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    let actual_counts = counts(actual);
    let expected_counts = counts(expected);

    let mut missing: Vec<&T> = Vec::new();
    let mut unexpected: Vec<&T> = Vec::new();
    for (item, &n) in &expected_counts {
        let got = actual_counts.get(item).copied().unwrap_or(0);
        missing.extend(std::iter::repeat_n(*item, n.saturating_sub(got)));
    }
    for (item, &n) in &actual_counts {
        let want = expected_counts.get(item).copied().unwrap_or(0);
        unexpected.extend(std::iter::repeat_n(*item, n.saturating_sub(want)));
    }

    assert!(
        missing.is_empty() && unexpected.is_empty(),
        "Collections differ (ignoring order):\n  Expected length: {}\n  Actual length: {}\n  Missing: {missing:?}\n  Unexpected or duplicated: {unexpected:?}",
        expected.len(),
        actual.len()
    );
}

/// Assert that no element occurs more than once.
///
/// # Panics
///
/// Panics listing every duplicated element.
pub fn assert_no_duplicates<T: Debug + Eq + Hash>(collection: &[T]) {
    let mut duplicated: Vec<&T> = counts(collection)
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(item, _)| item)
        .collect();
    duplicated.dedup();
    assert!(
        duplicated.is_empty(),
        "Expected no duplicates, found: {duplicated:?}"
    );
}

fn counts<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut m = HashMap::with_capacity(items.len());
    for item in items {
        *m.entry(item).or_insert(0) += 1;
    }
    m
}
