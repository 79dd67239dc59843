//! # Diff Engine
//!
//! The pure comparison primitive the whole engine is built on.
//!
//! ## Contract
//!
//! Given two category-count mappings `a` and `b`, [`count_diff`] returns
//! every key that is "ahead" in `a` relative to `b`: either absent from `b`
//! or strictly greater than `b`'s count, carrying `a`'s value.
//!
//! The same function serves both diff sources of the pipeline:
//!
//! - server diff: `count_diff(live, cache)` - categories with new remote
//!   documents since the last sync
//! - folder diff: `count_diff(cache, inventory)` - categories where the cache
//!   claims more documents than are actually on disk (crash recovery,
//!   external deletion)
//!
//! ## Known limitation
//!
//! The comparison is strictly greater-than: a category whose remote count
//! *decreases* is never surfaced. Server document counts are treated as
//! monotonically non-decreasing within an academic term.

use portal_traits::CategoryCounts;

/// Compare two count mappings and return the keys ahead in `a`.
///
/// Degenerate cases: with `b` absent the result is `a` unchanged (everything
/// is new); with `a` absent the result is `b` unchanged (no new information,
/// the other side is preserved). Pure and deterministic.
///
/// # Example
///
/// ```
/// use core_sync::count_diff;
/// use std::collections::BTreeMap;
///
/// let live = BTreeMap::from([("Slides".to_string(), 3), ("Exercises".to_string(), 1)]);
/// let cached = BTreeMap::from([("Slides".to_string(), 3)]);
///
/// let diff = count_diff(Some(&live), Some(&cached));
/// assert_eq!(diff, BTreeMap::from([("Exercises".to_string(), 1)]));
/// ```
pub fn count_diff(a: Option<&CategoryCounts>, b: Option<&CategoryCounts>) -> CategoryCounts {
    match (a, b) {
        (Some(a), Some(b)) => a
            .iter()
            .filter(|(key, count)| b.get(*key).is_none_or(|cached| *count > cached))
            .map(|(key, count)| (key.clone(), *count))
            .collect(),
        (Some(a), None) => a.clone(),
        (None, Some(b)) => b.clone(),
        (None, None) => CategoryCounts::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> CategoryCounts {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_absent_cache_returns_live_unchanged() {
        let a = counts(&[("Slides", 3), ("Exercises", 1)]);
        assert_eq!(count_diff(Some(&a), None), a);
    }

    #[test]
    fn test_absent_live_returns_cache_unchanged() {
        let b = counts(&[("Slides", 3)]);
        assert_eq!(count_diff(None, Some(&b)), b);
    }

    #[test]
    fn test_both_absent_is_empty() {
        assert!(count_diff(None, None).is_empty());
    }

    #[test]
    fn test_self_diff_is_empty() {
        let a = counts(&[("Slides", 3), ("Exercises", 1), ("Exams", 7)]);
        assert!(count_diff(Some(&a), Some(&a)).is_empty());
    }

    #[test]
    fn test_new_key_is_reported_with_its_count() {
        let a = counts(&[("Slides", 3), ("Exercises", 1)]);
        let b = counts(&[("Slides", 3)]);

        assert_eq!(count_diff(Some(&a), Some(&b)), counts(&[("Exercises", 1)]));
    }

    #[test]
    fn test_increased_count_is_reported() {
        let a = counts(&[("Slides", 5)]);
        let b = counts(&[("Slides", 3)]);

        assert_eq!(count_diff(Some(&a), Some(&b)), counts(&[("Slides", 5)]));
    }

    #[test]
    fn test_decreased_count_is_not_reported() {
        let a = counts(&[("Slides", 2)]);
        let b = counts(&[("Slides", 3)]);

        assert!(count_diff(Some(&a), Some(&b)).is_empty());
    }

    #[test]
    fn test_equal_counts_are_not_reported() {
        let a = counts(&[("Slides", 3)]);
        let b = counts(&[("Slides", 3)]);

        assert!(count_diff(Some(&a), Some(&b)).is_empty());
    }

    // Soundness and completeness over a mixed mapping: every reported key is
    // ahead in `a`, and every key ahead in `a` is reported.
    #[test]
    fn test_soundness_and_completeness() {
        let a = counts(&[("A", 1), ("B", 5), ("C", 2), ("D", 4)]);
        let b = counts(&[("A", 1), ("B", 3), ("C", 9)]);

        let diff = count_diff(Some(&a), Some(&b));

        for (key, count) in &diff {
            let ahead = match b.get(key) {
                None => true,
                Some(cached) => count > cached,
            };
            assert!(ahead, "{key} reported but not ahead");
            assert_eq!(count, a.get(key).unwrap());
        }
        for (key, count) in &a {
            let ahead = match b.get(key) {
                None => true,
                Some(cached) => count > cached,
            };
            assert_eq!(diff.contains_key(key), ahead, "{key} wrongly classified");
        }
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let a = counts(&[("Slides", 3), ("Exercises", 1)]);
        let b = counts(&[("Slides", 1)]);

        assert_eq!(
            count_diff(Some(&a), Some(&b)),
            count_diff(Some(&a), Some(&b))
        );
    }
}
