//! Merge, rank and truncate helpers shared by sales reporting and the
//! patient dashboard
//!
//! All functions are pure. Grouping keeps keys in first-seen order and the
//! ranking sort is stable, so ties resolve to the key that appeared first.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::AddAssign;

use crate::models::{ChartEntry, GroupCount};

/// Bucket used for groups without a key
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Default number of rows kept by [`merge_grouped_counts`]
pub const DEFAULT_TOP_N: usize = 10;

/// Number of month-of-year buckets
pub const MONTH_BUCKETS: usize = 12;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Group `items` by `key` and sum `value`, keeping first-seen key order
pub fn group_sum<T, K, V, I, FK, FV>(items: I, mut key: FK, mut value: FV) -> Vec<(K, V)>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    V: AddAssign + Default,
    FK: FnMut(&T) -> K,
    FV: FnMut(&T) -> V,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, V)> = Vec::new();

    for item in items {
        let k = key(&item);
        let v = value(&item);
        match index.get(&k) {
            Some(&i) => groups[i].1 += v,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, v));
            }
        }
    }
    groups
}

/// Stable descending sort by `value`, truncated to `limit`
pub fn rank_desc<T, V, F>(mut rows: Vec<T>, limit: usize, mut value: F) -> Vec<T>
where
    V: Ord,
    F: FnMut(&T) -> V,
{
    rows.sort_by(|a, b| value(b).cmp(&value(a)));
    rows.truncate(limit);
    rows
}

/// Merge grouped counts from several sources into one ranked view
///
/// Counts for the same key are summed across sources, a missing key lands in
/// the [`UNKNOWN_BUCKET`], rows are sorted by descending count and only the
/// first `top_n` are kept.
pub fn merge_grouped_counts<I, S>(sources: I, top_n: usize) -> Vec<ChartEntry>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = GroupCount>,
{
    merge_grouped_counts_with(sources, top_n, str::to_string)
}

/// [`merge_grouped_counts`] followed by relabelling each surviving row
pub fn merge_grouped_counts_with<I, S, F>(sources: I, top_n: usize, relabel: F) -> Vec<ChartEntry>
where
    I: IntoIterator<Item = S>,
    S: IntoIterator<Item = GroupCount>,
    F: Fn(&str) -> String,
{
    let merged = group_sum(
        sources.into_iter().flatten(),
        |row| row.key.clone().unwrap_or_else(|| UNKNOWN_BUCKET.to_string()),
        |row| row.count,
    );

    rank_desc(merged, top_n, |(_, count)| *count)
        .into_iter()
        .map(|(name, value)| ChartEntry {
            name: relabel(&name),
            value,
        })
        .collect()
}

/// Short month name for a 1-based month index; anything else is
/// [`UNKNOWN_BUCKET`]
pub fn month_label(index: &str) -> String {
    index
        .parse::<usize>()
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| MONTH_NAMES.get(i))
        .map_or_else(|| UNKNOWN_BUCKET.to_string(), |name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gc(key: Option<&str>, count: i64) -> GroupCount {
        GroupCount::new(key, count)
    }

    fn entry(name: &str, value: i64) -> ChartEntry {
        ChartEntry {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_merge_sums_across_sources_and_maps_null() {
        let a = vec![gc(Some("Male"), 3)];
        let b = vec![gc(Some("Male"), 2), gc(None, 1)];
        let merged = merge_grouped_counts(vec![a, b], DEFAULT_TOP_N);
        assert_eq!(merged, vec![entry("Male", 5), entry("Unknown", 1)]);
    }

    #[test]
    fn test_merge_truncates_to_top_n() {
        let source: Vec<GroupCount> = (0..15)
            .map(|i| gc(Some(&format!("dx-{}", i)), i + 1))
            .collect();
        let merged = merge_grouped_counts(vec![source], 10);
        assert_eq!(merged.len(), 10);
        assert_eq!(merged[0], entry("dx-14", 15));
        assert!(merged.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_merge_ties_keep_first_seen_order() {
        let a = vec![gc(Some("Flu"), 2), gc(Some("Malaria"), 2)];
        let b = vec![gc(Some("Cold"), 2)];
        let merged = merge_grouped_counts(vec![a, b], 10);
        let names: Vec<_> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Malaria", "Cold"]);
    }

    #[test]
    fn test_merge_of_nothing_is_empty() {
        let merged = merge_grouped_counts(Vec::<Vec<GroupCount>>::new(), 10);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_explicit_unknown_and_null_share_a_bucket() {
        let merged = merge_grouped_counts(vec![vec![gc(None, 1), gc(Some("Unknown"), 4)]], 10);
        assert_eq!(merged, vec![entry("Unknown", 5)]);
    }

    #[test]
    fn test_month_relabel() {
        let source = vec![gc(Some("3"), 4), gc(Some("12"), 6), gc(Some("13"), 1)];
        let merged = merge_grouped_counts_with(vec![source], MONTH_BUCKETS, month_label);
        assert_eq!(
            merged,
            vec![entry("Dec", 6), entry("Mar", 4), entry("Unknown", 1)]
        );
    }

    #[test]
    fn test_month_label_bounds() {
        assert_eq!(month_label("1"), "Jan");
        assert_eq!(month_label("12"), "Dec");
        assert_eq!(month_label("0"), "Unknown");
        assert_eq!(month_label("Unknown"), "Unknown");
    }

    #[test]
    fn test_group_sum_keeps_first_seen_order() {
        let rows = vec![("b", 1), ("a", 2), ("b", 3)];
        let grouped = group_sum(rows, |r| r.0, |r| r.1);
        assert_eq!(grouped, vec![("b", 4), ("a", 2)]);
    }

    proptest! {
        #[test]
        fn prop_merge_preserves_total_when_not_truncated(
            counts in prop::collection::vec((0usize..8, 1i64..50), 0..40)
        ) {
            let source: Vec<GroupCount> = counts
                .iter()
                .map(|(k, c)| gc(Some(&format!("k{}", k)), *c))
                .collect();
            let expected: i64 = counts.iter().map(|(_, c)| c).sum();
            let merged = merge_grouped_counts(vec![source], 8);
            prop_assert_eq!(merged.iter().map(|e| e.value).sum::<i64>(), expected);
        }

        #[test]
        fn prop_merge_is_sorted_and_bounded(
            counts in prop::collection::vec((0usize..30, 1i64..50), 0..60),
            top_n in 1usize..15
        ) {
            let source: Vec<GroupCount> = counts
                .iter()
                .map(|(k, c)| gc(Some(&format!("k{}", k)), *c))
                .collect();
            let merged = merge_grouped_counts(vec![source], top_n);
            prop_assert!(merged.len() <= top_n);
            prop_assert!(merged.windows(2).all(|w| w[0].value >= w[1].value));
        }
    }
}
