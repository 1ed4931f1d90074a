//! Aggregation of benchmark records
//!
//! ## Modules
//!
//! - `stats` - mean, median, population standard deviation
//! - `matches` - match statistics per (dataset, detector)
//! - `homography` - inlier/timing statistics per (dataset, detector, threshold)

pub mod homography;
pub mod matches;
pub mod stats;

use std::collections::BTreeMap;

pub use homography::{
    group_homographies, summarize_homographies, HomographyKey, HomographySummary, ThresholdKey,
};
pub use matches::{summarize_matches, MatchSummary};
pub use stats::{mean, median, population_std_dev};

/// Group items under a composite key
///
/// Within a group, values keep the order of `items`.
pub fn group_by<'a, T, K, V>(
    items: &'a [T],
    key: impl Fn(&'a T) -> K,
    value: impl Fn(&'a T) -> V,
) -> BTreeMap<K, Vec<V>>
where
    K: Ord,
{
    let mut groups: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(value(item));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by() {
        let words = ["apple", "avocado", "banana", "blueberry", "cherry"];
        let groups = group_by(&words, |w| w.chars().next().unwrap(), |w| w.len());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&'a'], vec![5, 7]);
        assert_eq!(groups[&'b'], vec![6, 9]);
        assert_eq!(groups[&'c'], vec![6]);
    }

    #[test]
    fn test_group_by_empty() {
        let empty: [u8; 0] = [];
        assert!(group_by(&empty, |x| *x, |x| *x).is_empty());
    }
}
