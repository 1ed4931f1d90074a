//! Per (dataset, detector) match statistics

use super::group_by;
use super::stats::{mean, median, population_std_dev};
use crate::results::{GroupKey, MatchRecord};

/// Statistics over all match records sharing a (dataset, detector) key
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub dataset: String,
    pub detector: String,
    /// Number of image pairs (records) in the group
    pub pairs: usize,
    pub avg_mean_dist: f64,
    pub median_mean_dist: f64,
    /// Population standard deviation; 0.0 for a single pair
    pub std_mean_dist: f64,
    pub total_matches: u64,
    pub avg_matches_per_pair: f64,
    pub avg_match_time_ms: f64,
    pub total_match_time_ms: f64,
}

impl MatchSummary {
    pub fn key(&self) -> GroupKey {
        GroupKey::new(&self.dataset, &self.detector)
    }

    fn from_group(key: GroupKey, records: &[&MatchRecord]) -> Self {
        let mean_dists: Vec<f64> = records.iter().map(|r| r.mean_dist).collect();
        let matches: Vec<f64> = records.iter().map(|r| r.num_matches as f64).collect();
        let times: Vec<f64> = records.iter().map(|r| r.time_ms).collect();

        Self {
            dataset: key.dataset,
            detector: key.detector,
            pairs: records.len(),
            avg_mean_dist: mean(&mean_dists),
            median_mean_dist: median(&mean_dists),
            std_mean_dist: population_std_dev(&mean_dists),
            total_matches: records.iter().map(|r| r.num_matches).sum(),
            avg_matches_per_pair: mean(&matches),
            avg_match_time_ms: mean(&times),
            total_match_time_ms: times.iter().sum(),
        }
    }
}

/// Summarise match records per (dataset, detector)
///
/// One summary per non-empty group. Callers should index the result by
/// [`MatchSummary::key`] rather than rely on its order.
pub fn summarize_matches(matches: &[MatchRecord]) -> Vec<MatchSummary> {
    group_by(matches, MatchRecord::key, |record| record)
        .into_iter()
        .map(|(key, records)| MatchSummary::from_group(key, &records))
        .collect()
}
