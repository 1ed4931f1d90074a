//! Per (dataset, detector, threshold) homography statistics
//!
//! Both the inlier chart and the timing chart read from the same grouping, so
//! a record lands in exactly one [`HomographySummary`].

use std::cmp::Ordering;

use super::group_by;
use super::stats::mean;
use crate::results::HomographyRecord;

/// RANSAC threshold usable as an ordered map key
///
/// Ordering follows [`f64::total_cmp`]; equality is bitwise, so `5.0` and
/// `5.000001` are different groups.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdKey(pub f64);

impl PartialEq for ThresholdKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ThresholdKey {}

impl PartialOrd for ThresholdKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ThresholdKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Composite grouping key for homography observations
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HomographyKey {
    pub dataset: String,
    pub detector: String,
    pub threshold: ThresholdKey,
}

impl HomographyKey {
    pub fn of(record: &HomographyRecord) -> Self {
        Self {
            dataset: record.dataset.clone(),
            detector: record.detector.clone(),
            threshold: ThresholdKey(record.threshold),
        }
    }
}

/// Inlier and timing statistics for one (dataset, detector, threshold)
#[derive(Debug, Clone, PartialEq)]
pub struct HomographySummary {
    pub dataset: String,
    pub detector: String,
    pub threshold: f64,
    /// Image pairs observed at this threshold
    pub samples: usize,
    pub avg_inliers: f64,
    pub total_inliers: u64,
    pub avg_time_ms: f64,
    pub total_time_ms: f64,
}

/// Group homography records by (dataset, detector, threshold)
pub fn group_homographies(
    records: &[HomographyRecord],
) -> std::collections::BTreeMap<HomographyKey, Vec<&HomographyRecord>> {
    group_by(records, HomographyKey::of, |record| record)
}

/// Summarise homography records, in ascending key order
pub fn summarize_homographies(records: &[HomographyRecord]) -> Vec<HomographySummary> {
    group_homographies(records)
        .into_iter()
        .map(|(key, group)| {
            let inliers: Vec<f64> = group.iter().map(|r| r.num_inliers as f64).collect();
            let times: Vec<f64> = group.iter().map(|r| r.time_ms).collect();
            HomographySummary {
                dataset: key.dataset,
                detector: key.detector,
                threshold: key.threshold.0,
                samples: group.len(),
                avg_inliers: mean(&inliers),
                total_inliers: group.iter().map(|r| r.num_inliers).sum(),
                avg_time_ms: mean(&times),
                total_time_ms: times.iter().sum(),
            }
        })
        .collect()
}
