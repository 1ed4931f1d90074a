//! Typed records read from benchmark result files
//!
//! One result file mixes three kinds of rows (detection, match, homography)
//! distinguished by their `type` column. Each kind gets its own record type
//! and [`ResultRow`] is the tagged union the reader produces per row.

use std::collections::BTreeMap;
use std::fmt;

/// Grouping key shared by detections and match summaries
///
/// Keys compare by exact string equality; ordering is lexicographic on
/// dataset first, then detector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub dataset: String,
    pub detector: String,
}

impl GroupKey {
    pub fn new(dataset: impl Into<String>, detector: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            detector: detector.into(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}-{}", self.dataset, self.detector)
    }
}

/// Keypoint detection outcome for one detector on one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
    /// Dataset tag derived from the file name
    pub dataset: String,
    /// Detector name (ORB, AKAZE, ...)
    pub detector: String,
    /// Keypoints found across all images of the dataset
    pub total_keypoints: u64,
    /// Wall time spent detecting, in milliseconds
    pub detect_time_ms: f64,
}

impl DetectionRecord {
    pub fn key(&self) -> GroupKey {
        GroupKey::new(&self.dataset, &self.detector)
    }
}

/// Descriptor matching outcome for one image pair
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub dataset: String,
    pub detector: String,
    /// Pair identifier, `"{img_i}-{img_j}"`
    pub pair: String,
    pub num_matches: u64,
    /// Mean Hamming distance over all matches of the pair
    pub mean_dist: f64,
    pub time_ms: f64,
    /// Raw per-match distances, possibly empty
    pub distances: Vec<f64>,
}

impl MatchRecord {
    pub fn key(&self) -> GroupKey {
        GroupKey::new(&self.dataset, &self.detector)
    }
}

/// Homography estimation outcome for one image pair at one RANSAC threshold
#[derive(Debug, Clone, PartialEq)]
pub struct HomographyRecord {
    pub dataset: String,
    pub detector: String,
    pub img_i: u32,
    pub img_j: u32,
    /// RANSAC inlier threshold in pixels
    pub threshold: f64,
    pub num_inliers: u64,
    pub time_ms: f64,
}

impl HomographyRecord {
    pub fn key(&self) -> GroupKey {
        GroupKey::new(&self.dataset, &self.detector)
    }
}

/// One parsed row of a result file, dispatched on its `type` column
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRow {
    Detection(DetectionRecord),
    Match(MatchRecord),
    Homography(HomographyRecord),
}

/// Row kinds recognised in the `type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Detect,
    Match,
    Homography,
}

impl RowKind {
    /// Parse a `type` value; unknown kinds yield `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "detect" => Some(Self::Detect),
            "match" => Some(Self::Match),
            "homography" => Some(Self::Homography),
            _ => None,
        }
    }
}

/// At most one detection per (dataset, detector); later inserts overwrite
pub type DetectMap = BTreeMap<GroupKey, DetectionRecord>;

/// The three record collections read from one file or a whole corpus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub detects: DetectMap,
    pub matches: Vec<MatchRecord>,
    pub homographies: Vec<HomographyRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one parsed row to the matching collection
    pub fn push(&mut self, row: ResultRow) {
        match row {
            ResultRow::Detection(detect) => {
                self.detects.insert(detect.key(), detect);
            }
            ResultRow::Match(record) => self.matches.push(record),
            ResultRow::Homography(record) => self.homographies.push(record),
        }
    }

    /// Merge a later result set into this one
    ///
    /// Match and homography records accumulate in order. Detections with a
    /// key already present are replaced by the incoming record.
    pub fn merge(&mut self, other: ResultSet) {
        self.detects.extend(other.detects);
        self.matches.extend(other.matches);
        self.homographies.extend(other.homographies);
    }

    pub fn is_empty(&self) -> bool {
        self.detects.is_empty() && self.matches.is_empty() && self.homographies.is_empty()
    }

    /// Total records across all three collections
    pub fn len(&self) -> usize {
        self.detects.len() + self.matches.len() + self.homographies.len()
    }
}
