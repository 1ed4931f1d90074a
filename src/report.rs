//! Console overview joining detections with match summaries
//!
//! One line per detect-map entry, in ascending (dataset, detector) order:
//!
//! ```text
//! D1-ORB: total_kp=500, detect_time_ms=12.00, pairs=2, avg_match_time_ms=6.0, avg_mean_dist=15.0
//! ```
//!
//! Summary-derived fields print as `-` when no match summary exists for the
//! key. Summaries without a detection are not reported.

use std::collections::{HashMap, HashSet};

use crate::results::{DetectMap, DetectionRecord, GroupKey};
use crate::summary::MatchSummary;

/// Title printed above the overview lines
pub const OVERVIEW_TITLE: &str = "=== Overview (per dataset & detector) ===";

/// Placeholder for fields of a missing summary
pub const PLACEHOLDER: &str = "-";

/// Build the overview lines
pub fn format_overview(detects: &DetectMap, summaries: &[MatchSummary]) -> Vec<String> {
    let index: HashMap<GroupKey, &MatchSummary> =
        summaries.iter().map(|s| (s.key(), s)).collect();

    detects
        .iter()
        .map(|(key, detect)| format_line(detect, index.get(key).copied()))
        .collect()
}

/// Print the overview to stdout
pub fn print_overview(detects: &DetectMap, summaries: &[MatchSummary]) {
    println!("{}", OVERVIEW_TITLE);
    for line in format_overview(detects, summaries) {
        println!("{}", line);
    }
}

/// Detect-map keys that have no match summary
pub fn missing_summaries(detects: &DetectMap, summaries: &[MatchSummary]) -> Vec<GroupKey> {
    let summarized: HashSet<GroupKey> = summaries.iter().map(MatchSummary::key).collect();
    detects
        .keys()
        .filter(|key| !summarized.contains(*key))
        .cloned()
        .collect()
}

fn format_line(detect: &DetectionRecord, summary: Option<&MatchSummary>) -> String {
    let (pairs, avg_time, avg_dist) = match summary {
        Some(s) => (
            s.pairs.to_string(),
            format_float(s.avg_match_time_ms),
            format_float(s.avg_mean_dist),
        ),
        None => (
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
        ),
    };

    format!(
        "D{}-{}: total_kp={}, detect_time_ms={:.2}, pairs={}, avg_match_time_ms={}, avg_mean_dist={}",
        detect.dataset, detect.detector, detect.total_keypoints, detect.detect_time_ms, pairs, avg_time, avg_dist
    )
}

/// Shortest round-trip form, always with a decimal point (`6.0`, `6.125`)
///
/// Very large or small magnitudes switch to exponent form with a signed,
/// two-digit exponent (`1e+16`, `1.5e-05`).
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}
