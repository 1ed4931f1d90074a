//! PNG charts of benchmark results
//!
//! [`ChartWriter`] expects its output directory to exist already; the caller
//! creates it once before rendering. Every chart returns the files it wrote,
//! and writes nothing when its input is empty.
//!
//! | Chart | File |
//! |---|---|
//! | mean distance per pair | `mean_distance_bar_all.png` |
//! | distance histogram per (dataset, detector) | `histogram_<detector>_D<dataset>.png` |
//! | keypoints per detector per dataset | `keypoints_bar_all.png` |
//! | average inliers vs threshold | `homography_inliers_D<dataset>.png` |
//! | average time vs threshold | `homography_time_D<dataset>.png` |
//! | detector x threshold average inliers | `homography_heatmap_D<dataset>.png` |

pub mod canvas;

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use canvas::{heat_color, Canvas, DARKORANGE, MISSING, SEAGREEN, SERIES, STEELBLUE};

use crate::results::{DetectMap, MatchRecord};
use crate::summary::{group_by, HomographySummary, ThresholdKey};

/// Default number of histogram bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 40;

/// Renders charts into an existing directory
#[derive(Debug, Clone)]
pub struct ChartWriter {
    dir: PathBuf,
    histogram_bins: usize,
}

impl ChartWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Mean Hamming distance of every match record, one bar per pair
    pub fn mean_distance_bar(&self, matches: &[MatchRecord]) -> Result<Option<PathBuf>> {
        if matches.is_empty() {
            return Ok(None);
        }
        let values: Vec<f64> = matches.iter().map(|m| m.mean_dist).collect();
        let path = self.dir.join("mean_distance_bar_all.png");
        bar_chart(1000, 400, &values, STEELBLUE, 0.2).save(&path)?;
        tracing::info!("Wrote {:?}", path);
        Ok(Some(path))
    }

    /// Histogram of raw distances per (dataset, detector)
    pub fn distance_histograms(&self, matches: &[MatchRecord]) -> Result<Vec<PathBuf>> {
        let groups = group_by(matches, MatchRecord::key, |m| m.distances.as_slice());

        let mut written = Vec::new();
        for (key, samples) in groups {
            let distances: Vec<f64> = samples.concat();
            if distances.is_empty() {
                continue;
            }
            let counts: Vec<f64> = histogram_counts(&distances, self.histogram_bins)
                .into_iter()
                .map(|c| c as f64)
                .collect();
            let path = self
                .dir
                .join(format!("histogram_{}_D{}.png", key.detector, key.dataset));
            bar_chart(600, 400, &counts, DARKORANGE, 0.0).save(&path)?;
            tracing::debug!("Wrote {:?} ({} samples)", path, distances.len());
            written.push(path);
        }
        Ok(written)
    }

    /// Total keypoints per detect entry, in key order
    pub fn keypoints_bar(&self, detects: &DetectMap) -> Result<Option<PathBuf>> {
        if detects.is_empty() {
            return Ok(None);
        }
        let values: Vec<f64> = detects.values().map(|d| d.total_keypoints as f64).collect();
        let path = self.dir.join("keypoints_bar_all.png");
        bar_chart(700, 400, &values, SEAGREEN, 0.2).save(&path)?;
        tracing::info!("Wrote {:?}", path);
        Ok(Some(path))
    }

    /// Average inliers and average time versus threshold, one chart each per dataset
    pub fn homography_lines(&self, summaries: &[HomographySummary]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (dataset, rows) in group_by(summaries, |s| s.dataset.clone(), |s| s) {
            let inliers = series_by_detector(&rows, |s| s.avg_inliers);
            let path = self.dir.join(format!("homography_inliers_D{}.png", dataset));
            line_chart(800, 500, &inliers).save(&path)?;
            written.push(path);

            let times = series_by_detector(&rows, |s| s.avg_time_ms);
            let path = self.dir.join(format!("homography_time_D{}.png", dataset));
            line_chart(800, 500, &times).save(&path)?;
            written.push(path);
        }
        if !written.is_empty() {
            tracing::info!("Wrote {} homography line charts", written.len());
        }
        Ok(written)
    }

    /// Detector by threshold grid of average inliers, one per dataset
    pub fn homography_heatmaps(&self, summaries: &[HomographySummary]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (dataset, rows) in group_by(summaries, |s| s.dataset.clone(), |s| s) {
            let grid = HeatmapGrid::from_summaries(&rows);
            let path = self.dir.join(format!("homography_heatmap_D{}.png", dataset));
            heatmap(600, 400, &grid).save(&path)?;
            tracing::debug!(
                "Wrote {:?} ({} detectors x {} thresholds)",
                path,
                grid.detectors.len(),
                grid.thresholds.len()
            );
            written.push(path);
        }
        Ok(written)
    }
}

/// Equal-width bin counts between the sample minimum and maximum
///
/// The maximum lands in the last bin. When all samples are equal they share
/// the first bin.
pub fn histogram_counts(values: &[f64], bins: usize) -> Vec<usize> {
    let bins = bins.max(1);
    let mut counts = vec![0; bins];
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return counts;
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    for v in finite {
        let bin = if width > 0.0 {
            (((v - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts[bin] += 1;
    }
    counts
}

/// Points of one detector's curve, ordered by threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub detector: String,
    pub points: Vec<(f64, f64)>,
}

fn series_by_detector(
    rows: &[&HomographySummary],
    value: impl Fn(&HomographySummary) -> f64,
) -> Vec<Series> {
    group_by(rows, |s| s.detector.clone(), |s| (s.threshold, value(*s)))
        .into_iter()
        .map(|(detector, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            Series { detector, points }
        })
        .collect()
}

/// Average inliers laid out detector (rows) by threshold (columns)
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub detectors: Vec<String>,
    pub thresholds: Vec<f64>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl HeatmapGrid {
    pub fn from_summaries(rows: &[&HomographySummary]) -> Self {
        let detectors: Vec<String> = rows
            .iter()
            .map(|s| s.detector.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let thresholds: Vec<ThresholdKey> = rows
            .iter()
            .map(|s| ThresholdKey(s.threshold))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![None; thresholds.len()]; detectors.len()];
        for s in rows {
            let row = detectors.binary_search(&s.detector);
            let col = thresholds.binary_search(&ThresholdKey(s.threshold));
            if let (Ok(row), Ok(col)) = (row, col) {
                cells[row][col] = Some(s.avg_inliers);
            }
        }

        Self {
            detectors,
            thresholds: thresholds.into_iter().map(|t| t.0).collect(),
            cells,
        }
    }

    fn value_range(&self) -> Option<(f64, f64)> {
        let values = self.cells.iter().flatten().flatten().copied();
        values.fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

fn bar_chart(width: u32, height: u32, values: &[f64], color: image::Rgb<u8>, gap: f32) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    canvas.draw_axes();

    let max = values.iter().copied().fold(0.0, f64::max);
    let (left, _, plot_width, _) = canvas.plot_area();
    let slot = plot_width / values.len().max(1) as f32;
    let bar_width = slot * (1.0 - gap);

    for (i, value) in values.iter().enumerate() {
        let x = left + slot * i as f32 + (slot - bar_width) / 2.0;
        let y = canvas.y_for(*value, max);
        let base = canvas.y_for(0.0, max);
        if base > y {
            canvas.fill_rect(x, y, bar_width, base - y, color);
        }
    }
    canvas
}

fn line_chart(width: u32, height: u32, series: &[Series]) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    canvas.draw_axes();

    let points = series.iter().flat_map(|s| s.points.iter());
    let (x_min, x_max, y_max) = points.fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64),
        |(lo, hi, top), &(x, y)| (lo.min(x), hi.max(x), top.max(y)),
    );
    let (left, _, plot_width, _) = canvas.plot_area();
    let x_for = |x: f64| {
        if x_max > x_min {
            left + plot_width * ((x - x_min) / (x_max - x_min)) as f32
        } else {
            left + plot_width / 2.0
        }
    };

    for (i, s) in series.iter().enumerate() {
        let color = SERIES[i % SERIES.len()];
        let pixels: Vec<(f32, f32)> = s
            .points
            .iter()
            .map(|&(x, y)| (x_for(x), canvas.y_for(y, y_max)))
            .collect();
        for pair in pixels.windows(2) {
            canvas.line(pair[0], pair[1], color);
        }
        for p in pixels {
            canvas.marker(p, color);
        }
    }
    canvas
}

fn heatmap(width: u32, height: u32, grid: &HeatmapGrid) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    let (left, top, plot_width, plot_height) = canvas.plot_area();
    let rows = grid.detectors.len().max(1) as f32;
    let cols = grid.thresholds.len().max(1) as f32;
    let (cell_w, cell_h) = (plot_width / cols, plot_height / rows);
    let (lo, hi) = grid.value_range().unwrap_or((0.0, 0.0));

    for (r, row) in grid.cells.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let color = match cell {
                Some(v) if hi > lo => heat_color((v - lo) / (hi - lo)),
                Some(_) => heat_color(1.0),
                None => MISSING,
            };
            canvas.fill_rect(
                left + cell_w * c as f32,
                top + cell_h * r as f32,
                cell_w,
                cell_h,
                color,
            );
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::DetectionRecord;

    fn match_record(dataset: &str, detector: &str, mean_dist: f64, distances: Vec<f64>) -> MatchRecord {
        MatchRecord {
            dataset: dataset.to_string(),
            detector: detector.to_string(),
            pair: "1-2".to_string(),
            num_matches: distances.len() as u64,
            mean_dist,
            time_ms: 1.0,
            distances,
        }
    }

    fn homography(dataset: &str, detector: &str, threshold: f64, avg_inliers: f64) -> HomographySummary {
        HomographySummary {
            dataset: dataset.to_string(),
            detector: detector.to_string(),
            threshold,
            samples: 1,
            avg_inliers,
            total_inliers: avg_inliers as u64,
            avg_time_ms: 0.5,
            total_time_ms: 0.5,
        }
    }

    #[test]
    fn test_histogram_counts() {
        let counts = histogram_counts(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(histogram_counts(&[7.0, 7.0, 7.0], 4), vec![3, 0, 0, 0]);
        assert_eq!(histogram_counts(&[], 3), vec![0, 0, 0]);
        assert_eq!(histogram_counts(&[1.0, f64::NAN], 0), vec![1]);
    }

    #[test]
    fn test_empty_inputs_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let charts = ChartWriter::new(dir.path());

        assert!(charts.mean_distance_bar(&[]).unwrap().is_none());
        assert!(charts.distance_histograms(&[]).unwrap().is_empty());
        assert!(charts.keypoints_bar(&DetectMap::new()).unwrap().is_none());
        assert!(charts.homography_lines(&[]).unwrap().is_empty());
        assert!(charts.homography_heatmaps(&[]).unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_match_charts_written() {
        let dir = tempfile::tempdir().unwrap();
        let charts = ChartWriter::new(dir.path()).with_histogram_bins(8);
        let matches = vec![
            match_record("1", "ORB", 20.0, vec![10.0, 20.0, 30.0]),
            match_record("1", "AKAZE", 15.0, vec![]),
        ];

        let bar = charts.mean_distance_bar(&matches).unwrap().unwrap();
        assert!(bar.ends_with("mean_distance_bar_all.png"));
        assert!(bar.exists());

        let histograms = charts.distance_histograms(&matches).unwrap();
        assert_eq!(histograms.len(), 1);
        assert!(histograms[0].ends_with("histogram_ORB_D1.png"));
        assert!(histograms[0].exists());
    }

    #[test]
    fn test_keypoints_bar_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut detects = DetectMap::new();
        let d = DetectionRecord {
            dataset: "1".to_string(),
            detector: "ORB".to_string(),
            total_keypoints: 500,
            detect_time_ms: 12.0,
        };
        detects.insert(d.key(), d);

        let path = ChartWriter::new(dir.path()).keypoints_bar(&detects).unwrap().unwrap();
        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (700, 400));
    }

    #[test]
    fn test_homography_charts_per_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let charts = ChartWriter::new(dir.path());
        let summaries = vec![
            homography("1", "ORB", 1.0, 40.0),
            homography("1", "ORB", 5.0, 90.0),
            homography("2", "AKAZE", 5.0, 70.0),
        ];

        let lines = charts.homography_lines(&summaries).unwrap();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("homography_inliers_D1.png"));
        assert!(lines[1].ends_with("homography_time_D1.png"));
        assert!(lines.iter().all(|p| p.exists()));

        let heatmaps = charts.homography_heatmaps(&summaries).unwrap();
        assert_eq!(heatmaps.len(), 2);
        assert!(heatmaps[1].ends_with("homography_heatmap_D2.png"));
    }

    #[test]
    fn test_heatmap_grid_layout() {
        let summaries = vec![
            homography("1", "ORB", 5.0, 90.0),
            homography("1", "AKAZE", 1.0, 30.0),
            homography("1", "ORB", 1.0, 40.0),
        ];
        let rows: Vec<&HomographySummary> = summaries.iter().collect();
        let grid = HeatmapGrid::from_summaries(&rows);

        assert_eq!(grid.detectors, vec!["AKAZE", "ORB"]);
        assert_eq!(grid.thresholds, vec![1.0, 5.0]);
        assert_eq!(grid.cells[0], vec![Some(30.0), None]);
        assert_eq!(grid.cells[1], vec![Some(40.0), Some(90.0)]);
        assert_eq!(grid.value_range(), Some((30.0, 90.0)));
    }

    #[test]
    fn test_series_sorted_by_threshold() {
        let summaries = vec![
            homography("1", "ORB", 15.0, 95.0),
            homography("1", "ORB", 1.0, 40.0),
        ];
        let rows: Vec<&HomographySummary> = summaries.iter().collect();
        let series = series_by_detector(&rows, |s| s.avg_inliers);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points, vec![(1.0, 40.0), (15.0, 95.0)]);
    }
}
