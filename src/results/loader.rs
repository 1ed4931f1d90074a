//! Corpus loader for benchmark result files
//!
//! Finds every result file matching a glob pattern and merges them into one
//! [`ResultSet`].
//!
//! ```rust,ignore
//! let config = LoaderConfig::new()
//!     .with_pattern("results/results*.txt")
//!     .with_tag_prefix("results");
//!
//! let corpus = load_corpus(&config)?;
//! ```
//!
//! Files are processed in sorted path order, so the merge is reproducible:
//! match and homography records concatenate in that order, and a detection
//! read from a later file replaces one with the same (dataset, detector).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::reader::read_results_file;
use super::records::ResultSet;
use crate::error::ReadError;

/// Tag used when a file name yields no dataset tag
pub const UNKNOWN_DATASET: &str = "?";

/// Default glob for result files
pub const DEFAULT_PATTERN: &str = "results/results*.txt";

/// Default file name prefix stripped to obtain the dataset tag
pub const DEFAULT_TAG_PREFIX: &str = "results";

/// Configuration for corpus loading
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Glob pattern selecting result files
    pub pattern: String,

    /// File name prefix removed when deriving the dataset tag
    pub tag_prefix: String,

    /// Skip files with malformed rows instead of failing the whole load
    pub skip_malformed_files: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
            skip_malformed_files: false,
        }
    }
}

impl LoaderConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the glob pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the file name prefix used for dataset tags
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    /// Skip malformed files (logged) rather than aborting
    pub fn with_skip_malformed_files(mut self, skip: bool) -> Self {
        self.skip_malformed_files = skip;
        self
    }

    /// Derive the dataset tag for a result file
    ///
    /// Takes the file name, keeps what follows the last occurrence of the
    /// prefix and drops everything from the first `.` on. `results3.txt`
    /// with prefix `results` gives `"3"`. An empty tag becomes `"?"`.
    pub fn dataset_tag(&self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        let name: &str = &file_name;

        let rest = if self.tag_prefix.is_empty() {
            name
        } else {
            name.rsplit_once(self.tag_prefix.as_str())
                .map_or(name, |(_, rest)| rest)
        };
        let tag = rest.split('.').next().unwrap_or("");

        if tag.is_empty() {
            UNKNOWN_DATASET.to_string()
        } else {
            tag.to_string()
        }
    }
}

/// All records read from the result files of one run
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Files that contributed records, in processing order
    pub sources: Vec<PathBuf>,
    /// Merged records
    pub results: ResultSet,
}

impl Corpus {
    pub fn file_count(&self) -> usize {
        self.sources.len()
    }
}

/// List result files matching the pattern, sorted by path
pub fn discover_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .with_context(|| format!("Invalid result file pattern: {}", pattern))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.context("Failed to read result file entry")?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load every result file matching the configured pattern
///
/// Zero matching files is a valid, empty corpus.
pub fn load_corpus(config: &LoaderConfig) -> Result<Corpus> {
    let paths = discover_files(&config.pattern)?;
    if paths.is_empty() {
        tracing::info!("No result files match '{}'", config.pattern);
    }

    let mut corpus = Corpus::default();
    for path in paths {
        let tag = config.dataset_tag(&path);
        match read_results_file(&path, &tag) {
            Ok(results) => {
                corpus.results.merge(results);
                corpus.sources.push(path);
            }
            Err(ReadError::Parse(err)) if config.skip_malformed_files => {
                let file = err.file().to_path_buf();
                tracing::warn!(
                    "Skipping malformed result file {:?}: {:#}",
                    file,
                    anyhow::Error::new(err)
                );
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to load result file {:?}", path));
            }
        }
    }

    tracing::info!(
        "Loaded {} result files: {} detect, {} match, {} homography records",
        corpus.file_count(),
        corpus.results.detects.len(),
        corpus.results.matches.len(),
        corpus.results.homographies.len()
    );

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::results::records::GroupKey;
    use std::fs;

    const HEADER: &str = "type,detector,img_i,img_j,num_matches,mean_dist,time_ms,distances";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), format!("{}\n{}", HEADER, body)).unwrap();
    }

    fn pattern(dir: &Path) -> String {
        format!("{}/results*.txt", dir.display())
    }

    #[test]
    fn test_dataset_tag() {
        let config = LoaderConfig::new();
        assert_eq!(config.dataset_tag(Path::new("results/results3.txt")), "3");
        assert_eq!(config.dataset_tag(Path::new("results12.csv")), "12");
        assert_eq!(config.dataset_tag(Path::new("results/results.txt")), "?");
        assert_eq!(config.dataset_tag(Path::new("pan1.txt")), "pan1");

        let config = LoaderConfig::new().with_tag_prefix("run_");
        assert_eq!(config.dataset_tag(Path::new("out/run_a.log")), "a");
    }

    #[test]
    fn test_no_matching_files_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = load_corpus(&LoaderConfig::new().with_pattern(pattern(dir.path()))).unwrap();
        assert_eq!(corpus.file_count(), 0);
        assert!(corpus.results.is_empty());
    }

    #[test]
    fn test_files_processed_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results2.txt", "match,ORB,1,2,5,20,1.0");
        write(dir.path(), "results1.txt", "match,ORB,1,2,5,10,1.0");

        let corpus = load_corpus(&LoaderConfig::new().with_pattern(pattern(dir.path()))).unwrap();
        let datasets: Vec<_> = corpus.results.matches.iter().map(|m| m.dataset.as_str()).collect();
        assert_eq!(datasets, vec!["1", "2"]);
        assert!(corpus.sources[0].ends_with("results1.txt"));
    }

    #[test]
    fn test_later_file_detection_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results1.a.txt", "detect,ORB,,,100,,1.0");
        write(dir.path(), "results1.b.txt", "detect,ORB,,,300,,3.0");
        let corpus = load_corpus(&LoaderConfig::new().with_pattern(pattern(dir.path()))).unwrap();
        assert_eq!(corpus.results.detects.len(), 1);
        assert_eq!(corpus.results.detects[&GroupKey::new("1", "ORB")].total_keypoints, 300);
    }

    #[test]
    fn test_distinct_tags_keep_both_detections() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results1.txt", "detect,ORB,,,100,,1.0");
        write(dir.path(), "results1b.txt", "detect,ORB,,,300,,3.0");

        let corpus = load_corpus(&LoaderConfig::new().with_pattern(pattern(dir.path()))).unwrap();
        assert_eq!(corpus.results.detects.len(), 2);
        assert!(corpus.results.detects.contains_key(&GroupKey::new("1b", "ORB")));
    }

    #[test]
    fn test_malformed_file_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results1.txt", "match,ORB,1,2,5,oops,1.0");

        let err = load_corpus(&LoaderConfig::new().with_pattern(pattern(dir.path()))).unwrap_err();
        let parse = err.downcast_ref::<ReadError>().unwrap();
        assert!(matches!(parse, ReadError::Parse(ParseError::InvalidField { .. })));
    }

    #[test]
    fn test_malformed_file_skipped_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "results1.txt", "match,ORB,1,2,5,oops,1.0");
        write(dir.path(), "results2.txt", "match,ORB,1,2,5,10,1.0");

        let config = LoaderConfig::new()
            .with_pattern(pattern(dir.path()))
            .with_skip_malformed_files(true);
        let corpus = load_corpus(&config).unwrap();
        assert_eq!(corpus.file_count(), 1);
        assert_eq!(corpus.results.matches.len(), 1);
        assert_eq!(corpus.results.matches[0].dataset, "2");
    }

    #[test]
    fn test_non_utf8_file_skipped_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("results1.txt"), b"\xff\xfe").unwrap();
        write(dir.path(), "results2.txt", "match,ORB,1,2,5,10,1.0");

        let config = LoaderConfig::new()
            .with_pattern(pattern(dir.path()))
            .with_skip_malformed_files(true);
        let corpus = load_corpus(&config).unwrap();
        assert_eq!(corpus.file_count(), 1);
        assert_eq!(corpus.results.matches[0].dataset, "2");
    }

    #[test]
    fn test_non_utf8_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("results1.txt"), b"\xff\xfe").unwrap();

        let err = load_corpus(&LoaderConfig::new().with_pattern(pattern(dir.path()))).unwrap_err();
        let read = err.downcast_ref::<ReadError>().unwrap();
        assert!(matches!(read, ReadError::Parse(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(discover_files("results/[").is_err());
    }
}
