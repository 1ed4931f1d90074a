//! Benchmark result ingestion
//!
//! Reads the result files written by the feature matching pipeline.
//!
//! ```rust,ignore
//! use results::{LoaderConfig, load_corpus};
//!
//! let corpus = load_corpus(&LoaderConfig::new().with_pattern("results/results*.txt"))?;
//! println!("{} match records", corpus.results.matches.len());
//! ```
//!
//! - `records` - typed rows and the collections holding them
//! - `reader` - one file to a [`ResultSet`]
//! - `loader` - glob discovery and cross-file merge

pub mod loader;
pub mod reader;
pub mod records;

pub use loader::{discover_files, load_corpus, Corpus, LoaderConfig};
pub use reader::{parse_distances, parse_threshold, read_results_file};
pub use records::{
    DetectMap, DetectionRecord, GroupKey, HomographyRecord, MatchRecord, ResultRow, ResultSet,
    RowKind,
};
