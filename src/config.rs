//! Configuration for the analytics run
//!
//! Defines the `analytics.toml` schema. Every field has a default, so the file
//! is optional and may list only what it overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::plotting::DEFAULT_HISTOGRAM_BINS;
use crate::results::loader::{DEFAULT_PATTERN, DEFAULT_TAG_PREFIX};
use crate::results::LoaderConfig;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "analytics.toml";

/// Analytics configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Where result files come from
    #[serde(default)]
    pub input: InputConfig,

    /// Where charts go
    #[serde(default)]
    pub output: OutputConfig,
}

impl AnalyticsConfig {
    /// Load config from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analytics config: {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse analytics config: {:?}", path))?;
        Ok(config)
    }

    /// Load from default location (./analytics.toml) or return defaults
    pub fn load_default() -> Result<Self> {
        let local_path = Path::new(DEFAULT_CONFIG_FILE);
        if local_path.exists() {
            return Self::load(local_path);
        }
        Ok(Self::default())
    }

    /// Loader settings derived from the input section
    pub fn loader(&self) -> LoaderConfig {
        LoaderConfig::new()
            .with_pattern(&self.input.pattern)
            .with_tag_prefix(&self.input.tag_prefix)
            .with_skip_malformed_files(self.input.skip_malformed_files)
    }
}

/// Result file discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Glob pattern for result files
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// File name prefix stripped to get the dataset tag
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Skip files with malformed rows instead of aborting
    #[serde(default)]
    pub skip_malformed_files: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            tag_prefix: default_tag_prefix(),
            skip_malformed_files: false,
        }
    }
}

/// Chart output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the PNG charts
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Render charts at all
    #[serde(default = "default_charts")]
    pub charts: bool,

    /// Bins per distance histogram
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            charts: default_charts(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

fn default_pattern() -> String { DEFAULT_PATTERN.to_string() }
fn default_tag_prefix() -> String { DEFAULT_TAG_PREFIX.to_string() }
fn default_output_dir() -> PathBuf { PathBuf::from("results") }
fn default_charts() -> bool { true }
fn default_histogram_bins() -> usize { DEFAULT_HISTOGRAM_BINS }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.input.pattern, "results/results*.txt");
        assert_eq!(config.input.tag_prefix, "results");
        assert!(!config.input.skip_malformed_files);
        assert_eq!(config.output.dir, PathBuf::from("results"));
        assert!(config.output.charts);
        assert_eq!(config.output.histogram_bins, 40);
    }

    #[test]
    fn test_config_toml_partial() {
        let toml_str = r#"
[input]
pattern = "out/run*.csv"
skip_malformed_files = true

[output]
histogram_bins = 20
"#;
        let config: AnalyticsConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.input.pattern, "out/run*.csv");
        assert_eq!(config.input.tag_prefix, "results");
        assert!(config.input.skip_malformed_files);
        assert_eq!(config.output.dir, PathBuf::from("results"));
        assert_eq!(config.output.histogram_bins, 20);
    }

    #[test]
    fn test_config_empty_toml_is_default() {
        let config: AnalyticsConfig = toml::from_str("").unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.toml");
        std::fs::write(&path, "[output]\ncharts = false\ndir = \"plots\"\n").unwrap();

        let config = AnalyticsConfig::load(&path).unwrap();
        assert!(!config.output.charts);
        assert_eq!(config.output.dir, PathBuf::from("plots"));
    }

    #[test]
    fn test_config_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.toml");
        std::fs::write(&path, "[output\n").unwrap();
        assert!(AnalyticsConfig::load(&path).is_err());
    }

    #[test]
    fn test_loader_from_config() {
        let mut config = AnalyticsConfig::default();
        config.input.tag_prefix = "run".to_string();
        config.input.skip_malformed_files = true;

        let loader = config.loader();
        assert_eq!(loader.pattern, "results/results*.txt");
        assert_eq!(loader.tag_prefix, "run");
        assert!(loader.skip_malformed_files);
    }
}
