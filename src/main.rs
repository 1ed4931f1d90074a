//! Feature Bench Analytics CLI
//!
//! Summarises the result files written by the feature matching benchmark.
//!
//! ## Quick Start
//!
//! ```bash
//! # Read results/results*.txt, write charts to results/, print the overview
//! ./feature-bench-analytics
//!
//! # Read a different set of result files
//! ./feature-bench-analytics "runs/results*.txt"
//! ```
//!
//! ## Configuration
//!
//! An optional `analytics.toml` in the working directory sets the default
//! pattern, dataset tag prefix, chart directory and histogram bins. A pattern
//! given on the command line wins over the file.
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::Parser;

use feature_bench_analytics::config::AnalyticsConfig;
use feature_bench_analytics::plotting::ChartWriter;
use feature_bench_analytics::report::{missing_summaries, print_overview};
use feature_bench_analytics::results::{load_corpus, Corpus};
use feature_bench_analytics::summary::{
    summarize_homographies, summarize_matches, HomographySummary, MatchSummary,
};

#[derive(Parser)]
#[command(name = "feature-bench-analytics")]
#[command(about = "Aggregate and chart feature matching benchmark results")]
#[command(version)]
struct Cli {
    /// Glob pattern for result files (overrides analytics.toml)
    pattern: Option<String>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AnalyticsConfig::load_default()?;
    if let Some(pattern) = cli.pattern {
        config.input.pattern = pattern;
    }

    let corpus = load_corpus(&config.loader())?;
    let summaries = summarize_matches(&corpus.results.matches);
    let homographies = summarize_homographies(&corpus.results.homographies);

    for key in missing_summaries(&corpus.results.detects, &summaries) {
        tracing::debug!("No match records for {}", key);
    }

    if config.output.charts {
        render_charts(&config, &corpus, &homographies)?;
    }

    print_overview(&corpus.results.detects, &summaries);
    log_summaries(&summaries);

    Ok(())
}

/// Create the output directory once, then draw every chart into it
fn render_charts(
    config: &AnalyticsConfig,
    corpus: &Corpus,
    homographies: &[HomographySummary],
) -> Result<()> {
    std::fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output.dir))?;

    let charts = ChartWriter::new(&config.output.dir)
        .with_histogram_bins(config.output.histogram_bins);
    let results = &corpus.results;

    let mut written = 0;
    written += charts.mean_distance_bar(&results.matches)?.is_some() as usize;
    written += charts.distance_histograms(&results.matches)?.len();
    written += charts.keypoints_bar(&results.detects)?.is_some() as usize;
    written += charts.homography_lines(homographies)?.len();
    written += charts.homography_heatmaps(homographies)?.len();

    tracing::info!("{} charts written to {:?}", written, charts.dir());
    Ok(())
}

fn log_summaries(summaries: &[MatchSummary]) {
    let mut sorted: Vec<&MatchSummary> = summaries.iter().collect();
    sorted.sort_by_key(|s| s.key());
    for s in sorted {
        tracing::debug!(
            "{}: pairs={} median_mean_dist={:.3} std_mean_dist={:.3} total_matches={} avg_matches_per_pair={:.1} total_match_time_ms={:.3}",
            s.key(),
            s.pairs,
            s.median_mean_dist,
            s.std_mean_dist,
            s.total_matches,
            s.avg_matches_per_pair,
            s.total_match_time_ms
        );
    }
}
