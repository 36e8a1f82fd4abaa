//! PR Manager Risk Engine: rule-based pull request risk analysis; no AI, no DB, no network.
//!
//! Ingests raw unified-diff text or a GitHub PR-files list, classifies each file,
//! and computes aggregate stats, a 0–100 risk score and hotspot explanations.
//! Used by the binary for stdin/stdout; can also be called as a library.

pub mod classify;
pub mod config;
pub mod deps;
pub mod diff;
pub mod error;
pub mod language;
pub mod request;
pub mod score;
pub mod types;

pub use config::Config;
pub use error::EngineError;
pub use types::{Analysis, FileChange, Input, Stats};

use tracing::debug;

/// Score already-classified files (no I/O, never fails).
pub fn analyze_files(
  files: Vec<FileChange>,
  pr_body: Option<&str>,
  config: &Config,
) -> (Stats, Vec<String>, Vec<FileChange>) {
  let mut stats = score::compute_stats(&files, pr_body, &config.thresholds);
  stats.risk_score_pre = score::compute_score(&stats, &files, &config.thresholds, &config.weights);
  let hotspots = score::compute_hotspots(&stats, &files, &config.thresholds, config.max_hotspots);

  debug!(
    files = stats.total_files,
    score = stats.risk_score_pre,
    hotspots = hotspots.len(),
    "analyzed change set"
  );
  (stats, hotspots, files)
}

/// Validate the request, ingest its files and analyze them.
pub fn analyze(input: &Input, config: &Config) -> Result<Analysis, EngineError> {
  let files = request::file_changes(input, config)?;
  let (stats, hotspots, files) = analyze_files(files, input.pr_body.as_deref(), config);
  Ok(Analysis {
    stats,
    hotspots,
    files,
    cache_key: request::cache_key(input),
  })
}

/// Run the engine with default configuration.
pub fn run(input: &Input) -> Result<Analysis, EngineError> {
  analyze(input, &Config::default())
}
