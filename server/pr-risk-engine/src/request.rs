//! Validate an inbound request and turn it into classified file changes.

use tracing::warn;

use crate::classify;
use crate::config::Config;
use crate::diff;
use crate::error::EngineError;
use crate::types::{FileChange, Input};

/// Where the per-file records come from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
  DiffText(&'a str),
  Files(&'a [crate::types::GithubFile]),
}

/// Pick the single source of file changes. Both or neither is an error.
pub fn source(input: &Input) -> Result<Source<'_>, EngineError> {
  match (&input.diff_text, &input.files) {
    (Some(text), None) => Ok(Source::DiffText(text)),
    (None, Some(files)) => Ok(Source::Files(files)),
    (Some(_), Some(_)) => Err(reject("input", "provide only one of files or diff_text")),
    (None, None) => Err(reject("input", "must provide files or diff_text")),
  }
}

/// Classify every file of the request and enforce the size caps.
pub fn file_changes(input: &Input, config: &Config) -> Result<Vec<FileChange>, EngineError> {
  let files: Vec<FileChange> = match source(input)? {
    Source::DiffText(text) => diff::parse_unified_diff(text, config.patch)
      .into_iter()
      .map(classify::from_raw_diff)
      .collect(),
    Source::Files(files) => files
      .iter()
      .map(|f| classify::from_github_file(f, config.patch))
      .collect(),
  };
  check_limits(&files, config)?;
  Ok(files)
}

fn check_limits(files: &[FileChange], config: &Config) -> Result<(), EngineError> {
  if files.len() > config.limits.max_files {
    return Err(reject(
      "files",
      &format!("too many files ({} > {})", files.len(), config.limits.max_files),
    ));
  }
  let changed: u64 = files
    .iter()
    .map(|f| u64::from(f.additions) + u64::from(f.deletions))
    .sum();
  if changed > config.limits.max_changed_lines {
    return Err(reject(
      "files",
      &format!("too many changed lines ({} > {})", changed, config.limits.max_changed_lines),
    ));
  }
  Ok(())
}

fn reject(field: &str, reason: &str) -> EngineError {
  warn!(field, reason, "rejected analysis request");
  EngineError::rejected(field, reason)
}

/// Stable cache key for a request: the PR URL when given, otherwise its content.
///
/// The PR body is included since it affects the score.
pub fn cache_key(input: &Input) -> String {
  let mut hasher = blake3::Hasher::new();
  match (&input.pr_url, &input.diff_text, &input.files) {
    (Some(url), _, _) => {
      hasher.update(b"url|");
      hasher.update(url.trim().as_bytes());
    }
    (None, Some(text), _) => {
      hasher.update(b"diff|");
      hasher.update(text.as_bytes());
    }
    (None, None, Some(files)) => {
      hasher.update(b"files|");
      for f in files {
        hasher.update(f.filename.as_bytes());
        hasher.update(b"\0");
        hasher.update(f.status.as_bytes());
        hasher.update(format!("\0{}\0{}\0", f.additions, f.deletions).as_bytes());
        hasher.update(f.patch.as_deref().unwrap_or_default().as_bytes());
        hasher.update(b"\0");
      }
    }
    (None, None, None) => {
      hasher.update(b"empty|");
    }
  }
  hasher.update(b"|body|");
  hasher.update(input.pr_body.as_deref().unwrap_or_default().trim().as_bytes());
  let hex = hasher.finalize().to_hex();
  format!("pra-{}", &hex[..32])
}
