//! Input/output types for the risk engine (JSON contract with Node) and internal models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the caller sends)
// ---------------------------------------------------------------------------

/// One analysis request. Exactly one of `diff_text` / `files` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Input {
  /// PR URL the caller resolved `files` from; only used for the cache key.
  #[serde(default)]
  pub pr_url: Option<String>,
  #[serde(default)]
  pub diff_text: Option<String>,
  #[serde(default)]
  pub files: Option<Vec<GithubFile>>,
  #[serde(default)]
  pub pr_body: Option<String>,
}

/// One record from GitHub's "list pull request files" endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubFile {
  pub filename: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub additions: u32,
  #[serde(default)]
  pub deletions: u32,
  /// Absent for binary files and very large diffs.
  #[serde(default)]
  pub patch: Option<String>,
}

// ---------------------------------------------------------------------------
// Classification vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
  Code,
  Test,
  Deps,
  Config,
  Db,
  Infra,
  Docs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
  TouchesAuth,
  TouchesPayment,
  DeletesGtAdditions,
  ChangesPublicApi,
  IsRename,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
  Added,
  Removed,
  Modified,
  Renamed,
}

impl FileStatus {
  /// Map a GitHub file status. `copied`, `changed` and `unchanged` count as modified.
  pub fn from_github(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "added" => Some(Self::Added),
      "removed" => Some(Self::Removed),
      "renamed" => Some(Self::Renamed),
      "modified" | "copied" | "changed" | "unchanged" => Some(Self::Modified),
      _ => None,
    }
  }
}

// ---------------------------------------------------------------------------
// Per-file records
// ---------------------------------------------------------------------------

/// One file section of a unified diff, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFileDiff {
  pub path: String,
  pub additions: u32,
  pub deletions: u32,
  pub patch_snippet: String,
  pub is_binary: bool,
}

/// A classified file change, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
  pub path: String,
  #[serde(rename = "type")]
  pub file_type: FileType,
  pub language: String,
  pub additions: u32,
  pub deletions: u32,
  pub flags: BTreeSet<Flag>,
  pub patch_snippet: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<FileStatus>,
}

impl FileChange {
  pub fn has_flag(&self, flag: Flag) -> bool {
    self.flags.contains(&flag)
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

/// Aggregate statistics for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
  pub total_files: u32,
  pub additions: u32,
  pub deletions: u32,
  pub touched_areas: BTreeSet<FileType>,
  pub has_tests_changed: bool,
  pub has_migrations: bool,
  pub deps_major_bump: bool,
  pub pr_body_present: bool,
  pub risk_score_pre: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
  pub stats: Stats,
  pub hotspots: Vec<String>,
  pub files: Vec<FileChange>,
  /// Stable key for the caller's response cache.
  pub cache_key: String,
}

/// What the binary prints instead of an [`Analysis`] when the run fails.
/// Built by `EngineError::to_output`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  /// Offending input field or `PR_RISK_*` variable, when there is one.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}
