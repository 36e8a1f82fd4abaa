//! File classification and per-file flags, from path patterns and patch text.
//!
//! Both are ordered rule tables so precedence is explicit: the first matching
//! type rule wins, while every matching flag rule contributes.

use std::collections::BTreeSet;

use crate::config::PatchLimits;
use crate::diff::truncate_patch;
use crate::language::language_from_path;
use crate::types::{FileChange, FileStatus, FileType, Flag, GithubFile, RawFileDiff};

// ---------------------------------------------------------------------------
// File type
// ---------------------------------------------------------------------------

/// Lower-cased path plus its last segment.
struct PathParts<'a> {
  lower: &'a str,
  name: &'a str,
}

struct TypeRule {
  file_type: FileType,
  matches: fn(&PathParts) -> bool,
}

/// Checked top to bottom; anything unmatched is `code`.
const TYPE_RULES: &[TypeRule] = &[
  TypeRule {
    file_type: FileType::Test,
    matches: is_test_path,
  },
  TypeRule {
    file_type: FileType::Deps,
    matches: is_deps_path,
  },
  TypeRule {
    file_type: FileType::Config,
    matches: is_config_path,
  },
  TypeRule {
    file_type: FileType::Db,
    matches: is_db_path,
  },
  TypeRule {
    file_type: FileType::Docs,
    matches: is_docs_path,
  },
];

const DEPS_MANIFESTS: &[&str] = &[
  "package.json",
  "package-lock.json",
  "yarn.lock",
  "pnpm-lock.yaml",
  "requirements.txt",
  "poetry.lock",
  "pipfile.lock",
  "go.mod",
  "go.sum",
  "pom.xml",
  "build.gradle",
];

const CONFIG_DIRS: &[&str] = &[".github/", ".circleci/", "helm/", "k8s/", "terraform/"];
const CONFIG_MARKERS: &[&str] = &["dockerfile", "docker-compose", "tsconfig", "eslint", "prettier"];

fn is_test_path(p: &PathParts) -> bool {
  ["test", "spec", "__tests__"].iter().any(|m| p.lower.contains(m))
    || [".test.ts", ".test.js", ".spec.ts", ".spec.js"]
      .iter()
      .any(|s| p.lower.ends_with(*s))
}

fn is_deps_path(p: &PathParts) -> bool {
  DEPS_MANIFESTS.iter().any(|m| *m == p.name)
}

fn is_config_path(p: &PathParts) -> bool {
  CONFIG_DIRS.iter().any(|d| p.lower.starts_with(d))
    || CONFIG_MARKERS.iter().any(|m| p.lower.contains(m))
    || p.lower.ends_with(".gitlab-ci.yml")
}

fn is_db_path(p: &PathParts) -> bool {
  p.lower.contains("migration") || p.lower.contains("schema") || p.lower.ends_with(".sql")
}

fn is_docs_path(p: &PathParts) -> bool {
  p.lower.ends_with(".md") || p.lower.starts_with("docs/")
}

/// Classify a repo-relative path. Total and deterministic.
pub fn classify(path: &str) -> FileType {
  let lower = path.to_lowercase();
  let parts = PathParts {
    lower: &lower,
    name: lower.rsplit('/').next().unwrap_or(&lower),
  };
  TYPE_RULES
    .iter()
    .find(|rule| (rule.matches)(&parts))
    .map(|rule| rule.file_type)
    .unwrap_or(FileType::Code)
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// What flag rules get to look at for one file.
#[derive(Debug, Clone, Copy)]
pub struct FlagFacts<'a> {
  pub path: &'a str,
  pub additions: u32,
  pub deletions: u32,
  pub patch: &'a str,
  pub status: Option<FileStatus>,
}

struct FlagRule {
  flag: Flag,
  applies: fn(&FlagFacts, &str) -> bool,
}

const FLAG_RULES: &[FlagRule] = &[
  FlagRule {
    flag: Flag::TouchesAuth,
    applies: |_, lower| AUTH_MARKERS.iter().any(|m| lower.contains(m)),
  },
  FlagRule {
    flag: Flag::TouchesPayment,
    applies: |_, lower| PAYMENT_MARKERS.iter().any(|m| lower.contains(m)),
  },
  FlagRule {
    flag: Flag::DeletesGtAdditions,
    applies: |f, _| f.deletions > f.additions,
  },
  FlagRule {
    flag: Flag::ChangesPublicApi,
    applies: |f, _| PUBLIC_API_MARKERS.iter().any(|m| f.patch.contains(m)),
  },
  FlagRule {
    flag: Flag::IsRename,
    applies: |f, _| f.status == Some(FileStatus::Renamed),
  },
];

const AUTH_MARKERS: &[&str] = &["auth", "security", "acl", "jwt", "oauth", "crypto"];
const PAYMENT_MARKERS: &[&str] = &["payment", "billing", "stripe", "paypal"];
// Coarse on purpose: declarations in most mainstream languages.
const PUBLIC_API_MARKERS: &[&str] = &["export ", "public ", "def ", "function "];

/// Every flag whose rule matches. Rules are independent.
pub fn derive_flags(facts: &FlagFacts) -> BTreeSet<Flag> {
  let lower = facts.path.to_lowercase();
  FLAG_RULES
    .iter()
    .filter(|rule| (rule.applies)(facts, &lower))
    .map(|rule| rule.flag)
    .collect()
}

// ---------------------------------------------------------------------------
// FileChange assembly
// ---------------------------------------------------------------------------

fn build(
  path: String,
  additions: u32,
  deletions: u32,
  patch_snippet: String,
  status: Option<FileStatus>,
) -> FileChange {
  let flags = derive_flags(&FlagFacts {
    path: &path,
    additions,
    deletions,
    patch: &patch_snippet,
    status,
  });
  FileChange {
    file_type: classify(&path),
    language: language_from_path(&path).to_string(),
    path,
    additions,
    deletions,
    flags,
    patch_snippet,
    status,
  }
}

/// Classify a file section produced by the diff ingestor.
pub fn from_raw_diff(raw: RawFileDiff) -> FileChange {
  build(raw.path, raw.additions, raw.deletions, raw.patch_snippet, None)
}

/// Classify a record from the GitHub PR-files API, truncating its patch.
pub fn from_github_file(file: &GithubFile, limits: PatchLimits) -> FileChange {
  let snippet = file
    .patch
    .as_deref()
    .map(|p| truncate_patch(p, limits))
    .unwrap_or_default();
  build(
    file.filename.clone(),
    file.additions,
    file.deletions,
    snippet,
    FileStatus::from_github(&file.status),
  )
}
