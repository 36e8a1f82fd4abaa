//! Unified diff ingestion: split `git diff` output into per-file records.
//!
//! Single forward scan. Malformed input never fails; it yields whatever file
//! sections could be recognized (possibly none).

use tracing::debug;

use crate::config::PatchLimits;
use crate::types::RawFileDiff;

const FILE_HEADER: &str = "diff --git ";

/// Bounded patch text. Lines past either limit are dropped silently.
struct PatchBuffer {
  text: String,
  lines: usize,
  full: bool,
  limits: PatchLimits,
}

impl PatchBuffer {
  fn new(limits: PatchLimits) -> Self {
    Self {
      text: String::new(),
      lines: 0,
      full: false,
      limits,
    }
  }

  fn push(&mut self, line: &str) {
    if self.full || self.lines >= self.limits.max_lines {
      return;
    }
    let sep = usize::from(self.lines > 0);
    if self.text.len() + sep + line.len() > self.limits.max_bytes {
      // Keep the snippet a clean prefix of the diff.
      self.full = true;
      return;
    }
    if sep == 1 {
      self.text.push('\n');
    }
    self.text.push_str(line);
    self.lines += 1;
  }
}

struct OpenFile {
  path: String,
  additions: u32,
  deletions: u32,
  is_binary: bool,
  patch: PatchBuffer,
}

impl OpenFile {
  fn new(path: String, limits: PatchLimits) -> Self {
    Self {
      path,
      additions: 0,
      deletions: 0,
      is_binary: false,
      patch: PatchBuffer::new(limits),
    }
  }

  fn finish(self) -> RawFileDiff {
    RawFileDiff {
      path: self.path,
      additions: self.additions,
      deletions: self.deletions,
      patch_snippet: self.patch.text,
      is_binary: self.is_binary,
    }
  }
}

/// Parse unified diff text into one record per `diff --git` section.
///
/// `---`/`+++`/`@@` headers and `Binary files ... differ` markers go into the
/// patch buffer without affecting counts. Counts always cover every `+`/`-`
/// line, even those dropped from the snippet by `limits`.
pub fn parse_unified_diff(text: &str, limits: PatchLimits) -> Vec<RawFileDiff> {
  let mut files = Vec::new();
  let mut current: Option<OpenFile> = None;

  let body = text.strip_suffix('\n').unwrap_or(text);
  for line in body.split('\n') {
    if let Some(rest) = line.strip_prefix(FILE_HEADER) {
      if let Some(open) = current.take() {
        files.push(open.finish());
      }
      current = Some(OpenFile::new(header_path(rest), limits));
      continue;
    }

    // Anything before the first file header is preamble.
    let Some(file) = current.as_mut() else {
      continue;
    };

    if line.starts_with("---") || line.starts_with("+++") || line.starts_with("@@") {
      file.patch.push(line);
    } else if is_binary_marker(line) {
      file.is_binary = true;
      file.patch.push(line);
    } else if line.starts_with('+') {
      file.additions = file.additions.saturating_add(1);
      file.patch.push(line);
    } else if line.starts_with('-') {
      file.deletions = file.deletions.saturating_add(1);
      file.patch.push(line);
    } else if line.starts_with(' ') || line.is_empty() {
      file.patch.push(line);
    }
    // index, mode and rename metadata lines are not part of the snippet
  }

  if let Some(open) = current {
    files.push(open.finish());
  }

  debug!(files = files.len(), bytes = text.len(), "parsed unified diff");
  files
}

/// Apply the snippet limits to a patch obtained elsewhere (e.g. the GitHub API).
pub fn truncate_patch(patch: &str, limits: PatchLimits) -> String {
  let mut buf = PatchBuffer::new(limits);
  let body = patch.strip_suffix('\n').unwrap_or(patch);
  for line in body.split('\n') {
    buf.push(line);
  }
  buf.text
}

/// Git's own marker line; content lines that merely mention it start with `+`/`-`/` `.
fn is_binary_marker(line: &str) -> bool {
  line.starts_with("Binary files") && line.trim_end_matches('\r').ends_with(" differ")
}

/// Destination path from the remainder of a `diff --git a/X b/Y` header.
fn header_path(rest: &str) -> String {
  let rest = rest.trim_end_matches('\r');
  match rest.rfind(" b/") {
    Some(idx) => rest[idx + 3..].to_string(),
    None => rest
      .split_whitespace()
      .last()
      .map(|p| p.strip_prefix("b/").unwrap_or(p).to_string())
      .unwrap_or_default(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn limits() -> PatchLimits {
    PatchLimits::default()
  }

  const TWO_FILES: &str = "\
diff --git a/src/auth/login.ts b/src/auth/login.ts
index 1111111..2222222 100644
--- a/src/auth/login.ts
+++ b/src/auth/login.ts
@@ -1,4 +1,7 @@
 import { db } from './db';
-const a = 1;
-const b = 2;
+export function login() {
+  return true;
+}
+const a = 1;
+const b = 3;

diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1 @@
-old
+new
";

  #[test]
  fn splits_files_and_counts_lines() {
    let files = parse_unified_diff(TWO_FILES, limits());
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path, "src/auth/login.ts");
    assert_eq!(files[0].additions, 5);
    assert_eq!(files[0].deletions, 2);
    assert_eq!(files[1].path, "README.md");
    assert_eq!(files[1].additions, 1);
    assert_eq!(files[1].deletions, 1);
  }

  #[test]
  fn headers_are_kept_but_not_counted() {
    let files = parse_unified_diff(TWO_FILES, limits());
    let snippet = &files[0].patch_snippet;
    assert!(snippet.starts_with("--- a/src/auth/login.ts\n+++ b/src/auth/login.ts\n@@"));
    assert!(!snippet.contains("index 1111111"));
    assert!(snippet.contains("+export function login() {"));
  }

  #[test]
  fn no_file_headers_yields_empty() {
    assert!(parse_unified_diff("", limits()).is_empty());
    assert!(parse_unified_diff("just some text\n+not a diff\n", limits()).is_empty());
  }

  #[test]
  fn counts_survive_snippet_cap() {
    let mut diff = String::from("diff --git a/big.txt b/big.txt\n@@ -1,400 +1,500 @@\n");
    for i in 0..500 {
      diff.push_str(&format!("+added {}\n", i));
    }
    for i in 0..400 {
      diff.push_str(&format!("-removed {}\n", i));
    }
    let files = parse_unified_diff(&diff, limits());
    assert_eq!(files[0].additions, 500);
    assert_eq!(files[0].deletions, 400);
    assert_eq!(files[0].patch_snippet.lines().count(), 300);
  }

  #[test]
  fn byte_cap_keeps_a_prefix() {
    let tight = PatchLimits {
      max_lines: 300,
      max_bytes: 20,
    };
    let files = parse_unified_diff("diff --git a/x b/x\n+aaaaaaaaa\n+bbbbbbbbb\n+ccc\n", tight);
    assert_eq!(files[0].patch_snippet, "+aaaaaaaaa");
    assert_eq!(files[0].additions, 3);
  }

  #[test]
  fn binary_marker_sets_flag() {
    let diff = "diff --git a/logo.png b/logo.png\nindex 1..2 100644\nBinary files a/logo.png and b/logo.png differ\n";
    let files = parse_unified_diff(diff, limits());
    assert!(files[0].is_binary);
    assert_eq!(files[0].additions, 0);
    assert!(files[0].patch_snippet.contains("Binary files"));
  }

  #[test]
  fn content_mentioning_binary_marker_is_counted() {
    let diff = [
      "diff --git a/src/notes.rs b/src/notes.rs",
      "@@ -0,0 +1,3 @@",
      "+// Binary files a/x and b/x differ",
      "+let msg = \"Binary files a/y and b/y differ\";",
      "+fn main() {}",
    ]
    .join("\n");
    let files = parse_unified_diff(&diff, limits());
    assert_eq!(files[0].additions, 3);
    assert!(!files[0].is_binary);
  }

  #[test]
  fn destination_path_wins_on_rename() {
    let diff = "diff --git a/old/name.rs b/new/name.rs\nsimilarity index 90%\nrename from old/name.rs\nrename to new/name.rs\n";
    let files = parse_unified_diff(diff, limits());
    assert_eq!(files[0].path, "new/name.rs");
  }

  #[test]
  fn carriage_returns_are_preserved_in_snippet() {
    let diff = "diff --git a/w.txt b/w.txt\r\n+line\r\n";
    let files = parse_unified_diff(diff, limits());
    assert_eq!(files[0].path, "w.txt");
    assert_eq!(files[0].patch_snippet, "+line\r");
  }

  #[test]
  fn truncate_patch_applies_line_cap() {
    let patch: String = (0..1000).map(|i| format!("+l{}\n", i)).collect();
    let out = truncate_patch(&patch, limits());
    assert_eq!(out.lines().count(), 300);
    assert!(out.starts_with("+l0\n+l1"));
  }
}
