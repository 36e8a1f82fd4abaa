//! Aggregate stats, the heuristic risk score, and human-readable hotspots.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::{ScoreWeights, SizeThresholds};
use crate::deps;
use crate::types::{FileChange, FileType, Flag, Stats};

/// Paths listed in one hotspot line before eliding the rest.
const HOTSPOT_PATHS: usize = 5;

/// Stats over a batch of classified files. `risk_score_pre` is left at 0;
/// see [`compute_score`].
pub fn compute_stats(
  files: &[FileChange],
  pr_body: Option<&str>,
  thresholds: &SizeThresholds,
) -> Stats {
  let touched_areas: BTreeSet<FileType> = files.iter().map(|f| f.file_type).collect();
  let deps_major_bump = deps::has_major_bump(
    files
      .iter()
      .filter(|f| f.file_type == FileType::Deps)
      .map(|f| f.patch_snippet.as_str()),
  );

  Stats {
    total_files: files.len() as u32,
    additions: files.iter().fold(0u32, |acc, f| acc.saturating_add(f.additions)),
    deletions: files.iter().fold(0u32, |acc, f| acc.saturating_add(f.deletions)),
    has_tests_changed: touched_areas.contains(&FileType::Test),
    has_migrations: touched_areas.contains(&FileType::Db),
    touched_areas,
    deps_major_bump,
    pr_body_present: pr_body.is_some_and(|b| b.trim().chars().count() > thresholds.min_body_chars),
    risk_score_pre: 0,
  }
}

fn count_of(files: &[FileChange], file_type: FileType) -> u32 {
  files.iter().filter(|f| f.file_type == file_type).count() as u32
}

fn any_flag(files: &[FileChange], flag: Flag) -> bool {
  files.iter().any(|f| f.has_flag(flag))
}

fn is_huge(stats: &Stats, t: &SizeThresholds) -> bool {
  stats.additions > t.huge_additions || stats.total_files > t.huge_files
}

fn is_large(stats: &Stats, t: &SizeThresholds) -> bool {
  stats.additions > t.large_additions || stats.total_files > t.large_files
}

fn code_without_tests(stats: &Stats) -> bool {
  stats.touched_areas.contains(&FileType::Code) && !stats.has_tests_changed
}

/// Risk 0–100: sum of rule weights, clamped.
pub fn compute_score(
  stats: &Stats,
  files: &[FileChange],
  thresholds: &SizeThresholds,
  weights: &ScoreWeights,
) -> u8 {
  let mut score: i32 = 0;

  if is_huge(stats, thresholds) {
    score += weights.huge_change;
  } else if is_large(stats, thresholds) {
    score += weights.large_change;
  }
  if any_flag(files, Flag::TouchesAuth) || any_flag(files, Flag::TouchesPayment) {
    score += weights.sensitive_paths;
  }
  if stats.has_migrations {
    score += weights.db_change;
    if !stats.has_tests_changed {
      score += weights.db_without_tests;
    }
  }
  if stats.deps_major_bump {
    score += weights.major_dep_bump;
  }
  if count_of(files, FileType::Deps) > thresholds.many_deps_files {
    score += weights.many_deps;
  }
  let areas = &stats.touched_areas;
  if areas.contains(&FileType::Config) || areas.contains(&FileType::Infra) {
    score += weights.config_or_infra;
  }
  if any_flag(files, Flag::ChangesPublicApi) {
    score += weights.public_api;
  }
  if code_without_tests(stats) {
    score += weights.code_without_tests;
  }
  if !stats.pr_body_present {
    score += weights.missing_body;
  }

  // mitigations
  if stats.deletions > stats.additions && stats.has_tests_changed {
    score -= weights.cleanup_with_tests;
  }
  let low_risk = [FileType::Docs, FileType::Config, FileType::Test];
  if stats.touched_areas.iter().all(|a| low_risk.contains(a)) {
    score -= weights.low_risk_only;
  }

  debug!(raw = score, "risk score before clamp");
  score.clamp(0, 100) as u8
}

fn path_list(files: &[FileChange], keep: impl Fn(&FileChange) -> bool) -> Option<String> {
  let paths: Vec<&str> = files.iter().filter(|&f| keep(f)).map(|f| f.path.as_str()).collect();
  if paths.is_empty() {
    return None;
  }
  let mut out = paths.iter().take(HOTSPOT_PATHS).copied().collect::<Vec<_>>().join(", ");
  if paths.len() > HOTSPOT_PATHS {
    out.push_str(&format!(" (+{} more)", paths.len() - HOTSPOT_PATHS));
  }
  Some(out)
}

/// Short human-readable risk observations, most important first, at most `cap`.
pub fn compute_hotspots(
  stats: &Stats,
  files: &[FileChange],
  thresholds: &SizeThresholds,
  cap: usize,
) -> Vec<String> {
  let checks: [&dyn Fn() -> Option<String>; 10] = [
    &|| {
      if stats.total_files > thresholds.huge_files {
        Some(format!("Very large PR: {} files changed", stats.total_files))
      } else if stats.total_files > thresholds.large_files {
        Some(format!("Large PR: {} files changed", stats.total_files))
      } else {
        None
      }
    },
    &|| {
      if stats.additions > thresholds.huge_additions {
        Some(format!("Very large change: {} lines added", stats.additions))
      } else if stats.additions > thresholds.large_additions {
        Some(format!("Large change: {} lines added", stats.additions))
      } else {
        None
      }
    },
    &|| {
      path_list(files, |f| f.has_flag(Flag::TouchesAuth))
        .map(|p| format!("Security-sensitive files: {}", p))
    },
    &|| {
      path_list(files, |f| f.has_flag(Flag::TouchesPayment))
        .map(|p| format!("Payment-related files: {}", p))
    },
    &|| {
      path_list(files, |f| f.file_type == FileType::Db)
        .map(|p| format!("Database/migration changes: {}", p))
    },
    &|| {
      stats
        .deps_major_bump
        .then(|| "Major dependency version bumps detected".to_string())
    },
    &|| {
      let n = count_of(files, FileType::Deps);
      (n > thresholds.many_deps_files).then(|| format!("Many dependency files changed ({})", n))
    },
    &|| {
      path_list(files, |f| f.has_flag(Flag::ChangesPublicApi))
        .map(|p| format!("Possible public API changes: {}", p))
    },
    &|| code_without_tests(stats).then(|| "Code changed without test updates".to_string()),
    &|| (!stats.pr_body_present).then(|| "Missing or very short PR description".to_string()),
  ];

  let mut out = Vec::new();
  for check in checks {
    if out.len() >= cap {
      break;
    }
    if let Some(s) = check() {
      out.push(s);
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn file(path: &str, file_type: FileType, additions: u32, deletions: u32, flags: &[Flag]) -> FileChange {
    FileChange {
      path: path.to_string(),
      file_type,
      language: "text".to_string(),
      additions,
      deletions,
      flags: flags.iter().copied().collect(),
      patch_snippet: String::new(),
      status: None,
    }
  }

  fn score_of(files: &[FileChange], body: Option<&str>) -> (Stats, u8) {
    let t = SizeThresholds::default();
    let stats = compute_stats(files, body, &t);
    let score = compute_score(&stats, files, &t, &ScoreWeights::default());
    (stats, score)
  }

  const BODY: &str = "Adds login flow with session refresh and audit logging.";

  #[test]
  fn stats_aggregate_batch() {
    let files = vec![
      file("src/a.ts", FileType::Code, 10, 2, &[]),
      file("src/a.test.ts", FileType::Test, 5, 0, &[]),
      file("db/schema.sql", FileType::Db, 3, 1, &[]),
    ];
    let (stats, _) = score_of(&files, Some(BODY));
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.additions, 18);
    assert_eq!(stats.deletions, 3);
    assert!(stats.has_tests_changed);
    assert!(stats.has_migrations);
    assert!(stats.pr_body_present);
    assert_eq!(stats.touched_areas.len(), 3);
  }

  #[test]
  fn short_body_counts_as_missing() {
    let files = vec![file("src/a.ts", FileType::Code, 1, 0, &[])];
    let (stats, _) = score_of(&files, Some("   fix typo          "));
    assert!(!stats.pr_body_present);
  }

  #[test]
  fn sensitive_code_without_tests() {
    let files = vec![file("src/auth/login.ts", FileType::Code, 5, 2, &[Flag::TouchesAuth, Flag::ChangesPublicApi])];
    let (_, score) = score_of(&files, Some(BODY));
    // auth 25 + public api 10 + code without tests 15
    assert_eq!(score, 50);
  }

  #[test]
  fn db_without_tests_adds_both_weights() {
    let files = vec![file("migrations/003_add_users.sql", FileType::Db, 12, 0, &[])];
    let (_, score) = score_of(&files, Some(BODY));
    assert_eq!(score, 25);
  }

  #[test]
  fn cleanup_with_tests_is_mitigated() {
    let files = vec![
      file("src/old.ts", FileType::Code, 1, 80, &[Flag::DeletesGtAdditions]),
      file("src/old.test.ts", FileType::Test, 0, 20, &[Flag::DeletesGtAdditions]),
    ];
    let (_, score) = score_of(&files, Some(BODY));
    assert_eq!(score, 0);
  }

  #[test]
  fn many_deps_and_config() {
    let mut files: Vec<FileChange> = (0..6)
      .map(|i| file(&format!("svc{}/package.json", i), FileType::Deps, 1, 1, &[]))
      .collect();
    files.push(file(".github/workflows/ci.yml", FileType::Config, 1, 0, &[]));
    let (_, score) = score_of(&files, Some(BODY));
    assert_eq!(score, 20);
  }

  #[test]
  fn score_is_clamped_to_100() {
    let mut files: Vec<FileChange> = (0..60)
      .map(|i| file(&format!("src/auth/m{}.ts", i), FileType::Code, 100, 0, &[Flag::TouchesAuth, Flag::ChangesPublicApi]))
      .collect();
    files.push(file("db/migration.sql", FileType::Db, 1, 0, &[]));
    files.push(file("infra/main.tf", FileType::Infra, 1, 0, &[]));
    let (_, score) = score_of(&files, None);
    // 30 + 25 + 25 + 10 + 10 + 15 + 5 = 120
    assert_eq!(score, 100);
  }

  #[test]
  fn empty_batch_scores_zero() {
    let (stats, score) = score_of(&[], None);
    assert_eq!(stats.total_files, 0);
    assert_eq!(score, 0);
  }

  #[test]
  fn hotspots_follow_check_order() {
    let files = vec![
      file("src/auth/jwt.ts", FileType::Code, 900, 0, &[Flag::TouchesAuth]),
      file("src/billing/invoice.ts", FileType::Code, 10, 0, &[Flag::TouchesPayment]),
    ];
    let t = SizeThresholds::default();
    let stats = compute_stats(&files, None, &t);
    let hotspots = compute_hotspots(&stats, &files, &t, 8);
    assert_eq!(
      hotspots,
      vec![
        "Large change: 910 lines added".to_string(),
        "Security-sensitive files: src/auth/jwt.ts".to_string(),
        "Payment-related files: src/billing/invoice.ts".to_string(),
        "Code changed without test updates".to_string(),
        "Missing or very short PR description".to_string(),
      ]
    );
  }

  #[test]
  fn hotspot_cap_keeps_earliest() {
    let mut files: Vec<FileChange> = (0..55)
      .map(|i| {
        file(
          &format!("src/auth/payment{}.ts", i),
          FileType::Code,
          50,
          0,
          &[Flag::TouchesAuth, Flag::TouchesPayment, Flag::ChangesPublicApi],
        )
      })
      .collect();
    files.push(file("db/schema.sql", FileType::Db, 1, 0, &[]));
    for i in 0..6 {
      files.push(file(&format!("svc{}/go.mod", i), FileType::Deps, 1, 1, &[]));
    }
    let t = SizeThresholds::default();
    let stats = compute_stats(&files, None, &t);
    let hotspots = compute_hotspots(&stats, &files, &t, 8);
    assert_eq!(hotspots.len(), 8);
    assert!(hotspots[0].starts_with("Very large PR: 62 files"));
    assert!(hotspots[2].ends_with("(+50 more)"));
    assert_eq!(hotspots[5], "Many dependency files changed (6)");
    assert_eq!(hotspots[7], "Code changed without test updates");
    assert!(!hotspots.iter().any(|h| h.starts_with("Missing")));
  }
}
