//! Size caps, patch limits, score weights and their `PR_RISK_*` overrides.

use crate::error::EngineError;

/// How much of each file's diff is kept in `patch_snippet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchLimits {
  pub max_lines: usize,
  pub max_bytes: usize,
}

impl Default for PatchLimits {
  fn default() -> Self {
    Self {
      max_lines: 300,
      max_bytes: 20_000,
    }
  }
}

/// Size tiers shared by the score and the hotspot list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeThresholds {
  /// Additions above this put the PR in the "very large" tier.
  pub huge_additions: u32,
  /// File count above this puts the PR in the "very large" tier.
  pub huge_files: u32,
  pub large_additions: u32,
  pub large_files: u32,
  /// More `deps` files than this is notable on its own.
  pub many_deps_files: u32,
  /// PR bodies at or under this many characters (trimmed) count as missing.
  pub min_body_chars: usize,
}

impl Default for SizeThresholds {
  fn default() -> Self {
    Self {
      huge_additions: 2000,
      huge_files: 50,
      large_additions: 800,
      large_files: 25,
      many_deps_files: 5,
      min_body_chars: 20,
    }
  }
}

/// Additive (and subtractive) weights of the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
  pub huge_change: i32,
  pub large_change: i32,
  pub sensitive_paths: i32,
  pub db_change: i32,
  pub db_without_tests: i32,
  pub major_dep_bump: i32,
  pub many_deps: i32,
  pub config_or_infra: i32,
  pub public_api: i32,
  pub code_without_tests: i32,
  pub missing_body: i32,
  /// Subtracted when the PR is net-negative and tests changed.
  pub cleanup_with_tests: i32,
  /// Subtracted when only docs/config/test areas are touched.
  pub low_risk_only: i32,
}

impl Default for ScoreWeights {
  fn default() -> Self {
    Self {
      huge_change: 30,
      large_change: 15,
      sensitive_paths: 25,
      db_change: 15,
      db_without_tests: 10,
      major_dep_bump: 20,
      many_deps: 10,
      config_or_infra: 10,
      public_api: 10,
      code_without_tests: 15,
      missing_body: 5,
      cleanup_with_tests: 10,
      low_risk_only: 15,
    }
  }
}

/// Tunable limits and weights for one engine instance.
#[derive(Debug, Clone)]
pub struct Config {
  pub limits: InputLimits,
  pub patch: PatchLimits,
  pub thresholds: SizeThresholds,
  pub weights: ScoreWeights,
  /// Hotspot list length cap.
  pub max_hotspots: usize,
}

/// Request-size caps enforced before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
  pub max_files: usize,
  pub max_changed_lines: u64,
}

impl Default for InputLimits {
  fn default() -> Self {
    Self {
      max_files: 100,
      max_changed_lines: 6000,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      limits: InputLimits::default(),
      patch: PatchLimits::default(),
      thresholds: SizeThresholds::default(),
      weights: ScoreWeights::default(),
      max_hotspots: 8,
    }
  }
}

impl Config {
  /// Defaults overridden by `PR_RISK_*` environment variables.
  pub fn from_env() -> Result<Self, EngineError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EngineError> {
    let mut config = Self::default();
    if let Some(v) = parse_var(&lookup, "PR_RISK_MAX_FILES")? {
      config.limits.max_files = v;
    }
    if let Some(v) = parse_var(&lookup, "PR_RISK_MAX_CHANGED_LINES")? {
      config.limits.max_changed_lines = v;
    }
    if let Some(v) = parse_var(&lookup, "PR_RISK_PATCH_MAX_LINES")? {
      config.patch.max_lines = v;
    }
    if let Some(v) = parse_var(&lookup, "PR_RISK_PATCH_MAX_BYTES")? {
      config.patch.max_bytes = v;
    }
    Ok(config)
  }
}

fn parse_var<T: std::str::FromStr>(
  lookup: &impl Fn(&str) -> Option<String>,
  key: &str,
) -> Result<Option<T>, EngineError>
where
  T::Err: std::fmt::Display,
{
  match lookup(key) {
    None => Ok(None),
    Some(raw) => raw
      .trim()
      .parse()
      .map(Some)
      .map_err(|e| EngineError::bad_setting(key, format!("invalid value {:?}: {}", raw, e))),
  }
}
