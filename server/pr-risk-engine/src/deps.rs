//! Major version bumps in dependency manifests, read straight off the patch text.
//!
//! Only a removed line immediately followed by its added replacement is
//! recognized. Manifests whose diffs interleave other lines between the old and
//! new version are not detected.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// `-  "pkg": "^1.2.3",` followed by `+  "pkg": "^2.0.0",`
fn npm_pair() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(concat!(
      r#"(?m)^-[ \t]*"([^"]+)"[ \t]*:[ \t]*"[\^~]?(\d+)\.\d+\.\d+[^"]*"[ \t]*,?[ \t\r]*\n"#,
      r#"\+[ \t]*"([^"]+)"[ \t]*:[ \t]*"[\^~]?(\d+)\.\d+\.\d+[^"]*""#,
    ))
    .expect("npm version pair pattern")
  })
}

/// `-pkg==1.2.3` followed by `+pkg==2.0.0`
fn pip_pair() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(concat!(
      r"(?m)^-[ \t]*([A-Za-z0-9_.\-\[\]]+)[ \t]*==[ \t]*(\d+)\.\d+\.\d+[^\n]*\n",
      r"\+[ \t]*([A-Za-z0-9_.\-\[\]]+)[ \t]*==[ \t]*(\d+)\.\d+\.\d+",
    ))
    .expect("pip version pair pattern")
  })
}

/// True when any adjacent removed/added pair for the same package raises the
/// leading version number.
pub fn patch_has_major_bump(patch: &str) -> bool {
  let npm = npm_pair().captures_iter(patch).find_map(|c| {
    is_bump(&c[1], &c[2], &c[3], &c[4], false).then(|| c[1].to_string())
  });
  if let Some(pkg) = npm {
    debug!(package = %pkg, "npm major bump");
    return true;
  }

  let pip = pip_pair().captures_iter(patch).find_map(|c| {
    is_bump(&c[1], &c[2], &c[3], &c[4], true).then(|| c[1].to_string())
  });
  if let Some(pkg) = pip {
    debug!(package = %pkg, "pip major bump");
    return true;
  }
  false
}

/// Major bump across any of the given dependency-file patches.
pub fn has_major_bump<'a>(patches: impl IntoIterator<Item = &'a str>) -> bool {
  patches.into_iter().any(patch_has_major_bump)
}

fn is_bump(
  old_pkg: &str,
  old_major: &str,
  new_pkg: &str,
  new_major: &str,
  fold_case: bool,
) -> bool {
  let same = if fold_case {
    old_pkg.eq_ignore_ascii_case(new_pkg)
  } else {
    old_pkg == new_pkg
  };
  if !same {
    return false;
  }
  match (old_major.parse::<u64>(), new_major.parse::<u64>()) {
    (Ok(old), Ok(new)) => new > old,
    _ => false,
  }
}
