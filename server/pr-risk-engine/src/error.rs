//! Failure modes of an analysis run.
//!
//! Classification and scoring are total; only request validation, configuration
//! and JSON I/O can fail.

use thiserror::Error;

use crate::types::ErrorOutput;

#[derive(Debug, Error)]
pub enum EngineError {
  /// The request itself is unusable (source selection, size caps).
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  /// A `PR_RISK_*` override could not be parsed.
  #[error("config: {key}: {reason}")]
  Config { key: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn rejected(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::Validation {
      field: field.into(),
      reason: reason.into(),
    }
  }

  pub fn bad_setting(key: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::Config {
      key: key.into(),
      reason: reason.into(),
    }
  }

  /// Body written to stdout when the run fails. Request and setting errors
  /// name the offending field so the caller can surface it.
  pub fn to_output(&self) -> ErrorOutput {
    let (message, field) = match self {
      Self::Validation { field, reason } => (reason.clone(), Some(field.clone())),
      Self::Config { key, reason } => (reason.clone(), Some(key.clone())),
      other => (other.to_string(), None),
    };
    ErrorOutput {
      error: true,
      message,
      field,
    }
  }
}
