//! Binary entrypoint: read one JSON object from stdin, write one to stdout.
//!
//! Logs go to stderr (`RUST_LOG`, default `info`) so stdout carries only JSON.

use pr_risk_engine::{analyze, Config, EngineError, Input};
use std::io::{self, Read, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false)
    .init();

  if let Err(e) = run_binary() {
    error!(error = %e, "pr-risk-engine failed");
    let out = e.to_output();
    let mut stdout = io::stdout().lock();
    let _ = serde_json::to_writer(&mut stdout, &out);
    let _ = writeln!(stdout);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), EngineError> {
  let config = Config::from_env()?;

  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;
  let input: Input = serde_json::from_str(&raw)?;

  let out = analyze(&input, &config)?;
  info!(
    files = out.stats.total_files,
    score = out.stats.risk_score_pre,
    cache_key = %out.cache_key,
    "analysis complete"
  );

  let mut stdout = io::stdout().lock();
  serde_json::to_writer(&mut stdout, &out)?;
  writeln!(stdout)?;
  stdout.flush()?;
  Ok(())
}
