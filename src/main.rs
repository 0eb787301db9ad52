use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use tracing::{debug, error, info, Level};
use tracing_subscriber::EnvFilter;

use ledger_golden::config::{HarnessConfig, DEFAULT_HARNESS_CONFIG};
use ledger_golden::{ProcessEngine, Runner};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
    .with_writer(io::stderr)
    .init();

  match run() {
    Ok(true) => {}
    Ok(false) => process::exit(1),
    Err(e) => {
      error!("Fatal error: {e:?}");
      eprintln!("Error: {e:?}");
      process::exit(1);
    }
  }
}

/// Returns whether every scenario passed
fn run() -> Result<bool> {
  let args: Vec<String> = env::args().collect();

  if args.len() > 2 {
    eprintln!("Usage: {} [harness.toml]", args[0]);
    process::exit(1);
  }

  let config = load_config(args.get(1).map(String::as_str))?;
  let scenarios = config.scenarios();
  info!(count = scenarios.len(), program = %config.engine.program, "Starting golden run");

  let runner = Runner::new(ProcessEngine::from_config(&config.engine));

  let stdout = io::stdout();
  let mut handle = stdout.lock();
  let summary = runner.run_all(&scenarios, &mut handle).context("Failed to write report")?;
  handle.flush()?;

  Ok(summary.all_passed())
}

/// An explicit path must exist; the default one falls back to built-in settings
fn load_config(explicit: Option<&str>) -> Result<HarnessConfig> {
  match explicit {
    Some(path) => HarnessConfig::load(Path::new(path))
      .with_context(|| format!("Failed to load config '{}'", path)),
    None if Path::new(DEFAULT_HARNESS_CONFIG).exists() => {
      HarnessConfig::load(Path::new(DEFAULT_HARNESS_CONFIG))
        .with_context(|| format!("Failed to load config '{}'", DEFAULT_HARNESS_CONFIG))
    }
    None => {
      debug!("No {DEFAULT_HARNESS_CONFIG}, using defaults");
      Ok(HarnessConfig::default())
    }
  }
}
