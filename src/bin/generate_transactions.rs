use std::env;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, error, Level};
use tracing_subscriber::EnvFilter;

use ledger_golden::config::{GeneratorParams, DEFAULT_GENERATOR_CONFIG};
use ledger_golden::generator;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run() {
    error!("Fatal error: {e:?}");
    eprintln!("Error: {e:?}");
    process::exit(1);
  }
}

fn run() -> Result<()> {
  let args: Vec<String> = env::args().collect();

  if args.len() > 2 {
    eprintln!("Usage: {} [generator_params.toml]", args[0]);
    process::exit(1);
  }

  let params = match args.get(1) {
    Some(path) => GeneratorParams::load(Path::new(path))
      .with_context(|| format!("Failed to load config '{}'", path))?,
    None if Path::new(DEFAULT_GENERATOR_CONFIG).exists() => {
      GeneratorParams::load(Path::new(DEFAULT_GENERATOR_CONFIG))
        .with_context(|| format!("Failed to load config '{}'", DEFAULT_GENERATOR_CONFIG))?
    }
    None => GeneratorParams::default(),
  };

  let mut rng: Box<dyn RngCore> = match params.output.seed {
    Some(seed) => {
      debug!(seed, "Using seeded generator");
      Box::new(StdRng::seed_from_u64(seed))
    }
    None => Box::new(rand::thread_rng()),
  };

  let path = &params.output.file;
  let written = generator::generate(path, params.rows.count, &params, &mut *rng)
    .with_context(|| format!("Failed to generate '{}'", path.display()))?;

  eprintln!("Generated {} transactions to {}", written, path.display());

  Ok(())
}
