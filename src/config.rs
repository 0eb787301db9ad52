use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::scenario::Scenario;

pub const DEFAULT_HARNESS_CONFIG: &str = "harness.toml";
pub const DEFAULT_GENERATOR_CONFIG: &str = "generator_params.toml";

/// Settings for the golden runner, read from `harness.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
  pub engine: EngineConfig,
  pub scenarios: ScenariosConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub program: String,
  /// Placed before the input path on the command line
  pub args: Vec<String>,
  pub timeout_secs: u64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self { program: "cargo".to_string(), args: vec!["run".into(), "--".into()], timeout_secs: 60 }
  }
}

impl EngineConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScenariosConfig {
  pub data_dir: PathBuf,
  pub names: Vec<String>,
}

impl Default for ScenariosConfig {
  fn default() -> Self {
    Self {
      data_dir: PathBuf::from("tests/data"),
      names: ["deposit", "withdrawal", "resolve", "chargeback"].map(String::from).to_vec(),
    }
  }
}

impl HarnessConfig {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let config: Self = read_toml(path)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.engine.program.trim().is_empty() {
      return Err(ConfigError::Invalid("engine.program must not be empty".to_string()));
    }
    if self.engine.timeout_secs == 0 {
      return Err(ConfigError::Invalid("engine.timeout_secs must be > 0".to_string()));
    }
    if self.scenarios.names.is_empty() {
      return Err(ConfigError::Invalid("scenarios.names must list at least one".to_string()));
    }
    Ok(())
  }

  /// Resolves every configured name to its fixture paths, in configured order
  pub fn scenarios(&self) -> Vec<Scenario> {
    self
      .scenarios
      .names
      .iter()
      .map(|name| Scenario::from_data_dir(&self.scenarios.data_dir, name))
      .collect()
  }
}

/// Settings for the dataset generator, read from `generator_params.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
  pub output: OutputConfig,
  pub rows: RowsConfig,
  pub clients: ClientsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
  pub file: PathBuf,
  pub seed: Option<u64>,
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self { file: PathBuf::from("tests/data/tmp/sample_small.csv"), seed: None }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RowsConfig {
  pub count: u32,
}

impl Default for RowsConfig {
  fn default() -> Self {
    Self { count: 100 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientsConfig {
  pub min: u16,
  pub max: u16,
}

impl Default for ClientsConfig {
  fn default() -> Self {
    Self { min: 1, max: 50 }
  }
}

impl GeneratorParams {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let params: Self = read_toml(path)?;
    params.validate()?;
    Ok(params)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.clients.min > self.clients.max {
      return Err(ConfigError::Invalid("clients.min must be <= clients.max".to_string()));
    }
    Ok(())
  }
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
  let content = fs::read_to_string(path)
    .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
  debug!(path = %path.display(), "Read config file");
  toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
