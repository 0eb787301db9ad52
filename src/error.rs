use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that stop a single scenario. The batch keeps going.
#[derive(Debug, Error)]
pub enum HarnessError {
  #[error("fixture '{}' is missing or unreadable: {source}", .path.display())]
  FixtureMissing {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to launch engine '{program}': {source}")]
  EngineLaunch {
    program: String,
    #[source]
    source: io::Error,
  },

  /// `None` means the engine was killed by a signal
  #[error("engine exited with {}", describe_exit(.code))]
  EngineExit { code: Option<i32> },

  #[error("engine did not exit within {after:?}")]
  Timeout { after: Duration },

  #[error("engine output is not valid UTF-8: {0}")]
  InvalidOutput(#[from] std::string::FromUtf8Error),

  #[error("failed to read engine output: {0}")]
  EngineIo(#[source] io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("status {code}"),
    None => "no status (terminated by signal)".to_string(),
  }
}

/// Errors raised while writing a generated dataset
#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("I/O error on '{}': {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write CSV: {0}")]
  Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read '{}': {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse '{}': {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid config: {0}")]
  Invalid(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_engine_exit_messages() {
    let err = HarnessError::EngineExit { code: Some(2) };
    assert_eq!(err.to_string(), "engine exited with status 2");

    let err = HarnessError::EngineExit { code: None };
    assert!(err.to_string().contains("signal"));
  }

  #[test]
  fn test_fixture_missing_names_path() {
    let err = HarnessError::FixtureMissing {
      path: PathBuf::from("tests/data/nope/input.csv"),
      source: io::Error::new(io::ErrorKind::NotFound, "not found"),
    };
    assert!(err.to_string().contains("tests/data/nope/input.csv"));
  }
}
