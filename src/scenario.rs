use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HarnessError;

pub const INPUT_FILE: &str = "input.csv";
pub const EXPECTED_FILE: &str = "expected_output.csv";

/// A named test case: one input fixture fed to the engine and one golden output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
  pub name: String,
  pub input_path: PathBuf,
  pub expected_path: PathBuf,
}

impl Scenario {
  pub fn new(
    name: impl Into<String>,
    input_path: impl Into<PathBuf>,
    expected_path: impl Into<PathBuf>,
  ) -> Self {
    Self { name: name.into(), input_path: input_path.into(), expected_path: expected_path.into() }
  }

  /// `<data_dir>/<name>/input.csv` and `<data_dir>/<name>/expected_output.csv`
  pub fn from_data_dir(data_dir: &Path, name: &str) -> Self {
    let dir = data_dir.join(name);
    Self::new(name, dir.join(INPUT_FILE), dir.join(EXPECTED_FILE))
  }

  /// Checks both fixtures are present before the engine is spawned
  pub fn verify_fixtures(&self) -> Result<(), HarnessError> {
    for path in [&self.input_path, &self.expected_path] {
      fs::metadata(path)
        .and_then(|meta| {
          if meta.is_file() {
            Ok(())
          } else {
            Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"))
          }
        })
        .map_err(|source| HarnessError::FixtureMissing { path: path.clone(), source })?;
    }
    Ok(())
  }

  pub fn read_expected(&self) -> Result<String, HarnessError> {
    fs::read_to_string(&self.expected_path)
      .map_err(|source| HarnessError::FixtureMissing { path: self.expected_path.clone(), source })
  }
}
