use std::io::{self, Write};

use tracing::{debug, info, instrument, warn};

use crate::compare::{compare, Comparison, Divergence};
use crate::engine::EngineRunner;
use crate::error::HarnessError;
use crate::row::{parse_rows, Row};
use crate::scenario::Scenario;

/// How one scenario ended
#[derive(Debug)]
pub enum Outcome {
  Passed,
  Failed(Comparison),
  Errored(HarnessError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
  pub passed: usize,
  pub failed: usize,
  pub errored: usize,
}

impl RunSummary {
  pub fn all_passed(&self) -> bool {
    self.failed == 0 && self.errored == 0
  }

  fn record(&mut self, outcome: &Outcome) {
    match outcome {
      Outcome::Passed => self.passed += 1,
      Outcome::Failed(_) => self.failed += 1,
      Outcome::Errored(_) => self.errored += 1,
    }
  }
}

/// Drives the engine over golden scenarios, one at a time, in order
pub struct Runner<E> {
  engine: E,
}

impl<E: EngineRunner> Runner<E> {
  pub fn new(engine: E) -> Self {
    Self { engine }
  }

  /// Runs the engine on the scenario's input and compares against its golden output
  #[instrument(skip(self, scenario), fields(scenario = %scenario.name))]
  pub fn run_one(&self, scenario: &Scenario) -> Result<Comparison, HarnessError> {
    scenario.verify_fixtures()?;
    debug!(
      input = %scenario.input_path.display(),
      expected = %scenario.expected_path.display(),
      "Resolved fixtures"
    );

    let output = self.engine.run(&scenario.input_path)?;
    if !output.success() {
      return Err(HarnessError::EngineExit { code: output.exit_code });
    }

    let actual = parse_rows(&output.stdout);
    let expected = parse_rows(&scenario.read_expected()?);
    debug!(actual = actual.len(), expected = expected.len(), "Parsed rows");

    Ok(compare(&actual, &expected))
  }

  /// Runs every scenario and writes the report to `out`. Scenario errors are reported
  /// and counted; only a failure to write the report stops the batch.
  pub fn run_all<W: Write>(&self, scenarios: &[Scenario], out: &mut W) -> io::Result<RunSummary> {
    let mut summary = RunSummary::default();

    for scenario in scenarios {
      writeln!(out, "Running test: {}", scenario.name)?;
      info!(scenario = %scenario.name, "Running scenario");

      let outcome = match self.run_one(scenario) {
        Ok(comparison) if comparison.passed() => Outcome::Passed,
        Ok(comparison) => Outcome::Failed(comparison),
        Err(e) => Outcome::Errored(e),
      };

      report(&scenario.name, &outcome, out)?;
      summary.record(&outcome);
    }

    writeln!(
      out,
      "{} passed, {} failed, {} errored",
      summary.passed, summary.failed, summary.errored
    )?;
    Ok(summary)
  }
}

fn report<W: Write>(name: &str, outcome: &Outcome, out: &mut W) -> io::Result<()> {
  match outcome {
    Outcome::Passed => {
      info!(scenario = %name, "Scenario passed");
      writeln!(out, "Test passed")
    }
    Outcome::Failed(comparison) => {
      warn!(scenario = %name, divergences = comparison.divergences.len(), "Scenario failed");
      for divergence in &comparison.divergences {
        write_divergence(divergence, out)?;
      }
      writeln!(out, "Test failed")
    }
    Outcome::Errored(e) => {
      warn!(scenario = %name, error = %e, "Scenario errored");
      writeln!(out, "Test errored: {e}")
    }
  }
}

fn write_divergence<W: Write>(divergence: &Divergence, out: &mut W) -> io::Result<()> {
  writeln!(out, "Difference found on line {}", divergence.index)?;
  writeln!(out, "Output:   {}", display_row(divergence.actual.as_ref()))?;
  writeln!(out, "Expected: {}", display_row(divergence.expected.as_ref()))
}

fn display_row(row: Option<&Row>) -> String {
  row.map_or_else(|| "<missing>".to_string(), Row::to_string)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::EngineOutput;
  use crate::scenario::{EXPECTED_FILE, INPUT_FILE};
  use std::cell::RefCell;
  use std::fs;
  use std::path::{Path, PathBuf};
  use tempfile::TempDir;

  /// Returns canned output and records which inputs it was called with
  struct FakeEngine {
    stdout: String,
    exit_code: Option<i32>,
    calls: RefCell<Vec<PathBuf>>,
  }

  impl FakeEngine {
    fn printing(stdout: &str) -> Self {
      Self { stdout: stdout.to_string(), exit_code: Some(0), calls: RefCell::new(vec![]) }
    }
  }

  impl EngineRunner for FakeEngine {
    fn run(&self, input: &Path) -> Result<EngineOutput, HarnessError> {
      self.calls.borrow_mut().push(input.to_path_buf());
      Ok(EngineOutput { stdout: self.stdout.clone(), exit_code: self.exit_code })
    }
  }

  const DEPOSIT_OUTPUT: &str =
    "client, available, held, total, locked\n1, 100.0000, 0.0000, 100.0000, false\n";

  fn scenario(dir: &TempDir, name: &str, expected: &str) -> Scenario {
    let scenario_dir = dir.path().join(name);
    fs::create_dir_all(&scenario_dir).unwrap();
    fs::write(scenario_dir.join(INPUT_FILE), "type,client,tx,amount\ndeposit,1,1,100.0\n")
      .unwrap();
    fs::write(scenario_dir.join(EXPECTED_FILE), expected).unwrap();
    Scenario::from_data_dir(dir.path(), name)
  }

  fn report_text(runner: &Runner<FakeEngine>, scenarios: &[Scenario]) -> (RunSummary, String) {
    let mut out = Vec::new();
    let summary = runner.run_all(scenarios, &mut out).unwrap();
    (summary, String::from_utf8(out).unwrap())
  }

  #[test]
  fn test_deposit_scenario_passes() {
    let dir = TempDir::new().unwrap();
    let deposit = scenario(&dir, "deposit", DEPOSIT_OUTPUT);
    let runner = Runner::new(FakeEngine::printing(DEPOSIT_OUTPUT));

    let (summary, text) = report_text(&runner, &[deposit.clone()]);

    assert_eq!(summary, RunSummary { passed: 1, failed: 0, errored: 0 });
    assert!(text.contains("Running test: deposit\nTest passed\n"));
    assert_eq!(runner.engine.calls.borrow().as_slice(), &[deposit.input_path]);
  }

  #[test]
  fn test_whitespace_differences_are_ignored() {
    let dir = TempDir::new().unwrap();
    let deposit = scenario(&dir, "deposit", DEPOSIT_OUTPUT);
    let runner = Runner::new(FakeEngine::printing(
      "client,available,held,total,locked\n1,100.0000,0.0000,100.0000,false",
    ));

    assert!(runner.run_one(&deposit).unwrap().passed());
  }

  #[test]
  fn test_mismatch_reports_every_divergent_line() {
    let dir = TempDir::new().unwrap();
    let s = scenario(&dir, "mixed", "a,1\nb,2\nc,3\n");
    let runner = Runner::new(FakeEngine::printing("a,1\nB,2\nc,4\n"));

    let (summary, text) = report_text(&runner, &[s]);

    assert_eq!(summary.failed, 1);
    assert!(text.contains(
      "Difference found on line 1\nOutput:   [\"B\", \"2\"]\nExpected: [\"b\", \"2\"]\n"
    ));
    assert!(text.contains("Difference found on line 2\n"));
    assert!(!text.contains("Difference found on line 0\n"));
    assert!(text.contains("Test failed\n"));
  }

  #[test]
  fn test_missing_rows_are_reported() {
    let dir = TempDir::new().unwrap();
    let s = scenario(&dir, "short", "a\nb\nc\n");
    let runner = Runner::new(FakeEngine::printing("a\nb\n"));

    let (_, text) = report_text(&runner, &[s]);
    assert!(
      text.contains("Difference found on line 2\nOutput:   <missing>\nExpected: [\"c\"]\n")
    );
  }

  #[test]
  fn test_non_zero_exit_is_an_error() {
    let dir = TempDir::new().unwrap();
    let s = scenario(&dir, "deposit", DEPOSIT_OUTPUT);
    let mut engine = FakeEngine::printing(DEPOSIT_OUTPUT);
    engine.exit_code = Some(101);
    let runner = Runner::new(engine);

    assert!(matches!(runner.run_one(&s), Err(HarnessError::EngineExit { code: Some(101) })));
  }

  #[test]
  fn test_missing_fixture_skips_engine_and_batch_continues() {
    let dir = TempDir::new().unwrap();
    let missing = Scenario::from_data_dir(dir.path(), "missing");
    let present = scenario(&dir, "deposit", DEPOSIT_OUTPUT);
    let runner = Runner::new(FakeEngine::printing(DEPOSIT_OUTPUT));

    let (summary, text) = report_text(&runner, &[missing, present]);

    assert_eq!(summary, RunSummary { passed: 1, failed: 0, errored: 1 });
    assert!(!summary.all_passed());
    assert!(text.contains("Running test: missing\nTest errored: fixture"));
    assert!(text.contains("Running test: deposit\nTest passed\n"));
    assert!(text.ends_with("1 passed, 0 failed, 1 errored\n"));
    assert_eq!(runner.engine.calls.borrow().len(), 1);
  }

  #[test]
  fn test_scenarios_run_in_given_order() {
    let dir = TempDir::new().unwrap();
    let names = ["withdrawal", "deposit", "chargeback"];
    let scenarios: Vec<Scenario> =
      names.iter().map(|name| scenario(&dir, name, DEPOSIT_OUTPUT)).collect();
    let runner = Runner::new(FakeEngine::printing(DEPOSIT_OUTPUT));

    let (summary, _) = report_text(&runner, &scenarios);

    assert!(summary.all_passed());
    let calls = runner.engine.calls.borrow();
    let expected: Vec<PathBuf> = scenarios.iter().map(|s| s.input_path.clone()).collect();
    assert_eq!(*calls, expected);
  }
}
