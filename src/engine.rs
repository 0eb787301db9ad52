use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::config::EngineConfig;
use crate::error::HarnessError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What the engine printed and how it exited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
  pub stdout: String,
  /// `None` when the process was terminated by a signal
  pub exit_code: Option<i32>,
}

impl EngineOutput {
  pub fn success(&self) -> bool {
    self.exit_code == Some(0)
  }
}

/// The boundary to the transaction engine under test. Implemented by [`ProcessEngine`]
/// for real runs and by in-memory fakes in tests.
pub trait EngineRunner {
  fn run(&self, input: &Path) -> Result<EngineOutput, HarnessError>;
}

/// Runs `program args... <input>` as a child process with a bounded wait
#[derive(Debug, Clone)]
pub struct ProcessEngine {
  program: String,
  args: Vec<String>,
  timeout: Duration,
}

impl ProcessEngine {
  pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
    Self { program: program.into(), args, timeout }
  }

  pub fn from_config(config: &EngineConfig) -> Self {
    Self::new(config.program.clone(), config.args.clone(), config.timeout())
  }

  fn spawn(&self, input: &Path) -> Result<Child, HarnessError> {
    Command::new(&self.program)
      .args(&self.args)
      .arg(input)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::inherit())
      .spawn()
      .map_err(|source| HarnessError::EngineLaunch { program: self.program.clone(), source })
  }

  /// Polls until the child exits or `deadline` passes. On expiry, or if the status
  /// cannot be read, the child is killed and reaped before the error is returned.
  fn wait_until(&self, child: &mut Child, deadline: Instant) -> Result<ExitStatus, HarnessError> {
    loop {
      match child.try_wait() {
        Ok(Some(status)) => return Ok(status),
        Ok(None) if Instant::now() >= deadline => {
          warn!(program = %self.program, timeout = ?self.timeout, "Engine timed out, killing");
          self.kill_and_reap(child);
          return Err(HarnessError::Timeout { after: self.timeout });
        }
        Ok(None) => thread::sleep(POLL_INTERVAL),
        Err(e) => {
          warn!(program = %self.program, error = %e, "Failed to poll engine, killing");
          self.kill_and_reap(child);
          return Err(HarnessError::EngineIo(e));
        }
      }
    }
  }

  fn kill_and_reap(&self, child: &mut Child) {
    if let Err(e) = child.kill() {
      warn!(program = %self.program, pid = child.id(), error = %e, "Failed to kill engine");
    }
    if let Err(e) = child.wait() {
      warn!(program = %self.program, pid = child.id(), error = %e, "Failed to reap engine");
    }
  }
}

impl EngineRunner for ProcessEngine {
  #[instrument(skip(self), fields(program = %self.program))]
  fn run(&self, input: &Path) -> Result<EngineOutput, HarnessError> {
    debug!(args = ?self.args, input = %input.display(), "Spawning engine");
    let deadline = Instant::now() + self.timeout;
    let mut child = self.spawn(input)?;

    let Some(stdout) = child.stdout.take() else {
      self.kill_and_reap(&mut child);
      return Err(HarnessError::EngineIo(io::Error::other("engine stdout was not captured")));
    };
    // Drained on its own thread so a chatty engine cannot block on a full pipe
    let received = drain(stdout);

    let status = self.wait_until(&mut child, deadline)?;

    // The pipe stays open while any process that inherited it is alive, so the drain
    // shares the deadline. A reader left behind is detached.
    let bytes = match received.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
      Ok(result) => result.map_err(HarnessError::EngineIo)?,
      Err(RecvTimeoutError::Timeout) => {
        warn!(program = %self.program, timeout = ?self.timeout, "Engine stdout still open");
        return Err(HarnessError::Timeout { after: self.timeout });
      }
      Err(RecvTimeoutError::Disconnected) => {
        return Err(HarnessError::EngineIo(io::Error::other("stdout reader stopped")));
      }
    };
    debug!(bytes = bytes.len(), status = %status, "Engine exited");

    // A failed run is reported by its exit status, whatever it printed
    let stdout = if status.success() {
      String::from_utf8(bytes)?
    } else {
      String::from_utf8_lossy(&bytes).into_owned()
    };

    Ok(EngineOutput { stdout, exit_code: status.code() })
  }
}

fn drain<R: Read + Send + 'static>(mut source: R) -> Receiver<io::Result<Vec<u8>>> {
  let (sender, receiver) = mpsc::channel();
  thread::spawn(move || {
    let mut buf = Vec::new();
    let result = source.read_to_end(&mut buf).map(|_| buf);
    // The receiver is gone once the run has timed out
    let _ = sender.send(result);
  });
  receiver
}
