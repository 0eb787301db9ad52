//! Golden-master harness for a transaction engine: a dataset generator for stress runs
//! and a runner that diffs the engine's stdout against checked-in expected output.

pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod row;
pub mod runner;
pub mod scenario;
pub mod transaction;

pub use compare::{compare, Comparison, Divergence};
pub use engine::{EngineOutput, EngineRunner, ProcessEngine};
pub use error::{ConfigError, GenerateError, HarnessError};
pub use row::{parse_rows, Row};
pub use runner::{Outcome, RunSummary, Runner};
pub use scenario::Scenario;
