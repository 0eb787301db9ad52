use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::config::GeneratorParams;
use crate::error::GenerateError;
use crate::transaction::{TransactionRecord, TransactionType, CSV_HEADER};

/// Amounts are drawn in ten-thousandths, so every value has scale 4
pub const AMOUNT_SCALE: u32 = 4;
const MIN_AMOUNT_UNITS: i64 = 100; // 0.0100
const MAX_AMOUNT_UNITS: i64 = 10_000_000; // 1000.0000

/// Writes `row_count` random rows plus a header to `path`, creating the parent
/// directory first. An existing file is overwritten.
#[instrument(skip(path, params, rng), fields(path = %path.display()))]
pub fn generate<R: Rng + ?Sized>(
  path: &Path,
  row_count: u32,
  params: &GeneratorParams,
  rng: &mut R,
) -> Result<u32, GenerateError> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .map_err(|source| GenerateError::Io { path: parent.to_path_buf(), source })?;
  }

  let file =
    File::create(path).map_err(|source| GenerateError::Io { path: path.to_path_buf(), source })?;

  let written = write_transactions(BufWriter::new(file), row_count, params, rng)?;
  debug!(rows = written, "Dataset written");
  Ok(written)
}

/// Streams the header and `row_count` rows to `writer`. Rows are serialized as they are
/// produced; `tx` runs 1..=row_count regardless of type.
pub fn write_transactions<W: Write, R: Rng + ?Sized>(
  writer: W,
  row_count: u32,
  params: &GeneratorParams,
  rng: &mut R,
) -> Result<u32, GenerateError> {
  let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
  csv_writer.write_record(CSV_HEADER)?;

  for tx in 1..=row_count {
    csv_writer.serialize(random_record(tx, params, rng))?;
  }

  csv_writer.flush().map_err(csv::Error::from)?;
  Ok(row_count)
}

fn random_record<R: Rng + ?Sized>(
  tx: u32,
  params: &GeneratorParams,
  rng: &mut R,
) -> TransactionRecord {
  // ALL is non-empty
  let tx_type = *TransactionType::ALL.choose(rng).unwrap_or(&TransactionType::Deposit);
  let client = rng.gen_range(params.clients.min..=params.clients.max);
  let amount = Decimal::new(rng.gen_range(MIN_AMOUNT_UNITS..=MAX_AMOUNT_UNITS), AMOUNT_SCALE);

  TransactionRecord { tx_type, client, tx, amount }
}
