use rust_decimal::Decimal;
use serde::Serialize;

/// The five record kinds the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
  Deposit,
  Withdrawal,
  Dispute,
  Resolve,
  Chargeback,
}

impl TransactionType {
  pub const ALL: [TransactionType; 5] = [
    TransactionType::Deposit,
    TransactionType::Withdrawal,
    TransactionType::Dispute,
    TransactionType::Resolve,
    TransactionType::Chargeback,
  ];
}

/// One generated CSV row. Every kind carries an amount; the generator does not
/// model which kinds the engine expects one for.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
  #[serde(rename = "type")]
  pub tx_type: TransactionType,
  pub client: u16,
  pub tx: u32,
  pub amount: Decimal,
}

pub const CSV_HEADER: [&str; 4] = ["type", "client", "tx", "amount"];
