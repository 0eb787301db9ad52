use crate::row::Row;

/// A row index where actual and expected differ. A side is `None` when that
/// output ran out of rows before the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
  pub index: usize,
  pub actual: Option<Row>,
  pub expected: Option<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
  pub divergences: Vec<Divergence>,
}

impl Comparison {
  pub fn passed(&self) -> bool {
    self.divergences.is_empty()
  }
}

/// Positional, exact comparison over the longer of the two outputs. Fields are compared
/// as strings, so `1.5` and `1.50` differ and so do `true` and `TRUE`.
pub fn compare(actual: &[Row], expected: &[Row]) -> Comparison {
  let len = actual.len().max(expected.len());
  let divergences = (0..len)
    .filter_map(|index| {
      let a = actual.get(index);
      let e = expected.get(index);
      (a != e).then(|| Divergence { index, actual: a.cloned(), expected: e.cloned() })
    })
    .collect();

  Comparison { divergences }
}
