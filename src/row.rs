use std::fmt;

pub const FIELD_SEPARATOR: char = ',';

/// One line of engine output split into trimmed fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row(Vec<String>);

impl Row {
  pub fn parse(line: &str) -> Self {
    Self(line.split(FIELD_SEPARATOR).map(|field| field.trim().to_string()).collect())
  }

  pub fn fields(&self) -> &[String] {
    &self.0
  }

  pub fn to_line(&self) -> String {
    self.0.join(",")
  }
}

impl<S: Into<String>> FromIterator<S> for Row {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self(iter.into_iter().map(Into::into).collect())
  }
}

impl fmt::Display for Row {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.0)
  }
}

/// Splits text into rows. `str::lines` handles `\n` and `\r\n` and does not yield an
/// empty row for the final terminator, so stdout and fixture files parse the same way.
/// Blank lines in the middle are kept as a row with one empty field.
pub fn parse_rows(text: &str) -> Vec<Row> {
  text.lines().map(Row::parse).collect()
}
