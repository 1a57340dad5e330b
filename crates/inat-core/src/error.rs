//! Error types for `inat-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A row carried fewer fields than the entity declares columns.
  #[error("row has {found} fields, expected {expected}")]
  FieldCount { expected: usize, found: usize },

  #[error("invalid timestamp: {0:?}")]
  InvalidTimestamp(String),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
