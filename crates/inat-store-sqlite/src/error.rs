//! Error type for `inat-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Structural or coercion failure while mapping source rows.
  #[error("core error: {0}")]
  Core(#[from] inat_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("unsupported database uri: {0:?}")]
  UnsupportedUri(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
