//! Error type for `inat-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("source file not found: {}", .0.display())]
  SourceNotFound(PathBuf),

  #[error("failed to read {}: {source}", path.display())]
  Source {
    path:   PathBuf,
    #[source]
    source: inat_core::Error,
  },

  #[error("store error: {0}")]
  Store(#[from] inat_store_sqlite::Error),

  #[error("background task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
