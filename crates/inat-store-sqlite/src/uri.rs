//! Connection-string handling.
//!
//! Accepts SQLAlchemy-style URLs
//! (`sqlite:///relative.db`, `sqlite:////absolute.db`, `sqlite://` for an
//! in-memory database) plus `sqlite::memory:` and bare paths.

use std::path::PathBuf;

use crate::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub enum Location {
  Memory,
  Path(PathBuf),
}

pub fn parse_uri(uri: &str) -> Result<Location> {
  if uri == "sqlite::memory:" || uri == ":memory:" {
    return Ok(Location::Memory);
  }

  if let Some(rest) = uri.strip_prefix("sqlite://") {
    let path = rest.strip_prefix('/').unwrap_or(rest);
    return Ok(if path.is_empty() || path == ":memory:" {
      Location::Memory
    } else {
      Location::Path(PathBuf::from(path))
    });
  }

  if uri.is_empty() || uri.contains("://") {
    return Err(Error::UnsupportedUri(uri.to_owned()));
  }
  Ok(Location::Path(PathBuf::from(uri)))
}

/// The `sqlite:///…` URI for a filesystem path.
pub fn uri_for_path(path: &std::path::Path) -> String {
  format!("sqlite:///{}", path.display())
}
