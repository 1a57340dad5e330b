//! SQLite backend for the iNaturalist open-data loader.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. A whole table load, from the
//! `DELETE` through the last batch, runs inside one call on that thread and
//! one transaction.

mod encode;
mod schema;
mod store;
mod uri;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
pub use uri::uri_for_path;

#[cfg(test)]
mod tests;
