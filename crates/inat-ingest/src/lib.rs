//! Bulk loading of extracted archive files into a [`SqliteStore`].
//!
//! [`TableLoader`] replaces one table from its source file;
//! [`load_all`] runs it over a selection of entities in dependency order,
//! isolating failures per table.
//!
//! [`SqliteStore`]: inat_store_sqlite::SqliteStore

mod loader;
mod options;
mod orchestrator;

pub mod error;

pub use error::{Error, Result};
pub use loader::TableLoader;
pub use options::LoadOptions;
pub use orchestrator::{LoadReport, TableReport, load_all, load_all_uri};
