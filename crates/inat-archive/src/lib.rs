//! Fetching and unpacking the iNaturalist open-data metadata archive.
//!
//! [`Fetcher`] downloads the tarball from the public bucket;
//! [`extract`] unpacks it into a flat directory of source files.

mod download;
mod extract;

pub mod error;

pub use download::{ARCHIVE_NAME, DEFAULT_ARCHIVE_URL, Fetcher};
pub use error::{Error, Result};
pub use extract::extract;
