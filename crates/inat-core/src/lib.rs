//! Core types for the iNaturalist open-data loader.
//!
//! Entity records and their column registry, text-to-value coercion, row
//! mapping, and the batching TSV reader. This crate is pure synchronous and
//! free of database dependencies; the storage and ingestion crates build on
//! it.

pub mod chunks;
pub mod coerce;
pub mod column;
pub mod entity;
pub mod error;
pub mod progress;
pub mod row;

pub use error::{Error, Result};
