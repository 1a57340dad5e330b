//! Running the loader across every selected table.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use inat_core::{entity::Entity, progress::ProgressSink};
use inat_store_sqlite::SqliteStore;
use tracing::{debug, error, info};

use crate::{LoadOptions, Result, TableLoader};

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Outcome of loading a single table.
#[derive(Debug)]
pub struct TableReport {
  pub entity:  Entity,
  pub elapsed: Duration,
  /// Rows loaded, or why the table was left untouched.
  pub outcome: Result<u64>,
}

impl TableReport {
  pub fn is_success(&self) -> bool { self.outcome.is_ok() }
}

/// Outcome of a whole run, one entry per table in load order.
#[derive(Debug)]
pub struct LoadReport {
  /// Where the rows went, as given by the caller.
  pub target: String,
  pub tables: Vec<TableReport>,
}

impl LoadReport {
  pub fn succeeded(&self) -> impl Iterator<Item = &TableReport> {
    self.tables.iter().filter(|t| t.is_success())
  }

  pub fn failed(&self) -> impl Iterator<Item = &TableReport> {
    self.tables.iter().filter(|t| !t.is_success())
  }

  pub fn total_rows(&self) -> u64 {
    self
      .tables
      .iter()
      .filter_map(|t| t.outcome.as_ref().ok())
      .sum()
  }

  pub fn is_success(&self) -> bool { self.tables.iter().all(TableReport::is_success) }
}

// ─── Runs ────────────────────────────────────────────────────────────────────

/// Load every entity in `options` into `store`, parents first.
///
/// A failing table is logged and recorded in the report; later tables still
/// run. `target` only labels the report and log lines.
pub async fn load_all(
  store: &SqliteStore,
  target: &str,
  options: &LoadOptions,
  progress: Arc<dyn ProgressSink>,
) -> LoadReport {
  let loader = TableLoader::new(store.clone(), options, progress);
  let mut tables = Vec::new();

  for entity in Entity::load_order(&options.entities) {
    let start = Instant::now();
    let outcome = loader.load(entity).await;
    let elapsed = start.elapsed();

    match &outcome {
      Ok(rows) if options.verbose => info!(
        table = entity.table(),
        rows,
        "{entity} finished in {:.2} seconds",
        elapsed.as_secs_f64()
      ),
      Ok(rows) => debug!(
        table = entity.table(),
        rows,
        "{entity} finished in {:.2} seconds",
        elapsed.as_secs_f64()
      ),
      Err(e) => error!(table = entity.table(), "failed to load {entity}: {e}"),
    }

    tables.push(TableReport {
      entity,
      elapsed,
      outcome,
    });
  }

  let report = LoadReport {
    target: target.to_owned(),
    tables,
  };
  info!(
    db = %report.target,
    loaded = report.succeeded().count(),
    failed = report.failed().count(),
    rows = report.total_rows(),
    "load finished"
  );
  report
}

/// Open the store at `uri` and run [`load_all`] against it.
///
/// Failing to open the store aborts before any table is touched.
pub async fn load_all_uri(
  uri: &str,
  options: &LoadOptions,
  progress: Arc<dyn ProgressSink>,
) -> Result<LoadReport> {
  let store = SqliteStore::open_uri(uri).await?;
  Ok(load_all(&store, uri, options, progress).await)
}
