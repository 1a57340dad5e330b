//! Per-run load settings.

use std::path::{Path, PathBuf};

use inat_core::{chunks::DEFAULT_BATCH_SIZE, entity::Entity};

/// Everything a load run needs besides the store itself. Built once by the
/// caller and passed in.
#[derive(Debug, Clone)]
pub struct LoadOptions {
  /// Directory holding the extracted `*.csv` files.
  pub download_dir: PathBuf,
  /// Rows per insert batch.
  pub batch_size:   usize,
  /// Entities to load; run in dependency order regardless of order here.
  pub entities:     Vec<Entity>,
  /// Log per-table timings at info level.
  pub verbose:      bool,
}

impl LoadOptions {
  pub fn new(download_dir: impl AsRef<Path>) -> Self {
    Self {
      download_dir: download_dir.as_ref().to_path_buf(),
      batch_size:   DEFAULT_BATCH_SIZE,
      entities:     Entity::ALL.to_vec(),
      verbose:      false,
    }
  }

  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size;
    self
  }

  /// Restrict the run to `entities`. An empty selection means all.
  pub fn with_entities(mut self, entities: &[Entity]) -> Self {
    self.entities = if entities.is_empty() {
      Entity::ALL.to_vec()
    } else {
      entities.to_vec()
    };
    self
  }

  pub fn with_verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }
}
