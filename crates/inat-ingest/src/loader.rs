//! One table, one source file, one transaction.

use std::{path::PathBuf, sync::Arc};

use inat_core::{
  chunks::{ChunkedReader, count_rows},
  entity::Entity,
  progress::ProgressSink,
};
use inat_store_sqlite::SqliteStore;
use tracing::{debug, info};

use crate::{Error, LoadOptions, Result};

/// Replaces a table's contents with the rows of its source file.
pub struct TableLoader {
  store:        SqliteStore,
  download_dir: PathBuf,
  batch_size:   usize,
  progress:     Arc<dyn ProgressSink>,
}

impl TableLoader {
  pub fn new(
    store: SqliteStore,
    options: &LoadOptions,
    progress: Arc<dyn ProgressSink>,
  ) -> Self {
    Self {
      store,
      download_dir: options.download_dir.clone(),
      batch_size: options.batch_size,
      progress,
    }
  }

  pub fn source_path(&self, entity: Entity) -> PathBuf {
    self.download_dir.join(entity.source_file())
  }

  /// Load `entity` and return the number of rows now in its table.
  ///
  /// The file is counted first so progress has a total, then streamed in
  /// batches into a single transaction. On any error the table keeps its
  /// previous contents.
  pub async fn load(&self, entity: Entity) -> Result<u64> {
    let path = self.source_path(entity);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
      return Err(Error::SourceNotFound(path));
    }

    info!(table = entity.table(), path = %path.display(), "loading table");

    self
      .progress
      .begin(None, &format!("Counting {entity} rows"));
    let counted = {
      let path = path.clone();
      tokio::task::spawn_blocking(move || count_rows(path)).await
    };
    self.progress.finish();
    let total = counted?.map_err(|source| Error::Source {
      path: path.clone(),
      source,
    })?;
    debug!(table = entity.table(), total, "counted source rows");

    let reader = ChunkedReader::open(&path, self.batch_size).map_err(|source| {
      Error::Source {
        path: path.clone(),
        source,
      }
    })?;
    let columns = entity.columns();
    let batches = reader.map(move |batch| batch.and_then(|b| b.map_rows(columns)));

    self
      .progress
      .begin(Some(total), &format!("Loading {entity} records"));
    let progress = Arc::clone(&self.progress);
    let result = self
      .store
      .replace_table(entity, batches, move |n| progress.advance(n as u64))
      .await;
    self.progress.finish();

    Ok(result?)
  }
}
