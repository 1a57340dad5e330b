//! [`SqliteStore`]: bulk table replacement and read queries.

use std::path::Path;

use inat_core::{
  entity::{Entity, Observation, Photo, Taxon, User},
  row::MappedRow,
};
use rusqlite::{OptionalExtension as _, Statement, params_from_iter};
use tracing::debug;

use crate::{
  Result,
  encode::{Bind, RawObservation},
  schema::{delete_sql, insert_sql, quote, schema_sql},
  uri::{Location, parse_uri},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An open-data database backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// are serialised on the connection's thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and create any missing tables.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a store from a connection string such as `sqlite:///inat.db`.
  pub async fn open_uri(uri: &str) -> Result<Self> {
    match parse_uri(uri)? {
      Location::Memory => Self::open_in_memory().await,
      Location::Path(path) => Self::open(path).await,
    }
  }

  async fn init_schema(&self) -> Result<()> {
    let sql = schema_sql();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Bulk load ─────────────────────────────────────────────────────────────

  /// Replace the entire contents of `entity`'s table with `batches`.
  ///
  /// Deletes every row, then inserts each batch in order, calling
  /// `on_batch(len)` after a batch is written. Everything happens in one
  /// transaction that commits after the last batch; the first error from
  /// the iterator or from SQLite rolls it back and leaves the table as it
  /// was. Returns the number of rows inserted.
  pub async fn replace_table<I, F>(
    &self,
    entity: Entity,
    batches: I,
    on_batch: F,
  ) -> Result<u64>
  where
    I: Iterator<Item = inat_core::Result<Vec<MappedRow>>> + Send + 'static,
    F: FnMut(usize) + Send + 'static,
  {
    self
      .conn
      .call(move |conn| Ok(replace_in_transaction(conn, entity, batches, on_batch)))
      .await?
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn count(&self, entity: Entity) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote(entity.table()));
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |r| r.get(0))?))
      .await?;
    Ok(n as u64)
  }

  pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, login, name FROM \"user\" WHERE id = ?1",
                rusqlite::params![id],
                |row| {
                  Ok(User {
                    id:    row.get(0)?,
                    login: row.get(1)?,
                    name:  row.get(2)?,
                  })
                },
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  pub async fn get_taxon(&self, id: i64) -> Result<Option<Taxon>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT id, ancestry, rank, rank_level, name, active
                 FROM taxon WHERE id = ?1",
                rusqlite::params![id],
                |row| {
                  Ok(Taxon {
                    id:         row.get(0)?,
                    ancestry:   row.get(1)?,
                    rank:       row.get(2)?,
                    rank_level: row.get(3)?,
                    name:       row.get(4)?,
                    active:     row.get(5)?,
                  })
                },
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  pub async fn get_observation(&self, uuid: &str) -> Result<Option<Observation>> {
    let uuid = uuid.to_owned();

    let raw: Option<RawObservation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT uuid, user_id, latitude, longitude, positional_accuracy,
                      taxon_id, quality_grade, observed_on
               FROM observation WHERE uuid = ?1",
              rusqlite::params![uuid],
              |row| {
                Ok(RawObservation {
                  uuid:                row.get(0)?,
                  user_id:             row.get(1)?,
                  latitude:            row.get(2)?,
                  longitude:           row.get(3)?,
                  positional_accuracy: row.get(4)?,
                  taxon_id:            row.get(5)?,
                  quality_grade:       row.get(6)?,
                  observed_on:         row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawObservation::into_observation).transpose()
  }

  /// Photos attached to an observation, in display order.
  pub async fn photos_for_observation(&self, uuid: &str) -> Result<Vec<Photo>> {
    let uuid = uuid.to_owned();

    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(
            "SELECT uuid, photo_id, observation_uuid, user_id, extension,
                    license, width, height, position
             FROM photo WHERE observation_uuid = ?1
             ORDER BY position, rowid",
          )?;
          let photos = stmt
            .query_map(rusqlite::params![uuid], |row| {
              Ok(Photo {
                uuid:             row.get(0)?,
                photo_id:         row.get(1)?,
                observation_uuid: row.get(2)?,
                user_id:          row.get(3)?,
                extension:        row.get(4)?,
                license:          row.get(5)?,
                width:            row.get(6)?,
                height:           row.get(7)?,
                position:         row.get(8)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(photos)
        })
        .await?,
    )
  }
}

// ─── Transaction body ────────────────────────────────────────────────────────

/// Runs on the connection thread.
fn replace_in_transaction<I, F>(
  conn: &mut rusqlite::Connection,
  entity: Entity,
  batches: I,
  mut on_batch: F,
) -> Result<u64>
where
  I: Iterator<Item = inat_core::Result<Vec<MappedRow>>>,
  F: FnMut(usize),
{
  let tx = conn.transaction()?;

  let deleted = tx.execute(&delete_sql(entity), [])?;
  debug!(table = entity.table(), deleted, "cleared table");

  let mut inserted = 0u64;
  {
    let mut stmt = tx.prepare_cached(&insert_sql(entity))?;
    for batch in batches {
      let rows = batch?;
      insert_batch(&mut stmt, &rows)?;
      inserted += rows.len() as u64;
      on_batch(rows.len());
    }
  }

  tx.commit()?;
  debug!(table = entity.table(), inserted, "committed table");
  Ok(inserted)
}

/// Write one batch through the table's prepared `INSERT`.
fn insert_batch(stmt: &mut Statement<'_>, rows: &[MappedRow]) -> rusqlite::Result<()> {
  for row in rows {
    stmt.execute(params_from_iter(row.values().map(Bind)))?;
  }
  Ok(())
}
