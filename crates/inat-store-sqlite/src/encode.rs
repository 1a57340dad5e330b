//! Binding coerced values into SQLite and decoding rows back into records.
//!
//! Text is bound as-is and left to the column's type affinity, so numeric
//! strings land as INTEGER or REAL. Booleans are stored as 0/1 and
//! timestamps as `YYYY-MM-DD HH:MM:SS.ffffff` text.

use inat_core::{
  coerce::{Value, format_timestamp, parse_timestamp},
  entity::Observation,
};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

use crate::Result;

// ─── Binding ─────────────────────────────────────────────────────────────────

/// Borrowing [`ToSql`] adapter for a coerced [`Value`].
pub struct Bind<'a>(pub &'a Value);

impl ToSql for Bind<'_> {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(match self.0 {
      Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
      Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
      Value::Bool(b) => ToSqlOutput::from(*b),
      Value::Timestamp(ts) => ToSqlOutput::from(format_timestamp(*ts)),
    })
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// An `observation` row before its timestamp is parsed.
pub struct RawObservation {
  pub uuid:                String,
  pub user_id:             Option<i64>,
  pub latitude:            Option<f64>,
  pub longitude:           Option<f64>,
  pub positional_accuracy: Option<i64>,
  pub taxon_id:            Option<i64>,
  pub quality_grade:       Option<String>,
  pub observed_on:         Option<String>,
}

impl RawObservation {
  pub fn into_observation(self) -> Result<Observation> {
    let observed_on = self
      .observed_on
      .as_deref()
      .map(parse_timestamp)
      .transpose()?;

    Ok(Observation {
      uuid: self.uuid,
      user_id: self.user_id,
      latitude: self.latitude,
      longitude: self.longitude,
      positional_accuracy: self.positional_accuracy,
      taxon_id: self.taxon_id,
      quality_grade: self.quality_grade,
      observed_on,
    })
  }
}
