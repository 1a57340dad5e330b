//! Positional mapping of raw fields onto an entity's columns.

use crate::{
  Error, Result,
  coerce::{Value, coerce},
  column::Column,
};

/// Column name → coerced value, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
  entries: Vec<(&'static str, Value)>,
}

impl MappedRow {
  pub fn get(&self, name: &str) -> Option<&Value> {
    self
      .entries
      .iter()
      .find(|(n, _)| *n == name)
      .map(|(_, v)| v)
  }

  /// Values in column order, for positional binding.
  pub fn values(&self) -> impl Iterator<Item = &Value> {
    self.entries.iter().map(|(_, v)| v)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
    self.entries.iter().map(|(n, v)| (*n, v))
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Coerce `fields` against `columns` pair by pair.
///
/// Fewer fields than columns is a structural mismatch between the file and
/// the registry and fails the row. Trailing extra fields are ignored.
pub fn map_row<'r, I>(columns: &[Column], fields: I) -> Result<MappedRow>
where
  I: IntoIterator<Item = &'r str>,
{
  let mut fields = fields.into_iter();
  let mut entries = Vec::with_capacity(columns.len());

  for (found, column) in columns.iter().enumerate() {
    let raw = fields.next().ok_or(Error::FieldCount {
      expected: columns.len(),
      found,
    })?;
    entries.push((column.name, coerce(column.ty, raw)?));
  }

  Ok(MappedRow { entries })
}
