//! Conversion of raw TSV fields into typed column values.
//!
//! Only booleans and timestamps are converted here. Numeric text passes
//! through untouched; the storage layer's native type affinity converts it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{Error, Result, column::ColumnType};

/// Storage format for timestamps. [`parse_timestamp`] reads it back.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Formats carrying a UTC offset; normalised to UTC.
const OFFSET_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f%z",
  "%Y-%m-%d %H:%M:%S%.f%z",
  "%Y-%m-%d %H:%M:%S%.f %z",
];

const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
  "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A coerced field, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Text(String),
  Bool(bool),
  Timestamp(NaiveDateTime),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }
}

/// Coerce one raw field for a column of type `ty`.
///
/// - timestamps: blank is `Null`, anything else must parse;
/// - booleans: `true` iff the text is exactly `"true"` ignoring case;
/// - everything else: blank is `Null`, anything else passes through as-is.
pub fn coerce(ty: ColumnType, raw: &str) -> Result<Value> {
  match ty {
    ColumnType::Timestamp => {
      if raw.trim().is_empty() {
        Ok(Value::Null)
      } else {
        parse_timestamp(raw).map(Value::Timestamp)
      }
    }
    ColumnType::Boolean => Ok(Value::Bool(raw.eq_ignore_ascii_case("true"))),
    ColumnType::Integer | ColumnType::Float | ColumnType::String => {
      if raw.trim().is_empty() {
        Ok(Value::Null)
      } else {
        Ok(Value::Text(raw.to_owned()))
      }
    }
  }
}

/// Parse a date or date-time in any of the common ISO-like layouts.
/// Date-only input is midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
  let s = raw.trim();
  let s = s.strip_suffix(" UTC").unwrap_or(s);

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.naive_utc());
  }
  for fmt in OFFSET_FORMATS {
    if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
      return Ok(dt.naive_utc());
    }
  }
  for fmt in NAIVE_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
      return Ok(dt);
    }
  }
  for fmt in DATE_FORMATS {
    if let Some(dt) = NaiveDate::parse_from_str(s, fmt)
      .ok()
      .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
      return Ok(dt);
    }
  }

  Err(Error::InvalidTimestamp(raw.to_owned()))
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
  ts.format(TIMESTAMP_FORMAT).to_string()
}
