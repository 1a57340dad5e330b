//! The four entity kinds, their records, and the schema registry.
//!
//! Relationships are plain foreign-key fields. Resolving them (photos of an
//! observation, the observer of a photo) is a query against the store, never
//! an embedded object graph.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnType};

/// Base URL of the public photo bucket.
pub const PHOTO_BASE_URL: &str =
  "https://inaturalist-open-data.s3.amazonaws.com/photos/";

/// Separator between ancestor ids in [`Taxon::ancestry`].
pub const ANCESTRY_SEPARATOR: char = '\\';

// ─── Entity kind ─────────────────────────────────────────────────────────────

/// One of the four record kinds in the archive.
///
/// Variants are declared in load order: parents before children. The derived
/// `Ord` is that order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Entity {
  User,
  Taxon,
  Observation,
  Photo,
}

impl Entity {
  /// Every entity, in load order.
  pub const ALL: [Entity; 4] =
    [Entity::User, Entity::Taxon, Entity::Observation, Entity::Photo];

  pub fn table(self) -> &'static str {
    match self {
      Entity::User => "user",
      Entity::Taxon => "taxon",
      Entity::Observation => "observation",
      Entity::Photo => "photo",
    }
  }

  /// File name of this entity's TSV inside the extracted archive.
  pub fn source_file(self) -> &'static str {
    match self {
      Entity::User => "observers.csv",
      Entity::Taxon => "taxa.csv",
      Entity::Observation => "observations.csv",
      Entity::Photo => "photos.csv",
    }
  }

  /// Ordered column descriptors, matching the source file's column order.
  pub fn columns(self) -> &'static [Column] {
    match self {
      Entity::User => USER_COLUMNS,
      Entity::Taxon => TAXON_COLUMNS,
      Entity::Observation => OBSERVATION_COLUMNS,
      Entity::Photo => PHOTO_COLUMNS,
    }
  }

  /// Sort `selected` into load order, dropping duplicates.
  pub fn load_order(selected: &[Entity]) -> Vec<Entity> {
    let mut ordered = selected.to_vec();
    ordered.sort();
    ordered.dedup();
    ordered
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

static USER_COLUMNS: &[Column] = &[
  Column::primary_key("id", ColumnType::Integer),
  Column::new("login", ColumnType::String).indexed(),
  Column::new("name", ColumnType::String),
];

static TAXON_COLUMNS: &[Column] = &[
  Column::primary_key("id", ColumnType::Integer),
  Column::new("ancestry", ColumnType::String),
  Column::new("rank", ColumnType::String),
  Column::new("rank_level", ColumnType::Float),
  Column::new("name", ColumnType::String).indexed(),
  Column::new("active", ColumnType::Boolean),
];

static OBSERVATION_COLUMNS: &[Column] = &[
  Column::primary_key("uuid", ColumnType::String).indexed(),
  Column::new("user_id", ColumnType::Integer)
    .indexed()
    .references("user", "id"),
  Column::new("latitude", ColumnType::Float),
  Column::new("longitude", ColumnType::Float),
  Column::new("positional_accuracy", ColumnType::Integer),
  Column::new("taxon_id", ColumnType::Integer)
    .indexed()
    .references("taxon", "id"),
  Column::new("quality_grade", ColumnType::String).indexed(),
  Column::new("observed_on", ColumnType::Timestamp).indexed(),
];

static PHOTO_COLUMNS: &[Column] = &[
  Column::primary_key("uuid", ColumnType::String).indexed(),
  Column::new("photo_id", ColumnType::Integer),
  Column::new("observation_uuid", ColumnType::String)
    .indexed()
    .references("observation", "uuid"),
  Column::new("user_id", ColumnType::Integer)
    .indexed()
    .references("user", "id"),
  Column::new("extension", ColumnType::String),
  Column::new("license", ColumnType::String),
  Column::new("width", ColumnType::Integer),
  Column::new("height", ColumnType::Integer),
  Column::new("position", ColumnType::Integer),
];

// ─── Records ─────────────────────────────────────────────────────────────────

/// An observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id:    i64,
  pub login: Option<String>,
  pub name:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxon {
  pub id:         i64,
  pub ancestry:   Option<String>,
  pub rank:       Option<String>,
  pub rank_level: Option<f64>,
  pub name:       Option<String>,
  pub active:     Option<bool>,
}

impl Taxon {
  /// Ancestor ids from the root down, as they appear in `ancestry`.
  pub fn ancestors(&self) -> Vec<&str> {
    match self.ancestry.as_deref() {
      Some(a) if !a.is_empty() => a.split(ANCESTRY_SEPARATOR).collect(),
      _ => Vec::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
  pub uuid:                String,
  pub user_id:             Option<i64>,
  pub latitude:            Option<f64>,
  pub longitude:           Option<f64>,
  pub positional_accuracy: Option<i64>,
  pub taxon_id:            Option<i64>,
  pub quality_grade:       Option<String>,
  pub observed_on:         Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
  pub uuid:             String,
  pub photo_id:         Option<i64>,
  pub observation_uuid: Option<String>,
  pub user_id:          Option<i64>,
  pub extension:        Option<String>,
  pub license:          Option<String>,
  pub width:            Option<i64>,
  pub height:           Option<i64>,
  /// Display position among the observation's photos.
  pub position:         Option<i64>,
}

impl Photo {
  /// Public URL of this photo at `size` (`square`, `small`, `medium`,
  /// `large`, `original`).
  pub fn url(&self, size: &str) -> Option<String> {
    let id = self.photo_id?;
    let ext = self.extension.as_deref()?;
    Some(format!("{PHOTO_BASE_URL}{id}/{size}.{ext}"))
  }
}
