//! Layered configuration: defaults, then `inat.toml`, then `INAT_*`
//! environment variables. Command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use inat_archive::DEFAULT_ARCHIVE_URL;
use inat_core::{chunks::DEFAULT_BATCH_SIZE, entity::Entity};
use inat_store_sqlite::uri_for_path;
use serde::Deserialize;

pub const DB_NAME: &str = "inaturalist-open-data.db";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Where the archive is downloaded and extracted.
  pub data_dir:    PathBuf,
  /// Defaults to a database file inside `data_dir`.
  pub db_uri:      Option<String>,
  pub batch_size:  usize,
  /// Empty means every entity.
  pub entities:    Vec<Entity>,
  pub archive_url: String,
}

impl Settings {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let mut settings: Settings = Config::builder()
      .set_default("data_dir", default_data_dir().to_string_lossy().into_owned())?
      .set_default("batch_size", DEFAULT_BATCH_SIZE as u64)?
      .set_default("entities", Vec::<String>::new())?
      .set_default("archive_url", DEFAULT_ARCHIVE_URL)?
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix("INAT")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("entities"),
      )
      .build()?
      .try_deserialize()?;

    settings.data_dir = expand_tilde(&settings.data_dir);
    Ok(settings)
  }

  pub fn db_uri(&self) -> String {
    self
      .db_uri
      .clone()
      .unwrap_or_else(|| uri_for_path(&self.data_dir.join(DB_NAME)))
  }
}

fn default_data_dir() -> PathBuf {
  directories::ProjectDirs::from("", "", "inaturalist")
    .map(|d| d.data_dir().to_path_buf())
    .unwrap_or_else(|| PathBuf::from(".inaturalist"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
