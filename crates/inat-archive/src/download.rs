//! Anonymous HTTPS download of the archive.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use inat_core::progress::ProgressSink;
use reqwest::{Client, header::CONTENT_LENGTH};
use tokio::{fs, io::AsyncWriteExt as _};
use tracing::{debug, info};

use crate::{Error, Result};

pub const ARCHIVE_NAME: &str = "inaturalist-open-data-latest.tar.gz";

pub const DEFAULT_ARCHIVE_URL: &str =
  "https://inaturalist-open-data.s3.amazonaws.com/metadata/inaturalist-open-data-latest.tar.gz";

/// Downloads the archive into a local directory.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct Fetcher {
  client: Client,
  url:    String,
}

impl Fetcher {
  /// A fetcher for the public bucket.
  pub fn new() -> Result<Self> { Self::with_url(DEFAULT_ARCHIVE_URL) }

  pub fn with_url(url: impl Into<String>) -> Result<Self> {
    // No overall timeout: the archive is several gigabytes.
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self::with_client(client, url))
  }

  /// A fetcher using a caller-configured client.
  pub fn with_client(client: Client, url: impl Into<String>) -> Self {
    Self {
      client,
      url: url.into(),
    }
  }

  pub fn url(&self) -> &str { &self.url }

  /// Download the archive into `dest_dir` and return its path.
  ///
  /// An archive already present is returned as-is. The body is streamed to
  /// a `.part` file that is renamed on completion, so an interrupted
  /// download is never mistaken for a finished one.
  pub async fn fetch(
    &self,
    dest_dir: impl AsRef<Path>,
    progress: &dyn ProgressSink,
  ) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    fs::create_dir_all(dest_dir).await?;

    let path = dest_dir.join(ARCHIVE_NAME);
    if fs::try_exists(&path).await? {
      info!(path = %path.display(), "archive already exists");
      return Ok(path);
    }

    info!(url = %self.url, path = %path.display(), "downloading archive");
    let total = self.content_length().await?;
    debug!(?total, "archive size");

    let mut response = self.client.get(&self.url).send().await?;
    self.check(response.status())?;

    let partial = path.with_extension("gz.part");
    let mut file = fs::File::create(&partial).await?;

    progress.begin(total, "Downloading");
    let written = async {
      let mut written = 0u64;
      while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        progress.advance(chunk.len() as u64);
      }
      file.flush().await?;
      Ok::<_, Error>(written)
    }
    .await;
    progress.finish();

    let written = match written {
      Ok(n) => n,
      Err(e) => {
        drop(file);
        let _ = fs::remove_file(&partial).await;
        return Err(e);
      }
    };

    fs::rename(&partial, &path).await?;
    info!(bytes = written, "download complete");
    Ok(path)
  }

  /// Size reported by a `HEAD` request, if the server sends one.
  async fn content_length(&self) -> Result<Option<u64>> {
    let response = self.client.head(&self.url).send().await?;
    self.check(response.status())?;
    Ok(
      response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok()),
    )
  }

  fn check(&self, status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
      Ok(())
    } else {
      Err(Error::Status {
        url: self.url.clone(),
        status,
      })
    }
  }
}
