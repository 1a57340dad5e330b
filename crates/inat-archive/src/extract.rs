//! Flat extraction of the gzip tarball.

use std::{
  fs::{self, File},
  io::{self, Read},
  path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use inat_core::progress::ProgressSink;
use tar::Archive;
use tracing::{debug, info};

use crate::Result;

/// Counts compressed bytes as the decoder pulls them.
struct ProgressReader<'a, R> {
  inner:    R,
  progress: &'a dyn ProgressSink,
}

impl<R: Read> Read for ProgressReader<'_, R> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let n = self.inner.read(buf)?;
    self.progress.advance(n as u64);
    Ok(n)
  }
}

/// Unpack every regular file in `archive_path` directly into `dest_dir`.
///
/// Directory components inside the archive are dropped, so
/// `inaturalist-open-data-20240101/taxa.csv` lands at `dest_dir/taxa.csv`.
/// Existing files are overwritten. Returns the written paths in archive
/// order. Blocking; run it off the async runtime.
pub fn extract(
  archive_path: impl AsRef<Path>,
  dest_dir: impl AsRef<Path>,
  progress: &dyn ProgressSink,
) -> Result<Vec<PathBuf>> {
  let archive_path = archive_path.as_ref();
  let dest_dir = dest_dir.as_ref();
  fs::create_dir_all(dest_dir)?;

  let file = File::open(archive_path)?;
  let total = file.metadata()?.len();
  info!(archive = %archive_path.display(), dest = %dest_dir.display(), "extracting");

  progress.begin(Some(total), "Extracting");
  let result = unpack_flat(
    ProgressReader {
      inner: file,
      progress,
    },
    dest_dir,
  );
  progress.finish();
  result
}

fn unpack_flat(source: impl Read, dest_dir: &Path) -> Result<Vec<PathBuf>> {
  let mut archive = Archive::new(GzDecoder::new(source));
  let mut written = Vec::new();

  for entry in archive.entries()? {
    let mut entry = entry?;
    if !entry.header().entry_type().is_file() {
      continue;
    }
    let Some(name) = entry.path()?.file_name().map(ToOwned::to_owned) else {
      continue;
    };

    let target = dest_dir.join(name);
    entry.unpack(&target)?;
    debug!(path = %target.display(), "extracted");
    written.push(target);
  }

  // Read through the end-of-archive padding so progress reaches the total.
  io::copy(&mut archive.into_inner(), &mut io::sink())?;
  Ok(written)
}
