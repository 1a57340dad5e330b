//! Progress reporting seam.
//!
//! Loaders and the archive fetcher report through a [`ProgressSink`]; the CLI
//! renders it as terminal progress bars, tests record it or ignore it.

/// Receiver of progress for one task at a time.
pub trait ProgressSink: Send + Sync {
  /// Start a new task. `None` means the total is unknown (spinner).
  fn begin(&self, total: Option<u64>, description: &str);

  fn advance(&self, amount: u64);

  fn finish(&self);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
  fn begin(&self, _total: Option<u64>, _description: &str) {}

  fn advance(&self, _amount: u64) {}

  fn finish(&self) {}
}
