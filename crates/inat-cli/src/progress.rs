//! Terminal rendering of [`ProgressSink`] with `indicatif`.

use std::{
  sync::{Mutex, PoisonError},
  time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use inat_core::progress::ProgressSink;

const ROW_TEMPLATE: &str =
  "{msg:<28} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {eta}";
const BYTE_TEMPLATE: &str =
  "{msg:<28} [{bar:40.cyan/blue}] {percent}% {bytes_per_sec} {bytes}/{total_bytes} {eta}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

#[derive(Debug, Clone, Copy)]
enum Unit {
  Rows,
  Bytes,
}

/// One bar at a time; beginning a new task clears the previous one.
pub struct TerminalProgress {
  unit: Unit,
  bar:  Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
  /// Counts of records.
  pub fn rows() -> Self { Self::new(Unit::Rows) }

  /// Transfer sizes, with throughput.
  pub fn bytes() -> Self { Self::new(Unit::Bytes) }

  fn new(unit: Unit) -> Self {
    Self {
      unit,
      bar: Mutex::new(None),
    }
  }

  fn style(&self) -> ProgressStyle {
    let template = match self.unit {
      Unit::Rows => ROW_TEMPLATE,
      Unit::Bytes => BYTE_TEMPLATE,
    };
    ProgressStyle::with_template(template)
      .unwrap_or_else(|_| ProgressStyle::default_bar())
      .progress_chars("#>-")
  }

  fn replace(&self, bar: Option<ProgressBar>) {
    let previous = std::mem::replace(
      &mut *self.bar.lock().unwrap_or_else(PoisonError::into_inner),
      bar,
    );
    if let Some(previous) = previous {
      previous.finish_and_clear();
    }
  }
}

impl ProgressSink for TerminalProgress {
  fn begin(&self, total: Option<u64>, description: &str) {
    let bar = match total {
      Some(total) => ProgressBar::new(total).with_style(self.style()),
      None => {
        let spinner = ProgressBar::new_spinner().with_style(
          ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
      }
    };
    bar.set_message(format!("{description}..."));
    self.replace(Some(bar));
  }

  fn advance(&self, amount: u64) {
    if let Some(bar) = self
      .bar
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .as_ref()
    {
      bar.inc(amount);
    }
  }

  fn finish(&self) {
    let finished = self
      .bar
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    if let Some(bar) = finished {
      if bar.length().is_some() {
        bar.finish();
      } else {
        bar.finish_and_clear();
      }
    }
  }
}
