//! Bounded-batch reading of tab-separated source files.
//!
//! The archive's `.csv` files are really TSV with a header line. A
//! [`ChunkedReader`] yields them as [`Batch`]es of at most `batch_size` rows so
//! memory stays bounded regardless of file size. It knows nothing about
//! entities or progress: consumers map each batch and report progress
//! themselves once the batch is written.

use std::{
  fs::File,
  io::{BufRead, BufReader, Read},
  path::Path,
};

use csv::{ReaderBuilder, StringRecord};

use crate::{
  Result,
  column::Column,
  row::{MappedRow, map_row},
};

pub const DEFAULT_BATCH_SIZE: usize = 20_000;

/// A group of raw rows, in file order.
#[derive(Debug, Clone, Default)]
pub struct Batch {
  rows: Vec<StringRecord>,
}

impl Batch {
  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn rows(&self) -> &[StringRecord] { &self.rows }

  /// Map every row onto `columns`, failing on the first bad row.
  pub fn map_rows(&self, columns: &[Column]) -> Result<Vec<MappedRow>> {
    self
      .rows
      .iter()
      .map(|record| map_row(columns, record.iter()))
      .collect()
  }
}

/// Iterator over the batches of one source. Restart by reopening.
pub struct ChunkedReader<R> {
  reader:     csv::Reader<R>,
  batch_size: usize,
  rows_read:  u64,
  done:       bool,
}

impl ChunkedReader<File> {
  pub fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self> {
    Ok(Self::new(File::open(path)?, batch_size))
  }
}

impl<R: Read> ChunkedReader<R> {
  /// Wrap `source`. A `batch_size` of zero is treated as one.
  ///
  /// Quotes have no meaning in the source files and are kept literally.
  /// Empty lines are skipped, both here and by [`count_rows`].
  pub fn new(source: R, batch_size: usize) -> Self {
    let reader = ReaderBuilder::new()
      .delimiter(b'\t')
      .quoting(false)
      .has_headers(true)
      .flexible(true)
      .from_reader(source);

    Self {
      reader,
      batch_size: batch_size.max(1),
      rows_read: 0,
      done: false,
    }
  }

  pub fn batch_size(&self) -> usize { self.batch_size }

  /// Rows yielded so far.
  pub fn rows_read(&self) -> u64 { self.rows_read }
}

impl<R: Read> Iterator for ChunkedReader<R> {
  type Item = Result<Batch>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }

    let mut rows = Vec::new();
    while rows.len() < self.batch_size {
      let mut record = StringRecord::new();
      match self.reader.read_record(&mut record) {
        Ok(true) => rows.push(record),
        Ok(false) => {
          self.done = true;
          break;
        }
        Err(e) => {
          self.done = true;
          return Some(Err(e.into()));
        }
      }
    }

    if rows.is_empty() {
      return None;
    }
    self.rows_read += rows.len() as u64;
    Some(Ok(Batch { rows }))
  }
}

/// Number of data rows in a source file: its non-empty line count minus the
/// header.
pub fn count_rows(path: impl AsRef<Path>) -> Result<u64> {
  let mut reader = BufReader::with_capacity(1 << 16, File::open(path)?);
  let mut lines = 0u64;
  let mut in_line = false;

  loop {
    let buf = reader.fill_buf()?;
    if buf.is_empty() {
      break;
    }
    for &b in buf {
      match b {
        b'\n' => {
          lines += u64::from(in_line);
          in_line = false;
        }
        b'\r' => {}
        _ => in_line = true,
      }
    }
    let len = buf.len();
    reader.consume(len);
  }

  // Unterminated last line.
  lines += u64::from(in_line);
  Ok(lines.saturating_sub(1))
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;
  use crate::entity::Entity;

  fn tsv(rows: usize) -> String {
    let mut s = String::from("id\tlogin\tname\n");
    for i in 0..rows {
      s.push_str(&format!("{i}\tlogin{i}\tName {i}\n"));
    }
    s
  }

  fn sizes(rows: usize, batch_size: usize) -> Vec<usize> {
    ChunkedReader::new(tsv(rows).as_bytes(), batch_size)
      .map(|b| b.unwrap().len())
      .collect()
  }

  #[test]
  fn batch_sizes_follow_ceiling_division() {
    for n in 0..=9 {
      for b in 1..=4 {
        let got = sizes(n, b);
        assert_eq!(got.len(), n.div_ceil(b), "n={n} b={b}");
        assert_eq!(got.iter().sum::<usize>(), n, "n={n} b={b}");
        if let Some((last, full)) = got.split_last() {
          assert!(full.iter().all(|&s| s == b), "n={n} b={b}");
          let expected_last = if n % b == 0 { b } else { n % b };
          assert_eq!(*last, expected_last, "n={n} b={b}");
        }
      }
    }
  }

  #[test]
  fn exact_multiple_has_no_empty_trailing_batch() {
    assert_eq!(sizes(6, 3), vec![3, 3]);
  }

  #[test]
  fn header_only_and_empty_files_yield_nothing() {
    assert!(sizes(0, 5).is_empty());
    assert_eq!(ChunkedReader::new(&b""[..], 5).count(), 0);
  }

  #[test]
  fn header_is_stripped_and_order_kept() {
    let data = tsv(3);
    let mut reader = ChunkedReader::new(data.as_bytes(), 2);
    let first = reader.next().unwrap().unwrap();
    assert_eq!(&first.rows()[0][0], "0");
    assert_eq!(&first.rows()[1][1], "login1");
    assert_eq!(reader.rows_read(), 2);

    let second = reader.next().unwrap().unwrap();
    assert_eq!(&second.rows()[0][2], "Name 2");
    assert_eq!(reader.rows_read(), 3);
    assert!(reader.next().is_none());
    assert!(reader.next().is_none());
  }

  #[test]
  fn zero_batch_size_is_clamped() {
    let data = tsv(2);
    let reader = ChunkedReader::new(data.as_bytes(), 0);
    assert_eq!(reader.batch_size(), 1);
    assert_eq!(reader.count(), 2);
  }

  #[test]
  fn short_rows_survive_reading_and_fail_mapping() {
    let data = "id\tlogin\tname\n1\tjdoe\tJane Doe\n2\tbob\n";
    let batch = ChunkedReader::new(data.as_bytes(), 10)
      .next()
      .unwrap()
      .unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch.map_rows(Entity::User.columns()).is_err());
  }

  #[test]
  fn count_rows_subtracts_the_header() {
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join("observers.csv");
    std::fs::write(&path, tsv(4)).unwrap();
    assert_eq!(count_rows(&path).unwrap(), 4);

    let mut f = File::create(&path).unwrap();
    write!(f, "id\tlogin\tname\n1\ta\tb").unwrap();
    drop(f);
    assert_eq!(count_rows(&path).unwrap(), 1);

    std::fs::write(&path, "").unwrap();
    assert_eq!(count_rows(&path).unwrap(), 0);
  }

  #[test]
  fn quotes_are_literal() {
    let data = "id\tlogin\tname\n2\t\"bob\tBob\n3\tkim\t\"Kim\"\n";
    let batch = ChunkedReader::new(data.as_bytes(), 10)
      .next()
      .unwrap()
      .unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(&batch.rows()[0][1], "\"bob");
    assert_eq!(&batch.rows()[0][2], "Bob");
    assert_eq!(&batch.rows()[1][2], "\"Kim\"");
  }

  #[test]
  fn blank_lines_are_skipped_and_not_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("observers.csv");
    std::fs::write(&path, "id\tlogin\tname\n1\ta\tA\n\n\r\n2\tb\tB\n").unwrap();

    assert_eq!(count_rows(&path).unwrap(), 2);
    let rows: usize = ChunkedReader::open(&path, 10)
      .unwrap()
      .map(|b| b.unwrap().len())
      .sum();
    assert_eq!(rows, 2);
  }
}
