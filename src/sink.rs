//! Append-only CSV result sink
//!
//! One row per completed record, written through a handle held open for
//! the whole run — append cost does not grow with file size. Creating a
//! new (or empty) destination writes the header row first; an existing
//! file is opened in append mode without touching prior rows. Each row is
//! flushed immediately so it is durable before its checkpoint mark lands.

use crate::QuarryError;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Streaming appender for fixed-width result rows.
pub struct CsvSink {
    writer: csv::Writer<File>,
    width: usize,
    path: PathBuf,
}

impl CsvSink {
    /// Opens the sink for appending, creating it with `header` when the
    /// destination does not exist or is empty.
    pub fn open(path: impl Into<PathBuf>, header: &[String]) -> Result<Self, QuarryError> {
        let path = path.into();
        let existing_len = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if existing_len == 0 {
            writer.write_record(header)?;
            writer.flush()?;
            tracing::info!(path = %path.display(), "created results file");
        } else {
            tracing::info!(path = %path.display(), "appending to existing results file");
        }

        Ok(Self {
            writer,
            width: header.len(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row and flushes it to disk.
    ///
    /// Rejects rows whose width does not match the header — the schema is
    /// fixed, a short or long row would silently shear the table.
    pub fn append_row(&mut self, row: &[String]) -> Result<(), QuarryError> {
        if row.len() != self.width {
            return Err(QuarryError::Sink(format!(
                "row width {} does not match schema width {}",
                row.len(),
                self.width
            )));
        }

        self.writer.write_record(row)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes any buffered output.
    pub fn flush(&mut self) -> Result<(), QuarryError> {
        self.writer.flush()?;
        Ok(())
    }
}
