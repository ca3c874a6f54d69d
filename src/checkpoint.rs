//! Durable record of which detail pages have been fully processed
//!
//! The checkpoint is a small JSON file with a single `processed_ids`
//! array, read whole at startup and rewritten whole on each flush. Writes
//! go to a temp file first and are renamed into place, so a reader can
//! never observe a partially written checkpoint. Marks made after the last
//! flush may be lost on a hard crash — that only widens the re-processing
//! window, it never loses output rows.

use crate::QuarryError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// On-disk shape of the checkpoint file.
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    processed_ids: Vec<String>,
}

/// The set of identifiers already written to the result sink.
///
/// Grows monotonically during a run; there is no un-mark operation.
pub struct CheckpointStore {
    path: PathBuf,
    processed: HashSet<String>,
    flush_every: usize,
    unflushed: usize,
}

impl CheckpointStore {
    /// Loads the checkpoint from `path`, or starts empty when no file
    /// exists yet. A present-but-unreadable file is an error: silently
    /// starting fresh would duplicate every previously written row.
    pub fn load(path: impl Into<PathBuf>, flush_every: usize) -> Result<Self, QuarryError> {
        let path = path.into();

        let processed = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let file: CheckpointFile = serde_json::from_str(&content).map_err(|e| {
                QuarryError::Checkpoint(format!(
                    "unreadable checkpoint {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let ids: HashSet<String> = file.processed_ids.into_iter().collect();
            tracing::info!(
                path = %path.display(),
                processed = ids.len(),
                "resuming from checkpoint"
            );
            ids
        } else {
            tracing::info!(path = %path.display(), "no checkpoint, starting fresh");
            HashSet::new()
        };

        Ok(Self {
            path,
            processed,
            flush_every: flush_every.max(1),
            unflushed: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the identifier has already been fully processed.
    pub fn contains(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    /// Marks an identifier as processed. Idempotent; returns whether the
    /// identifier was newly inserted.
    pub fn mark_processed(&mut self, id: impl Into<String>) -> bool {
        let inserted = self.processed.insert(id.into());
        if inserted {
            self.unflushed += 1;
        }
        inserted
    }

    /// Flushes when enough marks have accumulated since the last flush.
    pub fn persist_if_due(&mut self) -> Result<(), QuarryError> {
        if self.unflushed >= self.flush_every {
            self.persist()?;
        }
        Ok(())
    }

    /// Durably writes the checkpoint: serialize to a temp file in the same
    /// directory, then rename over the destination.
    pub fn persist(&mut self) -> Result<(), QuarryError> {
        let mut ids: Vec<&String> = self.processed.iter().collect();
        ids.sort();
        let file = CheckpointFile {
            processed_ids: ids.into_iter().cloned().collect(),
        };

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&file)?)?;
        std::fs::rename(&tmp, &self.path)?;

        self.unflushed = 0;
        tracing::debug!(
            path = %self.path.display(),
            processed = self.processed.len(),
            "checkpoint flushed"
        );
        Ok(())
    }
}
