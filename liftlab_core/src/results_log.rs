//! Append-only log of performed sets.
//!
//! Results are appended to a JSONL (JSON Lines) file under an exclusive
//! file lock. A batch (one lift's sets, say) is written under a single lock
//! and flushed together so a half-logged workout never reaches the reader.

use crate::{PreviousSetResult, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Sink for logged set results
pub trait ResultSink {
    fn append_all(&mut self, results: &[PreviousSetResult]) -> Result<()>;

    fn append(&mut self, result: &PreviousSetResult) -> Result<()> {
        self.append_all(std::slice::from_ref(result))
    }
}

/// JSONL-based result sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ResultSink for JsonlSink {
    fn append_all(&mut self, results: &[PreviousSetResult]) -> Result<()> {
        if results.is_empty() {
            return Ok(());
        }
        self.ensure_parent_dir()?;

        // Serialize everything before taking the lock
        let mut buffer = Vec::new();
        for result in results {
            serde_json::to_writer(&mut buffer, result)?;
            buffer.push(b'\n');
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(&buffer)?;
        writer.flush()?;
        drop(writer);
        file.sync_data()?;

        file.unlock()?;

        tracing::debug!("Appended {} results to {:?}", results.len(), self.path);
        Ok(())
    }
}

/// Read all results from a log file
///
/// Lines that fail to parse (a torn final write, hand edits) are skipped
/// with a warning.
pub fn read_results(path: &Path) -> Result<Vec<PreviousSetResult>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut results = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<PreviousSetResult>(&line) {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::warn!("Failed to parse result at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} results from log", results.len());
    Ok(results)
}
