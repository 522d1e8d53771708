//! CSV rollup for archiving the results log.
//!
//! Moves logged results into an append-only CSV archive and renames the log
//! so nothing is lost if the rollup is interrupted.

use crate::{PreviousSetResult, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    workout_id: u64,
    lift_id: u64,
    set_position: u32,
    myo_rep_set_position: Option<u32>,
    weight: f64,
    reps: u32,
    rpe: f64,
    mesocycle: u32,
    microcycle: u32,
    missed_lp_goals: Option<u32>,
    logged_at: String,
}

impl From<&PreviousSetResult> for CsvRow {
    fn from(result: &PreviousSetResult) -> Self {
        CsvRow {
            id: result.id.to_string(),
            workout_id: result.workout_id,
            lift_id: result.lift_id,
            set_position: result.set_position,
            myo_rep_set_position: result.myo_rep_set_position,
            weight: result.weight,
            reps: result.reps,
            rpe: result.rpe,
            mesocycle: result.mesocycle,
            microcycle: result.microcycle,
            missed_lp_goals: result.missed_lp_goals,
            logged_at: result.logged_at.to_rfc3339(),
        }
    }
}

/// Roll up logged results into CSV and archive the log
///
/// 1. Reads all results from the log
/// 2. Appends them to the CSV file (writing headers for a new file)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to `.processed`
///
/// Returns the number of results moved.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let results = crate::results_log::read_results(log_path)?;

    if results.is_empty() {
        tracing::info!("No results in log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for result in &results {
        writer.serialize(CsvRow::from(result))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} results to CSV", results.len());

    let processed_path = log_path.with_extension("log.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived log to {:?}", processed_path);

    Ok(results.len())
}

/// Remove archived `.processed` logs in a directory
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed logs", count);
    }

    Ok(count)
}
