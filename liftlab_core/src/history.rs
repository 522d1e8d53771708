//! Set result history.
//!
//! Loads logged set results from both the results log and the CSV archive,
//! and picks out the rows of the immediately preceding cycle that the
//! progression calculator compares against.

use crate::{CyclePosition, PreviousSetResult, Result};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived results
#[derive(Debug, Deserialize)]
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

impl TryFrom<CsvRow> for PreviousSetResult {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let logged_at = DateTime::parse_from_rfc3339(&row.logged_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(PreviousSetResult {
            id,
            workout_id: row.workout_id,
            lift_id: row.lift_id,
            set_position: row.set_position,
            myo_rep_set_position: row.myo_rep_set_position,
            weight: row.weight,
            reps: row.reps,
            rpe: row.rpe,
            mesocycle: row.mesocycle,
            microcycle: row.microcycle,
            missed_lp_goals: row.missed_lp_goals,
            logged_at,
        })
    }
}

/// Load every logged result from the log and the CSV archive.
///
/// Results present in both are kept once. Sorted oldest first.
pub fn load_results(log_path: &Path, csv_path: &Path) -> Result<Vec<PreviousSetResult>> {
    let mut results = Vec::new();
    let mut seen_ids = HashSet::new();

    // Load from the log first (most recent)
    if log_path.exists() {
        for result in crate::results_log::read_results(log_path)? {
            if seen_ids.insert(result.id) {
                results.push(result);
            }
        }
        tracing::debug!("Loaded {} results from log", results.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for result in load_results_from_csv(csv_path)? {
            if seen_ids.insert(result.id) {
                results.push(result);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} results from CSV", csv_count);
    }

    results.sort_by(|a, b| a.logged_at.cmp(&b.logged_at));

    tracing::info!("Loaded {} set results", results.len());
    Ok(results)
}

/// Load all results from a CSV file
fn load_results_from_csv(path: &Path) -> Result<Vec<PreviousSetResult>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut results = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        match row {
            Ok(row) => match PreviousSetResult::try_from(row) {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(results)
}

/// Rows of the most recent cycle before `position` for one lift of one
/// workout.
///
/// When a slot was logged more than once in that cycle the latest entry
/// supersedes the others. Sorted by set position, activation set before its
/// extensions.
pub fn previous_cycle_results(
    results: &[PreviousSetResult],
    workout_id: u64,
    lift_id: u64,
    position: CyclePosition,
) -> Vec<PreviousSetResult> {
    let candidates: Vec<&PreviousSetResult> = results
        .iter()
        .filter(|r| r.workout_id == workout_id && r.lift_id == lift_id && r.cycle() < position)
        .collect();

    let Some(latest) = candidates.iter().map(|r| r.cycle()).max() else {
        return Vec::new();
    };

    let mut by_key: HashMap<(u32, Option<u32>), &PreviousSetResult> = HashMap::new();
    for result in candidates.into_iter().filter(|r| r.cycle() == latest) {
        let key = (result.set_position, result.myo_rep_set_position);
        let newer = by_key
            .get(&key)
            .map_or(true, |existing| existing.logged_at <= result.logged_at);
        if newer {
            by_key.insert(key, result);
        }
    }

    let mut rows: Vec<PreviousSetResult> = by_key.into_values().cloned().collect();
    rows.sort_by_key(|r| (r.set_position, r.myo_rep_set_position));

    tracing::debug!(
        "Workout {} lift {}: {} rows from {} before {}",
        workout_id,
        lift_id,
        rows.len(),
        latest,
        position
    );

    rows
}
