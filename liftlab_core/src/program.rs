//! Program definition file.
//!
//! A program is authored by the user as `program.json` in the data
//! directory: its deload week, any custom lifts, and the workouts with their
//! lifts in order.

use crate::catalog::Catalog;
use crate::{Error, Lift, Result, WorkoutLift};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: u64,
    pub name: String,
    pub lifts: Vec<WorkoutLift>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub name: String,
    pub deload_week: u32,
    #[serde(default)]
    pub lifts: Vec<Lift>,
    pub workouts: Vec<Workout>,
}

impl Program {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Program(format!("No program found at {:?}", path)));
        }

        let contents = std::fs::read_to_string(path)?;
        let program: Program = serde_json::from_str(&contents)?;
        tracing::info!(
            "Loaded program '{}' ({} workouts) from {:?}",
            program.name,
            program.workouts.len(),
            path
        );
        Ok(program)
    }

    /// Built-in lifts plus the program's own
    pub fn catalog(&self) -> Catalog {
        Catalog::with_custom(&self.lifts)
    }

    pub fn workout(&self, id: u64) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Check the program against a catalog
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        if self.deload_week == 0 {
            return Err(Error::Program("deload week must be at least 1".into()));
        }

        let mut workout_ids = HashSet::new();
        for workout in &self.workouts {
            if !workout_ids.insert(workout.id) {
                return Err(Error::Program(format!(
                    "duplicate workout id {}",
                    workout.id
                )));
            }

            for lift in &workout.lifts {
                if lift.workout_id != workout.id {
                    return Err(Error::Program(format!(
                        "workout lift {} is listed in workout {} but points at workout {}",
                        lift.id, workout.id, lift.workout_id
                    )));
                }
                if catalog.get(lift.lift_id).is_none() {
                    return Err(Error::Program(format!(
                        "workout lift {} references unknown lift {}",
                        lift.id, lift.lift_id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Workout lifts in position order with each lift's own increment
    /// filled in where the workout lift has none.
    pub fn resolved_lifts(&self, workout: &Workout, catalog: &Catalog) -> Vec<WorkoutLift> {
        let mut lifts: Vec<WorkoutLift> = workout
            .lifts
            .iter()
            .map(|lift| {
                let mut lift = lift.clone();
                if lift.increment_override.is_none() {
                    lift.increment_override = catalog
                        .get(lift.lift_id)
                        .and_then(|l| l.increment_override);
                }
                lift
            })
            .collect();
        lifts.sort_by_key(|l| l.position);
        lifts
    }
}
