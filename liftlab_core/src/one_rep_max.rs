//! RPE-adjusted one-rep-max estimation.
//!
//! Reps in reserve are read off the RPE (`10 - rpe`) and added to the
//! performed reps, then the Epley formula is applied:
//! `1RM = weight * (1 + reps_to_failure / 30)`.

use crate::{Error, Result};

const EPLEY_DIVISOR: f64 = 30.0;

pub const MIN_RPE: f64 = 1.0;
pub const MAX_RPE: f64 = 10.0;

/// Estimate a one-rep max from a performed set.
pub fn estimate(weight: f64, reps: u32, rpe: f64) -> Result<f64> {
    validate_weight(weight)?;
    validate_reps(reps)?;
    validate_rpe(rpe)?;

    Ok(weight * (1.0 + reps_to_failure(reps, rpe) / EPLEY_DIVISOR))
}

/// Working weight that should land on `reps` at `rpe` for a lifter with the
/// given one-rep max. Inverse of [`estimate`].
pub fn weight_for_target(one_rep_max: f64, reps: u32, rpe: f64) -> Result<f64> {
    validate_weight(one_rep_max)?;
    validate_reps(reps)?;
    validate_rpe(rpe)?;

    Ok(one_rep_max / (1.0 + reps_to_failure(reps, rpe) / EPLEY_DIVISOR))
}

fn reps_to_failure(reps: u32, rpe: f64) -> f64 {
    reps as f64 + (MAX_RPE - rpe)
}

fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "weight must be positive, got {}",
            weight
        )));
    }
    Ok(())
}

fn validate_reps(reps: u32) -> Result<()> {
    if reps == 0 {
        return Err(Error::InvalidInput("reps must be positive".into()));
    }
    Ok(())
}

pub(crate) fn validate_rpe(rpe: f64) -> Result<()> {
    if !(MIN_RPE..=MAX_RPE).contains(&rpe) {
        return Err(Error::InvalidInput(format!(
            "RPE must be within [{}, {}], got {}",
            MIN_RPE, MAX_RPE, rpe
        )));
    }
    Ok(())
}
