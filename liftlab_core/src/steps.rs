//! Rep-target stepping for wave loading.
//!
//! A wave starts at the top of the rep range and steps down by a fixed
//! number of reps each microcycle until it reaches the bottom. The deload
//! week is not part of the sequence.

use crate::{Error, Result};

/// Number of stepped microcycles in a mesocycle with the given deload week.
pub fn total_steps_to_take(deload_week: u32) -> u32 {
    deload_week.saturating_sub(1)
}

/// Step sizes that walk `rep_range_top` down to `rep_range_bottom` in
/// whole, uniform decrements within `step_count` steps.
///
/// A size qualifies when it divides the range width exactly and needs no
/// more than `step_count` decrements. Sizes are ascending, so the first
/// entry is the most gradual wave.
pub fn possible_step_sizes(
    rep_range_top: u32,
    rep_range_bottom: u32,
    step_count: u32,
) -> Result<Vec<u32>> {
    if rep_range_top < rep_range_bottom {
        return Err(Error::InvalidInput(format!(
            "rep range top {} is below bottom {}",
            rep_range_top, rep_range_bottom
        )));
    }

    let width = rep_range_top - rep_range_bottom;
    if step_count == 0 || width == 0 {
        return Ok(Vec::new());
    }

    Ok((1..=width)
        .filter(|size| width % size == 0 && width / size <= step_count)
        .collect())
}

/// Rep target for each stepped microcycle, indexed by microcycle.
///
/// Entry `i` is `rep_range_top - step_size * i`, never below
/// `rep_range_bottom`.
pub fn complete_step_sequence(
    rep_range_top: u32,
    rep_range_bottom: u32,
    step_size: u32,
    total_steps_to_take: u32,
) -> Vec<u32> {
    (0..total_steps_to_take)
        .map(|i| {
            rep_range_top
                .saturating_sub(step_size.saturating_mul(i))
                .max(rep_range_bottom)
        })
        .collect()
}

/// Look up the stepped rep target for a microcycle.
///
/// Deload weeks sit past the end of the sequence; asking for them here is a
/// caller error.
pub fn rep_target_for_microcycle(sequence: &[u32], microcycle: u32) -> Result<u32> {
    sequence.get(microcycle as usize).copied().ok_or_else(|| {
        Error::InvalidInput(format!(
            "microcycle {} is outside the {}-step wave",
            microcycle,
            sequence.len()
        ))
    })
}
