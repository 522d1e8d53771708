//! Progression calculator.
//!
//! Turns a workout lift's configuration, the results logged for it in the
//! previous cycle and the current cycle position into the prescriptions for
//! the upcoming cycle:
//! - Linear progression: add the increment when every set hit the top of its
//!   range, otherwise hold and count the miss (repeated misses deload)
//! - Double progression: add reps until every set is at the top of its
//!   range, then add weight and restart at the bottom
//! - Dynamic double progression: the same decision made per set
//! - Wave loading: rep targets step down through the mesocycle, weight
//!   advances with each new wave
//!
//! Nothing is cached between calls. Progression state is rebuilt from the
//! result rows every time.

use crate::{
    deload, history, one_rep_max, steps, topology, CyclePosition, Error, LiftPrescription,
    PreviousSetResult, ProgressionDecision, ProgressionScheme, RepTarget, Result, RpeTarget,
    SetPrescription, SetSlot, SlotKind, WorkoutLift,
};
use std::collections::HashMap;

/// Program-level parameters the calculator reads
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionSettings {
    /// Program deload week (mesocycle length in weeks)
    pub deload_week: u32,
    /// Whether per-lift deload week overrides are honored
    pub lift_specific_deloading: bool,
    pub default_increment: f64,
    /// Round computed weights to a multiple of this (e.g. 2.5)
    pub weight_rounding: Option<f64>,
    /// Consecutive linear progression misses before the weight is reduced.
    /// 0 disables the reduction.
    pub lp_failures_before_deload: u32,
    /// Fraction taken off the weight when linear progression deloads
    pub lp_deload_percentage: f64,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            deload_week: 4,
            lift_specific_deloading: false,
            default_increment: 5.0,
            weight_rounding: None,
            lp_failures_before_deload: 2,
            lp_deload_percentage: 0.1,
        }
    }
}

impl ProgressionSettings {
    pub fn increment_for(&self, lift: &WorkoutLift) -> f64 {
        lift.increment_override.unwrap_or(self.default_increment)
    }

    pub fn deload_week_for(&self, lift: &WorkoutLift) -> u32 {
        deload::resolve(
            lift.deload_week,
            self.deload_week,
            self.lift_specific_deloading,
        )
    }

    fn round(&self, weight: f64) -> f64 {
        match self.weight_rounding {
            Some(step) if step > 0.0 => (weight / step).round() * step,
            _ => weight,
        }
    }
}

/// Everything a scheme policy needs for one lift
struct LiftContext<'a> {
    lift: &'a WorkoutLift,
    slots: &'a [SetSlot],
    previous: &'a HashMap<u32, &'a PreviousSetResult>,
    position: CyclePosition,
    deload_week: u32,
    deloading: bool,
    increment: f64,
    estimated_max: Option<f64>,
    settings: &'a ProgressionSettings,
}

impl LiftContext<'_> {
    fn previous_for(&self, slot: &SetSlot) -> Option<&PreviousSetResult> {
        self.previous.get(&slot.set_position).copied()
    }

    /// Weight for a slot with no history of its own, from the best 1RM the
    /// other slots imply.
    fn estimated_weight(&self, slot: &SetSlot, reps: u32) -> Option<f64> {
        let max = self.estimated_max?;
        one_rep_max::weight_for_target(max, reps.max(1), slot.rpe_target)
            .ok()
            .map(|weight| self.settings.round(weight))
    }

    fn advanced(&self, previous: &PreviousSetResult) -> f64 {
        self.settings.round(previous.weight + self.increment)
    }
}

/// Prescriptions for the next cycle of one workout lift.
///
/// `previous` holds the lift's results from the immediately preceding cycle
/// (myo-rep extension rows may be included and are ignored for decisions).
/// Without history the configured targets are returned with no weight.
pub fn calculate_next_sets(
    lift: &WorkoutLift,
    previous: &[PreviousSetResult],
    position: CyclePosition,
    settings: &ProgressionSettings,
) -> Result<Vec<SetPrescription>> {
    let slots = topology::expand_for_prescription(lift)?;
    validate_lift(lift, &slots, settings)?;

    let by_position = index_previous(lift, previous)?;
    let deload_week = settings.deload_week_for(lift);
    let deloading = lift.progression_scheme != ProgressionScheme::LinearProgression
        && deload::is_deload_microcycle(position.microcycle, deload_week);

    let mut prescriptions = if by_position.is_empty() {
        tracing::debug!(
            "Workout lift {} has no history, using configured targets",
            lift.id
        );
        base_prescriptions(lift, &slots, position, deload_week, deloading)?
    } else {
        let ctx = LiftContext {
            lift,
            slots: &slots,
            previous: &by_position,
            position,
            deload_week,
            deloading,
            increment: settings.increment_for(lift),
            estimated_max: best_estimated_max(&by_position),
            settings,
        };

        match lift.progression_scheme {
            ProgressionScheme::LinearProgression => linear_progression(&ctx)?,
            ProgressionScheme::DoubleProgression => double_progression(&ctx, false),
            ProgressionScheme::DynamicDoubleProgression => double_progression(&ctx, true),
            ProgressionScheme::WaveLoadingProgression => wave_loading(&ctx)?,
        }
    };

    chain_drop_sets(&mut prescriptions, settings);

    tracing::info!(
        "Calculated {} sets for workout lift {} ({:?}) at {}",
        prescriptions.len(),
        lift.id,
        lift.progression_scheme,
        position
    );

    Ok(prescriptions)
}

/// Prescriptions for every lift of a workout.
///
/// Each lift's previous-cycle rows are picked out of `history`. A lift that
/// fails is reported in its own entry and does not stop the others.
pub fn calculate_workout(
    lifts: &[WorkoutLift],
    history: &[PreviousSetResult],
    position: CyclePosition,
    settings: &ProgressionSettings,
) -> Vec<LiftPrescription> {
    lifts
        .iter()
        .map(|lift| {
            let previous =
                history::previous_cycle_results(history, lift.workout_id, lift.lift_id, position);
            let sets = calculate_next_sets(lift, &previous, position, settings);

            if let Err(e) = &sets {
                tracing::warn!("Failed to calculate workout lift {}: {}", lift.id, e);
            }

            LiftPrescription {
                workout_lift_id: lift.id,
                lift_id: lift.lift_id,
                sets,
            }
        })
        .collect()
}

fn validate_lift(
    lift: &WorkoutLift,
    slots: &[SetSlot],
    settings: &ProgressionSettings,
) -> Result<()> {
    validate_rep_range(lift.id, lift.rep_range_bottom, lift.rep_range_top)?;
    one_rep_max::validate_rpe(lift.rpe_target)?;

    for slot in slots {
        validate_rep_range(lift.id, slot.rep_range_bottom, slot.rep_range_top)?;
        one_rep_max::validate_rpe(slot.rpe_target)?;

        if let SlotKind::Drop { drop_percentage } = slot.kind {
            if !(drop_percentage > 0.0 && drop_percentage < 1.0) {
                return Err(Error::InvalidInput(format!(
                    "workout lift {}: drop percentage {} must be between 0 and 1",
                    lift.id, drop_percentage
                )));
            }
        }
    }

    let increment = settings.increment_for(lift);
    if !increment.is_finite() || increment < 0.0 {
        return Err(Error::InvalidInput(format!(
            "workout lift {}: increment {} must be a non-negative number",
            lift.id, increment
        )));
    }

    Ok(())
}

fn validate_rep_range(lift_id: u64, bottom: u32, top: u32) -> Result<()> {
    if bottom == 0 || top < bottom {
        return Err(Error::InvalidInput(format!(
            "workout lift {}: invalid rep range {}-{}",
            lift_id, bottom, top
        )));
    }
    Ok(())
}

/// Latest activation/standard row per set position.
fn index_previous<'a>(
    lift: &WorkoutLift,
    previous: &'a [PreviousSetResult],
) -> Result<HashMap<u32, &'a PreviousSetResult>> {
    let mut by_position: HashMap<u32, &PreviousSetResult> = HashMap::new();

    for result in previous {
        if result.lift_id != lift.lift_id {
            return Err(Error::DataIntegrity(format!(
                "result {} belongs to lift {}, not {}",
                result.id, result.lift_id, lift.lift_id
            )));
        }
        if !result.weight.is_finite() || result.weight < 0.0 {
            return Err(Error::DataIntegrity(format!(
                "result {} has invalid weight {}",
                result.id, result.weight
            )));
        }
        if one_rep_max::validate_rpe(result.rpe).is_err() {
            return Err(Error::DataIntegrity(format!(
                "result {} has RPE {} outside [1, 10]",
                result.id, result.rpe
            )));
        }
        if result.is_extension() {
            continue;
        }

        let newer = by_position
            .get(&result.set_position)
            .map_or(true, |existing| {
                (existing.cycle(), existing.logged_at) < (result.cycle(), result.logged_at)
            });
        if newer {
            by_position.insert(result.set_position, result);
        }
    }

    Ok(by_position)
}

fn best_estimated_max(previous: &HashMap<u32, &PreviousSetResult>) -> Option<f64> {
    previous
        .values()
        .filter_map(|r| one_rep_max::estimate(r.weight, r.reps, r.rpe).ok())
        .fold(None, |best, e1rm| match best {
            Some(b) if b >= e1rm => Some(b),
            _ => Some(e1rm),
        })
}

fn met_goal(slot: &SetSlot, result: &PreviousSetResult) -> bool {
    result.reps >= slot.rep_range_top && result.rpe <= slot.rpe_target
}

/// Rep target that the calendar alone dictates.
fn scheduled_reps(
    lift: &WorkoutLift,
    slot: &SetSlot,
    microcycle: u32,
    deload_week: u32,
    deloading: bool,
) -> Result<RepTarget> {
    if deloading {
        return Ok(RepTarget::Exact {
            reps: slot.rep_range_bottom,
        });
    }

    match lift.progression_scheme {
        ProgressionScheme::WaveLoadingProgression => {
            wave_reps(slot, lift.step_size, microcycle, deload_week)
        }
        _ => Ok(RepTarget::Range {
            bottom: slot.rep_range_bottom,
            top: slot.rep_range_top,
        }),
    }
}

fn wave_reps(
    slot: &SetSlot,
    step_size: Option<u32>,
    microcycle: u32,
    deload_week: u32,
) -> Result<RepTarget> {
    let total = steps::total_steps_to_take(deload_week);
    let step = match step_size {
        Some(size) => size,
        None => steps::possible_step_sizes(slot.rep_range_top, slot.rep_range_bottom, total)?
            .first()
            .copied()
            .unwrap_or(0),
    };

    if step == 0 {
        return Ok(RepTarget::Range {
            bottom: slot.rep_range_bottom,
            top: slot.rep_range_top,
        });
    }

    let sequence =
        steps::complete_step_sequence(slot.rep_range_top, slot.rep_range_bottom, step, total);
    Ok(RepTarget::Exact {
        reps: steps::rep_target_for_microcycle(&sequence, microcycle)?,
    })
}

fn rpe_for(scheme: ProgressionScheme, slot: &SetSlot) -> RpeTarget {
    match scheme {
        ProgressionScheme::LinearProgression => RpeTarget::AtMost(slot.rpe_target),
        _ => RpeTarget::Exact(slot.rpe_target),
    }
}

fn base_prescriptions(
    lift: &WorkoutLift,
    slots: &[SetSlot],
    position: CyclePosition,
    deload_week: u32,
    deloading: bool,
) -> Result<Vec<SetPrescription>> {
    slots
        .iter()
        .map(|slot| {
            Ok(SetPrescription {
                set_position: slot.set_position,
                kind: slot.kind,
                weight: None,
                reps: scheduled_reps(lift, slot, position.microcycle, deload_week, deloading)?,
                rpe: rpe_for(lift.progression_scheme, slot),
                decision: ProgressionDecision::Base,
                missed_lp_goals: (lift.progression_scheme
                    == ProgressionScheme::LinearProgression)
                    .then_some(0),
            })
        })
        .collect()
}

fn linear_progression(ctx: &LiftContext<'_>) -> Result<Vec<SetPrescription>> {
    let mut missed = 0;
    for result in ctx.previous.values() {
        let count = result.missed_lp_goals.ok_or_else(|| {
            Error::DataIntegrity(format!(
                "linear progression result {} (set {}) has no missed goal count",
                result.id, result.set_position
            ))
        })?;
        missed = missed.max(count);
    }

    let succeeded = ctx.slots.iter().all(|slot| {
        ctx.previous_for(slot)
            .map_or(true, |result| met_goal(slot, result))
    });

    let threshold = ctx.settings.lp_failures_before_deload;
    let (decision, missed_lp_goals) = if succeeded {
        (ProgressionDecision::Advance, 0)
    } else if threshold > 0 && missed + 1 >= threshold {
        (ProgressionDecision::Deload, 0)
    } else {
        (ProgressionDecision::Hold, missed + 1)
    };

    tracing::debug!(
        "Linear progression for workout lift {}: {:?}, missed goals {}",
        ctx.lift.id,
        decision,
        missed_lp_goals
    );

    Ok(ctx
        .slots
        .iter()
        .map(|slot| {
            let weight = match ctx.previous_for(slot) {
                Some(previous) => Some(match decision {
                    ProgressionDecision::Advance => ctx.advanced(previous),
                    ProgressionDecision::Deload => ctx
                        .settings
                        .round(previous.weight * (1.0 - ctx.settings.lp_deload_percentage)),
                    _ => previous.weight,
                }),
                None => ctx.estimated_weight(slot, slot.rep_range_top),
            };

            SetPrescription {
                set_position: slot.set_position,
                kind: slot.kind,
                weight,
                reps: RepTarget::Exact {
                    reps: slot.rep_range_top,
                },
                rpe: RpeTarget::AtMost(slot.rpe_target),
                decision,
                missed_lp_goals: Some(missed_lp_goals),
            }
        })
        .collect())
}

/// Double progression; `per_slot` makes each set advance on its own.
fn double_progression(ctx: &LiftContext<'_>, per_slot: bool) -> Vec<SetPrescription> {
    let all_met = ctx.slots.iter().all(|slot| {
        ctx.previous_for(slot)
            .is_some_and(|result| met_goal(slot, result))
    });

    ctx.slots
        .iter()
        .map(|slot| {
            let previous = ctx.previous_for(slot);
            let slot_met = previous.is_some_and(|result| met_goal(slot, result));

            let decision = if ctx.deloading {
                ProgressionDecision::Deload
            } else if (per_slot && slot_met) || (!per_slot && all_met) {
                ProgressionDecision::Advance
            } else {
                ProgressionDecision::Hold
            };

            let reps = match (decision, previous) {
                (ProgressionDecision::Deload, _) | (ProgressionDecision::Advance, _) => {
                    RepTarget::Exact {
                        reps: slot.rep_range_bottom,
                    }
                }
                (_, Some(result)) => RepTarget::Exact {
                    reps: next_rep_goal(slot, result),
                },
                (_, None) => RepTarget::Range {
                    bottom: slot.rep_range_bottom,
                    top: slot.rep_range_top,
                },
            };

            let weight = match previous {
                Some(result) if decision == ProgressionDecision::Advance => {
                    Some(ctx.advanced(result))
                }
                Some(result) => Some(result.weight),
                None => ctx.estimated_weight(slot, slot.rep_range_top),
            };

            tracing::debug!(
                "Workout lift {} set {}: {:?} -> {:?} x {}",
                ctx.lift.id,
                slot.set_position,
                decision,
                weight,
                reps
            );

            SetPrescription {
                set_position: slot.set_position,
                kind: slot.kind,
                weight,
                reps,
                rpe: RpeTarget::Exact(slot.rpe_target),
                decision,
                missed_lp_goals: None,
            }
        })
        .collect()
}

/// One more rep than last time when the set was at or under target RPE,
/// the same reps otherwise, kept inside the rep range.
fn next_rep_goal(slot: &SetSlot, result: &PreviousSetResult) -> u32 {
    let goal = if result.rpe <= slot.rpe_target {
        result.reps + 1
    } else {
        result.reps
    };
    goal.clamp(slot.rep_range_bottom, slot.rep_range_top)
}

fn wave_loading(ctx: &LiftContext<'_>) -> Result<Vec<SetPrescription>> {
    ctx.slots
        .iter()
        .map(|slot| {
            let previous = ctx.previous_for(slot);
            let reps = scheduled_reps(
                ctx.lift,
                slot,
                ctx.position.microcycle,
                ctx.deload_week,
                ctx.deloading,
            )?;

            let new_wave = ctx.position.microcycle == 0
                && previous.is_some_and(|result| result.mesocycle < ctx.position.mesocycle);
            let decision = if ctx.deloading {
                ProgressionDecision::Deload
            } else if new_wave {
                ProgressionDecision::Advance
            } else {
                ProgressionDecision::Hold
            };

            let weight = match previous {
                Some(result) if decision == ProgressionDecision::Advance => {
                    Some(ctx.advanced(result))
                }
                Some(result) => Some(result.weight),
                None => {
                    let target = match reps {
                        RepTarget::Exact { reps } => reps,
                        RepTarget::Range { top, .. } => top,
                    };
                    ctx.estimated_weight(slot, target)
                }
            };

            Ok(SetPrescription {
                set_position: slot.set_position,
                kind: slot.kind,
                weight,
                reps,
                rpe: RpeTarget::Exact(slot.rpe_target),
                decision,
                missed_lp_goals: None,
            })
        })
        .collect()
}

/// Drop sets take the preceding slot's prescribed weight less the drop.
fn chain_drop_sets(prescriptions: &mut [SetPrescription], settings: &ProgressionSettings) {
    let mut preceding: Option<f64> = None;
    for prescription in prescriptions.iter_mut() {
        if let SlotKind::Drop { drop_percentage } = prescription.kind {
            prescription.weight =
                preceding.map(|weight| settings.round(weight * (1.0 - drop_percentage)));
        }
        preceding = prescription.weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CustomLiftSet, MyoRepPolicy, MyoRepTermination, SetTopology};
    use chrono::Utc;
    use uuid::Uuid;

    fn workout_lift(scheme: ProgressionScheme, bottom: u32, top: u32, set_count: u32) -> WorkoutLift {
        WorkoutLift {
            id: 1,
            workout_id: 100,
            lift_id: 7,
            position: 0,
            progression_scheme: scheme,
            rep_range_bottom: bottom,
            rep_range_top: top,
            rpe_target: 8.0,
            deload_week: None,
            step_size: None,
            increment_override: None,
            sets: SetTopology::Standard { set_count },
        }
    }

    fn result(set_position: u32, weight: f64, reps: u32, rpe: f64) -> PreviousSetResult {
        PreviousSetResult {
            id: Uuid::new_v4(),
            workout_id: 100,
            lift_id: 7,
            set_position,
            myo_rep_set_position: None,
            weight,
            reps,
            rpe,
            mesocycle: 0,
            microcycle: 0,
            missed_lp_goals: None,
            logged_at: Utc::now(),
        }
    }

    fn lp_result(set_position: u32, weight: f64, reps: u32, missed: u32) -> PreviousSetResult {
        PreviousSetResult {
            missed_lp_goals: Some(missed),
            ..result(set_position, weight, reps, 8.0)
        }
    }

    fn at(mesocycle: u32, microcycle: u32) -> CyclePosition {
        CyclePosition::new(mesocycle, microcycle)
    }

    fn settings() -> ProgressionSettings {
        ProgressionSettings::default()
    }

    #[test]
    fn test_no_history_uses_configured_targets() {
        crate::logging::init_test();
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 3);

        let sets = calculate_next_sets(&lift, &[], at(0, 0), &settings()).unwrap();

        assert_eq!(sets.len(), 3);
        for set in &sets {
            assert_eq!(set.weight, None);
            assert_eq!(set.reps, RepTarget::Range { bottom: 8, top: 12 });
            assert_eq!(set.rpe, RpeTarget::Exact(8.0));
            assert_eq!(set.decision, ProgressionDecision::Base);
        }
    }

    #[test]
    fn test_double_progression_advances_at_top_of_range() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 2);
        let previous = vec![result(0, 100.0, 12, 8.0), result(1, 100.0, 12, 7.5)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        for set in &sets {
            assert_eq!(set.weight, Some(105.0));
            assert_eq!(set.reps, RepTarget::Exact { reps: 8 });
            assert_eq!(set.decision, ProgressionDecision::Advance);
        }
    }

    #[test]
    fn test_double_progression_holds_below_top() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 1);
        let previous = vec![result(0, 100.0, 10, 8.0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        assert_eq!(sets[0].weight, Some(100.0));
        assert_eq!(sets[0].reps, RepTarget::Exact { reps: 11 });
        assert_eq!(sets[0].decision, ProgressionDecision::Hold);
    }

    #[test]
    fn test_double_progression_holds_when_rpe_over_target() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 1);
        let previous = vec![result(0, 100.0, 12, 9.5)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        assert_eq!(sets[0].weight, Some(100.0));
        assert_eq!(sets[0].reps, RepTarget::Exact { reps: 12 });
        assert_eq!(sets[0].decision, ProgressionDecision::Hold);
    }

    #[test]
    fn test_double_progression_needs_every_set() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 2);
        let previous = vec![result(0, 100.0, 12, 8.0), result(1, 100.0, 9, 8.0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        assert!(sets.iter().all(|s| s.decision == ProgressionDecision::Hold));
        assert!(sets.iter().all(|s| s.weight == Some(100.0)));
        assert_eq!(sets[0].reps, RepTarget::Exact { reps: 12 });
        assert_eq!(sets[1].reps, RepTarget::Exact { reps: 10 });
    }

    #[test]
    fn test_dynamic_double_progression_decides_per_set() {
        let lift = workout_lift(ProgressionScheme::DynamicDoubleProgression, 8, 12, 2);
        let previous = vec![result(0, 100.0, 12, 8.0), result(1, 95.0, 9, 8.0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        assert_eq!(sets[0].decision, ProgressionDecision::Advance);
        assert_eq!(sets[0].weight, Some(105.0));
        assert_eq!(sets[0].reps, RepTarget::Exact { reps: 8 });

        assert_eq!(sets[1].decision, ProgressionDecision::Hold);
        assert_eq!(sets[1].weight, Some(95.0));
        assert_eq!(sets[1].reps, RepTarget::Exact { reps: 10 });
    }

    #[test]
    fn test_increment_override_and_rounding() {
        let mut lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 1);
        lift.increment_override = Some(2.0);
        let settings = ProgressionSettings {
            weight_rounding: Some(2.5),
            ..settings()
        };
        let previous = vec![result(0, 100.0, 12, 8.0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings).unwrap();
        // 102 rounds to the nearest 2.5
        assert_eq!(sets[0].weight, Some(102.5));
    }

    #[test]
    fn test_deload_week_resets_reps_and_holds_weight() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 1);
        let previous = vec![result(0, 100.0, 12, 8.0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 3), &settings()).unwrap();

        assert_eq!(sets[0].decision, ProgressionDecision::Deload);
        assert_eq!(sets[0].weight, Some(100.0));
        assert_eq!(sets[0].reps, RepTarget::Exact { reps: 8 });
    }

    #[test]
    fn test_lift_specific_deload_week() {
        let mut lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 1);
        lift.deload_week = Some(3);
        let previous = vec![result(0, 100.0, 10, 8.0)];

        let disabled = calculate_next_sets(&lift, &previous, at(0, 2), &settings()).unwrap();
        assert_eq!(disabled[0].decision, ProgressionDecision::Hold);

        let enabled_settings = ProgressionSettings {
            lift_specific_deloading: true,
            ..settings()
        };
        let enabled = calculate_next_sets(&lift, &previous, at(0, 2), &enabled_settings).unwrap();
        assert_eq!(enabled[0].decision, ProgressionDecision::Deload);
    }

    #[test]
    fn test_linear_progression_success() {
        let lift = workout_lift(ProgressionScheme::LinearProgression, 3, 5, 3);
        let previous: Vec<_> = (0..3).map(|i| lp_result(i, 140.0, 5, 1)).collect();

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        for set in &sets {
            assert_eq!(set.weight, Some(145.0));
            assert_eq!(set.reps, RepTarget::Exact { reps: 5 });
            assert_eq!(set.rpe, RpeTarget::AtMost(8.0));
            assert_eq!(set.decision, ProgressionDecision::Advance);
            assert_eq!(set.missed_lp_goals, Some(0));
        }
    }

    #[test]
    fn test_linear_progression_miss_holds_and_counts() {
        let lift = workout_lift(ProgressionScheme::LinearProgression, 3, 5, 2);
        let previous = vec![lp_result(0, 140.0, 5, 0), lp_result(1, 140.0, 4, 0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        for set in &sets {
            assert_eq!(set.weight, Some(140.0));
            assert_eq!(set.decision, ProgressionDecision::Hold);
            assert_eq!(set.missed_lp_goals, Some(1));
        }
    }

    #[test]
    fn test_linear_progression_repeated_miss_deloads() {
        let lift = workout_lift(ProgressionScheme::LinearProgression, 3, 5, 1);
        let previous = vec![lp_result(0, 140.0, 4, 1)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 2), &settings()).unwrap();

        assert_eq!(sets[0].decision, ProgressionDecision::Deload);
        assert!((sets[0].weight.unwrap() - 126.0).abs() < 1e-9);
        assert_eq!(sets[0].missed_lp_goals, Some(0));
    }

    #[test]
    fn test_linear_progression_ignores_deload_week() {
        let lift = workout_lift(ProgressionScheme::LinearProgression, 3, 5, 1);
        let previous = vec![lp_result(0, 140.0, 5, 0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 3), &settings()).unwrap();
        assert_eq!(sets[0].decision, ProgressionDecision::Advance);
    }

    #[test]
    fn test_linear_progression_missing_counter_is_integrity_error() {
        let lift = workout_lift(ProgressionScheme::LinearProgression, 3, 5, 1);
        let previous = vec![result(0, 140.0, 5, 8.0)];

        let err = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_wave_loading_steps_then_deloads() {
        let mut lift = workout_lift(ProgressionScheme::WaveLoadingProgression, 6, 8, 1);
        lift.step_size = Some(1);

        let expected = [8, 7, 6, 6];
        for (microcycle, reps) in expected.iter().enumerate() {
            let sets =
                calculate_next_sets(&lift, &[], at(0, microcycle as u32), &settings()).unwrap();
            assert_eq!(sets[0].reps, RepTarget::Exact { reps: *reps });
        }
    }

    #[test]
    fn test_wave_loading_with_history_holds_weight_in_wave() {
        let mut lift = workout_lift(ProgressionScheme::WaveLoadingProgression, 6, 8, 1);
        lift.step_size = Some(1);
        let previous = vec![result(0, 80.0, 8, 8.0)];

        let week_two = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();
        assert_eq!(week_two[0].reps, RepTarget::Exact { reps: 7 });
        assert_eq!(week_two[0].weight, Some(80.0));
        assert_eq!(week_two[0].rpe, RpeTarget::Exact(8.0));
        assert_eq!(week_two[0].decision, ProgressionDecision::Hold);

        let deload = calculate_next_sets(&lift, &previous, at(0, 3), &settings()).unwrap();
        assert_eq!(deload[0].reps, RepTarget::Exact { reps: 6 });
        assert_eq!(deload[0].decision, ProgressionDecision::Deload);
    }

    #[test]
    fn test_wave_loading_new_wave_advances_weight() {
        let mut lift = workout_lift(ProgressionScheme::WaveLoadingProgression, 6, 8, 1);
        lift.step_size = Some(1);
        let previous = vec![PreviousSetResult {
            mesocycle: 0,
            microcycle: 3,
            ..result(0, 80.0, 6, 7.0)
        }];

        let sets = calculate_next_sets(&lift, &previous, at(1, 0), &settings()).unwrap();
        assert_eq!(sets[0].decision, ProgressionDecision::Advance);
        assert_eq!(sets[0].weight, Some(85.0));
        assert_eq!(sets[0].reps, RepTarget::Exact { reps: 8 });
    }

    #[test]
    fn test_wave_loading_step_size_fallback() {
        // 12-8 over 3 steps: first viable step is 2
        let lift = workout_lift(ProgressionScheme::WaveLoadingProgression, 8, 12, 1);
        let sets = calculate_next_sets(&lift, &[], at(0, 1), &settings()).unwrap();
        assert_eq!(sets[0].reps, RepTarget::Exact { reps: 10 });
    }

    #[test]
    fn test_wave_loading_zero_step_prescribes_range() {
        let mut lift = workout_lift(ProgressionScheme::WaveLoadingProgression, 8, 12, 1);
        lift.step_size = Some(0);
        let sets = calculate_next_sets(&lift, &[], at(0, 1), &settings()).unwrap();
        assert_eq!(sets[0].reps, RepTarget::Range { bottom: 8, top: 12 });
    }

    #[test]
    fn test_drop_sets_chain_from_preceding_weight() {
        let mut lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 0);
        lift.sets = SetTopology::Custom {
            sets: vec![
                CustomLiftSet::Standard {
                    position: 0,
                    rep_range_bottom: 8,
                    rep_range_top: 12,
                    rpe_target: 8.0,
                },
                CustomLiftSet::Drop {
                    position: 1,
                    rep_range_bottom: 8,
                    rep_range_top: 12,
                    rpe_target: 9.0,
                    drop_percentage: 0.2,
                },
                CustomLiftSet::Drop {
                    position: 2,
                    rep_range_bottom: 8,
                    rep_range_top: 12,
                    rpe_target: 9.0,
                    drop_percentage: 0.25,
                },
            ],
        };
        let previous = vec![
            result(0, 100.0, 10, 8.0),
            result(1, 70.0, 10, 9.0),
            result(2, 50.0, 10, 9.0),
        ];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        assert_eq!(sets[0].weight, Some(100.0));
        assert!((sets[1].weight.unwrap() - 80.0).abs() < 1e-9);
        assert!((sets[2].weight.unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_drop_set_without_history_has_no_weight() {
        let mut lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 0);
        lift.sets = SetTopology::Custom {
            sets: vec![
                CustomLiftSet::Standard {
                    position: 0,
                    rep_range_bottom: 8,
                    rep_range_top: 12,
                    rpe_target: 8.0,
                },
                CustomLiftSet::Drop {
                    position: 1,
                    rep_range_bottom: 8,
                    rep_range_top: 12,
                    rpe_target: 9.0,
                    drop_percentage: 0.2,
                },
            ],
        };

        let sets = calculate_next_sets(&lift, &[], at(0, 0), &settings()).unwrap();
        assert_eq!(sets[1].weight, None);
        assert!(matches!(sets[1].kind, SlotKind::Drop { .. }));
    }

    #[test]
    fn test_myo_rep_extension_rows_ignored_for_decision() {
        let mut lift = workout_lift(ProgressionScheme::DoubleProgression, 12, 15, 0);
        lift.sets = SetTopology::Custom {
            sets: vec![CustomLiftSet::MyoRep {
                position: 0,
                rep_range_bottom: 12,
                rep_range_top: 15,
                rpe_target: 8.0,
                policy: MyoRepPolicy {
                    termination: MyoRepTermination::SetMatching { match_set_goal: 5 },
                    max_sets: None,
                },
            }],
        };
        let previous = vec![
            result(0, 40.0, 15, 8.0),
            PreviousSetResult {
                myo_rep_set_position: Some(0),
                ..result(0, 40.0, 5, 9.0)
            },
            PreviousSetResult {
                myo_rep_set_position: Some(1),
                ..result(0, 40.0, 4, 9.5)
            },
        ];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].decision, ProgressionDecision::Advance);
        assert_eq!(sets[0].weight, Some(45.0));
        assert!(matches!(sets[0].kind, SlotKind::MyoRep { .. }));
    }

    #[test]
    fn test_new_set_without_history_is_estimated() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 2);
        let previous = vec![result(0, 100.0, 10, 8.0)];

        let sets = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();

        let estimated = sets[1].weight.unwrap();
        // 100 x 10 @8 aimed at 12 reps @8 lands below 100
        assert!(estimated < 100.0 && estimated > 80.0);
        assert_eq!(sets[1].decision, ProgressionDecision::Hold);
        assert_eq!(sets[1].reps, RepTarget::Range { bottom: 8, top: 12 });
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let mut lift = workout_lift(ProgressionScheme::DoubleProgression, 12, 8, 1);
        assert!(matches!(
            calculate_next_sets(&lift, &[], at(0, 0), &settings()),
            Err(Error::InvalidInput(_))
        ));

        lift.rep_range_bottom = 8;
        lift.rep_range_top = 12;
        lift.rpe_target = 11.0;
        assert!(matches!(
            calculate_next_sets(&lift, &[], at(0, 0), &settings()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_corrupt_history_is_integrity_error() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 1);
        let previous = vec![result(0, 100.0, 10, 12.0)];

        let err = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_calculation_is_repeatable() {
        let lift = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 2);
        let previous = vec![result(0, 100.0, 12, 8.0), result(1, 100.0, 11, 8.0)];

        let first = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();
        let second = calculate_next_sets(&lift, &previous, at(0, 1), &settings()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_workout_isolates_failing_lift() {
        let healthy = workout_lift(ProgressionScheme::DoubleProgression, 8, 12, 1);
        let mut broken = workout_lift(ProgressionScheme::LinearProgression, 3, 5, 1);
        broken.id = 2;
        broken.lift_id = 8;

        let history = vec![
            result(0, 100.0, 12, 8.0),
            PreviousSetResult {
                lift_id: 8,
                ..result(0, 140.0, 5, 8.0)
            },
        ];

        let results = calculate_workout(&[healthy, broken], &history, at(0, 1), &settings());

        assert_eq!(results.len(), 2);
        let healthy_sets = results[0].sets.as_ref().unwrap();
        assert_eq!(healthy_sets[0].weight, Some(105.0));
        assert!(results[1]
            .sets
            .as_ref()
            .is_err_and(|e| e.is_data_integrity()));
    }
}
