//! Expansion of a workout lift's set configuration into concrete slots.
//!
//! Myo-rep extension sets are not scheduled ahead of time: how many follow an
//! activation set is decided during the workout by
//! [`should_continue_myo_rep_extension`].

use crate::{
    CustomLiftSet, Error, MyoRepPolicy, MyoRepTermination, PreviousSetResult, Result,
    SetSlot, SetTopology, SlotKind, WorkoutLift,
};
use std::collections::BTreeSet;

/// Schedule-known slots for the upcoming cycle, in set order.
///
/// Custom sets must be declared in order with dense 0-based positions.
pub fn expand_for_prescription(lift: &WorkoutLift) -> Result<Vec<SetSlot>> {
    match &lift.sets {
        SetTopology::Standard { set_count } => Ok((0..*set_count)
            .map(|position| SetSlot {
                set_position: position,
                myo_rep_set_position: None,
                kind: SlotKind::Standard,
                rep_range_bottom: lift.rep_range_bottom,
                rep_range_top: lift.rep_range_top,
                rpe_target: lift.rpe_target,
            })
            .collect()),
        SetTopology::Custom { sets } => {
            let mut slots = Vec::with_capacity(sets.len());
            for (index, set) in sets.iter().enumerate() {
                if set.position() as usize != index {
                    return Err(Error::SetTopology(format!(
                        "workout lift {}: set at index {} declares position {}",
                        lift.id,
                        index,
                        set.position()
                    )));
                }
                if index == 0 && matches!(set, CustomLiftSet::Drop { .. }) {
                    return Err(Error::SetTopology(format!(
                        "workout lift {}: drop set has no preceding set",
                        lift.id
                    )));
                }
                slots.push(slot_for_custom_set(set));
            }
            Ok(slots)
        }
    }
}

/// Fixed slots plus the myo-rep extension slots the history shows were
/// performed, for displaying a past cycle.
pub fn expand_for_history(
    lift: &WorkoutLift,
    previous: &[PreviousSetResult],
) -> Result<Vec<SetSlot>> {
    let fixed = expand_for_prescription(lift)?;
    let mut slots = Vec::with_capacity(fixed.len());

    for slot in fixed {
        let extensions: BTreeSet<u32> = match slot.kind {
            SlotKind::MyoRep { .. } => previous
                .iter()
                .filter(|r| r.set_position == slot.set_position)
                .filter_map(|r| r.myo_rep_set_position)
                .collect(),
            _ => BTreeSet::new(),
        };

        let template = slot.clone();
        slots.push(slot);
        for myo_position in extensions {
            slots.push(SetSlot {
                myo_rep_set_position: Some(myo_position),
                ..template.clone()
            });
        }
    }

    Ok(slots)
}

fn slot_for_custom_set(set: &CustomLiftSet) -> SetSlot {
    let (rep_range_bottom, rep_range_top) = set.rep_range();
    let kind = match set {
        CustomLiftSet::Standard { .. } => SlotKind::Standard,
        CustomLiftSet::Drop {
            drop_percentage, ..
        } => SlotKind::Drop {
            drop_percentage: *drop_percentage,
        },
        CustomLiftSet::MyoRep { policy, .. } => SlotKind::MyoRep { policy: *policy },
    };

    SetSlot {
        set_position: set.position(),
        myo_rep_set_position: None,
        kind,
        rep_range_bottom,
        rep_range_top,
        rpe_target: set.rpe_target(),
    }
}

/// Whether another myo-rep extension set should be performed.
///
/// Called after every logged extension set with everything performed so far.
pub fn should_continue_myo_rep_extension(
    activation_reps: u32,
    extension_reps_so_far: &[u32],
    policy: &MyoRepPolicy,
) -> bool {
    let extension_count = extension_reps_so_far.len() as u32;
    if let Some(max_sets) = policy.max_sets {
        if extension_count >= max_sets {
            return false;
        }
    }

    match policy.termination {
        MyoRepTermination::SetMatching { match_set_goal } => {
            let completed = extension_reps_so_far
                .iter()
                .fold(0u32, |acc, reps| acc.saturating_add(*reps));
            completed < activation_reps && extension_count < match_set_goal
        }
        MyoRepTermination::RepFloor { rep_floor } => {
            let last = extension_reps_so_far
                .last()
                .copied()
                .unwrap_or(activation_reps);
            last > rep_floor
        }
    }
}
