//! Core domain types for the LiftLab system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Lifts and their placement inside workouts
//! - Set topologies (standard, drop and myo-rep sets)
//! - Logged set results and program cycle position
//! - Prescriptions produced by the progression engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Lift Types
// ============================================================================

/// Movement pattern classification for a lift
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    HorizontalPush,
    HorizontalPull,
    VerticalPush,
    VerticalPull,
    Squat,
    Hinge,
    Lunge,
    Isolation,
    Core,
    Carry,
}

/// A lift definition (e.g., "Barbell Back Squat")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lift {
    pub id: u64,
    pub name: String,
    pub movement_pattern: MovementPattern,
    #[serde(default)]
    pub rest_time_secs: Option<u32>,
    #[serde(default)]
    pub increment_override: Option<f64>,
    #[serde(default)]
    pub hidden: bool,
}

// ============================================================================
// Workout Lift Configuration
// ============================================================================

/// Policy governing how weight and reps advance cycle to cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionScheme {
    LinearProgression,
    DoubleProgression,
    DynamicDoubleProgression,
    WaveLoadingProgression,
}

/// When a myo-rep set stops adding extension sets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MyoRepTermination {
    /// Stop once a set's reps fall at or below the floor
    RepFloor { rep_floor: u32 },
    /// Stop once extension reps add up to the activation set, or after
    /// `match_set_goal` extension sets
    SetMatching { match_set_goal: u32 },
}

impl MyoRepTermination {
    /// Build a termination policy from the flat record layout
    /// (`rep_floor`, `set_matching`, `match_set_goal`).
    ///
    /// Exactly one policy must be active.
    pub fn from_fields(
        rep_floor: Option<u32>,
        set_matching: bool,
        match_set_goal: Option<u32>,
    ) -> crate::Result<Self> {
        match (rep_floor, set_matching, match_set_goal) {
            (Some(rep_floor), false, _) => Ok(Self::RepFloor { rep_floor }),
            (None, true, Some(match_set_goal)) => Ok(Self::SetMatching { match_set_goal }),
            (None, true, None) => Err(crate::Error::DataIntegrity(
                "set matching is enabled without a match set goal".into(),
            )),
            (Some(_), true, _) => Err(crate::Error::DataIntegrity(
                "myo-rep set has both a rep floor and set matching".into(),
            )),
            (None, false, _) => Err(crate::Error::DataIntegrity(
                "myo-rep set has neither a rep floor nor set matching".into(),
            )),
        }
    }
}

/// Termination rule plus the optional hard cap on extension sets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MyoRepPolicy {
    #[serde(flatten)]
    pub termination: MyoRepTermination,
    #[serde(default)]
    pub max_sets: Option<u32>,
}

/// One explicitly configured set of a workout lift
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomLiftSet {
    Standard {
        position: u32,
        rep_range_bottom: u32,
        rep_range_top: u32,
        rpe_target: f64,
    },
    Drop {
        position: u32,
        rep_range_bottom: u32,
        rep_range_top: u32,
        rpe_target: f64,
        drop_percentage: f64,
    },
    MyoRep {
        position: u32,
        rep_range_bottom: u32,
        rep_range_top: u32,
        rpe_target: f64,
        #[serde(flatten)]
        policy: MyoRepPolicy,
    },
}

impl CustomLiftSet {
    pub fn position(&self) -> u32 {
        match self {
            CustomLiftSet::Standard { position, .. }
            | CustomLiftSet::Drop { position, .. }
            | CustomLiftSet::MyoRep { position, .. } => *position,
        }
    }

    /// (bottom, top) of the rep range
    pub fn rep_range(&self) -> (u32, u32) {
        match self {
            CustomLiftSet::Standard {
                rep_range_bottom,
                rep_range_top,
                ..
            }
            | CustomLiftSet::Drop {
                rep_range_bottom,
                rep_range_top,
                ..
            }
            | CustomLiftSet::MyoRep {
                rep_range_bottom,
                rep_range_top,
                ..
            } => (*rep_range_bottom, *rep_range_top),
        }
    }

    pub fn rpe_target(&self) -> f64 {
        match self {
            CustomLiftSet::Standard { rpe_target, .. }
            | CustomLiftSet::Drop { rpe_target, .. }
            | CustomLiftSet::MyoRep { rpe_target, .. } => *rpe_target,
        }
    }
}

/// Which sets a workout lift has: uniform standard sets or an explicit list
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetTopology {
    Standard { set_count: u32 },
    Custom { sets: Vec<CustomLiftSet> },
}

/// A lift's placement inside a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLift {
    pub id: u64,
    pub workout_id: u64,
    pub lift_id: u64,
    pub position: u32,
    pub progression_scheme: ProgressionScheme,
    pub rep_range_bottom: u32,
    pub rep_range_top: u32,
    pub rpe_target: f64,
    #[serde(default)]
    pub deload_week: Option<u32>,
    #[serde(default)]
    pub step_size: Option<u32>,
    #[serde(default)]
    pub increment_override: Option<f64>,
    pub sets: SetTopology,
}

// ============================================================================
// History and Cycle Position
// ============================================================================

/// Position in the program: mesocycle, then 0-based week within it.
///
/// Ordering is chronological.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CyclePosition {
    pub mesocycle: u32,
    pub microcycle: u32,
}

impl CyclePosition {
    pub fn new(mesocycle: u32, microcycle: u32) -> Self {
        Self {
            mesocycle,
            microcycle,
        }
    }
}

impl fmt::Display for CyclePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mesocycle {} / microcycle {}",
            self.mesocycle, self.microcycle
        )
    }
}

/// A logged set for one (workout, lift, set position, myo-rep position) key
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PreviousSetResult {
    pub id: Uuid,
    pub workout_id: u64,
    pub lift_id: u64,
    pub set_position: u32,
    #[serde(default)]
    pub myo_rep_set_position: Option<u32>,
    pub weight: f64,
    pub reps: u32,
    pub rpe: f64,
    pub mesocycle: u32,
    pub microcycle: u32,
    #[serde(default)]
    pub missed_lp_goals: Option<u32>,
    pub logged_at: DateTime<Utc>,
}

impl PreviousSetResult {
    pub fn cycle(&self) -> CyclePosition {
        CyclePosition::new(self.mesocycle, self.microcycle)
    }

    /// Myo-rep extension rows carry a secondary position
    pub fn is_extension(&self) -> bool {
        self.myo_rep_set_position.is_some()
    }
}

/// Where the program currently is. Mutated after workouts, read by the engine.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgramState {
    pub current_mesocycle: u32,
    pub current_microcycle: u32,
}

impl ProgramState {
    pub fn position(&self) -> CyclePosition {
        CyclePosition::new(self.current_mesocycle, self.current_microcycle)
    }

    /// Move to the next microcycle, rolling into a new mesocycle after the
    /// deload week.
    pub fn advance(&mut self, deload_week: u32) {
        let next = self.current_microcycle + 1;
        if next >= deload_week.max(1) {
            self.current_mesocycle += 1;
            self.current_microcycle = 0;
        } else {
            self.current_microcycle = next;
        }
    }
}

// ============================================================================
// Slots and Prescriptions
// ============================================================================

/// Kind of a concrete set slot
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotKind {
    Standard,
    Drop { drop_percentage: f64 },
    MyoRep {
        #[serde(flatten)]
        policy: MyoRepPolicy,
    },
}

/// One schedule-known set of a lift, before progression is applied
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SetSlot {
    pub set_position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub myo_rep_set_position: Option<u32>,
    pub kind: SlotKind,
    pub rep_range_bottom: u32,
    pub rep_range_top: u32,
    pub rpe_target: f64,
}

/// Rep goal shown to the lifter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepTarget {
    Exact { reps: u32 },
    Range { bottom: u32, top: u32 },
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepTarget::Exact { reps } => write!(f, "{}", reps),
            RepTarget::Range { bottom, top } => write!(f, "{}-{}", bottom, top),
        }
    }
}

/// RPE goal shown to the lifter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "rpe", rename_all = "snake_case")]
pub enum RpeTarget {
    Exact(f64),
    /// A cap rather than a target ("max RPE")
    AtMost(f64),
}

impl fmt::Display for RpeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpeTarget::Exact(rpe) => write!(f, "@{}", rpe),
            RpeTarget::AtMost(rpe) => write!(f, "@<={}", rpe),
        }
    }
}

/// Outcome of evaluating a slot against its history
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionDecision {
    /// No history to compare against
    Base,
    Advance,
    Hold,
    Deload,
}

/// Prescribed targets for one set slot of the upcoming cycle
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SetPrescription {
    pub set_position: u32,
    pub kind: SlotKind,
    pub weight: Option<f64>,
    pub reps: RepTarget,
    pub rpe: RpeTarget,
    pub decision: ProgressionDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed_lp_goals: Option<u32>,
}

/// Prescriptions (or the failure) for one lift of a workout
#[derive(Debug)]
pub struct LiftPrescription {
    pub workout_lift_id: u64,
    pub lift_id: u64,
    pub sets: crate::Result<Vec<SetPrescription>>,
}
