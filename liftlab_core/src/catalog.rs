//! Lift catalog.
//!
//! Built-in lifts plus whatever custom lifts a program defines.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Lifts available to programs, keyed by lift id
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub lifts: HashMap<u64, Lift>,
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the catalog of built-in lifts
pub fn build_default_catalog() -> Catalog {
    let builtin = [
        (1, "Barbell Back Squat", MovementPattern::Squat, Some(180)),
        (2, "Barbell Bench Press", MovementPattern::HorizontalPush, Some(180)),
        (3, "Barbell Deadlift", MovementPattern::Hinge, Some(240)),
        (4, "Overhead Press", MovementPattern::VerticalPush, Some(150)),
        (5, "Barbell Row", MovementPattern::HorizontalPull, None),
        (6, "Pull-up", MovementPattern::VerticalPull, None),
        (7, "Romanian Deadlift", MovementPattern::Hinge, None),
        (8, "Bulgarian Split Squat", MovementPattern::Lunge, None),
        (9, "Dumbbell Lateral Raise", MovementPattern::Isolation, Some(60)),
        (10, "Barbell Curl", MovementPattern::Isolation, Some(60)),
        (11, "Cable Triceps Pushdown", MovementPattern::Isolation, Some(60)),
        (12, "Hanging Leg Raise", MovementPattern::Core, Some(60)),
        (13, "Farmer's Carry", MovementPattern::Carry, None),
    ];

    let lifts = builtin
        .into_iter()
        .map(|(id, name, movement_pattern, rest_time_secs)| {
            let increment_override = match movement_pattern {
                MovementPattern::Isolation => Some(2.5),
                _ => None,
            };
            (
                id,
                Lift {
                    id,
                    name: name.into(),
                    movement_pattern,
                    rest_time_secs,
                    increment_override,
                    hidden: false,
                },
            )
        })
        .collect();

    Catalog { lifts }
}

impl Catalog {
    /// Default catalog extended with custom lifts; custom entries replace
    /// built-ins with the same id.
    pub fn with_custom(custom: &[Lift]) -> Self {
        let mut catalog = get_default_catalog().clone();
        for lift in custom {
            catalog.lifts.insert(lift.id, lift.clone());
        }
        catalog
    }

    pub fn get(&self, id: u64) -> Option<&Lift> {
        self.lifts.get(&id)
    }

    /// Visible lifts sorted by name
    pub fn visible(&self) -> Vec<&Lift> {
        let mut lifts: Vec<_> = self.lifts.values().filter(|l| !l.hidden).collect();
        lifts.sort_by(|a, b| a.name.cmp(&b.name));
        lifts
    }

    /// Validate catalog integrity
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, lift) in &self.lifts {
            if *id != lift.id {
                errors.push(format!("Lift id mismatch: key={}, lift.id={}", id, lift.id));
            }
            if lift.name.trim().is_empty() {
                errors.push(format!("Lift {} has an empty name", id));
            }
            if let Some(increment) = lift.increment_override {
                if !increment.is_finite() || increment <= 0.0 {
                    errors.push(format!(
                        "Lift {} has invalid increment override {}",
                        id, increment
                    ));
                }
            }
        }

        errors
    }
}
