//! Deload week resolution.

/// Effective deload week for a lift.
///
/// The lift's own override only applies when lift-specific deloading is
/// enabled; otherwise every lift follows the program.
pub fn resolve(
    lift_override: Option<u32>,
    program_default: u32,
    lift_specific_deloading_enabled: bool,
) -> u32 {
    match lift_override {
        Some(week) if lift_specific_deloading_enabled => week,
        _ => program_default,
    }
}

/// Weeks at or past `deload_week - 1` are deload weeks.
pub fn is_deload_microcycle(microcycle: u32, deload_week: u32) -> bool {
    microcycle >= deload_week.saturating_sub(1)
}
