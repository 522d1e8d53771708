#![forbid(unsafe_code)]

//! Core domain model and progression logic for LiftLab.
//!
//! This crate provides:
//! - Domain types (lifts, workout lifts, set topologies, results, prescriptions)
//! - Calculators (1RM estimation, step sequences, deload resolution, set expansion)
//! - The progression calculator for all schemes
//! - Persistence (results log, CSV archive, program state)
//! - Program definitions and configuration

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod one_rep_max;
pub mod steps;
pub mod deload;
pub mod topology;
pub mod progression;
pub mod history;
pub mod results_log;
pub mod csv_rollup;
pub mod state;
pub mod program;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use progression::{calculate_next_sets, calculate_workout, ProgressionSettings};
pub use topology::{expand_for_history, expand_for_prescription, should_continue_myo_rep_extension};
pub use results_log::{JsonlSink, ResultSink};
pub use history::load_results;
pub use program::{Program, Workout};
