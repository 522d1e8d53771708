use liftlab_core::*;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "liftlab")]
#[command(about = "Strength training progression engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prescribe the next sets for a workout (default)
    Prescribe {
        /// Workout id (defaults to the first workout of the program)
        #[arg(long)]
        workout: Option<u64>,

        /// Print prescriptions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log a performed set for the current microcycle
    Log {
        #[arg(long)]
        workout: u64,

        /// Lift id
        #[arg(long)]
        lift: u64,

        /// Set position (0-based)
        #[arg(long)]
        set: u32,

        /// Myo-rep extension position (0-based)
        #[arg(long)]
        myo_set: Option<u32>,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        #[arg(long)]
        rpe: f64,

        /// Linear progression miss counter (taken from the prescription when omitted)
        #[arg(long)]
        missed_lp_goals: Option<u32>,
    },

    /// Decide whether another myo-rep extension set should be performed
    #[command(group(ArgGroup::new("termination").required(true).args(["rep_floor", "match_goal"])))]
    Myo {
        /// Reps performed in the activation set
        #[arg(long)]
        activation: u32,

        /// Reps of the extension sets performed so far
        #[arg(long, value_delimiter = ',')]
        extensions: Vec<u32>,

        /// Stop once a set falls to this many reps
        #[arg(long)]
        rep_floor: Option<u32>,

        /// Stop after this many extension sets or once the activation reps are matched
        #[arg(long)]
        match_goal: Option<u32>,

        /// Hard cap on extension sets
        #[arg(long)]
        max_sets: Option<u32>,
    },

    /// Estimate a one-rep max
    Estimate {
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        #[arg(long)]
        rpe: f64,
    },

    /// Move to the next microcycle
    Advance,

    /// Show the current cycle position
    Status,

    /// List available lifts
    Lifts,

    /// Roll up the results log to CSV
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// File locations inside the data directory
struct DataPaths {
    program: PathBuf,
    log_dir: PathBuf,
    state: PathBuf,
    results_log: PathBuf,
    csv: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let log_dir = data_dir.join("log");
        Self {
            program: data_dir.join("program.json"),
            state: log_dir.join("state.json"),
            results_log: log_dir.join("set_results.log"),
            csv: data_dir.join("set_results.csv"),
            log_dir,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    liftlab_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);

    match cli.command {
        Some(Commands::Prescribe { workout, json }) => cmd_prescribe(&paths, &config, workout, json),
        Some(Commands::Log {
            workout,
            lift,
            set,
            myo_set,
            weight,
            reps,
            rpe,
            missed_lp_goals,
        }) => cmd_log(
            &paths,
            &config,
            LoggedSet {
                workout,
                lift,
                set,
                myo_set,
                weight,
                reps,
                rpe,
                missed_lp_goals,
            },
        ),
        Some(Commands::Myo {
            activation,
            extensions,
            rep_floor,
            match_goal,
            max_sets,
        }) => cmd_myo(activation, &extensions, rep_floor, match_goal, max_sets),
        Some(Commands::Estimate { weight, reps, rpe }) => cmd_estimate(weight, reps, rpe),
        Some(Commands::Advance) => cmd_advance(&paths),
        Some(Commands::Status) => cmd_status(&paths),
        Some(Commands::Lifts) => cmd_lifts(&paths),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        None => {
            // Default to "prescribe" command
            cmd_prescribe(&paths, &config, None, false)
        }
    }
}

/// Load and validate the program with its catalog
fn load_program(paths: &DataPaths) -> Result<(Program, Catalog)> {
    let program = Program::load(&paths.program)?;
    let catalog = program.catalog();

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Program("Invalid lift catalog".into()));
    }

    program.validate(&catalog)?;
    Ok((program, catalog))
}

fn select_workout(program: &Program, workout_id: Option<u64>) -> Result<&Workout> {
    match workout_id {
        Some(id) => program
            .workout(id)
            .ok_or_else(|| Error::Program(format!("Unknown workout {}", id))),
        None => program
            .workouts
            .first()
            .ok_or_else(|| Error::Program("Program has no workouts".into())),
    }
}

fn cmd_prescribe(
    paths: &DataPaths,
    config: &Config,
    workout_id: Option<u64>,
    json: bool,
) -> Result<()> {
    let (program, catalog) = load_program(paths)?;
    let workout = select_workout(&program, workout_id)?;
    let state = ProgramState::load(&paths.state)?;
    let history = load_results(&paths.results_log, &paths.csv)?;

    let settings = config.progression_settings(program.deload_week);
    let lifts = program.resolved_lifts(workout, &catalog);
    let prescriptions = calculate_workout(&lifts, &history, state.position(), &settings);
    let failed = prescriptions.iter().filter(|p| p.sets.is_err()).count();
    if failed > 0 {
        tracing::warn!(
            "{} of {} lifts in workout {} could not be prescribed",
            failed,
            prescriptions.len(),
            workout.id
        );
    }

    if json {
        let output: Vec<_> = prescriptions
            .iter()
            .map(|p| {
                let name = lift_name(&catalog, p.lift_id);
                match &p.sets {
                    Ok(sets) => serde_json::json!({
                        "workout_lift_id": p.workout_lift_id,
                        "lift_id": p.lift_id,
                        "lift": name,
                        "sets": sets,
                    }),
                    Err(e) => serde_json::json!({
                        "workout_lift_id": p.workout_lift_id,
                        "lift_id": p.lift_id,
                        "lift": name,
                        "error": e.to_string(),
                    }),
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    display_workout(&program, workout, &state, &catalog, config, &prescriptions);
    Ok(())
}

struct LoggedSet {
    workout: u64,
    lift: u64,
    set: u32,
    myo_set: Option<u32>,
    weight: f64,
    reps: u32,
    rpe: f64,
    missed_lp_goals: Option<u32>,
}

fn cmd_log(paths: &DataPaths, config: &Config, logged: LoggedSet) -> Result<()> {
    let (program, catalog) = load_program(paths)?;
    let workout = select_workout(&program, Some(logged.workout))?;
    let lifts = program.resolved_lifts(workout, &catalog);
    let workout_lift = lifts
        .iter()
        .find(|l| l.lift_id == logged.lift)
        .ok_or_else(|| {
            Error::Program(format!(
                "Lift {} is not part of workout {}",
                logged.lift, logged.workout
            ))
        })?;

    let slots = expand_for_prescription(workout_lift)?;
    let slot = slots
        .iter()
        .find(|s| s.set_position == logged.set)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "Lift {} has no set {} in workout {}",
                logged.lift,
                logged.set + 1,
                logged.workout
            ))
        })?;
    if logged.myo_set.is_some() && !matches!(slot.kind, SlotKind::MyoRep { .. }) {
        return Err(Error::InvalidInput(format!(
            "Set {} of lift {} is not a myo-rep set",
            logged.set + 1,
            logged.lift
        )));
    }

    // Rejects non-positive weight, zero reps and out of range RPE
    let estimated_max = one_rep_max::estimate(logged.weight, logged.reps, logged.rpe)?;

    let state = ProgramState::load(&paths.state)?;
    let position = state.position();

    let missed_lp_goals = match logged.missed_lp_goals {
        Some(missed) => Some(missed),
        None if workout_lift.progression_scheme == ProgressionScheme::LinearProgression => {
            let history = load_results(&paths.results_log, &paths.csv)?;
            let previous = history::previous_cycle_results(
                &history,
                workout_lift.workout_id,
                workout_lift.lift_id,
                position,
            );
            let settings = config.progression_settings(program.deload_week);
            let sets = calculate_next_sets(workout_lift, &previous, position, &settings)?;
            sets.iter()
                .find(|s| s.set_position == logged.set)
                .and_then(|s| s.missed_lp_goals)
                .or(Some(0))
        }
        None => None,
    };

    let result = PreviousSetResult {
        id: uuid::Uuid::new_v4(),
        workout_id: logged.workout,
        lift_id: logged.lift,
        set_position: logged.set,
        myo_rep_set_position: logged.myo_set,
        weight: logged.weight,
        reps: logged.reps,
        rpe: logged.rpe,
        mesocycle: position.mesocycle,
        microcycle: position.microcycle,
        missed_lp_goals,
        logged_at: chrono::Utc::now(),
    };

    let mut sink = JsonlSink::new(&paths.results_log);
    sink.append(&result)?;
    tracing::info!(
        "Logged workout {} lift {} set {} at {}",
        logged.workout,
        logged.lift,
        logged.set,
        position
    );

    println!(
        "✓ Logged {} set {}: {} x {} @{}",
        lift_name(&catalog, logged.lift),
        logged.set + 1,
        logged.weight,
        logged.reps,
        logged.rpe
    );
    println!("  Estimated 1RM: {:.1}", estimated_max);
    Ok(())
}

fn cmd_myo(
    activation: u32,
    extensions: &[u32],
    rep_floor: Option<u32>,
    match_goal: Option<u32>,
    max_sets: Option<u32>,
) -> Result<()> {
    let termination = MyoRepTermination::from_fields(rep_floor, match_goal.is_some(), match_goal)?;
    let policy = MyoRepPolicy {
        termination,
        max_sets,
    };

    if should_continue_myo_rep_extension(activation, extensions, &policy) {
        println!("Continue: perform extension set {}", extensions.len() + 1);
    } else {
        println!("Stop: myo-rep set complete");
    }
    Ok(())
}

fn cmd_estimate(weight: f64, reps: u32, rpe: f64) -> Result<()> {
    let estimated = one_rep_max::estimate(weight, reps, rpe)?;
    println!("Estimated 1RM: {:.1}", estimated);
    Ok(())
}

fn cmd_advance(paths: &DataPaths) -> Result<()> {
    let program = Program::load(&paths.program)?;
    let state = ProgramState::update(&paths.state, |state| {
        state.advance(program.deload_week);
        Ok(())
    })?;

    println!("✓ Advanced to {}", describe_position(&state, program.deload_week));
    Ok(())
}

fn cmd_status(paths: &DataPaths) -> Result<()> {
    let program = Program::load(&paths.program)?;
    let state = ProgramState::load(&paths.state)?;

    println!("Program: {}", program.name);
    println!("  {}", describe_position(&state, program.deload_week));
    if deload::is_deload_microcycle(state.current_microcycle, program.deload_week) {
        println!("  Deload week");
    }
    Ok(())
}

fn cmd_lifts(paths: &DataPaths) -> Result<()> {
    let catalog = if paths.program.exists() {
        Program::load(&paths.program)?.catalog()
    } else {
        get_default_catalog().clone()
    };

    for lift in catalog.visible() {
        println!("{:>4}  {} ({:?})", lift.id, lift.name, lift.movement_pattern);
    }
    Ok(())
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.results_log.exists() {
        println!("No results log found - nothing to roll up.");
        return Ok(());
    }

    let count = liftlab_core::csv_rollup::log_to_csv_and_archive(&paths.results_log, &paths.csv)?;

    println!("✓ Rolled up {} results to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = liftlab_core::csv_rollup::cleanup_processed_logs(&paths.log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}

fn lift_name(catalog: &Catalog, lift_id: u64) -> String {
    catalog
        .get(lift_id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| format!("Lift {}", lift_id))
}

/// Positions are stored 0-based and shown 1-based
fn describe_position(state: &ProgramState, deload_week: u32) -> String {
    format!(
        "Mesocycle {}, week {} of {}",
        state.current_mesocycle + 1,
        state.current_microcycle + 1,
        deload_week
    )
}

fn display_workout(
    program: &Program,
    workout: &Workout,
    state: &ProgramState,
    catalog: &Catalog,
    config: &Config,
    prescriptions: &[LiftPrescription],
) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", workout.name.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!("  {}", describe_position(state, program.deload_week));
    println!();

    for prescription in prescriptions {
        let rest_secs = catalog
            .get(prescription.lift_id)
            .and_then(|l| l.rest_time_secs)
            .unwrap_or(config.settings.default_rest_time_secs);
        println!(
            "  {} (rest {}s)",
            lift_name(catalog, prescription.lift_id),
            rest_secs
        );

        match &prescription.sets {
            Ok(sets) => {
                for set in sets {
                    println!("    {}", format_set(set));
                }
            }
            Err(e) => println!("    ✗ {}", e),
        }
        println!();
    }
}

fn format_set(set: &SetPrescription) -> String {
    let weight = set
        .weight
        .map(|w| format!("{}", w))
        .unwrap_or_else(|| "--".into());

    let label = match set.kind {
        SlotKind::Standard => String::new(),
        SlotKind::Drop { drop_percentage } => {
            format!(" drop -{:.0}%", drop_percentage * 100.0)
        }
        SlotKind::MyoRep { .. } => " myo-rep activation".into(),
    };

    let mut line = format!(
        "Set {}: {} x {} {}{} [{:?}]",
        set.set_position + 1,
        weight,
        set.reps,
        set.rpe,
        label,
        set.decision
    );
    if let Some(missed) = set.missed_lp_goals.filter(|m| *m > 0) {
        line.push_str(&format!(" (missed {})", missed));
    }
    line
}
