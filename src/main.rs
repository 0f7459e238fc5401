//! liftlog - Personal strength training log

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};

use liftlog::config::Config;
use liftlog::db::Database;
use liftlog::manager::{Registration, WorkoutManager};
use liftlog::model::{Entries, Workout, parse_block_date, parse_set_arg};
use liftlog::tracker::ProgressTrend;
use liftlog::tui::{App, summarize};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(version, about = "Personal strength training log")]
struct Cli {
    /// Folder holding the workout history and tracker documents
    #[arg(long, env = "LIFTLOG_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Refuse to start if a stored document cannot be parsed
    #[arg(long, env = "LIFTLOG_STRICT_LOAD", global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Manage the exercise catalog
    #[command(subcommand)]
    Exercise(ExerciseCommand),

    /// Manage training blocks
    #[command(subcommand)]
    Block(BlockCommand),

    /// Manage workout templates
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Log a completed workout
    Log {
        /// Training block number (1, 2, ...)
        #[arg(short, long)]
        block: usize,

        /// Template the workout follows
        #[arg(short, long)]
        template: String,

        /// Workout date as MM-DD-YYYY (defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Sets as EXERCISE:REPSxWEIGHT, in the order performed
        #[arg(short, long = "set", required = true)]
        sets: Vec<String>,
    },

    /// List the workouts of a training block
    Workouts {
        /// Training block number (1, 2, ...)
        block: usize,
    },

    /// Show training statistics
    Stats {
        /// Show one exercise in detail
        exercise: Option<String>,
    },

    /// Recompute the tracker from the full workout history
    Rebuild,
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Register a new exercise
    Add { name: String },
    /// List known exercises
    List,
}

#[derive(Subcommand)]
enum BlockCommand {
    /// Start a new training block
    Add {
        /// Start date as MM-DD-YYYY
        #[arg(short, long)]
        start: String,

        /// Workouts per week
        #[arg(short = 'w', long, default_value = "3")]
        per_week: u32,
    },
    /// List training blocks and their templates
    List,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Add a template to a block
    Add {
        /// Training block number (1, 2, ...)
        #[arg(short, long)]
        block: usize,

        /// Template name, e.g. "Leg Day"
        name: String,

        /// Exercises in order
        #[arg(required = true)]
        exercises: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new(cli.data_dir, cli.strict);
    let db = Database::open(&config.data_dir, config.load_policy)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let mut manager = WorkoutManager::open(db)?;

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(manager);
            app.run()?;
        }

        Some(Commands::Exercise(ExerciseCommand::Add { name })) => {
            match manager.add_exercise(&name)? {
                Registration::Added => println!("Added exercise '{}'", name),
                Registration::AlreadyExists => println!("Exercise '{}' already exists", name),
            }
        }

        Some(Commands::Exercise(ExerciseCommand::List)) => {
            println!("All Exercises:");
            for exercise in manager.exercises().iter() {
                println!("- {}", exercise);
            }
        }

        Some(Commands::Block(BlockCommand::Add { start, per_week })) => {
            let start = parse_block_date(&start)?;
            let idx = manager.add_training_block(start, per_week)?;
            println!("Created training block {}", idx + 1);
        }

        Some(Commands::Block(BlockCommand::List)) => {
            for (idx, block) in manager.training_blocks().iter().enumerate() {
                println!("\nTraining Block {}:", idx + 1);
                println!(
                    "Starting on {} with {} workouts per week, {} logged",
                    block.starting_date,
                    block.workouts_per_week,
                    block.workouts.len()
                );
                println!("Templates:");
                for template in &block.templates {
                    println!("  {}", template);
                }
            }
        }

        Some(Commands::Template(TemplateCommand::Add { block, name, exercises })) => {
            manager.add_template(block_index(block)?, &name, exercises)?;
            println!("Added template '{}' to block {}", name, block);
        }

        Some(Commands::Log { block, template, date, sets }) => {
            let idx = block_index(block)?;
            if manager.block(idx)?.template(&template).is_none() {
                bail!(liftlog::Error::UnknownTemplate(template));
            }

            let date = match date {
                Some(d) => parse_block_date(&d)?,
                None => Local::now().date_naive(),
            };

            let mut entries = Entries::new();
            for arg in &sets {
                let (exercise, set) = parse_set_arg(arg)?;
                entries.push_set(&exercise, set);
            }

            let workout = Workout::new(template, date).with_entries(entries);
            println!("{}", workout);
            manager.log_workout(idx, workout)?;
        }

        Some(Commands::Workouts { block }) => {
            let block_ref = manager.block(block_index(block)?)?;
            println!("Workouts for Training Block starting on {}:\n", block_ref.starting_date);
            for workout in &block_ref.workouts {
                println!("{}\n", workout);
            }
        }

        Some(Commands::Stats { exercise }) => {
            let tracker = manager.tracker();
            let stats = tracker.stats();

            println!("Training Statistics");
            println!("{:-<40}", "");

            match exercise {
                Some(ex) => {
                    let history = tracker
                        .exercise(&ex)
                        .with_context(|| format!("unknown exercise '{}'", ex))?;
                    if let Some(pb) = tracker.personal_best(&ex).filter(|pb| pb.is_set()) {
                        println!(
                            "PB for {} is {} lbs, completed for {} reps on {}",
                            ex, pb.weight, pb.reps, pb.date
                        );
                    }
                    for row in summarize(history) {
                        let latest = row
                            .latest
                            .map(|(v, d)| format!("{} on {}", v, d))
                            .unwrap_or_else(|| "-".into());
                        println!(
                            "{:10} | {:3} sessions | latest {} | {}",
                            row.label,
                            row.sessions,
                            latest,
                            row.trend.as_deref().unwrap_or("no trend yet")
                        );
                    }
                }
                None => {
                    println!("Total reps: {}", stats.total_reps);
                    println!("Total weight lifted: {} lbs", stats.total_volume);
                    println!("Workouts tracked: {}", stats.volume_per_workout.len());
                    if let Some(trend) = ProgressTrend::fit(&stats.volume_per_workout) {
                        println!("Volume trend: {}", trend.summary());
                        println!("Projected workout volume in a week: {:.0} lbs", trend.predict(7));
                    }
                    println!("\nPersonal bests:");
                    for (name, pb) in tracker.personal_bests() {
                        if pb.is_set() {
                            println!("{:20} | {} x {} lbs | {}", name, pb.reps, pb.weight, pb.date);
                        }
                    }
                }
            }
        }

        Some(Commands::Rebuild) => {
            manager.rebuild_tracker()?;
            println!(
                "Rebuilt tracker from {} workouts",
                manager.history().workouts().count()
            );
        }
    }

    Ok(())
}

/// Command-line block numbers start at 1
fn block_index(block: usize) -> Result<usize> {
    block
        .checked_sub(1)
        .context("block numbers start at 1")
}
