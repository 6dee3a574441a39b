//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Check-in commands.
#[derive(Debug, Subcommand)]
pub enum CheckinCommand {
    /// Record a check-in
    Add {
        /// Energy level, 1 (drained) to 10 (great)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=10))]
        energy: u8,

        /// Mark that you exercised
        #[arg(short = 'x', long)]
        exercise: bool,

        /// Symptoms, free text
        #[arg(short, long)]
        symptoms: Option<String>,

        /// Additional notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List recent check-ins, newest first
    List {
        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Export the check-in history to a file
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Destination file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Import check-ins from a JSON file, replacing the stored history
    Import {
        /// JSON file to import
        file: PathBuf,
    },
}

/// Medication commands.
#[derive(Debug, Subcommand)]
pub enum MedCommand {
    /// Add a medication to the daily checklist
    Add {
        /// Medication name
        name: String,

        /// Dose description (e.g. "200mg")
        #[arg(short, long)]
        dose: Option<String>,
    },

    /// List medications
    List,

    /// Remove a medication and its history
    Remove {
        /// Medication id (see `med list`)
        id: i64,
    },

    /// Mark a medication as taken today
    Tick {
        /// Medication id
        id: i64,
    },

    /// Unmark a medication for today
    Untick {
        /// Medication id
        id: i64,
    },

    /// Show today's checklist and adherence
    Status,
}

/// Workout commands.
#[derive(Debug, Subcommand)]
pub enum WorkoutCommand {
    /// Record a workout
    Add {
        /// BetterMe program session
        #[arg(short, long)]
        betterme: bool,

        /// Strength training
        #[arg(short, long)]
        strength: bool,

        /// Mobility or stretching
        #[arg(short, long)]
        mobility: bool,

        /// Cardio session
        #[arg(long)]
        cardio: bool,

        /// Step count
        #[arg(long)]
        steps: Option<u32>,

        /// Calories burned
        #[arg(long)]
        calories: Option<u32>,

        /// Additional notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List recent workouts, newest first
    List {
        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete all workouts
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the workout history as CSV
    Export {
        /// Destination file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Import workouts from a JSON file, replacing the stored history
    Import {
        /// JSON file to import
        file: PathBuf,
    },

    /// Show the current BetterMe streak
    Streak,
}

/// Vitals/sleep metric commands.
#[derive(Debug, Subcommand)]
pub enum MetricCommand {
    /// Record a measurement entry (at least one value required)
    Add {
        /// Body weight in kg
        #[arg(short, long)]
        weight: Option<f64>,

        /// Resting heart rate in bpm
        #[arg(short, long)]
        resting_hr: Option<u32>,

        /// Blood oxygen saturation in percent
        #[arg(short = 'o', long)]
        spo2: Option<f64>,

        /// Heart rate variability in ms
        #[arg(long)]
        hrv: Option<f64>,

        /// Blood pressure (e.g. "120/80")
        #[arg(short, long)]
        bp: Option<String>,

        /// Sleep duration in minutes
        #[arg(long, value_name = "MINUTES")]
        sleep: Option<u32>,
    },

    /// List recent entries, newest first
    List {
        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Export all entries as CSV
    Export {
        /// Destination file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Write a header-only CSV import template
    Template {
        /// Destination file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Import entries from a CSV or JSON file (chosen by extension)
    Import {
        /// File to import
        file: PathBuf,
    },
}

/// Insights command arguments.
#[derive(Debug, Args)]
pub struct InsightsCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Chart commands.
#[derive(Debug, Subcommand)]
pub enum ChartCommand {
    /// Energy sparkline over the last 30 check-ins
    Energy,

    /// Weekly workout bars over the last 12 ISO weeks
    Weekly,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Passcode commands.
#[derive(Debug, Subcommand)]
pub enum VaultCommand {
    /// Set or change the passcode (changing requires --pin)
    Set {
        /// The new passcode, at least 4 characters
        passcode: String,
    },

    /// Remove the passcode (requires --pin)
    Clear,

    /// Show whether a passcode is set
    Status,
}

/// File binder commands.
#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// Store one or more files in the binder
    Add {
        /// Files to store
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List stored files
    List,

    /// Write one stored file back out
    Get {
        /// Attachment id (see `files list`)
        id: i64,

        /// Destination file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Write all stored files out to a directory
    Export {
        /// Destination directory
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,
    },
}

/// Reminder commands.
#[derive(Debug, Subcommand)]
pub enum RemindCommand {
    /// Run the reminder schedule in the foreground (ctrl-c to stop)
    Run,

    /// Show when the next reminder is due
    Status,

    /// Fire one reminder immediately
    Test,

    /// Export the reminder schedule as an iCalendar file
    Calendar {
        /// Destination file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

/// Prune command arguments.
#[derive(Debug, Args)]
pub struct PruneCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Remove the configuration file, reverting to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Export format for check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// JSON array
    Json,
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
