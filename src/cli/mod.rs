//! Command-line interface for healthbinder.
//!
//! This module provides the CLI structure and command handlers for the
//! `hbind` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ChartCommand, CheckinCommand, ConfigCommand, ExportFormat, FilesCommand, InsightsCommand,
    MedCommand, MetricCommand, OutputFormat, PruneCommand, RemindCommand, StatusCommand,
    VaultCommand, WorkoutCommand,
};

/// hbind - Your health journal, on your machine
///
/// Tracks daily check-ins, medication adherence, workouts and vitals in a
/// local database, with derived insights, terminal charts and reminders.
#[derive(Debug, Parser)]
#[command(name = "hbind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Passcode, required for data commands once one is set
    #[arg(short, long, global = true, value_name = "PIN")]
    pub pin: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record and review daily check-ins
    #[command(subcommand)]
    Checkin(CheckinCommand),

    /// Manage medications and daily ticks
    #[command(subcommand)]
    Med(MedCommand),

    /// Record and review workouts
    #[command(subcommand)]
    Workout(WorkoutCommand),

    /// Record and review vitals and sleep
    #[command(subcommand)]
    Metric(MetricCommand),

    /// Show derived insight cards
    Insights(InsightsCommand),

    /// Render terminal charts
    #[command(subcommand)]
    Chart(ChartCommand),

    /// Show record counts, streak and schedule state
    Status(StatusCommand),

    /// Manage the passcode
    #[command(subcommand)]
    Vault(VaultCommand),

    /// Store and retrieve files (lab reports, scans)
    #[command(subcommand)]
    Files(FilesCommand),

    /// Check-in reminders
    #[command(subcommand)]
    Remind(RemindCommand),

    /// Delete records older than the configured maximum age
    Prune(PruneCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

impl Command {
    /// Whether this command reads or writes journal data and therefore
    /// requires the passcode when one is set.
    ///
    /// Passcode management, configuration, and read-only schedule queries
    /// stay usable while locked.
    #[must_use]
    pub fn requires_unlock(&self) -> bool {
        !matches!(
            self,
            Command::Vault(_)
                | Command::Config(_)
                | Command::Remind(RemindCommand::Status | RemindCommand::Calendar { .. })
        )
    }
}
