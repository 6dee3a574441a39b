//! `healthbinder` - A local-first personal health journal
//!
//! This library provides the core functionality for recording daily
//! check-ins, medication adherence, workouts and vitals in a local SQLite
//! database, and for deriving insights, charts and reminders from them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod attachments;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod insights;
pub mod logging;
pub mod record;
pub mod reminder;
pub mod storage;
pub mod vault;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{CheckIn, Medication, Metric, Workout};
pub use storage::{Storage, StorageStats};
