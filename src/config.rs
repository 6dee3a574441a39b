//! Configuration management for healthbinder.
//!
//! Configuration loading and validation using figment, supporting TOML
//! config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "healthbinder";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "journal.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HEALTHBINDER_`, with `__`
///    separating the section from the key, since key names themselves
///    contain underscores: `HEALTHBINDER_REMINDER__INTERVAL_HOURS=5`)
/// 2. TOML config file at `~/.config/healthbinder/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Reminder configuration.
    pub reminder: ReminderConfig,
    /// Goal thresholds used by the insights engine.
    pub goals: GoalsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/healthbinder/journal.db`
    pub database_path: Option<PathBuf>,
    /// Maximum age of history entries to retain in days.
    /// Set to 0 to keep everything.
    pub max_age_days: u32,
}

/// Reminder-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Hours between check-in reminders.
    pub interval_hours: u32,
}

/// Goal thresholds for the insights engine.
///
/// Defaults match common guidance: 7h of sleep, resting HR under 75 bpm,
/// HRV of 40ms or more, SpO₂ of 95% or more, 6000 steps a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalsConfig {
    /// Sleep target per 24h, in minutes.
    pub sleep_target_minutes: u32,
    /// Resting heart rate considered good when below this, in bpm.
    pub resting_hr_max: f64,
    /// HRV considered good at or above this, in milliseconds.
    pub hrv_min: f64,
    /// SpO₂ considered good at or above this, in percent.
    pub spo2_min: f64,
    /// SpO₂ below this earns a stronger caution, in percent.
    pub spo2_caution: f64,
    /// Average energy considered good at or above this.
    pub energy_good: f64,
    /// Average energy below this suggests a rest day.
    pub energy_low: f64,
    /// Daily step target.
    pub steps_target: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved to the default at runtime
            max_age_days: 0,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { interval_hours: 10 }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            sleep_target_minutes: 420,
            resting_hr_max: 75.0,
            hrv_min: 40.0,
            spo2_min: 95.0,
            spo2_caution: 94.0,
            energy_good: 6.0,
            energy_low: 5.0,
            steps_target: 6000,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("HEALTHBINDER_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.reminder.interval_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "interval_hours must be greater than 0".to_string(),
            });
        }

        if self.goals.sleep_target_minutes == 0 {
            return Err(Error::ConfigValidation {
                message: "sleep_target_minutes must be greater than 0".to_string(),
            });
        }

        if !(0.0..=100.0).contains(&self.goals.spo2_min)
            || !(0.0..=100.0).contains(&self.goals.spo2_caution)
        {
            return Err(Error::ConfigValidation {
                message: "spo2 thresholds must be between 0 and 100".to_string(),
            });
        }

        if self.goals.spo2_caution > self.goals.spo2_min {
            return Err(Error::ConfigValidation {
                message: format!(
                    "spo2_caution ({}) cannot be greater than spo2_min ({})",
                    self.goals.spo2_caution, self.goals.spo2_min
                ),
            });
        }

        if self.goals.energy_low > self.goals.energy_good {
            return Err(Error::ConfigValidation {
                message: format!(
                    "energy_low ({}) cannot be greater than energy_good ({})",
                    self.goals.energy_low, self.goals.energy_good
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the history retention limit as a chrono Duration.
    ///
    /// `None` means keep everything.
    #[must_use]
    pub fn max_age(&self) -> Option<chrono::Duration> {
        if self.storage.max_age_days == 0 {
            None
        } else {
            Some(chrono::Duration::days(i64::from(self.storage.max_age_days)))
        }
    }

    /// Get the reminder interval as a std Duration.
    #[must_use]
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.reminder.interval_hours) * 60 * 60)
    }
}
