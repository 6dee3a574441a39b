//! Error types for healthbinder.
//!
//! This module defines all error types used throughout the healthbinder crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for healthbinder operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Record Errors ===
    /// A record failed validation.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the validation failure.
        message: String,
    },

    /// A record with the given id does not exist.
    #[error("no {kind} with id {id}")]
    NotFound {
        /// Kind of record that was looked up.
        kind: &'static str,
        /// The id that was requested.
        id: i64,
    },

    // === Vault Errors ===
    /// A passcode is set and the command requires the vault to be unlocked.
    #[error("vault is locked: pass --pin, or remove the passcode with `hbind vault clear`")]
    VaultLocked,

    /// The supplied passcode does not match the stored digest.
    #[error("incorrect passcode")]
    PinMismatch,

    /// The supplied passcode is too short.
    #[error("passcode must be at least {min} characters")]
    PinTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    // === Import/Export Errors ===
    /// CSV processing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV row could not be imported.
    #[error("CSV import failed at line {line}: {message}")]
    CsvImport {
        /// 1-based line number of the offending row.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// An import file had an unsupported format.
    #[error("unsupported import format for {path}: expected .csv or .json")]
    UnsupportedImport {
        /// Path of the offending file.
        path: PathBuf,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a file that should be attached.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that couldn't be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for healthbinder operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new invalid-record error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create a new CSV import error for a specific line.
    #[must_use]
    pub fn csv_import(line: usize, message: impl Into<String>) -> Self {
        Self::CsvImport {
            line,
            message: message.into(),
        }
    }

    /// Check if this error means the vault refused access.
    #[must_use]
    pub fn is_vault_error(&self) -> bool {
        matches!(self, Self::VaultLocked | Self::PinMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PinMismatch;
        assert_eq!(err.to_string(), "incorrect passcode");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_is_vault_error() {
        assert!(Error::VaultLocked.is_vault_error());
        assert!(Error::PinMismatch.is_vault_error());
        assert!(!Error::internal("test").is_vault_error());
    }

    #[test]
    fn test_pin_too_short_display() {
        let err = Error::PinTooShort { min: 4 };
        assert!(err.to_string().contains("at least 4"));
    }

    #[test]
    fn test_invalid_record_display() {
        let err = Error::invalid_record("energy must be between 1 and 10");
        assert!(err.to_string().contains("energy must be between 1 and 10"));
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            kind: "medication",
            id: 7,
        };
        assert_eq!(err.to_string(), "no medication with id 7");
    }

    #[test]
    fn test_csv_import_display() {
        let err = Error::csv_import(3, "missing timestamp column");
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("missing timestamp column"));
    }

    #[test]
    fn test_unsupported_import_display() {
        let err = Error::UnsupportedImport {
            path: PathBuf::from("metrics.xls"),
        };
        assert!(err.to_string().contains("metrics.xls"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "interval_hours must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("interval_hours"));
    }
}
