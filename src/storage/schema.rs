//! `SQLite` schema definitions for healthbinder.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the check-ins table.
pub const CREATE_CHECKINS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS checkins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    energy INTEGER NOT NULL,
    exercise INTEGER NOT NULL DEFAULT 0,
    symptoms TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the workouts table.
pub const CREATE_WORKOUTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS workouts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    betterme INTEGER NOT NULL DEFAULT 0,
    strength INTEGER NOT NULL DEFAULT 0,
    mobility INTEGER NOT NULL DEFAULT 0,
    cardio INTEGER NOT NULL DEFAULT 0,
    steps INTEGER,
    calories INTEGER,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metrics (vitals/sleep) table.
pub const CREATE_METRICS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    weight REAL,
    resting_hr INTEGER,
    spo2 REAL,
    hrv REAL,
    bp TEXT,
    sleep_minutes INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the medications master list.
pub const CREATE_MEDICATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    dose TEXT
)
";

/// SQL statement to create the per-day medication tick table.
pub const CREATE_MED_TAKEN_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS med_taken (
    day TEXT NOT NULL,
    medication_id INTEGER NOT NULL,
    PRIMARY KEY (day, medication_id)
)
";

/// SQL statement to create the attachments (file binder) table.
pub const CREATE_ATTACHMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS attachments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    data BLOB NOT NULL,
    added_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statement to create an index on check-in timestamps.
pub const CREATE_CHECKINS_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_checkins_timestamp ON checkins(timestamp DESC)
";

/// SQL statement to create an index on workout timestamps.
pub const CREATE_WORKOUTS_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_workouts_timestamp ON workouts(timestamp DESC)
";

/// SQL statement to create an index on metric timestamps.
pub const CREATE_METRICS_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_metrics_timestamp ON metrics(timestamp DESC)
";

/// SQL statement to create an index on attachment hashes for deduplication.
pub const CREATE_ATTACHMENTS_HASH_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_attachments_hash ON attachments(content_hash)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_CHECKINS_TABLE,
    CREATE_WORKOUTS_TABLE,
    CREATE_METRICS_TABLE,
    CREATE_MEDICATIONS_TABLE,
    CREATE_MED_TAKEN_TABLE,
    CREATE_ATTACHMENTS_TABLE,
    CREATE_METADATA_TABLE,
    CREATE_CHECKINS_TIMESTAMP_INDEX,
    CREATE_WORKOUTS_TIMESTAMP_INDEX,
    CREATE_METRICS_TIMESTAMP_INDEX,
    CREATE_ATTACHMENTS_HASH_INDEX,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_checkins_table_contains_required_columns() {
        assert!(CREATE_CHECKINS_TABLE.contains("id INTEGER PRIMARY KEY"));
        assert!(CREATE_CHECKINS_TABLE.contains("timestamp TEXT NOT NULL"));
        assert!(CREATE_CHECKINS_TABLE.contains("energy INTEGER NOT NULL"));
    }

    #[test]
    fn test_create_med_taken_table_keyed_per_day() {
        assert!(CREATE_MED_TAKEN_TABLE.contains("PRIMARY KEY (day, medication_id)"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
