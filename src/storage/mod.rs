//! Storage layer for healthbinder.
//!
//! This module provides `SQLite`-based persistent storage for every record
//! kind the journal tracks: check-ins, workouts, vitals metrics, the
//! medication list with its per-day ticks, file attachments, and a small
//! metadata key-value table (schema version, PIN digest, reminder state).

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::attachments::Attachment;
use crate::error::{Error, Result};
use crate::record::{CheckIn, Medication, Metric, Workout};

/// Storage engine for the health journal.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Insertion and listing of check-ins, workouts, and metrics
/// - Wholesale replacement of a record set (JSON import semantics)
/// - The medication list and its per-day taken ticks
/// - Content-hash deduplicated file attachments
/// - Automatic pruning of old history entries
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Check-ins ===

    /// Insert a check-in and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_checkin(&self, checkin: &CheckIn) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO checkins (timestamp, energy, exercise, symptoms, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                checkin.timestamp.to_rfc3339(),
                checkin.energy,
                checkin.exercise,
                checkin.symptoms,
                checkin.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted check-in with id {}", id);
        Ok(id)
    }

    /// Get the most recent check-ins, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn checkins(&self, limit: usize) -> Result<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, energy, exercise, symptoms, notes
            FROM checkins ORDER BY timestamp DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let checkins = stmt
            .query_map([limit_i64], Self::row_to_checkin)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(checkins)
    }

    /// Get check-ins at or after the given instant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn checkins_since(&self, since: DateTime<Utc>) -> Result<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, energy, exercise, symptoms, notes
            FROM checkins WHERE timestamp >= ?1 ORDER BY timestamp DESC
            ",
        )?;

        let checkins = stmt
            .query_map([since.to_rfc3339()], Self::row_to_checkin)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(checkins)
    }

    /// Replace the entire check-in set (JSON import semantics).
    ///
    /// Returns the number of check-ins stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_checkins(&self, checkins: &[CheckIn]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM checkins", [])?;
        for checkin in checkins {
            tx.execute(
                r"
                INSERT INTO checkins (timestamp, energy, exercise, symptoms, notes)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
                params![
                    checkin.timestamp.to_rfc3339(),
                    checkin.energy,
                    checkin.exercise,
                    checkin.symptoms,
                    checkin.notes,
                ],
            )?;
        }
        tx.commit()?;

        info!("Replaced check-in history with {} entries", checkins.len());
        Ok(checkins.len())
    }

    // === Workouts ===

    /// Insert a workout and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_workout(&self, workout: &Workout) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO workouts (timestamp, betterme, strength, mobility, cardio, steps, calories, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                workout.timestamp.to_rfc3339(),
                workout.betterme,
                workout.strength,
                workout.mobility,
                workout.cardio,
                workout.steps,
                workout.calories,
                workout.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted workout with id {}", id);
        Ok(id)
    }

    /// Get the most recent workouts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn workouts(&self, limit: usize) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, betterme, strength, mobility, cardio, steps, calories, notes
            FROM workouts ORDER BY timestamp DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let workouts = stmt
            .query_map([limit_i64], Self::row_to_workout)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(workouts)
    }

    /// Get workouts at or after the given instant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn workouts_since(&self, since: DateTime<Utc>) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, betterme, strength, mobility, cardio, steps, calories, notes
            FROM workouts WHERE timestamp >= ?1 ORDER BY timestamp DESC
            ",
        )?;

        let workouts = stmt
            .query_map([since.to_rfc3339()], Self::row_to_workout)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(workouts)
    }

    /// Replace the entire workout set (JSON import semantics).
    ///
    /// Returns the number of workouts stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace_workouts(&self, workouts: &[Workout]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM workouts", [])?;
        for workout in workouts {
            tx.execute(
                r"
                INSERT INTO workouts (timestamp, betterme, strength, mobility, cardio, steps, calories, notes)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
                params![
                    workout.timestamp.to_rfc3339(),
                    workout.betterme,
                    workout.strength,
                    workout.mobility,
                    workout.cardio,
                    workout.steps,
                    workout.calories,
                    workout.notes,
                ],
            )?;
        }
        tx.commit()?;

        info!("Replaced workout history with {} entries", workouts.len());
        Ok(workouts.len())
    }

    /// Delete all workouts.
    ///
    /// Returns the number of workouts deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_workouts(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM workouts", [])?;
        if affected > 0 {
            info!("Cleared {} workouts", affected);
        }
        Ok(affected)
    }

    // === Metrics ===

    /// Insert a metric entry and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_metric(&self, metric: &Metric) -> Result<i64> {
        self.conn.execute(
            r"
            INSERT INTO metrics (timestamp, weight, resting_hr, spo2, hrv, bp, sleep_minutes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                metric.timestamp.to_rfc3339(),
                metric.weight,
                metric.resting_hr,
                metric.spo2,
                metric.hrv,
                metric.bp,
                metric.sleep_minutes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted metric with id {}", id);
        Ok(id)
    }

    /// Get the most recent metric entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn metrics(&self, limit: usize) -> Result<Vec<Metric>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, weight, resting_hr, spo2, hrv, bp, sleep_minutes
            FROM metrics ORDER BY timestamp DESC LIMIT ?1
            ",
        )?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let metrics = stmt
            .query_map([limit_i64], Self::row_to_metric)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(metrics)
    }

    /// Get metric entries at or after the given instant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn metrics_since(&self, since: DateTime<Utc>) -> Result<Vec<Metric>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, timestamp, weight, resting_hr, spo2, hrv, bp, sleep_minutes
            FROM metrics WHERE timestamp >= ?1 ORDER BY timestamp DESC
            ",
        )?;

        let metrics = stmt
            .query_map([since.to_rfc3339()], Self::row_to_metric)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(metrics)
    }

    // === Medications ===

    /// Add a medication to the master list and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_medication(&self, med: &Medication) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO medications (name, dose) VALUES (?1, ?2)",
            params![med.name, med.dose],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get the medication master list in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn medications(&self) -> Result<Vec<Medication>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, dose FROM medications ORDER BY id ASC")?;

        let meds = stmt
            .query_map([], |row| {
                Ok(Medication {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    dose: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(meds)
    }

    /// Remove a medication and any ticks recorded for it.
    ///
    /// Returns `true` if a medication was removed, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_medication(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?1", [id])?;
        self.conn
            .execute("DELETE FROM med_taken WHERE medication_id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Mark a medication taken or not taken on the given local day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the medication does not exist, or an
    /// error if the database operation fails.
    pub fn set_taken(&self, day: NaiveDate, medication_id: i64, taken: bool) -> Result<()> {
        let exists: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM medications WHERE id = ?1",
            [medication_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(Error::NotFound {
                kind: "medication",
                id: medication_id,
            });
        }

        if taken {
            self.conn.execute(
                "INSERT OR IGNORE INTO med_taken (day, medication_id) VALUES (?1, ?2)",
                params![day.to_string(), medication_id],
            )?;
        } else {
            self.conn.execute(
                "DELETE FROM med_taken WHERE day = ?1 AND medication_id = ?2",
                params![day.to_string(), medication_id],
            )?;
        }
        Ok(())
    }

    /// Get the ids of medications marked taken on the given local day.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn taken_on(&self, day: NaiveDate) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT medication_id FROM med_taken WHERE day = ?1 ORDER BY medication_id")?;

        let ids = stmt
            .query_map([day.to_string()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    // === Attachments ===

    /// Insert an attachment with the given file contents.
    ///
    /// Returns the assigned id, or `None` if an attachment with identical
    /// content already exists (deduplicated by content hash).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_attachment(&self, attachment: &Attachment, data: &[u8]) -> Result<Option<i64>> {
        let exists: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM attachments WHERE content_hash = ?1",
            [&attachment.content_hash],
            |row| row.get(0),
        )?;
        if exists > 0 {
            debug!(
                "Skipping duplicate attachment with hash {}",
                &attachment.content_hash[..16]
            );
            return Ok(None);
        }

        self.conn.execute(
            r"
            INSERT INTO attachments (name, kind, content_hash, data, added_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                attachment.name,
                attachment.kind,
                attachment.content_hash,
                data,
                attachment.added_at.to_rfc3339(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted attachment with id {}", id);
        Ok(Some(id))
    }

    /// List attachment metadata (without file contents), newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn attachments(&self) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, name, kind, content_hash, added_at, length(data)
            FROM attachments ORDER BY added_at DESC
            ",
        )?;

        let attachments = stmt
            .query_map([], Self::row_to_attachment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(attachments)
    }

    /// Get an attachment's metadata and contents by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn attachment_data(&self, id: i64) -> Result<Option<(Attachment, Vec<u8>)>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, name, kind, content_hash, added_at, length(data), data
                FROM attachments WHERE id = ?1
                ",
                [id],
                |row| {
                    let meta = Self::row_to_attachment(row)?;
                    let data: Vec<u8> = row.get(6)?;
                    Ok((meta, data))
                },
            )
            .optional()?;
        Ok(result)
    }

    // === Metadata ===

    /// Get a metadata value by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a metadata value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a metadata value.
    ///
    /// Returns `true` if a value was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_meta(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM metadata WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    // === Maintenance ===

    /// Prune history entries (check-ins, workouts, metrics) older than the
    /// given duration.
    ///
    /// Returns the total number of entries deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_older_than(&self, max_age: Duration) -> Result<usize> {
        let cutoff = (Utc::now() - max_age).to_rfc3339();

        let mut total = 0;
        for table in ["checkins", "workouts", "metrics"] {
            let affected = self.conn.execute(
                &format!("DELETE FROM {table} WHERE timestamp < ?1"),
                [&cutoff],
            )?;
            total += affected;
        }

        if total > 0 {
            info!("Pruned {} old history entries", total);
        }
        Ok(total)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let count = |table: &str| -> Result<i64> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                        row.get(0)
                    })?;
            Ok(n)
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            checkins: count("checkins")?,
            workouts: count("workouts")?,
            metrics: count("metrics")?,
            medications: count("medications")?,
            attachments: count("attachments")?,
            db_size_bytes,
        })
    }

    // === Row mappers ===

    /// Parse an RFC 3339 timestamp column, defaulting to now on corruption.
    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).map_or_else(
            |_| {
                warn!("Unparseable stored timestamp: {}", value);
                Utc::now()
            },
            |dt| dt.with_timezone(&Utc),
        )
    }

    fn row_to_checkin(row: &rusqlite::Row) -> rusqlite::Result<CheckIn> {
        let timestamp_str: String = row.get(1)?;
        Ok(CheckIn {
            id: Some(row.get(0)?),
            timestamp: Self::parse_timestamp(&timestamp_str),
            energy: row.get(2)?,
            exercise: row.get(3)?,
            symptoms: row.get(4)?,
            notes: row.get(5)?,
        })
    }

    fn row_to_workout(row: &rusqlite::Row) -> rusqlite::Result<Workout> {
        let timestamp_str: String = row.get(1)?;
        Ok(Workout {
            id: Some(row.get(0)?),
            timestamp: Self::parse_timestamp(&timestamp_str),
            betterme: row.get(2)?,
            strength: row.get(3)?,
            mobility: row.get(4)?,
            cardio: row.get(5)?,
            steps: row.get(6)?,
            calories: row.get(7)?,
            notes: row.get(8)?,
        })
    }

    fn row_to_metric(row: &rusqlite::Row) -> rusqlite::Result<Metric> {
        let timestamp_str: String = row.get(1)?;
        Ok(Metric {
            id: Some(row.get(0)?),
            timestamp: Self::parse_timestamp(&timestamp_str),
            weight: row.get(2)?,
            resting_hr: row.get(3)?,
            spo2: row.get(4)?,
            hrv: row.get(5)?,
            bp: row.get(6)?,
            sleep_minutes: row.get(7)?,
        })
    }

    fn row_to_attachment(row: &rusqlite::Row) -> rusqlite::Result<Attachment> {
        let added_at_str: String = row.get(4)?;
        let size: i64 = row.get(5)?;
        Ok(Attachment {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            kind: row.get(2)?,
            content_hash: row.get(3)?,
            added_at: Self::parse_timestamp(&added_at_str),
            size_bytes: u64::try_from(size).unwrap_or(0),
        })
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StorageStats {
    /// Number of check-ins stored.
    pub checkins: i64,
    /// Number of workouts stored.
    pub workouts: i64,
    /// Number of metric entries stored.
    pub metrics: i64,
    /// Number of medications on the master list.
    pub medications: i64,
    /// Number of file attachments stored.
    pub attachments: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::today;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn sample_checkin(energy: u8) -> CheckIn {
        CheckIn::new(energy, false, None, None).unwrap()
    }

    fn sample_workout() -> Workout {
        Workout::new(true, false, false, true, Some(4200), Some(300), None)
    }

    #[test]
    fn test_open_in_memory() {
        assert!(Storage::open_in_memory().is_ok());
    }

    #[test]
    fn test_insert_and_list_checkins() {
        let storage = create_test_storage();
        let id = storage.insert_checkin(&sample_checkin(7)).unwrap();
        assert!(id > 0);

        let checkins = storage.checkins(10).unwrap();
        assert_eq!(checkins.len(), 1);
        assert_eq!(checkins[0].energy, 7);
        assert_eq!(checkins[0].id, Some(id));
    }

    #[test]
    fn test_checkins_limit() {
        let storage = create_test_storage();
        for i in 1..=5 {
            storage.insert_checkin(&sample_checkin(i)).unwrap();
        }
        assert_eq!(storage.checkins(3).unwrap().len(), 3);
        assert_eq!(storage.checkins(0).unwrap().len(), 0);
    }

    #[test]
    fn test_checkins_since() {
        let storage = create_test_storage();
        storage.insert_checkin(&sample_checkin(5)).unwrap();

        let recent = storage
            .checkins_since(Utc::now() - Duration::hours(1))
            .unwrap();
        assert_eq!(recent.len(), 1);

        let none = storage
            .checkins_since(Utc::now() + Duration::hours(1))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_replace_checkins() {
        let storage = create_test_storage();
        storage.insert_checkin(&sample_checkin(5)).unwrap();
        storage.insert_checkin(&sample_checkin(6)).unwrap();

        let replacement = vec![sample_checkin(9)];
        let stored = storage.replace_checkins(&replacement).unwrap();
        assert_eq!(stored, 1);

        let checkins = storage.checkins(10).unwrap();
        assert_eq!(checkins.len(), 1);
        assert_eq!(checkins[0].energy, 9);
    }

    #[test]
    fn test_insert_and_list_workouts() {
        let storage = create_test_storage();
        storage.insert_workout(&sample_workout()).unwrap();

        let workouts = storage.workouts(10).unwrap();
        assert_eq!(workouts.len(), 1);
        assert!(workouts[0].betterme);
        assert_eq!(workouts[0].steps, Some(4200));
        assert_eq!(workouts[0].calories, Some(300));
    }

    #[test]
    fn test_clear_workouts() {
        let storage = create_test_storage();
        storage.insert_workout(&sample_workout()).unwrap();
        storage.insert_workout(&sample_workout()).unwrap();

        assert_eq!(storage.clear_workouts().unwrap(), 2);
        assert!(storage.workouts(10).unwrap().is_empty());
    }

    #[test]
    fn test_replace_workouts() {
        let storage = create_test_storage();
        storage.insert_workout(&sample_workout()).unwrap();

        let replacement = vec![
            Workout::new(false, true, false, false, None, None, None),
            Workout::new(false, false, true, false, None, None, None),
        ];
        assert_eq!(storage.replace_workouts(&replacement).unwrap(), 2);
        assert_eq!(storage.workouts(10).unwrap().len(), 2);
    }

    #[test]
    fn test_insert_and_list_metrics() {
        let storage = create_test_storage();
        let metric = Metric::new(
            Some(81.4),
            Some(62),
            Some(97.0),
            Some(45.0),
            Some("120/80".to_string()),
            Some(430),
        )
        .unwrap();
        storage.insert_metric(&metric).unwrap();

        let metrics = storage.metrics(10).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].resting_hr, Some(62));
        assert_eq!(metrics[0].bp.as_deref(), Some("120/80"));
    }

    #[test]
    fn test_metric_nullable_fields_round_trip() {
        let storage = create_test_storage();
        let metric = Metric::new(None, None, None, None, None, Some(400)).unwrap();
        storage.insert_metric(&metric).unwrap();

        let metrics = storage.metrics(10).unwrap();
        assert!(metrics[0].weight.is_none());
        assert!(metrics[0].bp.is_none());
        assert_eq!(metrics[0].sleep_minutes, Some(400));
    }

    #[test]
    fn test_medication_roundtrip() {
        let storage = create_test_storage();
        let med = Medication::new("Ibuprofen", Some("200mg".to_string())).unwrap();
        let id = storage.add_medication(&med).unwrap();

        let meds = storage.medications().unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].id, Some(id));
        assert_eq!(meds[0].name, "Ibuprofen");
    }

    #[test]
    fn test_remove_medication() {
        let storage = create_test_storage();
        let med = Medication::new("Vitamin D", None).unwrap();
        let id = storage.add_medication(&med).unwrap();
        storage.set_taken(today(), id, true).unwrap();

        assert!(storage.remove_medication(id).unwrap());
        assert!(storage.medications().unwrap().is_empty());
        // Ticks go with the medication
        assert!(storage.taken_on(today()).unwrap().is_empty());
    }

    #[test]
    fn test_remove_medication_nonexistent() {
        let storage = create_test_storage();
        assert!(!storage.remove_medication(99).unwrap());
    }

    #[test]
    fn test_set_taken_and_untick() {
        let storage = create_test_storage();
        let id = storage
            .add_medication(&Medication::new("Zinc", None).unwrap())
            .unwrap();

        storage.set_taken(today(), id, true).unwrap();
        assert_eq!(storage.taken_on(today()).unwrap(), vec![id]);

        // Ticking twice is fine
        storage.set_taken(today(), id, true).unwrap();
        assert_eq!(storage.taken_on(today()).unwrap(), vec![id]);

        storage.set_taken(today(), id, false).unwrap();
        assert!(storage.taken_on(today()).unwrap().is_empty());
    }

    #[test]
    fn test_set_taken_unknown_medication() {
        let storage = create_test_storage();
        let result = storage.set_taken(today(), 42, true);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_ticks_are_per_day() {
        let storage = create_test_storage();
        let id = storage
            .add_medication(&Medication::new("Iron", None).unwrap())
            .unwrap();

        let yesterday = today().pred_opt().unwrap();
        storage.set_taken(yesterday, id, true).unwrap();

        assert!(storage.taken_on(today()).unwrap().is_empty());
        assert_eq!(storage.taken_on(yesterday).unwrap(), vec![id]);
    }

    #[test]
    fn test_attachment_insert_and_dedup() {
        let storage = create_test_storage();
        let data = b"fake pdf bytes";
        let attachment = Attachment::from_bytes("scan.pdf", data);

        let id = storage.insert_attachment(&attachment, data).unwrap();
        assert!(id.is_some());

        // Same content under a different name is still deduplicated
        let again = Attachment::from_bytes("scan-copy.pdf", data);
        assert!(storage.insert_attachment(&again, data).unwrap().is_none());
    }

    #[test]
    fn test_attachment_list_and_fetch() {
        let storage = create_test_storage();
        let data = b"report body";
        let attachment = Attachment::from_bytes("report.txt", data);
        let id = storage
            .insert_attachment(&attachment, data)
            .unwrap()
            .unwrap();

        let listed = storage.attachments().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "report.txt");
        assert_eq!(listed[0].size_bytes, data.len() as u64);

        let (meta, fetched) = storage.attachment_data(id).unwrap().unwrap();
        assert_eq!(meta.name, "report.txt");
        assert_eq!(fetched, data);
    }

    #[test]
    fn test_attachment_fetch_nonexistent() {
        let storage = create_test_storage();
        assert!(storage.attachment_data(123).unwrap().is_none());
    }

    #[test]
    fn test_metadata_roundtrip() {
        let storage = create_test_storage();
        assert!(storage.get_meta("pin_hash").unwrap().is_none());

        storage.set_meta("pin_hash", "abc123").unwrap();
        assert_eq!(storage.get_meta("pin_hash").unwrap().as_deref(), Some("abc123"));

        storage.set_meta("pin_hash", "def456").unwrap();
        assert_eq!(storage.get_meta("pin_hash").unwrap().as_deref(), Some("def456"));

        assert!(storage.delete_meta("pin_hash").unwrap());
        assert!(storage.get_meta("pin_hash").unwrap().is_none());
        assert!(!storage.delete_meta("pin_hash").unwrap());
    }

    #[test]
    fn test_prune_older_than() {
        let storage = create_test_storage();
        storage.insert_checkin(&sample_checkin(5)).unwrap();
        storage.insert_workout(&sample_workout()).unwrap();

        // Everything was just inserted, so a generous window keeps it all
        assert_eq!(storage.prune_older_than(Duration::days(30)).unwrap(), 0);
        assert_eq!(storage.stats().unwrap().checkins, 1);
    }

    #[test]
    fn test_prune_removes_backdated_entries() {
        let storage = create_test_storage();
        let mut old = sample_checkin(3);
        old.timestamp = Utc::now() - Duration::days(120);
        storage.insert_checkin(&old).unwrap();
        storage.insert_checkin(&sample_checkin(8)).unwrap();

        let pruned = storage.prune_older_than(Duration::days(30)).unwrap();
        assert_eq!(pruned, 1);

        let remaining = storage.checkins(10).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].energy, 8);
    }

    #[test]
    fn test_stats() {
        let storage = create_test_storage();
        storage.insert_checkin(&sample_checkin(5)).unwrap();
        storage.insert_workout(&sample_workout()).unwrap();
        storage
            .add_medication(&Medication::new("Zinc", None).unwrap())
            .unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.checkins, 1);
        assert_eq!(stats.workouts, 1);
        assert_eq!(stats.metrics, 0);
        assert_eq!(stats.medications, 1);
        assert_eq!(stats.attachments, 0);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let nested_path = temp_dir.join(format!(
            "healthbinder_test_{}/nested/journal.db",
            std::process::id()
        ));

        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());
        assert_eq!(storage.path(), nested_path);

        drop(storage);
        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent.parent().unwrap());
        }
    }

    #[test]
    fn test_backdated_ordering() {
        let storage = create_test_storage();
        let mut older = sample_checkin(2);
        older.timestamp = Utc::now() - Duration::days(2);
        let newer = sample_checkin(9);

        storage.insert_checkin(&older).unwrap();
        storage.insert_checkin(&newer).unwrap();

        let checkins = storage.checkins(10).unwrap();
        assert_eq!(checkins[0].energy, 9);
        assert_eq!(checkins[1].energy, 2);
    }
}
