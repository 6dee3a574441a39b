//! Core record types for healthbinder.
//!
//! This module defines the fundamental data structures for the health
//! journal: daily check-ins, workouts, vitals metrics, and medications.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest accepted energy rating.
pub const MIN_ENERGY: u8 = 1;

/// Highest accepted energy rating.
pub const MAX_ENERGY: u8 = 10;

/// The local calendar day a timestamp falls on.
///
/// Day-keyed state (medication ticks, streaks) uses the local timezone, so a
/// workout logged at 23:50 counts for the day it was actually performed.
#[must_use]
pub fn local_day(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

/// Today's local calendar day.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Deserialize a timestamp from an RFC 3339 string or epoch milliseconds.
///
/// Older exports wrote timestamps as epoch milliseconds; current ones write
/// RFC 3339. Imports must load both.
fn flexible_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Rfc3339(String),
        EpochMillis(i64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Rfc3339(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom),
        Raw::EpochMillis(millis) => Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {millis}"))),
    }
}

/// A daily check-in: energy level, exercise flag, symptoms, and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,

    /// When the check-in was recorded.
    #[serde(alias = "ts", deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Energy rating from 1 (exhausted) to 10 (great).
    pub energy: u8,

    /// Whether any exercise was done that day.
    #[serde(default)]
    pub exercise: bool,

    /// Free-text symptoms.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub symptoms: Option<String>,

    /// Free-text notes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}

impl CheckIn {
    /// Create a new check-in timestamped now.
    ///
    /// # Errors
    ///
    /// Returns an error if `energy` is outside 1..=10.
    pub fn new(
        energy: u8,
        exercise: bool,
        symptoms: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        if !(MIN_ENERGY..=MAX_ENERGY).contains(&energy) {
            return Err(Error::invalid_record(format!(
                "energy must be between {MIN_ENERGY} and {MAX_ENERGY}, got {energy}"
            )));
        }
        Ok(Self {
            id: None,
            timestamp: Utc::now(),
            energy,
            exercise,
            symptoms,
            notes,
        })
    }
}

/// A workout session with type flags and optional activity totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,

    /// When the workout was recorded.
    #[serde(alias = "ts", deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// BetterMe program session (drives the streak).
    #[serde(default)]
    pub betterme: bool,

    /// Strength training.
    #[serde(default)]
    pub strength: bool,

    /// Mobility work.
    #[serde(default)]
    pub mobility: bool,

    /// Cardio session.
    #[serde(default)]
    pub cardio: bool,

    /// Step count for the session, if tracked.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub steps: Option<u32>,

    /// Calories burned, if tracked.
    #[serde(skip_serializing_if = "Option::is_none", default, alias = "cal")]
    pub calories: Option<u32>,

    /// Free-text notes.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
}

impl Workout {
    /// Create a new workout timestamped now.
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn new(
        betterme: bool,
        strength: bool,
        mobility: bool,
        cardio: bool,
        steps: Option<u32>,
        calories: Option<u32>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            betterme,
            strength,
            mobility,
            cardio,
            steps,
            calories,
            notes,
        }
    }

    /// Whether any workout type flag is set.
    #[must_use]
    pub fn any_session(&self) -> bool {
        self.betterme || self.strength || self.mobility || self.cardio
    }
}

/// A vitals/sleep measurement entry.
///
/// All measurement fields are optional so partial entries (say, just a
/// morning weight) can be recorded, but an entry must carry at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,

    /// When the measurement was taken. Imports without one default to now.
    #[serde(alias = "ts", default = "Utc::now", deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Body weight in kilograms.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight: Option<f64>,

    /// Resting heart rate in bpm.
    #[serde(skip_serializing_if = "Option::is_none", default, alias = "rhr")]
    pub resting_hr: Option<u32>,

    /// Blood oxygen saturation in percent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub spo2: Option<f64>,

    /// Heart rate variability in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hrv: Option<f64>,

    /// Blood pressure reading, e.g. "120/80".
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bp: Option<String>,

    /// Sleep duration in minutes.
    #[serde(skip_serializing_if = "Option::is_none", default, alias = "sleep")]
    pub sleep_minutes: Option<u32>,
}

impl Metric {
    /// Create a new metric entry timestamped now.
    ///
    /// # Errors
    ///
    /// Returns an error if every measurement field is `None`.
    pub fn new(
        weight: Option<f64>,
        resting_hr: Option<u32>,
        spo2: Option<f64>,
        hrv: Option<f64>,
        bp: Option<String>,
        sleep_minutes: Option<u32>,
    ) -> Result<Self> {
        let metric = Self {
            id: None,
            timestamp: Utc::now(),
            weight,
            resting_hr,
            spo2,
            hrv,
            bp,
            sleep_minutes,
        };
        if metric.is_empty() {
            return Err(Error::invalid_record(
                "a metric entry needs at least one measurement",
            ));
        }
        Ok(metric)
    }

    /// Whether every measurement field is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.resting_hr.is_none()
            && self.spo2.is_none()
            && self.hrv.is_none()
            && self.bp.is_none()
            && self.sleep_minutes.is_none()
    }
}

/// A medication on the daily schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    /// Unique identifier (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,

    /// Medication name.
    pub name: String,

    /// Dose description, e.g. "200mg".
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dose: Option<String>,
}

impl Medication {
    /// Create a new medication.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty after trimming.
    pub fn new(name: impl Into<String>, dose: Option<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(Error::invalid_record("medication name must not be empty"));
        }
        Ok(Self {
            id: None,
            name,
            dose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkin_new_valid() {
        let checkin = CheckIn::new(7, true, Some("tired".to_string()), None).unwrap();
        assert!(checkin.id.is_none());
        assert_eq!(checkin.energy, 7);
        assert!(checkin.exercise);
        assert_eq!(checkin.symptoms.as_deref(), Some("tired"));
    }

    #[test]
    fn test_checkin_energy_bounds() {
        assert!(CheckIn::new(0, false, None, None).is_err());
        assert!(CheckIn::new(11, false, None, None).is_err());
        assert!(CheckIn::new(1, false, None, None).is_ok());
        assert!(CheckIn::new(10, false, None, None).is_ok());
    }

    #[test]
    fn test_checkin_json_accepts_ts_alias() {
        let json = r#"{"ts":"2024-03-01T08:00:00Z","energy":5}"#;
        let checkin: CheckIn = serde_json::from_str(json).unwrap();
        assert_eq!(checkin.energy, 5);
        assert!(!checkin.exercise);
    }

    #[test]
    fn test_workout_any_session() {
        let none = Workout::new(false, false, false, false, None, None, None);
        assert!(!none.any_session());

        let mobility = Workout::new(false, false, true, false, None, None, None);
        assert!(mobility.any_session());
    }

    #[test]
    fn test_workout_json_accepts_cal_alias() {
        let json = r#"{"ts":"2024-03-01T08:00:00Z","betterme":true,"cal":320}"#;
        let workout: Workout = serde_json::from_str(json).unwrap();
        assert!(workout.betterme);
        assert_eq!(workout.calories, Some(320));
        assert!(workout.steps.is_none());
    }

    #[test]
    fn test_metric_requires_a_value() {
        assert!(Metric::new(None, None, None, None, None, None).is_err());
        assert!(Metric::new(Some(81.5), None, None, None, None, None).is_ok());
    }

    #[test]
    fn test_metric_json_aliases() {
        let json = r#"{"ts":"2024-03-01T08:00:00Z","rhr":62,"sleep":430}"#;
        let metric: Metric = serde_json::from_str(json).unwrap();
        assert_eq!(metric.resting_hr, Some(62));
        assert_eq!(metric.sleep_minutes, Some(430));
        assert!(metric.weight.is_none());
    }

    #[test]
    fn test_timestamps_accept_epoch_millis() {
        // 2024-03-01T08:00:00Z as epoch milliseconds, the pre-RFC 3339
        // export format
        let metric: Metric = serde_json::from_str(r#"{"ts":1709280000000,"rhr":62}"#).unwrap();
        assert_eq!(metric.timestamp.timestamp_millis(), 1_709_280_000_000);
        assert_eq!(metric.resting_hr, Some(62));

        let checkin: CheckIn =
            serde_json::from_str(r#"{"ts":1709280000000,"energy":6}"#).unwrap();
        assert_eq!(checkin.timestamp.timestamp_millis(), 1_709_280_000_000);

        let workout: Workout =
            serde_json::from_str(r#"{"ts":1709280000000,"betterme":true}"#).unwrap();
        assert_eq!(workout.timestamp.timestamp_millis(), 1_709_280_000_000);
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        let result: std::result::Result<Metric, _> =
            serde_json::from_str(r#"{"ts":"yesterday","rhr":62}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_metric_serialization_skips_none() {
        let metric = Metric::new(Some(80.0), None, None, None, None, None).unwrap();
        let json = serde_json::to_string(&metric).unwrap();
        assert!(json.contains("weight"));
        assert!(!json.contains("spo2"));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn test_medication_name_trimmed() {
        let med = Medication::new("  Ibuprofen  ", Some("200mg".to_string())).unwrap();
        assert_eq!(med.name, "Ibuprofen");
    }

    #[test]
    fn test_medication_empty_name() {
        assert!(Medication::new("   ", None).is_err());
    }

    #[test]
    fn test_checkin_serde_round_trip() {
        let checkin = CheckIn::new(4, false, None, Some("slept badly".to_string())).unwrap();
        let json = serde_json::to_string(&checkin).unwrap();
        let back: CheckIn = serde_json::from_str(&json).unwrap();
        assert_eq!(checkin, back);
    }

    #[test]
    fn test_local_day_is_stable_for_same_instant() {
        let now = Utc::now();
        assert_eq!(local_day(now), local_day(now));
    }
}
