//! CSV and JSON import/export.
//!
//! Check-ins and workouts import from JSON with replace semantics (the file
//! becomes the new history); metric imports append. CSV columns are located
//! by header name so column order does not matter, and legacy exports with
//! epoch-millisecond timestamps still load.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::record::{CheckIn, Metric, Workout};
use crate::storage::Storage;

/// CSV header for check-in exports.
pub const CHECKIN_HEADERS: [&str; 5] = ["timestamp", "energy", "exercise", "symptoms", "notes"];

/// CSV header for workout exports.
pub const WORKOUT_HEADERS: [&str; 8] = [
    "timestamp",
    "betterme",
    "strength",
    "mobility",
    "cardio",
    "steps",
    "calories",
    "notes",
];

/// CSV header for metric exports and the import template.
pub const METRIC_HEADERS: [&str; 7] = [
    "timestamp",
    "weight",
    "resting_hr",
    "spo2",
    "hrv",
    "bp",
    "sleep_minutes",
];

/// Render a boolean flag the way the CSV surface spells it.
fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Format an optional value, empty string for `None`.
fn fmt_opt<T: Display>(value: Option<&T>) -> String {
    value.map_or_else(String::new, ToString::to_string)
}

/// Parse an optional cell: empty means absent, unparseable is dropped with a
/// warning rather than failing the whole import.
fn parse_opt<T: FromStr>(value: &str, column: &str, line: usize) -> Option<T> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Line {}: unparseable {} value '{}', skipped", line, column, value);
            None
        }
    }
}

/// Parse a timestamp cell: RFC 3339 first, then epoch milliseconds.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let millis: i64 = value.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

// === Check-ins ===

/// Export all check-ins as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if a database operation or the write fails.
pub fn export_checkins_json(storage: &Storage, output: &Path) -> Result<usize> {
    let checkins = storage.checkins(usize::MAX)?;
    let json = serde_json::to_string_pretty(&checkins)?;
    std::fs::write(output, json)?;
    info!("Exported {} check-ins to {}", checkins.len(), output.display());
    Ok(checkins.len())
}

/// Export all check-ins as CSV.
///
/// # Errors
///
/// Returns an error if a database operation or the write fails.
pub fn export_checkins_csv(storage: &Storage, output: &Path) -> Result<usize> {
    let checkins = storage.checkins(usize::MAX)?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(CHECKIN_HEADERS)?;
    for c in &checkins {
        writer.write_record([
            c.timestamp.to_rfc3339(),
            c.energy.to_string(),
            yes_no(c.exercise).to_string(),
            c.symptoms.clone().unwrap_or_default(),
            c.notes.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    info!("Exported {} check-ins to {}", checkins.len(), output.display());
    Ok(checkins.len())
}

/// Import check-ins from a JSON array, replacing the stored history.
///
/// # Errors
///
/// Returns an error if the file is unreadable, not a JSON array of
/// check-ins, or a database operation fails.
pub fn import_checkins_json(storage: &Storage, input: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(input)?;
    let checkins: Vec<CheckIn> = serde_json::from_str(&text)?;
    storage.replace_checkins(&checkins)
}

// === Workouts ===

/// Export all workouts as CSV.
///
/// # Errors
///
/// Returns an error if a database operation or the write fails.
pub fn export_workouts_csv(storage: &Storage, output: &Path) -> Result<usize> {
    let workouts = storage.workouts(usize::MAX)?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(WORKOUT_HEADERS)?;
    for w in &workouts {
        writer.write_record([
            w.timestamp.to_rfc3339(),
            yes_no(w.betterme).to_string(),
            yes_no(w.strength).to_string(),
            yes_no(w.mobility).to_string(),
            yes_no(w.cardio).to_string(),
            fmt_opt(w.steps.as_ref()),
            fmt_opt(w.calories.as_ref()),
            w.notes.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    info!("Exported {} workouts to {}", workouts.len(), output.display());
    Ok(workouts.len())
}

/// Import workouts from a JSON array, replacing the stored history.
///
/// # Errors
///
/// Returns an error if the file is unreadable, not a JSON array of
/// workouts, or a database operation fails.
pub fn import_workouts_json(storage: &Storage, input: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(input)?;
    let workouts: Vec<Workout> = serde_json::from_str(&text)?;
    storage.replace_workouts(&workouts)
}

// === Metrics ===

/// Export all metric entries as CSV.
///
/// # Errors
///
/// Returns an error if a database operation or the write fails.
pub fn export_metrics_csv(storage: &Storage, output: &Path) -> Result<usize> {
    let metrics = storage.metrics(usize::MAX)?;

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(METRIC_HEADERS)?;
    for m in &metrics {
        writer.write_record([
            m.timestamp.to_rfc3339(),
            fmt_opt(m.weight.as_ref()),
            fmt_opt(m.resting_hr.as_ref()),
            fmt_opt(m.spo2.as_ref()),
            fmt_opt(m.hrv.as_ref()),
            m.bp.clone().unwrap_or_default(),
            fmt_opt(m.sleep_minutes.as_ref()),
        ])?;
    }
    writer.flush()?;

    info!("Exported {} metrics to {}", metrics.len(), output.display());
    Ok(metrics.len())
}

/// Write a header-only CSV template for metric imports.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write_metrics_template(output: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(METRIC_HEADERS)?;
    writer.flush()?;
    Ok(())
}

/// Import metric entries from a CSV or JSON file, chosen by extension.
///
/// Imported entries are added to the stored history.
///
/// # Errors
///
/// Returns [`Error::UnsupportedImport`] for other extensions, or an error if
/// parsing or a database operation fails.
pub fn import_metrics(storage: &Storage, input: &Path) -> Result<usize> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => import_metrics_json(storage, input),
        Some("csv") => import_metrics_csv(storage, input),
        _ => Err(Error::UnsupportedImport {
            path: input.to_path_buf(),
        }),
    }
}

/// Import metric entries from a JSON array.
///
/// Accepts the aliases `ts`, `rhr` and `sleep`; entries without a timestamp
/// default to now.
///
/// # Errors
///
/// Returns an error if the file is unreadable, not a JSON array of metrics,
/// or a database operation fails.
pub fn import_metrics_json(storage: &Storage, input: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(input)?;
    let metrics: Vec<Metric> = serde_json::from_str(&text)?;

    let mut imported = 0;
    for metric in &metrics {
        if metric.is_empty() {
            warn!("Skipping metric entry with no measurements");
            continue;
        }
        storage.insert_metric(metric)?;
        imported += 1;
    }

    info!("Imported {} metrics from {}", imported, input.display());
    Ok(imported)
}

/// Import metric entries from CSV.
///
/// Columns are located by header name; `rhr` and `sleep` are accepted as
/// aliases. Rows whose every measurement cell is empty are skipped.
///
/// # Errors
///
/// Returns [`Error::CsvImport`] if no recognized columns are present, or an
/// error if reading or a database operation fails.
pub fn import_metrics_csv(storage: &Storage, input: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(input)?;

    let headers = reader.headers()?.clone();
    let col = |names: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| names.contains(&h.trim().to_ascii_lowercase().as_str()))
    };

    let i_ts = col(&["timestamp", "ts"]);
    let i_weight = col(&["weight"]);
    let i_rhr = col(&["resting_hr", "rhr"]);
    let i_spo2 = col(&["spo2"]);
    let i_hrv = col(&["hrv"]);
    let i_bp = col(&["bp"]);
    let i_sleep = col(&["sleep_minutes", "sleep"]);

    if [i_weight, i_rhr, i_spo2, i_hrv, i_bp, i_sleep]
        .iter()
        .all(Option::is_none)
    {
        return Err(Error::csv_import(1, "no recognized measurement columns"));
    }

    let cell = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string()
    };

    let mut imported = 0;
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = row + 2; // 1-based, after the header

        let timestamp = i_ts
            .and_then(|i| record.get(i))
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        let metric = Metric {
            id: None,
            timestamp,
            weight: parse_opt(&cell(&record, i_weight), "weight", line),
            resting_hr: parse_opt(&cell(&record, i_rhr), "resting_hr", line),
            spo2: parse_opt(&cell(&record, i_spo2), "spo2", line),
            hrv: parse_opt(&cell(&record, i_hrv), "hrv", line),
            bp: {
                let bp = cell(&record, i_bp).trim().to_string();
                if bp.is_empty() {
                    None
                } else {
                    Some(bp)
                }
            },
            sleep_minutes: parse_opt(&cell(&record, i_sleep), "sleep_minutes", line),
        };

        if metric.is_empty() {
            warn!("Line {}: no measurements, row skipped", line);
            continue;
        }
        storage.insert_metric(&metric)?;
        imported += 1;
    }

    info!("Imported {} metrics from {}", imported, input.display());
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hbind_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T08:00:00Z").is_some());
        // Epoch milliseconds (legacy exports)
        let dt = parse_timestamp("1709280000000").unwrap();
        assert_eq!(dt.timestamp_millis(), 1_709_280_000_000);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_checkin_csv_round_numbers() {
        let storage = test_storage();
        storage
            .insert_checkin(
                &CheckIn::new(7, true, Some("headache, mild".to_string()), None).unwrap(),
            )
            .unwrap();

        let path = temp_file("checkins.csv");
        let count = export_checkins_csv(&storage, &path).unwrap();
        assert_eq!(count, 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("timestamp,energy,exercise,symptoms,notes"));
        // The comma inside the symptom field must survive via quoting
        assert!(text.contains("\"headache, mild\""));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_checkin_json_round_trip() {
        let storage = test_storage();
        storage
            .insert_checkin(&CheckIn::new(6, false, None, None).unwrap())
            .unwrap();
        storage
            .insert_checkin(&CheckIn::new(9, true, None, None).unwrap())
            .unwrap();

        let path = temp_file("checkins.json");
        export_checkins_json(&storage, &path).unwrap();

        // Import into a fresh store: replace semantics
        let fresh = test_storage();
        fresh
            .insert_checkin(&CheckIn::new(1, false, None, None).unwrap())
            .unwrap();
        let imported = import_checkins_json(&fresh, &path).unwrap();
        assert_eq!(imported, 2);

        let checkins = fresh.checkins(10).unwrap();
        assert_eq!(checkins.len(), 2);
        assert!(checkins.iter().all(|c| c.energy != 1));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_checkins_invalid_json() {
        let storage = test_storage();
        let path = temp_file("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(import_checkins_json(&storage, &path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_workout_csv_export_flags() {
        let storage = test_storage();
        storage
            .insert_workout(&Workout::new(
                true,
                false,
                true,
                false,
                Some(8000),
                None,
                None,
            ))
            .unwrap();

        let path = temp_file("workouts.csv");
        export_workouts_csv(&storage, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.contains("yes,no,yes,no,8000,,"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_workout_json_import_replaces() {
        let storage = test_storage();
        storage
            .insert_workout(&Workout::new(false, true, false, false, None, None, None))
            .unwrap();

        let path = temp_file("workouts.json");
        std::fs::write(
            &path,
            r#"[{"ts":"2024-03-01T08:00:00Z","betterme":true,"cal":250}]"#,
        )
        .unwrap();

        let imported = import_workouts_json(&storage, &path).unwrap();
        assert_eq!(imported, 1);

        let workouts = storage.workouts(10).unwrap();
        assert_eq!(workouts.len(), 1);
        assert!(workouts[0].betterme);
        assert_eq!(workouts[0].calories, Some(250));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_metrics_template() {
        let path = temp_file("template.csv");
        write_metrics_template(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.trim(),
            "timestamp,weight,resting_hr,spo2,hrv,bp,sleep_minutes"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_metrics_csv_with_aliases() {
        let storage = test_storage();
        let path = temp_file("metrics_alias.csv");
        std::fs::write(
            &path,
            "timestamp,rhr,sleep\n2024-03-01T08:00:00Z,62,430\n1709280000000,,400\n",
        )
        .unwrap();

        let imported = import_metrics_csv(&storage, &path).unwrap();
        assert_eq!(imported, 2);

        let metrics = storage.metrics(10).unwrap();
        assert!(metrics.iter().any(|m| m.resting_hr == Some(62)));
        assert!(metrics.iter().any(|m| m.sleep_minutes == Some(400)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_metrics_json_epoch_ms_timestamps() {
        let storage = test_storage();
        let path = temp_file("metrics_legacy.json");
        // Older exports wrote `ts` as epoch milliseconds
        std::fs::write(&path, r#"[{"ts": 1709280000000, "rhr": 62}]"#).unwrap();

        let imported = import_metrics(&storage, &path).unwrap();
        assert_eq!(imported, 1);

        let metrics = storage.metrics(10).unwrap();
        assert_eq!(metrics[0].resting_hr, Some(62));
        assert_eq!(metrics[0].timestamp.timestamp_millis(), 1_709_280_000_000);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_metrics_csv_skips_empty_rows() {
        let storage = test_storage();
        let path = temp_file("metrics_empty.csv");
        std::fs::write(
            &path,
            "timestamp,weight,resting_hr,spo2,hrv,bp,sleep_minutes\n2024-03-01T08:00:00Z,,,,,,\n2024-03-02T08:00:00Z,81.2,,,,,\n",
        )
        .unwrap();

        let imported = import_metrics_csv(&storage, &path).unwrap();
        assert_eq!(imported, 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_metrics_csv_unrecognized_headers() {
        let storage = test_storage();
        let path = temp_file("metrics_bad_header.csv");
        std::fs::write(&path, "foo,bar\n1,2\n").unwrap();

        let result = import_metrics_csv(&storage, &path);
        assert!(matches!(result, Err(Error::CsvImport { line: 1, .. })));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_metrics_dispatch_by_extension() {
        let storage = test_storage();

        let json_path = temp_file("metrics.json");
        std::fs::write(&json_path, r#"[{"rhr": 58}]"#).unwrap();
        assert_eq!(import_metrics(&storage, &json_path).unwrap(), 1);

        let bad_path = temp_file("metrics.xls");
        std::fs::write(&bad_path, "").unwrap();
        assert!(matches!(
            import_metrics(&storage, &bad_path),
            Err(Error::UnsupportedImport { .. })
        ));

        let _ = std::fs::remove_file(&json_path);
        let _ = std::fs::remove_file(&bad_path);
    }

    #[test]
    fn test_import_metrics_appends() {
        let storage = test_storage();
        storage
            .insert_metric(&Metric::new(Some(80.0), None, None, None, None, None).unwrap())
            .unwrap();

        let path = temp_file("metrics_append.json");
        std::fs::write(&path, r#"[{"weight": 79.5}]"#).unwrap();
        import_metrics(&storage, &path).unwrap();

        assert_eq!(storage.metrics(10).unwrap().len(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_metrics_csv_round_trip() {
        let storage = test_storage();
        storage
            .insert_metric(
                &Metric::new(
                    Some(81.0),
                    Some(60),
                    Some(97.5),
                    Some(44.0),
                    Some("118/76".to_string()),
                    Some(445),
                )
                .unwrap(),
            )
            .unwrap();

        let path = temp_file("metrics_rt.csv");
        export_metrics_csv(&storage, &path).unwrap();

        let fresh = test_storage();
        let imported = import_metrics_csv(&fresh, &path).unwrap();
        assert_eq!(imported, 1);

        let metrics = fresh.metrics(10).unwrap();
        assert_eq!(metrics[0].resting_hr, Some(60));
        assert_eq!(metrics[0].bp.as_deref(), Some("118/76"));
        assert_eq!(metrics[0].sleep_minutes, Some(445));
        let _ = std::fs::remove_file(&path);
    }
}
