//! Terminal chart rendering.
//!
//! Two views: an energy sparkline over recent check-ins, and a weekly
//! workout chart that buckets sessions into ISO weeks with step and calorie
//! totals. Bars are scaled against floored maxima so sparse data does not
//! render as full-height bars.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::record::{local_day, CheckIn, Workout, MAX_ENERGY};

/// Number of check-ins shown in the energy chart.
pub const ENERGY_CHART_POINTS: usize = 30;

/// Number of weeks shown in the weekly chart.
pub const WEEKLY_CHART_WEEKS: usize = 12;

/// Lowest maximum used when scaling the sessions bar.
const MIN_SESSIONS_SCALE: u32 = 3;

/// Lowest maximum used when scaling the steps bar.
const MIN_STEPS_SCALE: u64 = 5000;

/// Lowest maximum used when scaling the calories bar.
const MIN_CALORIES_SCALE: u64 = 500;

/// Width of a full weekly bar, in characters.
const BAR_WIDTH: usize = 20;

/// Eight-level block characters for sparklines, lowest to highest.
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Aggregated workout totals for one ISO week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    /// ISO week key, e.g. "2026-W35".
    pub key: String,
    /// Workout entries with at least one type flag set.
    pub sessions: u32,
    /// Total steps recorded that week.
    pub steps: u64,
    /// Total calories recorded that week.
    pub calories: u64,
}

/// Bucket workouts into ISO weeks, oldest first, keeping the most recent
/// `max_weeks` buckets. Weeks without any workout entry produce no bucket.
#[must_use]
pub fn weekly_buckets(workouts: &[Workout], max_weeks: usize) -> Vec<WeekBucket> {
    let mut map: BTreeMap<(i32, u32), WeekBucket> = BTreeMap::new();

    for workout in workouts {
        let day = local_day(workout.timestamp);
        let iso = day.iso_week();
        let bucket = map.entry((iso.year(), iso.week())).or_insert_with(|| WeekBucket {
            key: format!("{}-W{:02}", iso.year(), iso.week()),
            sessions: 0,
            steps: 0,
            calories: 0,
        });

        if workout.any_session() {
            bucket.sessions += 1;
        }
        bucket.steps += u64::from(workout.steps.unwrap_or(0));
        bucket.calories += u64::from(workout.calories.unwrap_or(0));
    }

    let mut buckets: Vec<WeekBucket> = map.into_values().collect();
    if buckets.len() > max_weeks {
        buckets.drain(..buckets.len() - max_weeks);
    }
    buckets
}

/// Render recent check-in energy as a sparkline, oldest to newest.
///
/// Takes up to `points` of the most recent check-ins (input is expected
/// newest first, as the storage layer returns it). Energy is clamped to the
/// chartable range before scaling.
#[must_use]
pub fn render_energy(checkins: &[CheckIn], points: usize) -> String {
    if checkins.is_empty() {
        return "No check-ins recorded yet.".to_string();
    }

    let recent: Vec<&CheckIn> = checkins.iter().take(points).collect();
    let spark: String = recent
        .iter()
        .rev()
        .map(|c| spark_char(c.energy.min(MAX_ENERGY)))
        .collect();

    let shown = recent.len();
    format!("Energy, last {shown} check-ins (oldest → newest, scale 1–{MAX_ENERGY})\n{spark}")
}

/// Pick the sparkline character for an energy value in 0..=10.
fn spark_char(energy: u8) -> char {
    if energy == 0 {
        return SPARK_LEVELS[0];
    }
    // Map 1..=10 onto the eight levels
    let idx = (usize::from(energy) - 1) * (SPARK_LEVELS.len() - 1) / usize::from(MAX_ENERGY - 1);
    SPARK_LEVELS[idx]
}

/// Render the weekly workout chart.
///
/// One row per ISO week: a sessions bar plus step and calorie totals.
#[must_use]
pub fn render_weekly(buckets: &[WeekBucket]) -> String {
    if buckets.is_empty() {
        return "No workouts recorded yet.".to_string();
    }

    let max_sessions = buckets
        .iter()
        .map(|b| b.sessions)
        .max()
        .unwrap_or(0)
        .max(MIN_SESSIONS_SCALE);
    let max_steps = buckets
        .iter()
        .map(|b| b.steps)
        .max()
        .unwrap_or(0)
        .max(MIN_STEPS_SCALE);
    let max_calories = buckets
        .iter()
        .map(|b| b.calories)
        .max()
        .unwrap_or(0)
        .max(MIN_CALORIES_SCALE);

    let mut out = String::from("Week      Sessions              Steps                 Calories\n");
    for bucket in buckets {
        let sessions_bar = bar(u64::from(bucket.sessions), u64::from(max_sessions));
        let steps_bar = bar(bucket.steps, max_steps);
        let calories_bar = bar(bucket.calories, max_calories);
        out.push_str(&format!(
            "{:9} {} {:2}  {} {:6}  {} {:5}\n",
            bucket.key,
            sessions_bar,
            bucket.sessions,
            steps_bar,
            bucket.steps,
            calories_bar,
            bucket.calories,
        ));
    }
    out.push_str("(bars scaled per column; floors: 3 sessions, 5000 steps, 500 kcal)");
    out
}

/// Render a value as a fixed-width bar of filled and empty cells.
fn bar(value: u64, max: u64) -> String {
    let max = max.max(1);
    let filled = usize::try_from(value * BAR_WIDTH as u64 / max)
        .unwrap_or(BAR_WIDTH)
        .min(BAR_WIDTH);
    let mut s = String::with_capacity(BAR_WIDTH * 3);
    for _ in 0..filled {
        s.push('█');
    }
    for _ in filled..BAR_WIDTH {
        s.push('░');
    }
    s
}
