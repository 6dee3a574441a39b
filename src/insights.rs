//! Derived insights over recent journal entries.
//!
//! Aggregates the last 24 hours and 7 days of metrics, check-ins, and
//! workouts into a small set of cards, each with a tone and a short
//! actionable message. Also computes medication adherence for today and the
//! BetterMe workout streak.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::config::GoalsConfig;
use crate::error::Result;
use crate::record::{local_day, today, Workout};
use crate::storage::Storage;

/// How a card should read at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// On track.
    Good,
    /// Worth attention.
    Warn,
    /// Needs action.
    Bad,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Warn => write!(f, "warn"),
            Self::Bad => write!(f, "bad"),
        }
    }
}

/// A single insight card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Card heading, e.g. "Sleep (last 24h)".
    pub title: String,
    /// Headline value, e.g. "430 min", or "—" when no data.
    pub value: String,
    /// Tone of the card.
    pub tone: Tone,
    /// Short supporting message.
    pub message: String,
}

/// Today's medication adherence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adherence {
    /// Medications marked taken today.
    pub taken: usize,
    /// Medications on the schedule (floored at 1 for display).
    pub total: usize,
}

impl Adherence {
    /// Adherence as a whole percentage.
    ///
    /// The denominator is floored at 1 so an empty schedule reads 0%.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u32 {
        let total = self.total.max(1);
        ((self.taken as f64 / total as f64) * 100.0).round() as u32
    }
}

impl std::fmt::Display for Adherence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} ({}%)",
            self.taken,
            self.total.max(1),
            self.percent()
        )
    }
}

/// Compute today's medication adherence.
///
/// Only ticks for medications still on the schedule are counted.
///
/// # Errors
///
/// Returns an error if a database operation fails.
pub fn adherence(storage: &Storage) -> Result<Adherence> {
    let meds = storage.medications()?;
    let scheduled: HashSet<i64> = meds.iter().filter_map(|m| m.id).collect();
    let taken = storage
        .taken_on(today())?
        .into_iter()
        .filter(|id| scheduled.contains(id))
        .count();

    Ok(Adherence {
        taken,
        total: meds.len(),
    })
}

/// Count the BetterMe streak over the given workouts.
///
/// The streak is the number of consecutive local calendar days with a
/// betterme-flagged workout, counted back from today. If today has no
/// session yet, the count starts from yesterday so an unbroken run is not
/// reported as zero mid-day.
#[must_use]
pub fn betterme_streak(workouts: &[Workout]) -> u32 {
    let days: HashSet<NaiveDate> = workouts
        .iter()
        .filter(|w| w.betterme)
        .map(|w| local_day(w.timestamp))
        .collect();

    let count_from = |start: NaiveDate| {
        let mut streak = 0;
        let mut cursor = start;
        while days.contains(&cursor) {
            streak += 1;
            match cursor.pred_opt() {
                Some(prev) => cursor = prev,
                None => break,
            }
        }
        streak
    };

    let streak = count_from(today());
    if streak > 0 {
        return streak;
    }
    match today().pred_opt() {
        Some(yesterday) => count_from(yesterday),
        None => 0,
    }
}

/// Average of the values present in an iterator, `None` when empty.
fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

/// Analyze recent entries and build the insight card set.
///
/// # Errors
///
/// Returns an error if a database operation fails.
#[allow(clippy::too_many_lines)]
pub fn analyze(storage: &Storage, goals: &GoalsConfig) -> Result<Vec<Card>> {
    let now = Utc::now();
    let day_ago = now - Duration::hours(24);
    let week_ago = now - Duration::days(7);

    let metrics_24h = storage.metrics_since(day_ago)?;
    let metrics_7d = storage.metrics_since(week_ago)?;
    let checkins_24h = storage.checkins_since(day_ago)?;
    let workouts_24h = storage.workouts_since(day_ago)?;
    let all_metrics = storage.metrics(usize::MAX)?;

    let sleep_min: u64 = metrics_24h
        .iter()
        .filter_map(|m| m.sleep_minutes)
        .map(u64::from)
        .sum();
    let rhr_avg = average(metrics_7d.iter().filter_map(|m| m.resting_hr).map(f64::from));
    let hrv_avg = average(metrics_7d.iter().filter_map(|m| m.hrv));
    let spo2_min = metrics_7d
        .iter()
        .filter_map(|m| m.spo2)
        .fold(None::<f64>, |acc, v| {
            Some(acc.map_or(v, |min| min.min(v)))
        });
    let weight_latest = all_metrics.iter().find_map(|m| m.weight);
    let energy_avg = average(checkins_24h.iter().map(|c| f64::from(c.energy)));

    let steps_24h: u64 = workouts_24h
        .iter()
        .filter_map(|w| w.steps)
        .map(u64::from)
        .sum();
    let cals_24h: u64 = workouts_24h
        .iter()
        .filter_map(|w| w.calories)
        .map(u64::from)
        .sum();
    let betterme_done = workouts_24h.iter().any(|w| w.betterme);

    let mut cards = Vec::with_capacity(7);

    // Sleep
    cards.push(Card {
        title: "Sleep (last 24h)".to_string(),
        value: if sleep_min > 0 {
            format!("{sleep_min} min")
        } else {
            "—".to_string()
        },
        tone: if sleep_min >= u64::from(goals.sleep_target_minutes) {
            Tone::Good
        } else if sleep_min > 0 {
            Tone::Warn
        } else {
            Tone::Bad
        },
        message: if sleep_min >= u64::from(goals.sleep_target_minutes) {
            "Good sleep duration.".to_string()
        } else {
            format!(
                "Aim for {}+ minutes.",
                goals.sleep_target_minutes
            )
        },
    });

    // Resting HR
    cards.push(Card {
        title: "Resting HR (7d avg)".to_string(),
        value: rhr_avg.map_or_else(|| "—".to_string(), |v| format!("{v:.0} bpm")),
        tone: match rhr_avg {
            Some(v) if v < goals.resting_hr_max => Tone::Good,
            _ => Tone::Warn,
        },
        message: if rhr_avg.is_some() {
            "Lower is generally better (fitness & recovery).".to_string()
        } else {
            "Add resting HR in metrics.".to_string()
        },
    });

    // HRV
    cards.push(Card {
        title: "HRV (7d avg)".to_string(),
        value: hrv_avg.map_or_else(|| "—".to_string(), |v| format!("{v:.0} ms")),
        tone: match hrv_avg {
            Some(v) if v >= goals.hrv_min => Tone::Good,
            _ => Tone::Warn,
        },
        message: if hrv_avg.is_some() {
            "Consistency matters more than absolute value.".to_string()
        } else {
            "Add HRV in metrics.".to_string()
        },
    });

    // SpO₂
    cards.push(Card {
        title: "SpO₂ (7d min)".to_string(),
        value: spo2_min.map_or_else(|| "—".to_string(), |v| format!("{v:.0}%")),
        tone: match spo2_min {
            Some(v) if v >= goals.spo2_min => Tone::Good,
            _ => Tone::Warn,
        },
        message: match spo2_min {
            Some(v) if v < goals.spo2_caution => {
                "Consider checking with a doctor if persistent.".to_string()
            }
            Some(_) => "Looks fine.".to_string(),
            None => "Add SpO₂ in metrics.".to_string(),
        },
    });

    // Weight
    cards.push(Card {
        title: "Weight (latest)".to_string(),
        value: weight_latest.map_or_else(|| "—".to_string(), |v| format!("{v} kg")),
        tone: Tone::Good,
        message: "Track weekly to see trend.".to_string(),
    });

    // Energy
    cards.push(Card {
        title: "Energy (24h avg)".to_string(),
        value: energy_avg.map_or_else(|| "—".to_string(), |v| format!("{v:.1}/10")),
        tone: match energy_avg {
            Some(v) if v >= goals.energy_good => Tone::Good,
            _ => Tone::Warn,
        },
        message: match energy_avg {
            Some(v) if v < goals.energy_low => "Rest & nutrition focus today.".to_string(),
            Some(_) => "Nice energy!".to_string(),
            None => "Log a check-in today.".to_string(),
        },
    });

    // Activity
    cards.push(Card {
        title: "Activity (24h)".to_string(),
        value: format!("{steps_24h} steps • {cals_24h} kcal"),
        tone: if steps_24h >= u64::from(goals.steps_target) {
            Tone::Good
        } else {
            Tone::Warn
        },
        message: if betterme_done {
            "BetterMe done. Keep the streak going!".to_string()
        } else {
            "Try a light session today.".to_string()
        },
    });

    Ok(cards)
}
