//! Check-in reminders.
//!
//! Reminders fire on a fixed interval (10 hours by default). The time of the
//! last fired reminder is persisted in the metadata table so restarts pick up
//! where the schedule left off instead of resetting it. For integration with
//! external calendar apps, the schedule can also be exported as an iCalendar
//! file with a matching recurrence rule.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::Storage;

/// Metadata key holding the RFC 3339 time the last reminder fired.
pub const LAST_REMINDER_KEY: &str = "last_reminder";

/// Lead time before the first calendar event, in minutes.
const CALENDAR_LEAD_MINUTES: i64 = 5;

/// The persisted reminder schedule state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderStatus {
    /// When the last reminder fired, if one ever has.
    pub last_fired: Option<DateTime<Utc>>,

    /// How long until the next reminder is due. Zero when overdue.
    pub due_in: Duration,
}

/// When the last reminder fired, from the metadata table.
///
/// A corrupt stored value is treated as never fired.
///
/// # Errors
///
/// Returns an error if the database read fails.
pub fn last_fired(storage: &Storage) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = storage.get_meta(LAST_REMINDER_KEY)? else {
        return Ok(None);
    };
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(dt) => Ok(Some(dt.with_timezone(&Utc))),
        Err(e) => {
            debug!("Ignoring corrupt {} value '{}': {}", LAST_REMINDER_KEY, raw, e);
            Ok(None)
        }
    }
}

/// How long to wait before the next reminder.
///
/// A reminder that is already overdue, or one that has never fired, is due
/// immediately.
#[must_use]
pub fn due_in(last: Option<DateTime<Utc>>, interval: Duration, now: DateTime<Utc>) -> Duration {
    let Some(last) = last else {
        return Duration::ZERO;
    };
    let Ok(elapsed) = (now - last).to_std() else {
        // Last-fired in the future, likely a clock change. Start a fresh interval.
        return interval;
    };
    interval.saturating_sub(elapsed)
}

/// The current schedule state.
///
/// # Errors
///
/// Returns an error if the database read fails.
pub fn status(storage: &Storage, interval: Duration) -> Result<ReminderStatus> {
    let last = last_fired(storage)?;
    Ok(ReminderStatus {
        last_fired: last,
        due_in: due_in(last, interval, Utc::now()),
    })
}

/// Fire a reminder now and persist the time it fired.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn fire(storage: &Storage) -> Result<DateTime<Utc>> {
    let now = Utc::now();
    storage.set_meta(LAST_REMINDER_KEY, &now.to_rfc3339())?;
    info!("Reminder fired");
    println!("⏰ Time for a check-in: log your energy and any symptoms (hbind checkin add)");
    Ok(now)
}

/// Run the reminder schedule in the foreground until interrupted.
///
/// Picks up from the persisted last-fired time, fires on the configured
/// interval, and stops on ctrl-c.
///
/// # Errors
///
/// Returns an error if the async runtime cannot start or a database
/// operation fails.
pub fn run(storage: &Storage, interval: Duration) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        info!(
            "Reminder schedule running, interval {}h; ctrl-c to stop",
            interval.as_secs() / 3600
        );
        loop {
            let wait = due_in(last_fired(storage)?, interval, Utc::now());
            debug!("Next reminder in {}s", wait.as_secs());
            tokio::select! {
                () = tokio::time::sleep(wait) => {
                    fire(storage)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Reminder schedule stopped");
                    return Ok(());
                }
            }
        }
    })
}

/// Build an iCalendar file with a recurring check-in reminder.
///
/// The event starts shortly after `now` and repeats on the configured
/// interval, so calendar apps can take over the nudging.
#[must_use]
pub fn calendar(interval_hours: u32, now: DateTime<Utc>) -> String {
    let start = (now + chrono::Duration::minutes(CALENDAR_LEAD_MINUTES)).format("%Y%m%dT%H%M%SZ");
    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//healthbinder//reminders//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:checkin-reminder@healthbinder\r\n\
         DTSTAMP:{start}\r\n\
         DTSTART:{start}\r\n\
         SUMMARY:Health check-in\r\n\
         DESCRIPTION:Log your energy\\, workouts and vitals.\r\n\
         RRULE:FREQ=HOURLY;INTERVAL={interval_hours}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}
