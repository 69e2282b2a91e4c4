//! Cron parsing and next-fire computation.
//!
//! Schedules are stored as standard 5-field cron (`min hour dom month
//! dow`, validated by `brain-store` at write time); the `cron` crate
//! parses 6/7-field expressions with a leading seconds field, so a `"0
//! "` is prepended before handing the expression to it.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;

use crate::error::ScheduleError;

/// Parse a 5-field cron expression and return the first fire time
/// strictly after `after`.
pub fn next_fire(expr: &str, after: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
    let six_field = format!("0 {expr}");
    let schedule =
        Schedule::from_str(&six_field).map_err(|e| ScheduleError::InvalidCron(e.to_string()))?;
    schedule
        .after(&after)
        .next()
        .ok_or_else(|| ScheduleError::InvalidCron(format!("{expr} has no upcoming fire time")))
}

/// Validate that `expr` parses as a cron expression, without computing a
/// fire time. Used at `create`/`update` time, on top of `brain-store`'s
/// 5-field grammar check, to catch semantically invalid field values
/// (e.g. `60` in the minute field).
pub fn validate(expr: &str) -> Result<(), ScheduleError> {
    let six_field = format!("0 {expr}");
    Schedule::from_str(&six_field).map_err(|e| ScheduleError::InvalidCron(e.to_string()))?;
    Ok(())
}
