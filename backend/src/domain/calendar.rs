//! Calendar-day arithmetic for habit tracking.
//!
//! Every date comparison in the domain goes through [`calendar_day`]: a
//! timestamp is reduced to the local calendar day it falls on, and only
//! those days are compared. The [`Clock`] trait supplies "now" so services
//! never read the system time directly.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use thiserror::Error;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// The normalized current day
    fn today(&self) -> NaiveDate {
        calendar_day(&self.now())
    }
}

/// Clock backed by the process-local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Reduce a timestamp to the local calendar day it falls on
pub fn calendar_day<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> NaiveDate {
    timestamp.with_timezone(&Local).date_naive()
}

/// The calendar day immediately before `day`
pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

/// `start + (days - 1)`, the last day of an inclusive range of `days` days.
/// `None` if that falls outside the supported date range.
pub fn inclusive_end(start: NaiveDate, days: u32) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(i64::from(days.saturating_sub(1))))
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD or an RFC 3339 timestamp)")]
    UnparseableDate(String),
    #[error("Invalid month: {0}. Must be between 1 and 12")]
    InvalidMonth(u32),
    #[error("Invalid year: {0}")]
    InvalidYear(i32),
}

/// Parse caller input into a calendar day.
///
/// Plain dates are taken as-is; full timestamps are normalized to the local
/// day they fall on.
pub fn parse_calendar_day(input: &str) -> Result<NaiveDate, CalendarError> {
    let trimmed = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| calendar_day(&timestamp))
        .map_err(|_| CalendarError::UnparseableDate(input.to_string()))
}

/// Get the number of days in a given month and year
pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidYear(year))?;
    let (next_year, next_month) = next_month(year, month);
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or(CalendarError::InvalidYear(next_year))?;
    Ok((next_first - first).num_days() as u32)
}

/// Weekday of the first of the month (0 = Sunday, 1 = Monday, ..)
pub fn first_day_of_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::InvalidMonth(month));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.weekday().num_days_from_sunday())
        .ok_or(CalendarError::InvalidYear(year))
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "Invalid Month",
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Clock pinned to noon of a chosen day
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: std::sync::Arc<std::sync::Mutex<DateTime<Local>>>,
}

#[cfg(test)]
impl FixedClock {
    pub fn on(day: NaiveDate) -> Self {
        Self {
            now: std::sync::Arc::new(std::sync::Mutex::new(Self::noon(day))),
        }
    }

    pub fn set_day(&self, day: NaiveDate) {
        *self.now.lock().unwrap() = Self::noon(day);
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap();
        *now = *now + Duration::days(days);
    }

    fn noon(day: NaiveDate) -> DateTime<Local> {
        Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
