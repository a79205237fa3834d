use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use shared_models::error::ScheduleError;

/// Date every availability time-of-day is anchored to.
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn hh_mm() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid time pattern"))
}

/// Anchors a time of day to the reference date.
pub fn on_reference_date(time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&reference_date().and_time(time))
}

/// Parses an availability bound. Accepts `HH:MM` (hours 0-23, minutes 00-59)
/// or an ISO timestamp; the latter is converted to UTC and its date dropped.
pub fn parse_time_of_day(input: &str, label: &str) -> Result<DateTime<Utc>, ScheduleError> {
    let input = input.trim();

    if let Some(caps) = hh_mm().captures(input) {
        let hours: u32 = caps[1].parse().unwrap_or(u32::MAX);
        let minutes: u32 = caps[2].parse().unwrap_or(u32::MAX);
        return NaiveTime::from_hms_opt(hours, minutes, 0)
            .filter(|_| hours <= 23 && minutes <= 59)
            .map(on_reference_date)
            .ok_or_else(|| ScheduleError::InvalidInput(format!("Invalid {} time", label)));
    }

    parse_timestamp(input)
        .map(|dt| on_reference_date(dt.time()))
        .map_err(|_| ScheduleError::InvalidInput(format!("Invalid {} time", label)))
}

/// Parses an absolute timestamp. RFC 3339 is preferred; a timestamp without
/// an offset is taken as UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ScheduleError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ScheduleError::InvalidInput(format!("Invalid timestamp '{}'", input)))
}

/// Weekday number with Sunday = 0.
pub fn weekday_of(dt: &DateTime<Utc>) -> i16 {
    dt.weekday().num_days_from_sunday() as i16
}

pub fn validate_weekday(weekday: i64) -> Result<i16, ScheduleError> {
    if (0..=6).contains(&weekday) {
        Ok(weekday as i16)
    } else {
        Err(ScheduleError::InvalidInput("weekday must be between 0 and 6".to_string()))
    }
}
