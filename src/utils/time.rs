use crate::utils::error::{PreshowError, Result};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a show time. Offsets are accepted but only the wall-clock part is kept.
pub fn parse_show_datetime(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    // Fractional seconds, e.g. 2025-11-20T19:30:00.000
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    Err(PreshowError::DateTimeError {
        value: value.to_string(),
    })
}

/// HTML `datetime-local` inputs omit seconds.
pub fn normalize_datetime(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if value.len() == 16 {
        return format!("{}:00", value);
    }
    value.to_string()
}

/// "Thursday, November 20 at 07:30 PM"; unparsable input is returned unchanged.
pub fn format_date(value: &str) -> String {
    match parse_show_datetime(value) {
        Ok(dt) => dt.format("%A, %B %d at %I:%M %p").to_string(),
        Err(_) => value.to_string(),
    }
}

/// "07:30 PM", or "TBD".
pub fn simple_time(value: &str) -> String {
    match parse_show_datetime(value) {
        Ok(dt) => dt.format("%I:%M %p").to_string(),
        Err(_) => "TBD".to_string(),
    }
}

/// Human runtime between two show times: "2 hours and 15 minutes", "45 minutes" or "TBD".
pub fn runtime(end: &str, start: &str) -> String {
    let (Ok(start), Ok(end)) = (parse_show_datetime(start), parse_show_datetime(end)) else {
        return "TBD".to_string();
    };
    let mins = (end - start).num_minutes();
    if mins < 0 {
        return "TBD".to_string();
    }
    let (h, m) = (mins / 60, mins % 60);
    if h > 0 {
        let plural = if h > 1 { "s" } else { "" };
        format!("{} hour{} and {} minutes", h, plural, m)
    } else {
        format!("{} minutes", m)
    }
}

/// Interprets a wall-clock time in `tz` and renders it as UTC RFC 3339 (`+00:00`).
pub fn to_utc_iso_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<String> {
    if value.trim().is_empty() {
        return Err(PreshowError::ValidationError {
            message: "No schedule time provided".to_string(),
        });
    }
    let naive = parse_show_datetime(value)?;
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| PreshowError::DateTimeError {
            value: value.to_string(),
        })?;
    Ok(local
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Same as [`to_utc_iso_in`] using the machine's local time zone.
pub fn to_utc_iso(value: &str) -> Result<String> {
    to_utc_iso_in(value, &Local)
}
