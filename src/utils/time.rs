use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Naive layouts the backend has been seen to send when it drops the offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Parse an ISO-8601 timestamp.
///
/// Offset-less timestamps are read as wall-clock time in `tz`. Anything that
/// does not parse yields `None` so one bad field never sinks a whole response.
pub fn parse_timestamp(raw: &str, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| localize(&naive, tz))
}

/// Resolve a wall-clock time in `tz`. Ambiguous DST times take the earlier instant.
pub fn localize(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// Combine a picked date and an HH:MM string into a timestamp in `tz`
pub fn combine_date_time(
    date: NaiveDate,
    time_str: &str,
    tz: &Tz,
) -> Option<DateTime<FixedOffset>> {
    let (hour, minute) = parse_time(time_str)?;
    let naive = date.and_hms_opt(hour, minute, 0)?;
    localize(&naive, tz)
}

/// Wire representation sent to the backend
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339()
}

/// Human-readable representation for prompts and speech
pub fn display_timestamp(dt: &DateTime<FixedOffset>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%a %b %-d, %H:%M").to_string()
}
