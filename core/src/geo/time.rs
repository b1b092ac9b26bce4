use chrono::{DateTime, NaiveDate, NaiveDateTime};

const CAPTURE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a capture timestamp as emitted by the scan endpoints. Accepts
/// RFC 3339 with an offset as well as the bare `T`- and space-separated
/// forms, with or without fractional seconds.
pub fn parse_capture(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    CAPTURE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Calendar-date key used to group records by day.
pub fn date_key(dt: &NaiveDateTime) -> NaiveDate {
    dt.date()
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_day(date: &NaiveDate) -> String {
    date.format("%m/%d (%a)").to_string()
}

/// Display form of a raw capture string: "-" when missing, the raw text
/// when unparsable, the formatted timestamp otherwise.
pub fn display_capture(raw: Option<&str>) -> String {
    match raw {
        None => "-".to_string(),
        Some(text) => match parse_capture(text) {
            Some(dt) => format_datetime(&dt),
            None => text.to_string(),
        },
    }
}
