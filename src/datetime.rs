//! Timestamp text handling.
//!
//! Two text forms are in play:
//!
//! - the display pattern (default `YYYY-MM-DD hh:mm:ss`) in the local time zone,
//!   used by fields tagged `datetime`
//! - RFC 3339, the self-describing form used for instant fields without the tag
//!   and for instants travelling through [`crate::Value`]

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, SecondsFormat, TimeZone};

/// Default display pattern for `datetime` fields.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses display text in the local time zone.
pub(crate) fn parse_local(text: &str, format: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(text, format).map_err(|e| e.to_string())?;
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err("time does not exist in the local time zone".to_string()),
    }
}

/// Formats epoch seconds as local display text; non-positive epochs have no text.
pub(crate) fn format_epoch(secs: i64, format: &str) -> Result<Option<String>, String> {
    if secs <= 0 {
        return Ok(None);
    }
    match Local.timestamp_opt(secs, 0) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => render(&dt, format).map(Some),
        LocalResult::None => Err(format!("epoch {} is out of range", secs)),
    }
}

/// Formats an instant as local display text.
pub(crate) fn render<Tz: TimeZone>(instant: &DateTime<Tz>, format: &str) -> Result<String, String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    // an invalid pattern surfaces as fmt::Error instead of a panic in to_string()
    write!(out, "{}", instant.with_timezone(&Local).format(format))
        .map_err(|_| format!("invalid datetime pattern {:?}", format))?;
    Ok(out)
}

/// Parses the RFC 3339 form.
pub(crate) fn parse_instant(text: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(text).map_err(|e| e.to_string())
}

/// Renders an instant in its RFC 3339 form.
pub(crate) fn instant_text<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// The zero instant: the Unix epoch, which is what `DateTime::default()` yields.
pub(crate) fn is_zero_instant(instant: &DateTime<FixedOffset>) -> bool {
    instant.timestamp() == 0 && instant.timestamp_subsec_nanos() == 0
}

/// RFC 3339 text of the zero instant.
pub(crate) fn zero_instant_text() -> String {
    instant_text(&DateTime::<chrono::Utc>::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_local_roundtrip() {
        let dt = parse_local("2017-11-06 01:27:00", DEFAULT_DATETIME_FORMAT).unwrap();
        let text = format_epoch(dt.timestamp(), DEFAULT_DATETIME_FORMAT).unwrap();
        assert_eq!(text.as_deref(), Some("2017-11-06 01:27:00"));
    }

    #[test]
    fn test_parse_local_rejects_other_patterns() {
        assert!(parse_local("2017/11/06", DEFAULT_DATETIME_FORMAT).is_err());
        assert!(parse_local("", DEFAULT_DATETIME_FORMAT).is_err());
    }

    #[test]
    fn test_non_positive_epoch_has_no_text() {
        assert_eq!(format_epoch(0, DEFAULT_DATETIME_FORMAT), Ok(None));
        assert_eq!(format_epoch(-5, DEFAULT_DATETIME_FORMAT), Ok(None));
    }

    #[test]
    fn test_zero_instant() {
        let zero = parse_instant(&zero_instant_text()).unwrap();
        assert!(is_zero_instant(&zero));
        let other = parse_instant("2024-01-15T10:30:00Z").unwrap();
        assert!(!is_zero_instant(&other));
    }
}
