//! Coercion of untyped record values and filter inputs into comparable
//! scalars. Anything that does not coerce yields `None`; callers decide what
//! an uncoercible value means instead of comparing `NaN`s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// A date operand, kept at the precision it was written with so the remote
/// renderer can emit an `Edm.Date` or an `Edm.DateTimeOffset` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLiteral {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

impl DateLiteral {
    /// Milliseconds since the Unix epoch; calendar days start at UTC midnight.
    pub fn timestamp_millis(&self) -> i64 {
        match self {
            DateLiteral::Day(day) => day
                .and_hms_opt(0, 0, 0)
                .map(|midnight| Utc.from_utc_datetime(&midnight).timestamp_millis())
                .unwrap_or_default(),
            DateLiteral::Instant(instant) => instant.timestamp_millis(),
        }
    }

    pub fn odata_literal(&self) -> String {
        match self {
            DateLiteral::Day(day) => day.format("%Y-%m-%d").to_string(),
            DateLiteral::Instant(instant) => {
                instant.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
            }
        }
    }
}

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a finite decimal number; blank text, `NaN` and infinities are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Parses `YYYY-MM-DD`, RFC 3339, or a naive ISO date-time (read as UTC).
pub fn parse_date(text: &str) -> Option<DateLiteral> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(DateLiteral::Day(day));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(DateLiteral::Instant(instant.with_timezone(&Utc)));
    }
    NAIVE_DATETIME_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(trimmed, format)
            .ok()
            .map(|naive| DateLiteral::Instant(Utc.from_utc_datetime(&naive)))
    })
}

pub fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|number| number.is_finite()),
        Value::String(text) => parse_number(text),
        _ => None,
    }
}

/// Date values as epoch milliseconds. JSON numbers are taken as epoch milliseconds.
pub fn date_millis_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|millis| millis.is_finite())
                .map(|millis| millis as i64)
        }),
        Value::String(text) => parse_date(text).map(|date| date.timestamp_millis()),
        _ => None,
    }
}

pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Canonical rendering of a parsed number: integers drop the fraction.
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
