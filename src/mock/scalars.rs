/// Custom scalars for the mock schema
///
/// Date and time scalars check their input format with chrono so the round
/// trip catches malformed sample values. Every other custom scalar accepts
/// anything.

use async_graphql::dynamic::Scalar;
use async_graphql::Value;
use chrono::{DateTime, NaiveDate, NaiveTime};

/// Build the mock scalar for a custom scalar declared by the schema
pub fn custom_scalar(name: &str, description: Option<&str>) -> Scalar {
    let scalar = match name {
        "Date" => Scalar::new(name).validator(is_date),
        "DateTime" => Scalar::new(name).validator(is_datetime),
        "Time" => Scalar::new(name).validator(is_time),
        _ => Scalar::new(name),
    };
    match description {
        Some(desc) => scalar.description(desc),
        None => scalar,
    }
}

/// ISO 8601 date (YYYY-MM-DD)
fn is_date(value: &Value) -> bool {
    matches!(value, Value::String(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
}

/// RFC 3339 datetime with offset
fn is_datetime(value: &Value) -> bool {
    matches!(value, Value::String(s) if DateTime::parse_from_rfc3339(s).is_ok())
}

/// Time of day, seconds optional
fn is_time(value: &Value) -> bool {
    matches!(value, Value::String(s)
        if NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok() || NaiveTime::parse_from_str(s, "%H:%M").is_ok())
}
