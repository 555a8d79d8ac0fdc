//! serde codec for the hour-aligned timestamps found in demand, event and feature files.
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

pub const APP_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ISO-8601 style timestamps (with a 'T' separator) are also accepted when reading.
const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, APP_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, ISO_DATETIME_FORMAT))
        .map_err(|e| {
            format!("failure reading timestamp '{value}', expected format '{APP_DATETIME_FORMAT}': {e}")
        })
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(APP_DATETIME_FORMAT).to_string()
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_datetime(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_datetime(&s).map_err(serde::de::Error::custom)
}
