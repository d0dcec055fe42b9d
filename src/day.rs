//! Calendar-day helpers.
//!
//! Dates travel as `YYYY-MM-DD` strings, matching what the front-end renders.

use serde::{Deserialize, Deserializer, Serializer};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Current calendar day in UTC.
#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Serialize a [`Date`] as `YYYY-MM-DD`.
pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    let format = format_description!("[year]-[month]-[day]");
    let text = date.format(format).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

/// Deserialize a [`Date`] from `YYYY-MM-DD`.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
    let format = format_description!("[year]-[month]-[day]");
    let text = String::deserialize(deserializer)?;
    Date::parse(&text, format).map_err(serde::de::Error::custom)
}
