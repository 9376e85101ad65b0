//! Lenient decoding of stored civil timestamps.
//!
//! Rows arrive as `YYYY-MM-DDTHH:MM:SS`, sometimes with fractional seconds,
//! a `Z`, or an offset appended. The wall-clock part is kept as written and
//! the suffix is ignored. Use with `#[serde(deserialize_with = ...)]`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

const CIVIL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const SPACED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read the wall-clock part of a timestamp string.
pub fn parse_civil(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(head) = raw.get(..19) {
        let parsed = NaiveDateTime::parse_from_str(head, CIVIL_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(head, SPACED_FORMAT));
        if let Ok(civil) = parsed {
            return Some(civil);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|stamped| stamped.naive_local())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_civil(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// Optional variant; `null` and blank strings decode as `None`.
pub mod option {
    use super::{parse_civil, Deserialize, Deserializer, Error, NaiveDateTime};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_civil(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            _ => Ok(None),
        }
    }
}
