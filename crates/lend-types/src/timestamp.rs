use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Wire form of an unset timestamp: the zero instant of year 1, UTC.
///
/// Only `Record::end_time` may be unset. Any encoding of this instant decodes
/// to `None` there, and is rejected everywhere a real timestamp is required.
pub const UNSET_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Seconds from the UNIX epoch to `UNSET_TIMESTAMP`.
const UNSET_UNIX_SECONDS: i64 = -62_135_596_800;

/// Seconds from the UNIX epoch to `10000-01-01T00:00:00Z`. RFC 3339 has no
/// five-digit years, so instants from here on cannot be written canonically.
const END_UNIX_SECONDS: i64 = 253_402_300_800;

/// A UTC instant used for loan start and end times.
///
/// Ordering is chronological and total. The canonical text form is RFC 3339
/// with a `Z` suffix and the shortest sub-second precision (0, 3, 6 or 9
/// digits) that represents the instant exactly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a UTC instant. Instants at or before the unset sentinel, and
    /// instants past year 9999, are rejected.
    pub fn new(instant: DateTime<Utc>) -> Result<Self, CodecError> {
        if is_unset_or_earlier(&instant) {
            return Err(CodecError::Timestamp(format!(
                "{} is reserved for unset timestamps",
                instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            )));
        }
        if instant.timestamp() >= END_UNIX_SECONDS {
            return Err(CodecError::Timestamp(format!(
                "{} is past year 9999",
                instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            )));
        }
        Ok(Self(instant))
    }

    /// Build a timestamp from milliseconds since the UNIX epoch.
    pub fn from_unix_millis(millis: i64) -> Result<Self, CodecError> {
        let instant = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| CodecError::Timestamp(format!("{millis}ms is out of range")))?;
        Self::new(instant)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse any RFC 3339 string; offsets are normalized to UTC.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        Self::new(parse_instant(text)?)
    }

    /// Milliseconds since the UNIX epoch.
    pub fn unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Canonical text form.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

fn parse_instant(text: &str) -> Result<DateTime<Utc>, CodecError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CodecError::Timestamp(format!("{text:?}: {e}")))
}

fn is_unset_or_earlier(instant: &DateTime<Utc>) -> bool {
    let secs = instant.timestamp();
    secs < UNSET_UNIX_SECONDS
        || (secs == UNSET_UNIX_SECONDS && instant.timestamp_subsec_nanos() == 0)
}

impl FromStr for Timestamp {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_rfc3339())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<Timestamp>` fields that use the unset sentinel
/// on the wire instead of `null`.
pub mod optional {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => ts.serialize(serializer),
            None => serializer.serialize_str(UNSET_TIMESTAMP),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_optional(&text).map_err(serde::de::Error::custom)
    }

    /// Parse a possibly-unset timestamp.
    pub fn parse_optional(text: &str) -> Result<Option<Timestamp>, CodecError> {
        let instant = parse_instant(text)?;
        if instant.timestamp() == UNSET_UNIX_SECONDS && instant.timestamp_subsec_nanos() == 0 {
            return Ok(None);
        }
        Timestamp::new(instant).map(Some)
    }
}
