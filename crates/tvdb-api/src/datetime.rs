//! Timestamp format used by the TVDB API (`"YYYY-MM-DD HH:MM:SS"`).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// `chrono` format string of API timestamps.
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A timestamp as sent by the API, without time zone.
///
/// Decoding fails unless the string matches [`API_DATETIME_FORMAT`]
/// exactly; a bare date such as `"2023-05-15"` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiDateTime(pub NaiveDateTime);

impl ApiDateTime {
    /// Wrapped date-time.
    #[must_use]
    pub const fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl FromStr for ApiDateTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, API_DATETIME_FORMAT).map(Self)
    }
}

impl fmt::Display for ApiDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(API_DATETIME_FORMAT))
    }
}

impl From<NaiveDateTime> for ApiDateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl Serialize for ApiDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e| {
            serde::de::Error::custom(format!(
                "invalid timestamp {s:?} (expected YYYY-MM-DD HH:MM:SS): {e}"
            ))
        })
    }
}
