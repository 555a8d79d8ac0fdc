use std::{fmt::Display, str::FromStr};

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// width of one observation bucket (one forecast slot). parsed from and written as a
/// humantime duration string such as "1h" or "30m".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeBucket {
    seconds: i64,
}

impl TimeBucket {
    pub fn hourly() -> TimeBucket {
        TimeBucket { seconds: 3600 }
    }

    pub fn from_seconds(seconds: i64) -> Result<TimeBucket, String> {
        if seconds <= 0 {
            return Err(format!("time bucket width must be positive, found {seconds} seconds"));
        }
        Ok(TimeBucket { seconds })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn duration(&self) -> TimeDelta {
        TimeDelta::seconds(self.seconds)
    }

    /// true if the timestamp sits on a bucket boundary (relative to the unix epoch).
    pub fn is_aligned(&self, timestamp: &NaiveDateTime) -> bool {
        timestamp.and_utc().timestamp().rem_euclid(self.seconds) == 0
    }
}

impl Default for TimeBucket {
    fn default() -> Self {
        TimeBucket::hourly()
    }
}

impl FromStr for TimeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let duration = humantime::parse_duration(s.trim())
            .map_err(|e| format!("failure reading time bucket '{s}': {e}"))?;
        let seconds = i64::try_from(duration.as_secs())
            .map_err(|e| format!("time bucket '{s}' is too large: {e}"))?;
        TimeBucket::from_seconds(seconds)
    }
}

impl TryFrom<String> for TimeBucket {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimeBucket::from_str(&value)
    }
}

impl From<TimeBucket> for String {
    fn from(value: TimeBucket) -> Self {
        value.to_string()
    }
}

impl Display for TimeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = std::time::Duration::from_secs(self.seconds as u64);
        write!(f, "{}", humantime::format_duration(d))
    }
}
