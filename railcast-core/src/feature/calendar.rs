use chrono::{Datelike, NaiveDateTime, Timelike};

/// hours of the day treated as night service.
const NIGHT_HOURS: [u32; 5] = [0, 1, 2, 3, 4];

/// features that depend only on the timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub hour: u32,
    /// Monday = 0 through Sunday = 6
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub is_night: bool,
    pub month: u32,
}

impl From<&NaiveDateTime> for CalendarFeatures {
    fn from(timestamp: &NaiveDateTime) -> Self {
        let hour = timestamp.hour();
        let day_of_week = timestamp.weekday().num_days_from_monday();
        CalendarFeatures {
            hour,
            day_of_week,
            is_weekend: day_of_week >= 5,
            is_night: NIGHT_HOURS.contains(&hour),
            month: timestamp.month(),
        }
    }
}
