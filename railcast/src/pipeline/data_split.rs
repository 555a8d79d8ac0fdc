use chrono::{NaiveTime, TimeDelta};
use railcast_core::feature::FeatureRow;

/// splits rows into a training set and a trailing evaluation set. the cutoff is midnight
/// at the start of (last date - test_days): rows at or before it train the model, so only
/// the first hour of the cutoff day trains and the rest of that day evaluates.
pub fn split_by_date(rows: Vec<FeatureRow>, test_days: u32) -> (Vec<FeatureRow>, Vec<FeatureRow>) {
    let last_date = match rows.iter().map(|r| r.timestamp.date()).max() {
        Some(date) => date,
        None => return (vec![], vec![]),
    };
    let cutoff = match last_date.checked_sub_signed(TimeDelta::days(test_days as i64)) {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => return (vec![], rows),
    };
    rows.into_iter().partition(|r| r.timestamp <= cutoff)
}
