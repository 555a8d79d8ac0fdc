use std::path::Path;

use csv::QuoteStyle;
use itertools::Itertools;
use kdam::{tqdm, Bar, BarExt};
use railcast_core::model::{DemandObservation, EventObservation, FleetRoster, TrainRecord};
use serde::{de::DeserializeOwned, Serialize};

use crate::{pipeline::ForecastRecord, RailcastError};

/// reads every row of a headed CSV file into `T`, reporting progress with a spinner.
pub fn read_csv<T>(path: &Path, desc: &str) -> Result<Vec<T>, RailcastError>
where
    T: DeserializeOwned,
{
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| RailcastError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let mut bar = Bar::builder()
        .desc(desc)
        .build()
        .map_err(|e| RailcastError::InternalError(format!("progress bar error: {e}")))?;
    let mut rows = vec![];
    for (idx, row) in reader.into_deserialize::<T>().enumerate() {
        let row = row.map_err(|e| RailcastError::ReadError {
            path: path.to_path_buf(),
            message: format!("failure reading row {}: {e}", idx + 1),
        })?;
        rows.push(row);
        let _ = bar.update(1);
    }
    eprintln!();
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// writes rows to a headed CSV file, replacing any existing file.
pub fn write_csv<I>(iterable: I, path: &Path, desc: &str) -> Result<(), RailcastError>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    I::Item: Serialize,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Necessary)
        .from_path(path)
        .map_err(|e| RailcastError::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let iter = iterable.into_iter();
    let total = iter.len();
    let bar_iter = tqdm!(iter, total = total, desc = desc);
    for element in bar_iter {
        writer
            .serialize(element)
            .map_err(|e| RailcastError::WriteError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }
    eprintln!();
    writer.flush().map_err(|e| RailcastError::WriteError {
        path: path.to_path_buf(),
        message: format!("failed to flush: {e}"),
    })
}

pub fn read_demand(path: &Path) -> Result<Vec<DemandObservation>, RailcastError> {
    read_csv(path, "read demand observations")
}

pub fn read_events(path: &Path) -> Result<Vec<EventObservation>, RailcastError> {
    read_csv(path, "read events")
}

pub fn read_fleet(path: &Path) -> Result<FleetRoster, RailcastError> {
    let trains: Vec<TrainRecord> = read_csv(path, "read fleet roster")?;
    Ok(FleetRoster::new(trains)?)
}

/// reads a `slot,forecast` file into per-slot forecasts ordered by slot. rows may come in
/// any order, but the slots must be exactly 0..n with no duplicates or gaps.
pub fn read_forecast(path: &Path) -> Result<Vec<f64>, RailcastError> {
    let records: Vec<ForecastRecord> = read_csv(path, "read forecast")?;
    let sorted = records.into_iter().sorted_by_key(|r| r.slot).collect_vec();
    if let Some((expected, record)) = sorted.iter().enumerate().find(|(i, r)| r.slot != *i) {
        return Err(RailcastError::ReadError {
            path: path.to_path_buf(),
            message: format!(
                "forecast slots must run from 0 to {} without gaps or duplicates, expected slot {expected} but found {}",
                sorted.len().saturating_sub(1),
                record.slot
            ),
        });
    }
    Ok(sorted.into_iter().map(|r| r.forecast).collect_vec())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use railcast_core::model::TrainStatus;

    use super::*;

    fn test_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("railcast-csv-test").join(name);
        crate::io::fs::create_dirs(&dir).expect("test invariant failed: directory should be created");
        dir
    }

    #[test]
    fn test_demand_with_missing_values() {
        let dir = test_dir("demand");
        let path = dir.join("demand.csv");
        std::fs::write(
            &path,
            "timestamp,route,passenger_demand\n2024-01-01 00:00:00,A,120\n2024-01-01 01:00:00,A,\n",
        )
        .expect("test invariant failed: fixture should be written");
        let rows = read_demand(&path).expect("test invariant failed: demand should parse");
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(1, 0, 0))
            .expect("test invariant failed: valid date");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].passenger_demand, Some(120.0));
        assert_eq!(rows[1], DemandObservation::new(ts, "A", None));
    }

    #[test]
    fn test_fleet_round_trip() {
        let dir = test_dir("fleet");
        let path = dir.join("fleet.csv");
        let trains = vec![
            TrainRecord::new("T1", 350, TrainStatus::Available),
            TrainRecord::new("T2", 300, TrainStatus::Maintenance),
        ];
        write_csv(&trains, &path, "write fleet").expect("test invariant failed: write should succeed");
        let fleet = read_fleet(&path).expect("test invariant failed: fleet should parse");
        assert_eq!(fleet.trains(), trains.as_slice());
        assert_eq!(fleet.fleet_size(), 1);
    }

    #[test]
    fn test_bad_row_reports_path() {
        let dir = test_dir("bad");
        let path = dir.join("events.csv");
        std::fs::write(&path, "timestamp,route,event_size\nyesterday,A,5\n")
            .expect("test invariant failed: fixture should be written");
        let result = read_events(&path);
        assert!(matches!(result, Err(RailcastError::ReadError { .. })));
    }

    #[test]
    fn test_forecast_is_ordered_by_slot() {
        let dir = test_dir("forecast");
        let path = dir.join("forecast.csv");
        std::fs::write(&path, "slot,forecast\n2,80\n0,100\n1,250\n")
            .expect("test invariant failed: fixture should be written");
        let forecast = read_forecast(&path).expect("test invariant failed: forecast should parse");
        assert_eq!(forecast, vec![100.0, 250.0, 80.0]);
    }

    #[test]
    fn test_forecast_slots_must_be_contiguous() {
        let dir = test_dir("forecast-slots");
        for (name, contents) in [
            ("duplicate.csv", "slot,forecast\n0,10\n0,20\n1,30\n"),
            ("gap.csv", "slot,forecast\n0,10\n0,20\n7,30\n"),
            ("offset.csv", "slot,forecast\n1,10\n2,20\n"),
        ] {
            let path = dir.join(name);
            std::fs::write(&path, contents).expect("test invariant failed: fixture should be written");
            let result = read_forecast(&path);
            assert!(
                matches!(result, Err(RailcastError::ReadError { .. })),
                "{name} should be rejected"
            );
        }
    }
}
