use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use itertools::Itertools;
use rayon::prelude::*;

use crate::capacity::CapacityEstimator;
use crate::model::{datetime_codec, DemandObservation, EventObservation, FleetRoster, TimeBucket};

use super::{
    batch_processing_error, cleaning_ops, window_ops, CalendarFeatures, EventIndex, FeatureConfig,
    FeatureError, FeatureRow,
};

/// the demand series of one route, sorted by timestamp.
type RouteSeries = Vec<(NaiveDateTime, Option<f64>)>;

/// derives one [`FeatureRow`] per observation, sorted by (route, timestamp).
///
/// # Arguments
///
/// * `observations` - raw demand, unique per (timestamp, route), in any order
/// * `events` - optional event overlay. None means no row is attributed to an event
/// * `fleet` - roster used for the two capacity baseline features
/// * `config` - feature options, see [`FeatureConfig`]
///
/// # Errors
///
/// reports invalid or duplicate observations, and any route without a single valid
/// demand value (no median can be computed to fill its gaps).
pub fn derive(
    observations: &[DemandObservation],
    events: Option<&[EventObservation]>,
    fleet: &FleetRoster,
    config: &FeatureConfig,
) -> Result<Vec<FeatureRow>, FeatureError> {
    config.validate()?;
    let estimator = CapacityEstimator::new(fleet, config.occupancy_target)?;
    let event_index = match events {
        Some(events) => EventIndex::new(events, config)?,
        None => EventIndex::empty(config),
    };
    let routes = group_by_route(observations, &config.time_bucket)?;
    log::debug!(
        "deriving features for {} observations across {} routes",
        observations.len(),
        routes.len()
    );

    // clean each route independently
    let (cleaned, errors): (Vec<Vec<f64>>, Vec<FeatureError>) = routes
        .par_iter()
        .map(|(route, series)| cleaning_ops::clean_route_series(route, series))
        .collect::<Vec<_>>()
        .into_iter()
        .partition_result();
    if !errors.is_empty() {
        return Err(batch_processing_error(errors));
    }

    // bound outliers using a reference quantile over every route's cleaned demand
    let all_demand = cleaned.iter().flatten().copied().collect_vec();
    let upper = match cleaning_ops::quantile(&all_demand, config.outlier_quantile) {
        Some(reference) => reference * config.outlier_multiplier,
        None => return Ok(vec![]),
    };
    let clipped_count = all_demand.iter().filter(|v| **v > upper).count();
    if clipped_count > 0 {
        log::warn!("clipping {clipped_count} demand values above {upper:.2}");
    }

    let (rows, errors): (Vec<Vec<FeatureRow>>, Vec<FeatureError>) = routes
        .par_iter()
        .zip(cleaned.par_iter())
        .map(|((route, series), demand)| {
            // lag gaps take the median of the route before clipping
            let route_median =
                cleaning_ops::median(demand).ok_or_else(|| FeatureError::NoDemandHistory {
                    route: route.to_string(),
                })?;
            let demand = demand
                .iter()
                .map(|v| cleaning_ops::clip(*v, upper))
                .collect_vec();
            route_feature_rows(route, series, &demand, route_median, &estimator, &event_index)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .partition_result();
    if !errors.is_empty() {
        return Err(batch_processing_error(errors));
    }

    Ok(rows.into_iter().flatten().collect_vec())
}

/// validates observations and groups them into per-route series sorted by time.
/// routes are returned sorted by name.
fn group_by_route(
    observations: &[DemandObservation],
    time_bucket: &TimeBucket,
) -> Result<Vec<(String, RouteSeries)>, FeatureError> {
    let mut seen: HashSet<(&str, NaiveDateTime)> = HashSet::new();
    let mut routes: BTreeMap<String, RouteSeries> = BTreeMap::new();
    for obs in observations.iter() {
        if !time_bucket.is_aligned(&obs.timestamp) {
            return Err(FeatureError::MisalignedTimestamp {
                route: obs.route.clone(),
                timestamp: datetime_codec::format_datetime(&obs.timestamp),
                bucket: time_bucket.to_string(),
            });
        }
        // NaN is a missing reading, filled like an empty cell
        let passenger_demand = obs.passenger_demand.filter(|v| !v.is_nan());
        if let Some(value) = passenger_demand {
            if !value.is_finite() || value < 0.0 {
                return Err(FeatureError::InvalidDemand {
                    route: obs.route.clone(),
                    timestamp: datetime_codec::format_datetime(&obs.timestamp),
                    value,
                });
            }
        }
        if !seen.insert((obs.route.as_str(), obs.timestamp)) {
            return Err(FeatureError::DuplicateObservation {
                route: obs.route.clone(),
                timestamp: datetime_codec::format_datetime(&obs.timestamp),
            });
        }
        routes
            .entry(obs.route.clone())
            .or_default()
            .push((obs.timestamp, passenger_demand));
    }
    let result = routes
        .into_iter()
        .map(|(route, mut series)| {
            series.sort_by_key(|(ts, _)| *ts);
            (route, series)
        })
        .collect_vec();
    Ok(result)
}

/// builds the feature rows of one route from its cleaned, clipped demand. every lag and
/// rolling value at position i reads only positions <= i of this route. lags that reach
/// before the first row take `route_median`.
fn route_feature_rows(
    route: &str,
    series: &RouteSeries,
    demand: &[f64],
    route_median: f64,
    estimator: &CapacityEstimator,
    event_index: &EventIndex,
) -> Result<Vec<FeatureRow>, FeatureError> {
    let lag_1 = window_ops::lag(demand, 1);
    let lag_24 = window_ops::lag(demand, 24);
    let rolling_3 = window_ops::rolling_mean(demand, 3);
    let rolling_6 = window_ops::rolling_mean(demand, 6);
    let rolling_24 = window_ops::rolling_mean(demand, 24);
    let target = window_ops::lead(demand, 1);

    series
        .iter()
        .enumerate()
        .map(|(i, (timestamp, _))| {
            let calendar = CalendarFeatures::from(timestamp);
            let passenger_demand = demand[i];
            Ok(FeatureRow {
                timestamp: *timestamp,
                route: route.to_string(),
                hour: calendar.hour,
                day_of_week: calendar.day_of_week,
                is_weekend: calendar.is_weekend,
                is_night: calendar.is_night,
                month: calendar.month,
                event_size: event_index.event_size(route, timestamp),
                is_event_window: u8::from(event_index.in_event_window(route, timestamp)),
                passenger_demand,
                lag_1: lag_1[i].unwrap_or(route_median),
                lag_24: lag_24[i].unwrap_or(route_median),
                rolling_3: rolling_3[i],
                rolling_6: rolling_6[i],
                rolling_24: rolling_24[i],
                baseline_required_trains: estimator.baseline_required_trains(passenger_demand)?,
                greedy_min_trains: estimator.greedy_min_trains(passenger_demand)?,
                target_next_hour: target[i],
            })
        })
        .collect::<Result<Vec<_>, FeatureError>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TrainRecord, TrainStatus};
    use chrono::{NaiveDate, TimeDelta};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn fleet() -> FleetRoster {
        FleetRoster::new(vec![
            TrainRecord::new("T1", 350, TrainStatus::Available),
            TrainRecord::new("T2", 300, TrainStatus::Available),
            TrainRecord::new("T3", 150, TrainStatus::Available),
        ])
        .expect("test invariant failed: valid roster")
    }

    /// a deterministic demand pattern with a daily cycle, one route per offset.
    fn observations(routes: &[(&str, f64)], hours: usize) -> Vec<DemandObservation> {
        routes
            .iter()
            .flat_map(|(route, base)| {
                (0..hours).map(move |h| {
                    let demand = base + 40.0 * ((h % 24) as f64 / 24.0 * std::f64::consts::TAU).sin();
                    DemandObservation::new(start() + TimeDelta::hours(h as i64), route, Some(demand.round()))
                })
            })
            .collect()
    }

    #[test]
    fn test_rows_sorted_by_route_then_time() {
        let mut obs = observations(&[("Route_B", 150.0), ("Route_A", 220.0)], 30);
        obs.reverse();
        let rows = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        assert_eq!(rows.len(), 60);
        let keys = rows.iter().map(|r| (r.route.clone(), r.timestamp)).collect_vec();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(rows[0].route, "Route_A");
    }

    #[test]
    fn test_lags_and_label_stay_within_route() {
        let obs = observations(&[("Route_A", 220.0), ("Route_B", 90.0)], 30);
        let rows = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        for (route, group) in &rows.iter().chunk_by(|r| r.route.clone()) {
            let group = group.collect_vec();
            let demand = group.iter().map(|r| r.passenger_demand).collect_vec();
            let median = cleaning_ops::median(&demand).unwrap();
            assert_eq!(group[0].lag_1, median, "route {route}");
            for i in 1..group.len() {
                assert_eq!(group[i].lag_1, demand[i - 1]);
            }
            for i in 0..group.len() {
                if i < 24 {
                    assert_eq!(group[i].lag_24, median);
                } else {
                    assert_eq!(group[i].lag_24, demand[i - 24]);
                }
            }
            for i in 0..group.len() - 1 {
                assert_eq!(group[i].target_next_hour, Some(demand[i + 1]));
            }
            assert!(!group[group.len() - 1].is_labelled());
        }
    }

    #[test]
    fn test_no_look_ahead_in_lag_and_rolling_features() {
        let full = observations(&[("Route_A", 220.0)], 72);
        let cutoff = start() + TimeDelta::hours(47);
        let prefix = full
            .iter()
            .filter(|o| o.timestamp <= cutoff)
            .cloned()
            .collect_vec();
        let mut altered_future = full.clone();
        for obs in altered_future.iter_mut().filter(|o| o.timestamp > cutoff) {
            obs.passenger_demand = obs.passenger_demand.map(|d| d * 0.5);
        }
        let config = FeatureConfig::default();
        let prefix_rows = derive(&prefix, None, &fleet(), &config).unwrap();
        for variant in [&full, &altered_future] {
            let rows = derive(variant, None, &fleet(), &config).unwrap();
            for (a, b) in prefix_rows.iter().zip(rows.iter()) {
                assert_eq!(a.timestamp, b.timestamp);
                assert_eq!(a.passenger_demand, b.passenger_demand);
                assert_eq!(a.rolling_3, b.rolling_3);
                assert_eq!(a.rolling_6, b.rolling_6);
                assert_eq!(a.rolling_24, b.rolling_24);
                if a.timestamp > start() {
                    assert_eq!(a.lag_1, b.lag_1);
                }
                if a.timestamp >= start() + TimeDelta::hours(24) {
                    assert_eq!(a.lag_24, b.lag_24);
                }
            }
        }
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let mut obs = observations(&[("Route_A", 220.0), ("Route_B", 160.0), ("Route_C", 90.0)], 50);
        obs[7].passenger_demand = None;
        obs[60].passenger_demand = None;
        let events = vec![EventObservation::new(start() + TimeDelta::hours(20), "Route_B", 700)];
        let config = FeatureConfig::default();
        let a = derive(&obs, Some(&events), &fleet(), &config).unwrap();
        let b = derive(&obs, Some(&events), &fleet(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_values_are_interpolated() {
        let mut obs = observations(&[("Route_A", 200.0)], 5);
        obs[0].passenger_demand = Some(100.0);
        obs[1].passenger_demand = None;
        obs[2].passenger_demand = Some(120.0);
        let rows = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        assert_eq!(rows[1].passenger_demand, 110.0);
    }

    #[test]
    fn test_all_missing_route_is_reported() {
        let mut obs = observations(&[("Route_A", 200.0), ("Route_Z", 100.0)], 10);
        for o in obs.iter_mut().filter(|o| o.route == "Route_Z") {
            o.passenger_demand = None;
        }
        let result = derive(&obs, None, &fleet(), &FeatureConfig::default());
        match result {
            Err(FeatureError::NoDemandHistory { route }) => assert_eq!(route, "Route_Z"),
            other => panic!("expected NoDemandHistory, found {other:?}"),
        }
    }

    #[test]
    fn test_two_faulty_routes_are_batched() {
        let mut obs = observations(&[("Route_Y", 200.0), ("Route_Z", 100.0)], 4);
        for o in obs.iter_mut() {
            o.passenger_demand = None;
        }
        let result = derive(&obs, None, &fleet(), &FeatureConfig::default());
        match result {
            Err(FeatureError::BatchProcessing(msg)) => {
                assert!(msg.contains("Route_Y"));
                assert!(msg.contains("Route_Z"));
            }
            other => panic!("expected BatchProcessing, found {other:?}"),
        }
    }

    #[test]
    fn test_outliers_are_clipped() {
        let mut obs = observations(&[("Route_A", 0.0)], 2000);
        for o in obs.iter_mut() {
            o.passenger_demand = Some(100.0);
        }
        // a single spike sits above the 99.9th percentile of 2000 values
        obs[1000].passenger_demand = Some(100_000.0);
        let rows = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        assert_eq!(rows.len(), 2000);
        assert!((rows[1000].passenger_demand - 120.0).abs() < 1e-9);
        assert_eq!(rows[999].passenger_demand, 100.0);
    }

    #[test]
    fn test_lag_backfill_uses_median_before_clipping() {
        let mut obs = (0..3)
            .map(|h| DemandObservation::new(start() + TimeDelta::hours(h), "Big", Some(1_000_000.0)))
            .collect_vec();
        obs.extend(
            (0..5000).map(|h| DemandObservation::new(start() + TimeDelta::hours(h), "Small", Some(10.0))),
        );
        let rows = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        let big = rows.iter().filter(|r| r.route == "Big").collect_vec();
        assert!((big[0].passenger_demand - 12.0).abs() < 1e-9);
        assert_eq!(big[0].lag_1, 1_000_000.0);
        assert_eq!(big[0].lag_24, 1_000_000.0);
        assert!((big[1].lag_1 - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_nan_demand_is_treated_as_missing() {
        let mut obs = observations(&[("Route_A", 200.0)], 5);
        obs[0].passenger_demand = Some(100.0);
        obs[1].passenger_demand = Some(f64::NAN);
        obs[2].passenger_demand = Some(120.0);
        let rows = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        assert_eq!(rows[1].passenger_demand, 110.0);

        let mut obs = observations(&[("Route_A", 200.0)], 3);
        obs[1].passenger_demand = Some(f64::INFINITY);
        assert!(matches!(
            derive(&obs, None, &fleet(), &FeatureConfig::default()),
            Err(FeatureError::InvalidDemand { .. })
        ));
    }

    #[test]
    fn test_event_features() {
        let obs = observations(&[("Route_A", 200.0), ("Route_B", 100.0)], 24);
        let event_time = start() + TimeDelta::hours(10);
        let events = vec![EventObservation::new(event_time, "Route_A", 900)];
        let rows = derive(&obs, Some(&events), &fleet(), &FeatureConfig::default()).unwrap();
        for row in rows.iter() {
            let offset = (row.timestamp - start()).num_hours();
            let expected_window = row.route == "Route_A" && (8..=13).contains(&offset);
            assert_eq!(row.is_event_window == 1, expected_window);
            let expected_size = if row.route == "Route_A" && offset == 10 { 900 } else { 0 };
            assert_eq!(row.event_size, expected_size);
        }
        let without = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        assert!(without.iter().all(|r| r.event_size == 0 && r.is_event_window == 0));
    }

    #[test]
    fn test_rejects_duplicates_and_bad_values() {
        let mut obs = observations(&[("Route_A", 200.0)], 3);
        obs.push(obs[1].clone());
        assert!(matches!(
            derive(&obs, None, &fleet(), &FeatureConfig::default()),
            Err(FeatureError::DuplicateObservation { .. })
        ));

        let mut obs = observations(&[("Route_A", 200.0)], 3);
        obs[2].passenger_demand = Some(-4.0);
        assert!(matches!(
            derive(&obs, None, &fleet(), &FeatureConfig::default()),
            Err(FeatureError::InvalidDemand { .. })
        ));

        let mut obs = observations(&[("Route_A", 200.0)], 3);
        obs[0].timestamp += TimeDelta::minutes(15);
        assert!(matches!(
            derive(&obs, None, &fleet(), &FeatureConfig::default()),
            Err(FeatureError::MisalignedTimestamp { .. })
        ));
    }

    #[test]
    fn test_capacity_baselines_use_cleaned_demand() {
        let mut obs = observations(&[("Route_A", 0.0)], 3);
        obs[0].passenger_demand = Some(0.0);
        obs[1].passenger_demand = Some(500.0);
        obs[2].passenger_demand = Some(250.0);
        let rows = derive(&obs, None, &fleet(), &FeatureConfig::default()).unwrap();
        // mean capacity 266.67 * 0.8 = 213.33
        assert_eq!(rows[1].baseline_required_trains, 3);
        // 280 + 240 = 520 >= 500
        assert_eq!(rows[1].greedy_min_trains, 2);
        assert_eq!(rows[0].greedy_min_trains, 1);
        assert_eq!(rows[0].baseline_required_trains, 0);
    }

    #[test]
    fn test_empty_input() {
        let rows = derive(&[], None, &fleet(), &FeatureConfig::default()).unwrap();
        assert!(rows.is_empty());
    }
}
