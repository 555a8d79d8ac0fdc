use std::collections::HashMap;

use chrono::{NaiveDateTime, TimeDelta};
use itertools::Itertools;

use crate::model::{datetime_codec, EventObservation};

use super::{FeatureConfig, FeatureError};

/// lookup over event observations by route, used to attribute event size and
/// event-window membership to feature rows.
#[derive(Clone, Debug)]
pub struct EventIndex {
    sizes: HashMap<(String, NaiveDateTime), u32>,
    /// sorted, de-duplicated event times per route
    times: HashMap<String, Vec<NaiveDateTime>>,
    pre: TimeDelta,
    post: TimeDelta,
}

impl EventIndex {
    /// an index with no events. every row gets event_size 0 and is outside any window.
    pub fn empty(config: &FeatureConfig) -> EventIndex {
        EventIndex {
            sizes: HashMap::new(),
            times: HashMap::new(),
            pre: TimeDelta::hours(config.event_window_pre_hours as i64),
            post: TimeDelta::hours(config.event_window_post_hours as i64),
        }
    }

    /// builds the index. when several events share a (timestamp, route) the largest
    /// event size is kept.
    pub fn new(events: &[EventObservation], config: &FeatureConfig) -> Result<EventIndex, FeatureError> {
        let mut index = EventIndex::empty(config);
        for event in events.iter() {
            if event.event_size == 0 {
                return Err(FeatureError::InvalidEvent {
                    route: event.route.clone(),
                    timestamp: datetime_codec::format_datetime(&event.timestamp),
                });
            }
            let key = (event.route.clone(), event.timestamp);
            let size = index.sizes.entry(key).or_insert(0);
            *size = (*size).max(event.event_size);
        }
        index.times = index
            .sizes
            .keys()
            .map(|(route, ts)| (route.clone(), *ts))
            .into_group_map()
            .into_iter()
            .map(|(route, times)| (route, times.into_iter().sorted().dedup().collect_vec()))
            .collect();
        Ok(index)
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// size of the event at exactly this (timestamp, route), or 0.
    pub fn event_size(&self, route: &str, timestamp: &NaiveDateTime) -> u32 {
        self.sizes
            .get(&(route.to_string(), *timestamp))
            .copied()
            .unwrap_or_default()
    }

    /// true if `event - pre <= timestamp <= event + post` for some event on this route.
    pub fn in_event_window(&self, route: &str, timestamp: &NaiveDateTime) -> bool {
        let Some(times) = self.times.get(route) else {
            return false;
        };
        // equivalently: timestamp - post <= event <= timestamp + pre
        let earliest = *timestamp - self.post;
        let latest = *timestamp + self.pre;
        let first = times.partition_point(|t| *t < earliest);
        times.get(first).is_some_and(|t| *t <= latest)
    }
}
