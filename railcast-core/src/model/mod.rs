mod demand_observation;
mod event_observation;
mod fleet_roster;
mod time_bucket;

pub mod datetime_codec;

pub use demand_observation::DemandObservation;
pub use event_observation::EventObservation;
pub use fleet_roster::{FleetRoster, TrainRecord, TrainStatus};
pub use time_bucket::TimeBucket;
