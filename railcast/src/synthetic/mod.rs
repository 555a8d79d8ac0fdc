//! seeded synthetic demand, event and fleet data. the same config (and seed) always
//! yields the same dataset, so generated files double as reproducible test fixtures.
mod generator;
mod synthetic_config;

pub use generator::{generate, SyntheticDataset};
pub use synthetic_config::SyntheticConfig;
