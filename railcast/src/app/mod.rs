mod pipeline_config;
mod railcast_app;

pub use pipeline_config::PipelineConfig;
pub use railcast_app::{RailcastApp, RailcastOperation};
