//! derives a supervised-learning feature matrix from raw per-route demand observations.
//! every lag and rolling statistic is computed inside a single route's chronologically
//! sorted series, so routes are processed independently (and in parallel).
mod calendar;
mod event_index;
mod feature_config;
mod feature_error;
mod feature_row;
mod route_encoder;

pub mod cleaning_ops;
pub mod pipeline;
pub mod window_ops;

pub use calendar::CalendarFeatures;
pub use event_index::EventIndex;
pub use feature_config::FeatureConfig;
pub use feature_error::{batch_processing_error, FeatureError};
pub use feature_row::{FeatureRow, FEATURE_COLUMNS, FEATURE_COUNT};
pub use pipeline::derive;
pub use route_encoder::RouteEncoder;
