//! sequences the pipeline stages: feature derivation, model training and evaluation,
//! horizon forecasting, allocation, and the optional feedback re-plan.
mod data_split;
mod feedback;
mod orchestrator;
mod schedule_report;

pub use data_split::split_by_date;
pub use feedback::{replan, FeedbackReport, ReoptimizationTrigger, SlotDeviation};
pub use orchestrator::{
    allocate_forecast, allocation_request, derive_features, horizon_rows, plan_route, train_model,
    PipelineInputs, TrainingReport,
};
pub use schedule_report::{ForecastRecord, ScheduleReport};
