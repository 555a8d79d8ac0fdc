use std::path::PathBuf;

use indexmap::IndexMap;
use itertools::Itertools;
use railcast_core::{
    capacity::CapacityEstimator,
    feature::{self, FeatureConfig, FeatureRow, RouteEncoder},
    forecast::{training_set, FeatureMatrix, ForecastMetrics, Forecaster, LinearForecaster, NaiveForecaster},
    model::{datetime_codec, DemandObservation, EventObservation, FleetRoster},
    optimize::{AllocationConstraints, AllocationPlan, AllocationRequest, AllocationSolver},
};
use serde::{Deserialize, Serialize};

use super::{replan, split_by_date, FeedbackReport, ReoptimizationTrigger, ScheduleReport};
use crate::{
    app::PipelineConfig,
    io::{csv_ops, model_store::ModelArtifact},
    RailcastError,
};

/// locations of the pipeline's input tables.
#[derive(Clone, Debug)]
pub struct PipelineInputs {
    pub data_path: PathBuf,
    pub fleet_path: PathBuf,
    pub events_path: Option<PathBuf>,
}

type LoadedInputs = (Vec<DemandObservation>, Option<Vec<EventObservation>>, FleetRoster);

impl PipelineInputs {
    pub fn load(&self) -> Result<LoadedInputs, RailcastError> {
        let demand = csv_ops::read_demand(&self.data_path)?;
        let events = self
            .events_path
            .as_ref()
            .map(|p| csv_ops::read_events(p))
            .transpose()?;
        let fleet = csv_ops::read_fleet(&self.fleet_path)?;
        log::info!(
            "loaded {} demand observations, {} events and {} trains ({} available)",
            demand.len(),
            events.as_ref().map(|e| e.len()).unwrap_or(0),
            fleet.trains().len(),
            fleet.fleet_size()
        );
        Ok((demand, events, fleet))
    }
}

/// evaluation of the trained model and the persistence baseline on the held-out days.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    /// metrics keyed by forecaster name, empty when no labelled rows were held out
    pub metrics: IndexMap<String, ForecastMetrics>,
}

pub fn derive_features(
    demand: &[DemandObservation],
    events: Option<&[EventObservation]>,
    fleet: &FleetRoster,
    config: &FeatureConfig,
) -> Result<Vec<FeatureRow>, RailcastError> {
    let rows = feature::derive(demand, events, fleet, config)?;
    let labelled = rows.iter().filter(|r| r.is_labelled()).count();
    log::info!("derived {} feature rows ({labelled} labelled)", rows.len());
    Ok(rows)
}

/// fits the ridge forecaster on all but the trailing `test_days` and evaluates it against
/// the persistence baseline on the held-out rows.
pub fn train_model(
    rows: Vec<FeatureRow>,
    config: &PipelineConfig,
) -> Result<(ModelArtifact, TrainingReport), RailcastError> {
    let encoder = RouteEncoder::from_rows(&rows);
    let (train, test) = split_by_date(rows, config.test_days);
    let (train_x, train_y) = training_set(&train, &encoder)?;
    if train_x.is_empty() {
        return Err(RailcastError::InvalidUserInput(format!(
            "no labelled rows remain for training after holding out {} days",
            config.test_days
        )));
    }
    let model = LinearForecaster::fit(&train_x, &train_y, config.ridge)?;

    let mut metrics = IndexMap::new();
    let (test_x, test_y) = training_set(&test, &encoder)?;
    if test_x.is_empty() {
        log::warn!("no labelled rows held out for evaluation");
    } else {
        let forecasters: [&dyn Forecaster; 2] = [&model, &NaiveForecaster];
        for forecaster in forecasters {
            let predicted = forecaster.predict(&test_x)?;
            let m = ForecastMetrics::evaluate(&test_y, &predicted)?;
            log::info!(
                "{} on {} held-out rows: rmse {:.3}, mae {:.3}, r2 {:.3}",
                forecaster.name(),
                m.n,
                m.rmse,
                m.mae,
                m.r2
            );
            metrics.insert(forecaster.name(), m);
        }
    }
    let report = TrainingReport {
        train_rows: train_x.n_rows(),
        test_rows: test_x.n_rows(),
        metrics,
    };
    let artifact = ModelArtifact {
        model,
        encoder,
        feature_config: config.feature_config(),
    };
    Ok((artifact, report))
}

/// the last `horizon` rows of a route in time order.
pub fn horizon_rows(rows: &[FeatureRow], route: &str, horizon: usize) -> Vec<FeatureRow> {
    let route_rows = rows.iter().filter(|r| r.route == route).collect_vec();
    let skip = route_rows.len().saturating_sub(horizon);
    route_rows.into_iter().skip(skip).cloned().collect_vec()
}

/// builds an allocation request for a forecast. slot capacity is the fleet's mean capacity
/// at the target occupancy. fleet size is the available train count unless overridden.
pub fn allocation_request(
    forecast: Vec<f64>,
    fleet: &FleetRoster,
    config: &PipelineConfig,
    constraints: AllocationConstraints,
) -> Result<AllocationRequest, RailcastError> {
    let estimator = CapacityEstimator::new(fleet, config.occupancy_target)?;
    let fleet_size = config.fleet_size.unwrap_or(estimator.fleet_size());
    let request = AllocationRequest::new(forecast, fleet_size, estimator.effective_capacity())
        .with_constraints(constraints);
    Ok(request)
}

pub fn allocate_forecast(
    forecast: Vec<f64>,
    fleet: &FleetRoster,
    config: &PipelineConfig,
    constraints: AllocationConstraints,
    solver: &dyn AllocationSolver,
) -> Result<(AllocationRequest, AllocationPlan), RailcastError> {
    let request = allocation_request(forecast, fleet, config, constraints)?;
    let plan = solver.allocate(&request)?;
    log::info!(
        "{} produced a {:?} plan over {} slots",
        solver.name(),
        plan.status,
        request.slots()
    );
    Ok((request, plan))
}

/// forecasts the last `horizon` rows of a route with the trained model and allocates
/// trains against the forecast. slots are sized with the model's occupancy target. with `feedback` set, the realized demand of those rows is
/// compared against the forecast and the plan is revised if the trigger fires.
#[allow(clippy::too_many_arguments)]
pub fn plan_route(
    rows: &[FeatureRow],
    artifact: &ModelArtifact,
    fleet: &FleetRoster,
    config: &PipelineConfig,
    route: Option<&str>,
    constraints: AllocationConstraints,
    solver: &dyn AllocationSolver,
    feedback: bool,
) -> Result<(ScheduleReport, Option<FeedbackReport>), RailcastError> {
    let config = &config.with_feature_config(&artifact.feature_config);
    let route = match route {
        Some(route) => route.to_string(),
        None => rows
            .first()
            .map(|r| r.route.clone())
            .ok_or_else(|| RailcastError::InvalidUserInput(String::from("no feature rows to plan from")))?,
    };
    let horizon = horizon_rows(rows, &route, config.horizon);
    if horizon.is_empty() {
        return Err(RailcastError::InvalidUserInput(format!(
            "route '{route}' has no demand observations"
        )));
    }
    if horizon.len() < config.horizon {
        log::warn!(
            "route '{route}' has {} rows, shorter than the {}-slot horizon",
            horizon.len(),
            config.horizon
        );
    }
    let matrix = FeatureMatrix::from_rows(&horizon, &artifact.encoder)?;
    let forecast = artifact.model.predict(&matrix)?;
    let (request, plan) = allocate_forecast(forecast, fleet, config, constraints, solver)?;

    let bucket = config.time_bucket.duration();
    let slot_starts = horizon
        .iter()
        .map(|r| datetime_codec::format_datetime(&(r.timestamp + bucket)))
        .collect_vec();

    let feedback_report = if feedback {
        let realized = horizon.iter().map(|r| r.target_next_hour).collect_vec();
        let trigger = ReoptimizationTrigger::new(config.reopt_threshold);
        Some(replan(solver, &request, &plan, &realized, &trigger)?)
    } else {
        None
    };

    let report = ScheduleReport {
        route: Some(route),
        optimizer: solver.name(),
        fleet_size: request.fleet_size,
        slot_capacity: request.slot_capacity,
        slot_starts,
        forecast: request.forecast,
        plan,
    };
    Ok((report, feedback_report))
}
