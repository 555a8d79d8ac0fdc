use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{integer_program::SolveBudget, AllocationSolver, GeneticAllocator, IntegerProgramAllocator, OptimizerError};

/// used to tag the type of allocation solver when constructing from CLI.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerType {
    #[default]
    IntegerProgram,
    HeuristicSearch,
}

/// configures an [`AllocationSolver`]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum OptimizerConfig {
    IntegerProgram {
        /// maximum branch and bound nodes, unbounded if omitted
        node_limit: Option<u64>,
        /// wall clock limit as a humantime duration such as "10s"
        time_limit: Option<String>,
    },
    HeuristicSearch(GeneticAllocator),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::IntegerProgram {
            node_limit: None,
            time_limit: Some(String::from("10s")),
        }
    }
}

impl OptimizerConfig {
    /// build a new [`OptimizerConfig`] from CLI or file settings. the heuristic search
    /// takes its population settings from the defaults and the given seed.
    pub fn new(
        optimizer: &OptimizerType,
        node_limit: Option<u64>,
        time_limit: Option<&String>,
        seed: u64,
    ) -> OptimizerConfig {
        match optimizer {
            OptimizerType::IntegerProgram => OptimizerConfig::IntegerProgram {
                node_limit,
                time_limit: time_limit.cloned(),
            },
            OptimizerType::HeuristicSearch => OptimizerConfig::HeuristicSearch(GeneticAllocator {
                seed,
                ..Default::default()
            }),
        }
    }

    pub fn optimizer_type(&self) -> OptimizerType {
        match self {
            OptimizerConfig::IntegerProgram { .. } => OptimizerType::IntegerProgram,
            OptimizerConfig::HeuristicSearch(_) => OptimizerType::HeuristicSearch,
        }
    }

    pub fn build(&self) -> Result<Box<dyn AllocationSolver>, OptimizerError> {
        match self {
            OptimizerConfig::IntegerProgram {
                node_limit,
                time_limit,
            } => {
                let time_limit = time_limit.as_deref().map(parse_time_limit).transpose()?;
                let budget = SolveBudget {
                    node_limit: *node_limit,
                    time_limit,
                };
                Ok(Box::new(IntegerProgramAllocator::new(budget)))
            }
            OptimizerConfig::HeuristicSearch(genetic) => {
                genetic.validate()?;
                Ok(Box::new(genetic.clone()))
            }
        }
    }
}

fn parse_time_limit(value: &str) -> Result<Duration, OptimizerError> {
    humantime::parse_duration(value).map_err(|e| {
        OptimizerError::InvalidConfig(format!("time limit '{value}' is not a valid duration: {e}"))
    })
}
