use itertools::Itertools;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{
    allocation_objective, satisfies_request, AllocationPlan, AllocationRequest, AllocationSolver,
    InfeasibleReason, OptimizerError, PlanStatus,
};

/// fitness added per train of coverage shortfall, in units of slot capacity.
const SHORTFALL_PENALTY: f64 = 1_000.0;
/// individuals copied unchanged into the next generation.
const ELITE_COUNT: usize = 2;
const TOURNAMENT_SIZE: usize = 3;

/// seeded genetic search over per-slot train counts. it never proves optimality, so its
/// plans are at best [`PlanStatus::Feasible`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GeneticAllocator {
    pub population: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub seed: u64,
}

impl Default for GeneticAllocator {
    fn default() -> Self {
        GeneticAllocator {
            population: 60,
            generations: 200,
            mutation_rate: 0.1,
            seed: 42,
        }
    }
}

impl GeneticAllocator {
    pub fn validate(&self) -> Result<(), OptimizerError> {
        if self.population < 2 {
            return Err(OptimizerError::InvalidConfig(format!(
                "genetic search needs a population of at least 2, found {}",
                self.population
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(OptimizerError::InvalidConfig(format!(
                "mutation rate must be in [0, 1], found {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }
}

impl AllocationSolver for GeneticAllocator {
    fn name(&self) -> String {
        String::from("heuristic_search")
    }

    fn allocate(&self, request: &AllocationRequest) -> Result<AllocationPlan, OptimizerError> {
        self.validate()?;
        request.validate()?;
        let bounds = request.slot_bounds();
        let floors = request.coverage_floors();
        // a slot whose floor or operator minimum exceeds its upper bound can never be covered
        let conflict = bounds
            .iter()
            .zip(floors.iter())
            .any(|((lower, upper), floor)| lower.max(floor) > upper);
        if conflict {
            return Ok(AllocationPlan::infeasible(InfeasibleReason::Constraints, request));
        }

        let targets = coverage_targets(&bounds, &floors);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut population = std::iter::once(targets.clone())
            .chain((1..self.population).map(|_| random_genome(&bounds, &mut rng)))
            .collect_vec();
        for _ in 0..self.generations {
            let ranked = rank(population, request, &floors);
            let mut next = ranked.iter().take(ELITE_COUNT).cloned().collect_vec();
            while next.len() < self.population {
                let a = tournament(&ranked, &mut rng);
                let b = tournament(&ranked, &mut rng);
                let mut child = crossover(a, b, &mut rng);
                mutate(&mut child, &bounds, self.mutation_rate, &mut rng);
                descend(&mut child, &targets);
                next.push(child);
            }
            population = next;
        }

        let ranked = rank(population, request, &floors);
        match ranked.into_iter().next() {
            Some(best) if satisfies_request(&best, request) => {
                log::info!(
                    "genetic search over {} slots found a feasible plan with objective {}",
                    request.slots(),
                    allocation_objective(&best, request)
                );
                Ok(AllocationPlan::solved(best, PlanStatus::Feasible, request))
            }
            _ => {
                log::warn!(
                    "genetic search over {} slots ended without a feasible plan",
                    request.slots()
                );
                Ok(AllocationPlan::infeasible(InfeasibleReason::Budget, request))
            }
        }
    }
}

/// the smallest count each slot may take: its coverage floor raised to the operator minimum.
/// callers have already ruled out slots where this exceeds the upper bound.
fn coverage_targets(bounds: &[(u32, u32)], floors: &[u32]) -> Vec<u32> {
    bounds
        .iter()
        .zip(floors.iter())
        .map(|((lower, _), floor)| (*lower).max(*floor))
        .collect_vec()
}

fn random_genome(bounds: &[(u32, u32)], rng: &mut StdRng) -> Vec<u32> {
    bounds
        .iter()
        .map(|(lower, upper)| rng.random_range(*lower..=*upper))
        .collect_vec()
}

/// lower is better: unused capacity plus a heavy penalty per uncovered train.
fn fitness(genome: &[u32], request: &AllocationRequest, floors: &[u32]) -> f64 {
    let shortfall: u32 = genome
        .iter()
        .zip(floors.iter())
        .map(|(x, floor)| floor.saturating_sub(*x))
        .sum();
    allocation_objective(genome, request) + SHORTFALL_PENALTY * request.slot_capacity * shortfall as f64
}

/// sorts a population best first. ties keep their previous order so the search is
/// deterministic for a seed.
fn rank(population: Vec<Vec<u32>>, request: &AllocationRequest, floors: &[u32]) -> Vec<Vec<u32>> {
    population
        .into_iter()
        .map(|g| (OrderedFloat(fitness(&g, request, floors)), g))
        .sorted_by_key(|(f, _)| *f)
        .map(|(_, g)| g)
        .collect_vec()
}

/// best of a few uniformly drawn individuals from a ranked population.
fn tournament<'a>(ranked: &'a [Vec<u32>], rng: &mut StdRng) -> &'a Vec<u32> {
    let best_rank = (0..TOURNAMENT_SIZE)
        .map(|_| rng.random_range(0..ranked.len()))
        .min()
        .unwrap_or(0);
    &ranked[best_rank]
}

fn crossover(a: &[u32], b: &[u32], rng: &mut StdRng) -> Vec<u32> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| if rng.random::<bool>() { *x } else { *y })
        .collect_vec()
}

/// each gene mutates with the given probability, either by a one-train step or by a
/// fresh draw from its bounds.
fn mutate(genome: &mut [u32], bounds: &[(u32, u32)], rate: f64, rng: &mut StdRng) {
    for (gene, (lower, upper)) in genome.iter_mut().zip(bounds.iter()) {
        if rng.random::<f64>() >= rate {
            continue;
        }
        *gene = if rng.random::<bool>() {
            if rng.random::<bool>() {
                gene.saturating_add(1).min(*upper)
            } else {
                gene.saturating_sub(1).max(*lower)
            }
        } else {
            rng.random_range(*lower..=*upper)
        };
    }
}

/// removes one train from every slot running above its target. a gene at or above its target
/// stays within its bounds and keeps its coverage, and the fleet total only shrinks.
fn descend(genome: &mut [u32], targets: &[u32]) {
    for (gene, target) in genome.iter_mut().zip(targets.iter()) {
        if *gene > *target {
            *gene -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::integer_program::SolveBudget;
    use crate::optimize::{coverage_floors, AllocationConstraints, IntegerProgramAllocator};

    #[test]
    fn test_finds_feasible_plan() {
        let request = AllocationRequest::new(vec![100.0, 250.0, 80.0], 5, 100.0);
        let plan = GeneticAllocator::default()
            .allocate(&request)
            .expect("test invariant failed: request should be valid");
        assert_eq!(plan.status, PlanStatus::Feasible);
        assert!(satisfies_request(&plan.allocations, &request));
    }

    #[test]
    fn test_feasible_label_is_honest() {
        let mut rng = StdRng::seed_from_u64(7);
        for seed in 0..20 {
            let forecast = (0..12).map(|_| rng.random::<f64>() * 1_000.0).collect_vec();
            let request = AllocationRequest::new(forecast, 6, 180.0);
            let solver = GeneticAllocator {
                population: 20,
                generations: 15,
                mutation_rate: 0.2,
                seed,
            };
            let plan = solver
                .allocate(&request)
                .expect("test invariant failed: request should be valid");
            if plan.is_feasible() {
                assert!(satisfies_request(&plan.allocations, &request));
            } else {
                assert!(plan.allocations.is_empty());
            }
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let request = AllocationRequest::new(vec![320.0, 40.0, 510.0, 90.0], 4, 150.0);
        let a = GeneticAllocator::default().allocate(&request);
        let b = GeneticAllocator::default().allocate(&request);
        assert_eq!(a, b);
    }

    #[test]
    fn test_never_beats_the_floors() {
        let forecast = vec![320.0, 40.0, 510.0, 90.0];
        let request = AllocationRequest::new(forecast.clone(), 4, 150.0);
        let plan = GeneticAllocator::default()
            .allocate(&request)
            .expect("test invariant failed: request should be valid");
        let floors = coverage_floors(&forecast, 150.0);
        assert!(plan
            .allocations
            .iter()
            .zip(floors.iter())
            .all(|(x, floor)| x >= floor));
    }

    #[test]
    fn test_conflict_is_proven_infeasible() {
        let request = AllocationRequest::new(vec![600.0], 5, 100.0);
        let plan = GeneticAllocator::default()
            .allocate(&request)
            .expect("test invariant failed: request should be valid");
        assert_eq!(plan.status, PlanStatus::Infeasible(InfeasibleReason::Constraints));
        let constraints = AllocationConstraints {
            max_trains_per_slot: Some(1),
            ..Default::default()
        };
        let request = AllocationRequest::new(vec![150.0], 5, 100.0).with_constraints(constraints);
        let plan = GeneticAllocator::default()
            .allocate(&request)
            .expect("test invariant failed: request should be valid");
        assert!(!plan.is_feasible());
    }

    #[test]
    fn test_stays_close_to_optimum_on_long_horizon() {
        let mut rng = StdRng::seed_from_u64(11);
        let forecast = (0..72).map(|_| rng.random::<f64>() * 1_000.0).collect_vec();
        let request = AllocationRequest::new(forecast, 6, 180.0);
        let exact = IntegerProgramAllocator::new(SolveBudget::unlimited())
            .allocate(&request)
            .expect("test invariant failed: request should be valid");
        let heuristic = GeneticAllocator::default()
            .allocate(&request)
            .expect("test invariant failed: request should be valid");
        assert_eq!(exact.status, PlanStatus::Optimal);
        assert_eq!(heuristic.status, PlanStatus::Feasible);
        let optimum = exact.objective.expect("test invariant failed: optimal plan has a cost");
        let cost = heuristic
            .objective
            .expect("test invariant failed: feasible plan has a cost");
        // within 5% of the exact optimum
        assert!(cost <= optimum * 1.05, "heuristic cost {cost} vs optimum {optimum}");
    }

    #[test]
    fn test_descend_stops_at_targets() {
        let bounds = vec![(0, 6), (2, 6), (0, 6)];
        let targets = coverage_targets(&bounds, &[3, 1, 0]);
        assert_eq!(targets, vec![3, 2, 0]);
        let mut genome = vec![5, 2, 1];
        descend(&mut genome, &targets);
        assert_eq!(genome, vec![4, 2, 0]);
        descend(&mut genome, &targets);
        assert_eq!(genome, vec![3, 2, 0]);
    }

    #[test]
    fn test_rejects_bad_config() {
        let solver = GeneticAllocator {
            population: 1,
            ..Default::default()
        };
        let request = AllocationRequest::new(vec![1.0], 1, 1.0);
        assert!(solver.allocate(&request).is_err());
    }
}
