//! Parameter variation for scenario sweeps.
//!
//! A [`ParameterSpace`] lists the fleet and demand budgets to explore;
//! [`ParameterSpace::generate`] expands them into one [`ParameterSet`]
//! per combination and replication, each with its own derived seed.

use std::collections::HashSet;

use carpool_core::scenario::ScenarioParams;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A fleet or demand budget: total limit, per-batch cap, ticks between
/// batches. Mirrors the arguments of the scenario builders.
pub type SpawnBudget = (usize, usize, u32);

/// One runnable parameter combination with its identity and seed.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub params: ScenarioParams,
    /// Shared by every replication of the same combination.
    pub experiment_id: String,
    /// Replication index within the experiment.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(params: ScenarioParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
        }
    }
}

/// A grid of scenario parameters to explore.
///
/// Dimensions left empty fall back to the base parameters, so a space
/// that only varies the car fleet still produces full scenarios.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    base: ScenarioParams,
    car_fleets: Vec<SpawnBudget>,
    passenger_demands: Vec<SpawnBudget>,
    replications: usize,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base: ScenarioParams::default(),
            car_fleets: Vec::new(),
            passenger_demands: Vec::new(),
            replications: 1,
        }
    }

    /// A parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    /// Base parameters for every dimension the space does not vary.
    pub fn base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    /// Car budgets to explore.
    pub fn car_fleet(mut self, fleets: Vec<SpawnBudget>) -> Self {
        self.car_fleets = fleets;
        self
    }

    /// Passenger budgets to explore.
    pub fn passenger_demand(mut self, demands: Vec<SpawnBudget>) -> Self {
        self.passenger_demands = demands;
        self
    }

    /// Seeded repetitions of every combination. At least one.
    pub fn replications(mut self, count: usize) -> Self {
        self.replications = count.max(1);
        self
    }

    fn fleet_values(&self) -> Vec<SpawnBudget> {
        if self.car_fleets.is_empty() {
            vec![(self.base.car_limit, self.base.car_batch, self.base.car_delay)]
        } else {
            self.car_fleets.clone()
        }
    }

    fn demand_values(&self) -> Vec<SpawnBudget> {
        if self.passenger_demands.is_empty() {
            vec![(
                self.base.passenger_limit,
                self.base.passenger_batch,
                self.base.passenger_delay,
            )]
        } else {
            self.passenger_demands.clone()
        }
    }

    fn build_set(
        &self,
        experiment_id: usize,
        run_id: usize,
        fleet: SpawnBudget,
        demand: SpawnBudget,
    ) -> ParameterSet {
        let params = self
            .base
            .clone()
            .with_car_fleet(fleet.0, fleet.1, fleet.2)
            .with_passenger_demand(demand.0, demand.1, demand.2);
        let seed = (experiment_id as u64)
            .wrapping_mul(0x9e37_79b9)
            .wrapping_add(run_id as u64);
        ParameterSet::new(params, format!("exp_{experiment_id}"), run_id, seed)
    }

    /// Expand the grid into one set per combination and replication.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let mut sets = Vec::new();
        let mut experiment_id = 0;
        for &fleet in &self.fleet_values() {
            for &demand in &self.demand_values() {
                for run_id in 0..self.replications {
                    sets.push(self.build_set(experiment_id, run_id, fleet, demand));
                }
                experiment_id += 1;
            }
        }
        sets
    }

    /// Sample `count` distinct combinations from the space at random.
    ///
    /// Returns fewer sets when the space holds fewer than `count`
    /// distinct combinations.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        const MAX_ATTEMPTS: usize = 10_000;

        let mut rng = StdRng::seed_from_u64(seed);
        let fleets = self.fleet_values();
        let demands = self.demand_values();
        let mut seen = HashSet::new();
        let mut sets = Vec::new();
        let mut attempts = 0;
        while sets.len() < count && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let fleet = *fleets.choose(&mut rng).expect("fleet values are never empty");
            let demand = *demands
                .choose(&mut rng)
                .expect("demand values are never empty");
            if !seen.insert((fleet, demand)) {
                continue;
            }
            sets.push(self.build_set(sets.len(), 0, fleet, demand));
        }
        sets
    }
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_every_combination() {
        let sets = ParameterSpace::grid()
            .car_fleet(vec![(5, 1, 1), (10, 1, 1)])
            .passenger_demand(vec![(10, 1, 1), (20, 2, 1), (40, 4, 2)])
            .generate();

        assert_eq!(sets.len(), 6);
        let ids: Vec<&str> = sets.iter().map(|set| set.experiment_id.as_str()).collect();
        assert_eq!(ids, ["exp_0", "exp_1", "exp_2", "exp_3", "exp_4", "exp_5"]);
        let seeds: HashSet<u64> = sets.iter().map(|set| set.seed).collect();
        assert_eq!(seeds.len(), 6);
        assert_eq!(sets[4].params.car_limit, 10);
        assert_eq!(sets[4].params.passenger_batch, 2);
    }

    #[test]
    fn replications_share_the_combination_but_not_the_seed() {
        let sets = ParameterSpace::grid()
            .car_fleet(vec![(5, 1, 1)])
            .replications(3)
            .generate();

        assert_eq!(sets.len(), 3);
        assert!(sets.iter().all(|set| set.experiment_id == "exp_0"));
        assert_eq!(
            sets.iter().map(|set| set.run_id).collect::<Vec<_>>(),
            [0, 1, 2]
        );
        let seeds: HashSet<u64> = sets.iter().map(|set| set.seed).collect();
        assert_eq!(seeds.len(), 3);
        assert!(sets.iter().all(|set| set.params.car_limit == 5));
    }

    #[test]
    fn empty_dimensions_fall_back_to_the_base() {
        let base = ScenarioParams::default().with_passenger_demand(42, 2, 3);
        let sets = ParameterSpace::grid().base(base.clone()).generate();

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].params.car_limit, base.car_limit);
        assert_eq!(sets[0].params.passenger_limit, 42);
        assert_eq!(sets[0].params.passenger_delay, 3);
    }

    #[test]
    fn random_sampling_is_reproducible_and_distinct() {
        let space = ParameterSpace::grid()
            .car_fleet(vec![(4, 1, 1), (8, 1, 1), (16, 2, 1)])
            .passenger_demand(vec![(10, 1, 1), (30, 2, 1), (90, 3, 2)]);

        let first = space.sample_random(4, 9);
        let second = space.sample_random(4, 9);

        assert_eq!(first.len(), 4);
        let combos: HashSet<(usize, usize)> = first
            .iter()
            .map(|set| (set.params.car_limit, set.params.passenger_limit))
            .collect();
        assert_eq!(combos.len(), 4);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.seed, b.seed);
            assert_eq!(a.params.car_limit, b.params.car_limit);
            assert_eq!(a.params.passenger_limit, b.params.passenger_limit);
        }
    }

    #[test]
    fn sampling_a_small_space_stops_at_its_size() {
        let space = ParameterSpace::grid().car_fleet(vec![(4, 1, 1), (8, 1, 1)]);
        let sets = space.sample_random(10, 1);
        assert_eq!(sets.len(), 2);
    }
}
