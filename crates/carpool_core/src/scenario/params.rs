/// Default budgets for an interactive run.
const DEFAULT_CAR_LIMIT: usize = 10;
const DEFAULT_PASSENGER_LIMIT: usize = 20;

/// Everything a scenario needs besides the city layout itself.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    /// Total cars the run may create.
    pub car_limit: usize,
    /// Cars released per batch.
    pub car_batch: usize,
    /// Ticks between car batches. Zero is treated as one.
    pub car_delay: u32,
    /// Total passengers the run may create.
    pub passenger_limit: usize,
    /// Passengers released per batch.
    pub passenger_batch: usize,
    /// Ticks between passenger batches. Zero is treated as one.
    pub passenger_delay: u32,
    pub seed: Option<u64>,
    /// Optional snapshot history cap. If None, the default is used.
    pub max_snapshots: Option<usize>,
    pub route_cache_capacity: usize,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            car_limit: DEFAULT_CAR_LIMIT,
            car_batch: 1,
            car_delay: 1,
            passenger_limit: DEFAULT_PASSENGER_LIMIT,
            passenger_batch: 1,
            passenger_delay: 1,
            seed: None,
            max_snapshots: None,
            route_cache_capacity: 5_000,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the car budget: total limit, per-batch cap, ticks between batches.
    pub fn with_car_fleet(mut self, limit: usize, batch: usize, delay: u32) -> Self {
        self.car_limit = limit;
        self.car_batch = batch;
        self.car_delay = delay;
        self
    }

    /// Set the passenger budget: total limit, per-batch cap, ticks between batches.
    pub fn with_passenger_demand(mut self, limit: usize, batch: usize, delay: u32) -> Self {
        self.passenger_limit = limit;
        self.passenger_batch = batch;
        self.passenger_delay = delay;
        self
    }

    pub fn with_max_snapshots(mut self, max_snapshots: usize) -> Self {
        self.max_snapshots = Some(max_snapshots);
        self
    }

    /// A scenario that never spawns on its own, for tests that place
    /// their agents by hand.
    pub fn without_spawning(self) -> Self {
        self.with_car_fleet(0, 0, 1).with_passenger_demand(0, 0, 1)
    }
}
