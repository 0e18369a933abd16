//! Agent spawners: release cars and passengers in periodic batches.
//!
//! Each population has a total budget, a per-batch cap, and a delay in
//! ticks between batches. Placement picks random free cells by
//! rejection sampling, which assumes the layout keeps enough free road
//! and sidewalk cells; when sampling saturates the rest of the batch is
//! skipped and retried at the next release.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::{CityGrid, GridPos};
use crate::scenario::ScenarioParams;

/// Attempts per placement before giving up on a saturated layout.
const MAX_PLACEMENT_ATTEMPTS: usize = 2000;

/// Release schedule for one agent population.
#[derive(Debug, Clone, Copy)]
pub struct SpawnTrack {
    limit: usize,
    batch: usize,
    delay: u32,
    countdown: u32,
    spawned_total: usize,
}

impl SpawnTrack {
    fn new(limit: usize, batch: usize, delay: u32) -> Self {
        // A zero delay would never come due again once elapsed.
        let delay = delay.max(1);
        Self {
            limit,
            batch,
            delay,
            countdown: delay,
            spawned_total: 0,
        }
    }

    /// Advance the countdown one tick and return how many agents may be
    /// released now. Zero on ticks between batches.
    pub fn release(&mut self) -> usize {
        self.countdown -= 1;
        if self.countdown > 0 {
            return 0;
        }
        self.countdown = self.delay;
        self.batch.min(self.limit - self.spawned_total)
    }

    /// Record one successfully placed agent.
    pub fn record_spawn(&mut self) {
        self.spawned_total += 1;
    }

    pub fn exhausted(&self) -> bool {
        self.spawned_total >= self.limit
    }

    pub fn spawned_total(&self) -> usize {
        self.spawned_total
    }
}

/// Spawner state for both populations, driven once per tick.
#[derive(Resource)]
pub struct AgentSpawner {
    pub rng: StdRng,
    pub cars: SpawnTrack,
    pub passengers: SpawnTrack,
}

impl AgentSpawner {
    pub fn new(params: &ScenarioParams, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cars: SpawnTrack::new(params.car_limit, params.car_batch, params.car_delay),
            passengers: SpawnTrack::new(
                params.passenger_limit,
                params.passenger_batch,
                params.passenger_delay,
            ),
        }
    }

    /// True once both budgets are fully spent.
    pub fn exhausted(&self) -> bool {
        self.cars.exhausted() && self.passengers.exhausted()
    }
}

/// Sample a random cell satisfying `is_candidate`, or `None` when the
/// sampler saturates.
pub fn random_free_cell(
    grid: &CityGrid,
    rng: &mut StdRng,
    mut is_candidate: impl FnMut(GridPos) -> bool,
) -> Option<GridPos> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = GridPos::new(rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()));
        if is_candidate(pos) {
            return Some(pos);
        }
    }
    None
}
