use bevy_ecs::prelude::World;

use crate::clock::TickClock;
use crate::ecs::{KillList, SimRng, WorldCounters};
use crate::grid::CityGrid;
use crate::routing::RouteCache;
use crate::scenario::params::ScenarioParams;
use crate::signal::Signals;
use crate::spatial::GridIndex;
use crate::spawner::AgentSpawner;
use crate::telemetry::{SimSnapshotConfig, SimSnapshots, SimTelemetry};

/// Install every resource a run needs into `world`. The caller keeps
/// ownership of the schedule; see [`crate::runner`].
pub fn build_scenario(world: &mut World, grid: CityGrid, params: ScenarioParams) {
    world.insert_resource(TickClock::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(match params.max_snapshots {
        Some(max_snapshots) => SimSnapshotConfig { max_snapshots },
        None => SimSnapshotConfig::default(),
    });
    world.insert_resource(SimSnapshots::default());
    world.insert_resource(WorldCounters::default());
    world.insert_resource(KillList::default());
    world.insert_resource(GridIndex::new());
    world.insert_resource(RouteCache::new(params.route_cache_capacity));

    let seed = params.seed.unwrap_or(0);
    world.insert_resource(SimRng::seeded(seed ^ 0x5eed_cafe));
    world.insert_resource(AgentSpawner::new(&params, seed.wrapping_add(0xcafe_babe)));

    world.insert_resource(Signals::from_grid(&grid));
    world.insert_resource(grid);
}
