//! Simulation runner: advances the clock and runs the staged schedule.
//!
//! Every tick runs the same pipeline: spawn new agents, let cars offer
//! rides, let passengers confirm one, rotate the lights, move the cars,
//! exchange passengers, snapshot the tick, then despawn retired cars.
//! Stages are strictly ordered so a run is a pure function of the
//! scenario parameters and the seed.

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::TickClock;
use crate::ecs::WorldCounters;
use crate::spawner::AgentSpawner;
use crate::systems::{
    confirm::confirm_rides_system,
    lifecycle::retire_cars_system,
    movement::move_cars_system,
    notify::notify_passengers_system,
    pickup_dropoff::pick_drop_passengers_system,
    signal_tick::tick_signals_system,
    snapshot::telemetry_snapshot_system,
    spawner::spawn_agents_system,
};

/// Builds the per-tick schedule. The snapshot stage sits before the
/// retire stage so a retiring car still reports its final movement.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            spawn_agents_system,
            apply_deferred,
            notify_passengers_system,
            confirm_rides_system,
            tick_signals_system,
            move_cars_system,
            pick_drop_passengers_system,
            telemetry_snapshot_system,
            retire_cars_system,
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

/// Advances the clock by one tick and runs the schedule once.
pub fn run_tick(world: &mut World, schedule: &mut Schedule) {
    world.resource_mut::<TickClock>().advance();
    schedule.run(world);
}

pub fn run_ticks(world: &mut World, schedule: &mut Schedule, ticks: u64) {
    for _ in 0..ticks {
        run_tick(world, schedule);
    }
}

/// A world is settled once both spawn budgets are spent and every car
/// has retired. Passengers may remain, arrived or stranded.
pub fn simulation_settled(world: &World) -> bool {
    world.resource::<AgentSpawner>().exhausted()
        && world.resource::<WorldCounters>().cars_in_transit == 0
}

/// Runs ticks until the world settles or `max_ticks` is reached.
/// Returns the number of ticks executed.
pub fn run_until_settled(world: &mut World, schedule: &mut Schedule, max_ticks: u64) -> u64 {
    let mut ticks = 0;
    while ticks < max_ticks && !simulation_settled(world) {
        run_tick(world, schedule);
        ticks += 1;
    }
    ticks
}
