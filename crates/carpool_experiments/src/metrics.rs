//! Metrics extraction from finished simulation worlds.

use bevy_ecs::prelude::World;
use carpool_core::ecs::{Passenger, PassengerState, WorldCounters};
use carpool_core::spawner::AgentSpawner;
use carpool_core::telemetry::SimTelemetry;
use serde::Serialize;

/// Aggregated outcome of a single run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Ticks executed before the run settled or hit its cap.
    pub ticks: u64,
    /// Cars created by the spawner over the whole run.
    pub cars_spawned: usize,
    /// Passengers created by the spawner over the whole run.
    pub passengers_spawned: usize,
    /// Passengers dropped off at their destination.
    pub passengers_delivered: u64,
    /// Passengers still waiting for their confirmed car at the end.
    pub passengers_waiting: usize,
    /// Passengers that never accepted an offer.
    pub passengers_unmatched: usize,
    /// Cars that reached their own destination and left the world.
    pub cars_retired: u64,
    /// Cars still on the road at the end. Zero for a settled run.
    pub cars_in_transit: usize,
    /// Committed single-cell moves across the whole fleet.
    pub movements_total: u64,
    /// Delivered share of the passengers the spawner created.
    pub delivery_rate: f64,
    /// Fleet moves per delivered passenger. Zero with no deliveries.
    pub moves_per_delivery: f64,
}

/// Read the run outcome out of a world the runner has finished with.
pub fn extract_metrics(world: &mut World, ticks: u64) -> SimulationResult {
    let (movements_total, cars_retired, passengers_delivered) = {
        let telemetry = world.resource::<SimTelemetry>();
        (
            telemetry.movements_total,
            telemetry.cars_retired_total,
            telemetry.passengers_delivered_total,
        )
    };
    let (passengers_unmatched, cars_in_transit) = {
        let counters = world.resource::<WorldCounters>();
        (counters.passengers_unmatched, counters.cars_in_transit)
    };
    let (cars_spawned, passengers_spawned) = {
        let spawner = world.resource::<AgentSpawner>();
        (
            spawner.cars.spawned_total(),
            spawner.passengers.spawned_total(),
        )
    };

    let mut passenger_query = world.query::<&Passenger>();
    let passengers_waiting = passenger_query
        .iter(world)
        .filter(|passenger| passenger.state == PassengerState::Waiting)
        .count();

    let delivery_rate = if passengers_spawned > 0 {
        passengers_delivered as f64 / passengers_spawned as f64
    } else {
        0.0
    };
    let moves_per_delivery = if passengers_delivered > 0 {
        movements_total as f64 / passengers_delivered as f64
    } else {
        0.0
    };

    SimulationResult {
        ticks,
        cars_spawned,
        passengers_spawned,
        passengers_delivered,
        passengers_waiting,
        passengers_unmatched,
        cars_retired,
        cars_in_transit,
        movements_total,
        delivery_rate,
        moves_per_delivery,
    }
}
