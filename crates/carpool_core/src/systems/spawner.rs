//! Spawner system: release new cars and passengers on their batch cadence.

use bevy_ecs::prelude::{Commands, Res, ResMut};

use crate::clock::TickClock;
use crate::ecs::{Car, Passenger, Position, WorldCounters};
use crate::grid::{CityGrid, Tile};
use crate::spatial::GridIndex;
use crate::spawner::{random_free_cell, AgentSpawner};

pub fn spawn_agents_system(
    mut commands: Commands,
    clock: Res<TickClock>,
    grid: Res<CityGrid>,
    mut spawner: ResMut<AgentSpawner>,
    mut index: ResMut<GridIndex>,
    mut counters: ResMut<WorldCounters>,
) {
    let spawner = &mut *spawner;

    // Passengers release before cars, keeping entity allocation order
    // stable for a given seed.
    let passenger_allowance = spawner.passengers.release();
    for _ in 0..passenger_allowance {
        let Some(start) = random_free_cell(&grid, &mut spawner.rng, |pos| {
            *grid.tile(pos) == Tile::Sidewalk && index.passengers_at(pos).is_empty()
        }) else {
            break;
        };
        let Some(destination) = random_free_cell(&grid, &mut spawner.rng, |pos| {
            *grid.tile(pos) == Tile::Sidewalk
                && pos != start
                && index.passengers_at(pos).is_empty()
        }) else {
            break;
        };
        let entity = commands
            .spawn((Passenger::new(destination), Position(start)))
            .id();
        index.insert_passenger(entity, start);
        counters.passengers_unmatched += 1;
        spawner.passengers.record_spawn();
    }

    let car_allowance = spawner.cars.release();
    for _ in 0..car_allowance {
        let Some(start) = random_free_cell(&grid, &mut spawner.rng, |pos| {
            matches!(grid.tile(pos), Tile::Road(_)) && index.cars_at(pos).is_empty()
        }) else {
            break;
        };
        let facing = match grid.tile(start) {
            Tile::Road(direction) => *direction,
            _ => continue,
        };
        let Some(destination) = random_free_cell(&grid, &mut spawner.rng, |pos| {
            matches!(grid.tile(pos), Tile::Road(_))
                && pos != start
                && index.cars_at(pos).is_empty()
        }) else {
            break;
        };
        let entity = commands
            .spawn((Car::new(destination, facing, clock.now()), Position(start)))
            .id();
        index.insert_car(entity, start);
        counters.cars_in_transit += 1;
        spawner.cars.record_spawn();
    }
}
