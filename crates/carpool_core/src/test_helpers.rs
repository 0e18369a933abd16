//! Test helpers for common test setup and utilities.
//!
//! Small hand-built cities plus spawn shortcuts, shared by the system
//! tests to avoid repeating world scaffolding.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::TickClock;
use crate::ecs::{Car, Passenger, Position, WorldCounters};
use crate::grid::{CityGrid, Direction, GridPos, IntersectionId, IntersectionSpec, Tile};
use crate::scenario::{build_scenario, ScenarioParams};
use crate::spatial::GridIndex;

/// A `length` by 2 city: the bottom row is a one-way road flowing
/// right, the top row is sidewalk. No intersections.
pub fn corridor_city(length: i32) -> CityGrid {
    let mut tiles = vec![Tile::Road(Direction::Right); length as usize];
    tiles.extend(vec![Tile::Sidewalk; length as usize]);
    CityGrid::new(length, 2, tiles, Vec::new())
}

/// A city whose perimeter is a one-way clockwise ring road with a
/// signalled corner at each turn. Interior cells are sidewalk.
pub fn ring_city(width: i32, height: i32) -> CityGrid {
    let corner = |position, stop, go| IntersectionSpec {
        position,
        directions_to_stop: vec![stop],
        directions_to_go: vec![go],
    };
    let intersections = vec![
        corner(GridPos::new(0, 0), Direction::Left, Direction::Up),
        corner(GridPos::new(width - 1, 0), Direction::Down, Direction::Left),
        corner(GridPos::new(0, height - 1), Direction::Up, Direction::Right),
        corner(
            GridPos::new(width - 1, height - 1),
            Direction::Right,
            Direction::Down,
        ),
    ];

    let mut tiles = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let corner_id = intersections
                .iter()
                .position(|spec| spec.position == GridPos::new(x, y));
            let tile = if let Some(id) = corner_id {
                Tile::Intersection(IntersectionId(id))
            } else if y == height - 1 {
                Tile::Road(Direction::Right)
            } else if y == 0 {
                Tile::Road(Direction::Left)
            } else if x == width - 1 {
                Tile::Road(Direction::Down)
            } else if x == 0 {
                Tile::Road(Direction::Up)
            } else {
                Tile::Sidewalk
            };
            tiles.push(tile);
        }
    }
    CityGrid::new(width, height, tiles, intersections)
}

/// A 5x5 city with one signalled crossing at the center: a rightward
/// road along `y = 2` meets an upward road along `x = 2`.
pub fn crossing_city() -> CityGrid {
    let center = GridPos::new(2, 2);
    let mut tiles = Vec::with_capacity(25);
    for y in 0..5 {
        for x in 0..5 {
            let tile = if GridPos::new(x, y) == center {
                Tile::Intersection(IntersectionId(0))
            } else if y == 2 {
                Tile::Road(Direction::Right)
            } else if x == 2 {
                Tile::Road(Direction::Up)
            } else {
                Tile::Sidewalk
            };
            tiles.push(tile);
        }
    }
    let intersections = vec![IntersectionSpec {
        position: center,
        directions_to_stop: vec![Direction::Right, Direction::Up],
        directions_to_go: vec![Direction::Right, Direction::Up],
    }];
    CityGrid::new(5, 5, tiles, intersections)
}

/// A world built from `grid` with all scenario resources in place, a
/// fixed seed, and both spawn budgets set to zero so tests place their
/// own agents.
pub fn test_world(grid: CityGrid) -> World {
    let mut world = World::new();
    build_scenario(
        &mut world,
        grid,
        ScenarioParams::default().without_spawning().with_seed(7),
    );
    world
}

/// Spawns a car on `start` facing along the road there, registered in
/// the spatial index and the transit counter.
///
/// # Panics
///
/// Panics if `start` is not a road cell.
pub fn spawn_test_car(world: &mut World, start: GridPos, destination: GridPos) -> Entity {
    let facing = match world.resource::<CityGrid>().tile(start) {
        Tile::Road(direction) => *direction,
        other => panic!("test cars start on road cells, found {:?} at {:?}", other, start),
    };
    let spawned_at = world.resource::<TickClock>().now();
    let entity = world
        .spawn((Car::new(destination, facing, spawned_at), Position(start)))
        .id();
    world.resource_mut::<GridIndex>().insert_car(entity, start);
    world.resource_mut::<WorldCounters>().cars_in_transit += 1;
    entity
}

/// Spawns a passenger on `start` in [`crate::ecs::PassengerState::NeedsRide`],
/// registered in the spatial index and the unmatched counter.
pub fn spawn_test_passenger(world: &mut World, start: GridPos, destination: GridPos) -> Entity {
    let entity = world
        .spawn((Passenger::new(destination), Position(start)))
        .id();
    world
        .resource_mut::<GridIndex>()
        .insert_passenger(entity, start);
    world.resource_mut::<WorldCounters>().passengers_unmatched += 1;
    entity
}
