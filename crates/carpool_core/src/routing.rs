//! Route searches over the one-way road network.
//!
//! All searches expand breadth-first through the drivable exits of each
//! cell, so the first time a goal is seen the route to it is one of the
//! shortest. Cars never drive onto sidewalks; a search for a sidewalk
//! anchor therefore finishes on a road cell adjacent to it, and the
//! returned route ends there.

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;

use bevy_ecs::prelude::{Entity, Resource};
use lru::LruCache;
use pathfinding::directed::bfs::bfs;

use crate::grid::{CityGrid, Direction, GridPos};
use crate::spatial::GridIndex;

/// Cache of shortest routes between road cells. Routes are directed, so
/// keys are not canonicalized. Only successful searches are cached.
#[derive(Resource)]
pub struct RouteCache {
    cache: LruCache<(GridPos, GridPos), Vec<Direction>>,
}

impl RouteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(
                NonZeroUsize::new(capacity).expect("cache size must be non-zero"),
            ),
        }
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new(5_000)
    }
}

/// Shortest drivable route from `origin` onto `destination` itself, for
/// cars heading to their own retirement cell. Returns `None` when the
/// road network offers no path.
pub fn shortest_route_home(
    grid: &CityGrid,
    cache: &mut RouteCache,
    origin: GridPos,
    destination: GridPos,
) -> Option<Vec<Direction>> {
    if let Some(route) = cache.cache.get(&(origin, destination)) {
        return Some(route.clone());
    }
    let path = bfs(
        &origin,
        |&cell| {
            grid.exits(cell)
                .into_iter()
                .filter_map(move |direction| grid.step(cell, direction))
                .collect::<Vec<_>>()
        },
        |&cell| cell == destination,
    )?;
    let route = directions_along(&path);
    cache.cache.put((origin, destination), route.clone());
    Some(route)
}

fn directions_along(path: &[GridPos]) -> Vec<Direction> {
    path.windows(2)
        .map(|pair| {
            Direction::from_delta(pair[1].x - pair[0].x, pair[1].y - pair[0].y)
                .expect("consecutive path cells must be adjacent")
        })
        .collect()
}

/// Find routes from `origin` toward every target anchor in one search.
///
/// A target is hit when the search dequeues a road cell adjacent to its
/// anchor; the hit removes the target and records the route to that
/// cell. Results come back in discovery order, nearest first. Targets
/// unreachable from `origin` are silently absent from the result.
pub fn dispatch_routes(
    grid: &CityGrid,
    origin: GridPos,
    targets: &[(Entity, GridPos)],
) -> Vec<(Entity, Vec<Direction>)> {
    let mut routes = Vec::new();
    if targets.is_empty() {
        return routes;
    }
    let mut live: Vec<(Entity, GridPos)> = targets.to_vec();
    let mut frontier: VecDeque<(GridPos, Vec<Direction>)> = VecDeque::new();
    let mut visited: HashSet<GridPos> = HashSet::new();
    frontier.push_back((origin, Vec::new()));
    visited.insert(origin);

    while let Some((cell, route)) = frontier.pop_front() {
        live.retain(|&(entity, anchor)| {
            if cell.is_adjacent(&anchor) {
                routes.push((entity, route.clone()));
                false
            } else {
                true
            }
        });
        if live.is_empty() {
            break;
        }
        for direction in grid.exits(cell) {
            if let Some(next) = grid.step(cell, direction) {
                if visited.insert(next) {
                    let mut next_route = route.clone();
                    next_route.push(direction);
                    frontier.push_back((next, next_route));
                }
            }
        }
    }
    routes
}

/// Find the passenger closest to `origin` that still needs a ride,
/// together with the route to the road cell beside them.
///
/// The first dequeued cell with an eligible passenger next to it wins.
/// Its neighbors are checked in [`Direction::ALL`] order; the first
/// cell holding an eligible passenger settles the pick, and passengers
/// sharing that cell tie-break by lowest entity id.
pub fn nearest_pickup(
    grid: &CityGrid,
    index: &GridIndex,
    origin: GridPos,
    mut needs_ride: impl FnMut(Entity) -> bool,
) -> Option<(Entity, Vec<Direction>)> {
    let mut frontier: VecDeque<(GridPos, Vec<Direction>)> = VecDeque::new();
    let mut visited: HashSet<GridPos> = HashSet::new();
    frontier.push_back((origin, Vec::new()));
    visited.insert(origin);

    while let Some((cell, route)) = frontier.pop_front() {
        for neighbor in grid.neighbors(cell) {
            let winner = index
                .passengers_at(neighbor)
                .iter()
                .copied()
                .filter(|&passenger| needs_ride(passenger))
                .min();
            if let Some(winner) = winner {
                return Some((winner, route));
            }
        }
        for direction in grid.exits(cell) {
            if let Some(next) = grid.step(cell, direction) {
                if visited.insert(next) {
                    let mut next_route = route.clone();
                    next_route.push(direction);
                    frontier.push_back((next, next_route));
                }
            }
        }
    }
    None
}
