//! Movement stage: the long term, temporary, and immediate driving
//! decisions.
//!
//! Cars act in entity order. A car without an objective first tries to
//! acquire one from its onboard passengers and pending reservation.
//! With an empty route it then either waits for the pickup stage,
//! drifts opportunistically while unmatched passengers remain, retires
//! on its own destination, or plots the route home and takes its first
//! step. With a route it advances one cell, unless the target refuses
//! it, in which case the step is requeued and the car holds.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, ParamSet, Query, Res, ResMut, With};
use rand::Rng;

use crate::ecs::{
    Car, KillList, MoveOutcome, Objective, Passenger, PassengerState, Position, SimRng,
    WorldCounters,
};
use crate::grid::{CityGrid, Direction, GridPos, Tile};
use crate::routing::{dispatch_routes, shortest_route_home, RouteCache};
use crate::signal::Signals;
use crate::spatial::GridIndex;
use crate::telemetry::SimTelemetry;

/// A step is refused when the target cell's light is not serving the
/// car's direction of travel, or when a car that has not parked on its
/// own destination occupies the target.
fn step_refused(
    grid: &CityGrid,
    signals: &Signals,
    index: &GridIndex,
    destinations: &HashMap<Entity, GridPos>,
    target: GridPos,
    facing: Direction,
) -> bool {
    if let Tile::Intersection(id) = grid.tile(target) {
        if !signals.admits(*id, facing) {
            return true;
        }
    }
    index
        .cars_at(target)
        .iter()
        .any(|other| destinations.get(other).is_some_and(|&dest| dest != target))
}

/// Direction an idle car may drift in from its current cell, if any.
/// Leaving an intersection requires holding its green window.
fn cruise_direction(
    grid: &CityGrid,
    signals: &Signals,
    rng: &mut SimRng,
    cell: GridPos,
    facing: Direction,
) -> Option<Direction> {
    match grid.tile(cell) {
        Tile::Road(direction) => Some(*direction),
        Tile::Intersection(id) => {
            if !signals.admits(*id, facing) {
                return None;
            }
            let choices = &grid.intersection(*id).directions_to_go;
            if choices.is_empty() {
                return None;
            }
            Some(choices[rng.0.gen_range(0..choices.len())])
        }
        Tile::Sidewalk | Tile::Building => None,
    }
}

#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn move_cars_system(
    grid: Res<CityGrid>,
    signals: Res<Signals>,
    mut rng: ResMut<SimRng>,
    mut counters: ResMut<WorldCounters>,
    mut telemetry: ResMut<SimTelemetry>,
    mut kill_list: ResMut<KillList>,
    mut index: ResMut<GridIndex>,
    mut cache: ResMut<RouteCache>,
    passengers: Query<&Passenger>,
    mut queries: ParamSet<(
        Query<(Entity, &mut Car, &mut Position)>,
        Query<&mut Position, With<Passenger>>,
    )>,
) {
    let mut car_ids: Vec<Entity> = queries.p0().iter().map(|(entity, _, _)| entity).collect();
    car_ids.sort();

    // Destinations are fixed for the whole stage; collecting them once
    // lets the occupancy check run without touching the car query.
    let destinations: HashMap<Entity, GridPos> = queries
        .p0()
        .iter()
        .map(|(entity, car, _)| (entity, car.destination))
        .collect();

    for car_entity in car_ids {
        let Some(&destination) = destinations.get(&car_entity) else {
            continue;
        };

        // Fresh tick: last tick's realized movement no longer applies.
        let (cell, facing, interest) = {
            let mut car_query = queries.p0();
            let Ok((_, mut car, position)) = car_query.get_mut(car_entity) else {
                continue;
            };
            car.last_move = MoveOutcome::Hold;
            let mut interest: Vec<Entity> = Vec::new();
            if car.objective.is_none() {
                interest.extend(car.onboard.iter().copied());
                if let Some(reservation) = &car.reservation {
                    interest.push(reservation.passenger);
                }
            }
            (position.0, car.facing, interest)
        };

        if !interest.is_empty() {
            let targets: Vec<(Entity, GridPos)> = interest
                .iter()
                .filter_map(|&passenger_entity| {
                    let passenger = passengers.get(passenger_entity).ok()?;
                    let anchor = match passenger.state {
                        PassengerState::Traveling => Some(passenger.destination),
                        PassengerState::Waiting => index.passenger_cell(passenger_entity),
                        _ => None,
                    }?;
                    Some((passenger_entity, anchor))
                })
                .collect();
            let routes = dispatch_routes(&grid, cell, &targets);
            // Earliest discovery wins ties, so a later equal-length
            // route never displaces the first.
            let best = routes.into_iter().reduce(|best, candidate| {
                if candidate.1.len() < best.1.len() {
                    candidate
                } else {
                    best
                }
            });
            if let Some((target, route)) = best {
                let mut car_query = queries.p0();
                if let Ok((_, mut car, _)) = car_query.get_mut(car_entity) {
                    car.objective = Some(Objective::Passenger(target));
                    car.route = route.into();
                }
            }
        }

        // The route may have been assigned just above; read it fresh.
        let (route_is_empty, objective) = {
            let car_query = queries.p0();
            let Ok((_, car, _)) = car_query.get(car_entity) else {
                continue;
            };
            (car.route.is_empty(), car.objective)
        };

        let (next_direction, from_route) = if route_is_empty {
            if matches!(objective, Some(Objective::Passenger(_))) {
                // The pickup stage will handle the adjacent objective.
                continue;
            }
            if counters.passengers_unmatched > 0 {
                match cruise_direction(&grid, &signals, &mut rng, cell, facing) {
                    Some(direction) => (direction, false),
                    None => continue,
                }
            } else if cell == destination {
                {
                    let mut car_query = queries.p0();
                    if let Ok((_, mut car, _)) = car_query.get_mut(car_entity) {
                        car.last_move = MoveOutcome::Retired;
                    }
                }
                counters.cars_in_transit = counters.cars_in_transit.saturating_sub(1);
                telemetry.add_retired_car();
                kill_list.0.push(car_entity);
                continue;
            } else {
                let Some(route) = shortest_route_home(&grid, &mut cache, cell, destination)
                else {
                    panic!(
                        "car at {:?} has no route home to {:?}; the road network must stay strongly connected",
                        cell, destination
                    );
                };
                let mut car_query = queries.p0();
                let Ok((_, mut car, _)) = car_query.get_mut(car_entity) else {
                    continue;
                };
                car.objective = Some(Objective::Home);
                car.route = route.into();
                match car.route.pop_front() {
                    Some(direction) => (direction, true),
                    None => continue,
                }
            }
        } else {
            let mut car_query = queries.p0();
            let Ok((_, mut car, _)) = car_query.get_mut(car_entity) else {
                continue;
            };
            match car.route.pop_front() {
                Some(direction) => (direction, true),
                None => continue,
            }
        };

        let target = match grid.step(cell, next_direction) {
            Some(target) => target,
            None => {
                if from_route {
                    let mut car_query = queries.p0();
                    if let Ok((_, mut car, _)) = car_query.get_mut(car_entity) {
                        car.route.push_front(next_direction);
                    }
                }
                continue;
            }
        };

        if step_refused(&grid, &signals, &index, &destinations, target, facing) {
            if from_route {
                let mut car_query = queries.p0();
                if let Ok((_, mut car, _)) = car_query.get_mut(car_entity) {
                    car.route.push_front(next_direction);
                }
            }
            continue;
        }

        // Commit: move the car, then carry its passengers with it.
        let onboard = {
            let mut car_query = queries.p0();
            let Ok((_, mut car, mut position)) = car_query.get_mut(car_entity) else {
                continue;
            };
            position.0 = target;
            car.facing = next_direction;
            car.last_move = MoveOutcome::Step(next_direction);
            car.onboard.clone()
        };
        index.update_car_position(car_entity, cell, target);
        if from_route {
            telemetry.add_movement();
        }
        for passenger_entity in onboard {
            {
                let mut rider_query = queries.p1();
                if let Ok(mut position) = rider_query.get_mut(passenger_entity) {
                    position.0 = target;
                }
            }
            if let Some(old_cell) = index.passenger_cell(passenger_entity) {
                index.update_passenger_position(passenger_entity, old_cell, target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Reservation;
    use crate::test_helpers::{
        corridor_city, crossing_city, spawn_test_car, spawn_test_passenger, test_world,
    };
    use bevy_ecs::prelude::Schedule;

    fn movement_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(move_cars_system);
        schedule
    }

    fn car_position(world: &bevy_ecs::prelude::World, car: Entity) -> GridPos {
        world.get::<Position>(car).unwrap().0
    }

    #[test]
    fn homeward_car_plots_and_takes_its_first_step_in_one_tick() {
        let mut world = test_world(corridor_city(3));
        let car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(2, 0));
        let mut schedule = movement_schedule();

        schedule.run(&mut world);

        assert_eq!(car_position(&world, car), GridPos::new(1, 0));
        let state = world.get::<Car>(car).unwrap();
        assert_eq!(state.objective, Some(Objective::Home));
        assert_eq!(state.last_move, MoveOutcome::Step(Direction::Right));
        assert_eq!(state.route.len(), 1);
    }

    #[test]
    fn car_retires_on_its_destination_and_is_flagged() {
        let mut world = test_world(corridor_city(3));
        let car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(2, 0));
        let mut schedule = movement_schedule();

        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(car_position(&world, car), GridPos::new(2, 0));

        schedule.run(&mut world);
        let state = world.get::<Car>(car).unwrap();
        assert_eq!(state.last_move, MoveOutcome::Retired);
        assert_eq!(world.resource::<KillList>().0, vec![car]);
        assert_eq!(world.resource::<WorldCounters>().cars_in_transit, 0);
        assert_eq!(world.resource::<SimTelemetry>().cars_retired_total, 1);
    }

    #[test]
    fn occupied_cell_refuses_the_trailer_until_the_leader_moves() {
        let mut world = test_world(corridor_city(4));
        let leader = spawn_test_car(&mut world, GridPos::new(2, 0), GridPos::new(3, 0));
        let trailer = spawn_test_car(&mut world, GridPos::new(1, 0), GridPos::new(3, 0));
        let rider = spawn_test_passenger(&mut world, GridPos::new(0, 1), GridPos::new(3, 1));
        {
            // An empty route with a passenger objective parks the
            // leader in place until the pickup stage would act.
            let mut car = world.get_mut::<Car>(leader).unwrap();
            car.objective = Some(Objective::Passenger(rider));
            let mut car = world.get_mut::<Car>(trailer).unwrap();
            car.objective = Some(Objective::Home);
            car.route = vec![Direction::Right, Direction::Right].into();
        }
        let mut schedule = movement_schedule();

        for _ in 0..2 {
            schedule.run(&mut world);
            assert_eq!(car_position(&world, trailer), GridPos::new(1, 0));
            let state = world.get::<Car>(trailer).unwrap();
            assert_eq!(state.last_move, MoveOutcome::Hold);
            assert_eq!(state.route.len(), 2);
        }

        // Releasing the objective lets the leader drift forward, and
        // the trailer claims the vacated cell on the same tick.
        world.get_mut::<Car>(leader).unwrap().objective = None;
        schedule.run(&mut world);
        assert_eq!(car_position(&world, leader), GridPos::new(3, 0));
        assert_eq!(car_position(&world, trailer), GridPos::new(2, 0));
    }

    #[test]
    fn red_light_refuses_entry_and_requeues_the_step() {
        let mut world = test_world(crossing_city());
        let car = spawn_test_car(&mut world, GridPos::new(2, 1), GridPos::new(2, 4));
        {
            let mut state = world.get_mut::<Car>(car).unwrap();
            state.objective = Some(Objective::Home);
            state.route = vec![Direction::Up, Direction::Up, Direction::Up].into();
        }
        // The crossing serves Right first; the upward approach is red.
        assert_eq!(
            world.resource::<Signals>().controllers[0].active_direction(),
            Direction::Right
        );
        let mut schedule = movement_schedule();

        schedule.run(&mut world);

        assert_eq!(car_position(&world, car), GridPos::new(2, 1));
        let state = world.get::<Car>(car).unwrap();
        assert_eq!(state.last_move, MoveOutcome::Hold);
        assert_eq!(state.route.len(), 3);
    }

    #[test]
    fn green_window_admits_the_gated_direction() {
        let mut world = test_world(crossing_city());
        let car = spawn_test_car(&mut world, GridPos::new(1, 2), GridPos::new(4, 2));
        {
            let mut state = world.get_mut::<Car>(car).unwrap();
            state.objective = Some(Objective::Home);
            state.route = vec![Direction::Right; 3].into();
        }
        let mut schedule = movement_schedule();

        schedule.run(&mut world);

        assert_eq!(car_position(&world, car), GridPos::new(2, 2));
        assert_eq!(
            world.get::<Car>(car).unwrap().last_move,
            MoveOutcome::Step(Direction::Right)
        );
    }

    #[test]
    fn car_with_reservation_routes_to_the_waiting_passenger() {
        let mut world = test_world(corridor_city(6));
        let car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(5, 0));
        let passenger = spawn_test_passenger(&mut world, GridPos::new(3, 1), GridPos::new(5, 1));
        {
            let mut state = world.get_mut::<Passenger>(passenger).unwrap();
            state.state = PassengerState::Waiting;
            let mut car_state = world.get_mut::<Car>(car).unwrap();
            car_state.reservation = Some(Reservation {
                passenger,
                route: vec![Direction::Right; 3],
            });
        }
        let mut schedule = movement_schedule();

        schedule.run(&mut world);

        let state = world.get::<Car>(car).unwrap();
        assert_eq!(state.objective, Some(Objective::Passenger(passenger)));
        // Plotted to the road cell beside the passenger and already
        // advanced one cell toward it.
        assert_eq!(car_position(&world, car), GridPos::new(1, 0));
        assert_eq!(state.route.len(), 2);
    }

    #[test]
    fn idle_car_drifts_along_the_road_while_passengers_wait_elsewhere() {
        let mut world = test_world(corridor_city(5));
        let car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(0, 0));
        // An unmatched passenger exists but is nobody's objective yet.
        spawn_test_passenger(&mut world, GridPos::new(4, 1), GridPos::new(1, 1));
        let mut schedule = movement_schedule();

        schedule.run(&mut world);

        assert_eq!(car_position(&world, car), GridPos::new(1, 0));
        let state = world.get::<Car>(car).unwrap();
        assert_eq!(state.last_move, MoveOutcome::Step(Direction::Right));
        // Drifting is not a route-following movement.
        assert_eq!(world.resource::<SimTelemetry>().movements_total, 0);
    }

    #[test]
    fn parked_car_blocks_nobody() {
        let mut world = test_world(corridor_city(4));
        let parked = spawn_test_car(&mut world, GridPos::new(2, 0), GridPos::new(2, 0));
        let mover = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(3, 0));
        {
            let mut state = world.get_mut::<Car>(mover).unwrap();
            state.objective = Some(Objective::Home);
            state.route = vec![Direction::Right; 3].into();
        }
        let mut schedule = movement_schedule();

        // Tick 1 retires the parked car in place; tick 2 lets the
        // mover drive through the now-free destination cell.
        schedule.run(&mut world);
        assert_eq!(world.get::<Car>(parked).unwrap().last_move, MoveOutcome::Retired);
        schedule.run(&mut world);

        assert_eq!(car_position(&world, mover), GridPos::new(2, 0));
    }

    #[test]
    fn onboard_passengers_ride_with_the_car() {
        let mut world = test_world(corridor_city(5));
        let car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(4, 0));
        let rider = spawn_test_passenger(&mut world, GridPos::new(0, 0), GridPos::new(4, 1));
        {
            let mut state = world.get_mut::<Passenger>(rider).unwrap();
            state.state = PassengerState::Traveling;
            let mut car_state = world.get_mut::<Car>(car).unwrap();
            car_state.onboard.push(rider);
        }
        let mut schedule = movement_schedule();

        schedule.run(&mut world);

        let cell = car_position(&world, car);
        assert_eq!(world.get::<Position>(rider).unwrap().0, cell);
        assert_eq!(
            world.resource::<GridIndex>().passengers_at(cell),
            &[rider]
        );
    }
}
