//! Snapshot stage. Runs after movement and pickup but before retired
//! cars are despawned, so a retiring car still contributes its final
//! "PA" row.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::TickClock;
use crate::ecs::{Car, Passenger, PassengerState, Position};
use crate::signal::Signals;
use crate::telemetry::{
    light_id, CarMoveRecord, LightRecord, PassengerRecord, SimSnapshotConfig, SimSnapshots,
    SpawnRecord, TickSnapshot,
};

pub fn telemetry_snapshot_system(
    clock: Res<TickClock>,
    signals: Res<Signals>,
    config: Res<SimSnapshotConfig>,
    mut snapshots: ResMut<SimSnapshots>,
    cars: Query<(Entity, &Car, &Position)>,
    passengers: Query<(Entity, &Passenger, &Position)>,
) {
    let mut car_rows: Vec<(Entity, &Car, &Position)> = cars.iter().collect();
    car_rows.sort_by_key(|(entity, _, _)| *entity);

    let mut movements = Vec::new();
    let mut spawned_cars = Vec::new();
    for (entity, car, position) in car_rows {
        if car.spawned_at == clock.now() {
            // A car's first tick reports only where it appeared.
            spawned_cars.push(SpawnRecord::at(position.0));
        } else {
            movements.push(CarMoveRecord {
                car: entity,
                next_direction: car.last_move,
            });
        }
    }

    let mut lights = Vec::new();
    for controller in &signals.controllers {
        for light in &controller.lights {
            lights.push(LightRecord {
                id: light_id(controller.position, light.direction),
                state: light.state,
            });
        }
    }

    let mut passenger_rows: Vec<(Entity, &Passenger, &Position)> = passengers.iter().collect();
    passenger_rows.sort_by_key(|(entity, _, _)| *entity);
    let passenger_records: Vec<PassengerRecord> = passenger_rows
        .into_iter()
        .filter(|(_, passenger, _)| passenger.state != PassengerState::Traveling)
        .map(|(_, passenger, position)| {
            PassengerRecord::at(position.0, passenger.state == PassengerState::Arrived)
        })
        .collect();

    snapshots.snapshots.push_back(TickSnapshot {
        tick: clock.now(),
        movements,
        lights,
        spawned_cars,
        passengers: passenger_records,
    });
    while snapshots.snapshots.len() > config.max_snapshots {
        snapshots.snapshots.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::MoveOutcome;
    use crate::grid::{Direction, GridPos};
    use crate::test_helpers::{crossing_city, spawn_test_car, spawn_test_passenger, test_world};
    use bevy_ecs::prelude::Schedule;

    fn snapshot_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(telemetry_snapshot_system);
        schedule
    }

    #[test]
    fn fresh_cars_report_spawn_cells_not_movements() {
        let mut world = test_world(crossing_city());
        spawn_test_car(&mut world, GridPos::new(0, 2), GridPos::new(4, 2));

        snapshot_schedule().run(&mut world);

        let snapshots = world.resource::<SimSnapshots>();
        let latest = snapshots.latest().unwrap();
        assert!(latest.movements.is_empty());
        assert_eq!(latest.spawned_cars.len(), 1);
        assert_eq!(latest.spawned_cars[0].x, 0);
        assert_eq!(latest.spawned_cars[0].z, 2);
    }

    #[test]
    fn seasoned_cars_report_their_last_move() {
        let mut world = test_world(crossing_city());
        let car = spawn_test_car(&mut world, GridPos::new(0, 2), GridPos::new(4, 2));
        world.resource_mut::<crate::clock::TickClock>().advance();
        world.get_mut::<Car>(car).unwrap().last_move = MoveOutcome::Step(Direction::Right);

        snapshot_schedule().run(&mut world);

        let snapshots = world.resource::<SimSnapshots>();
        let latest = snapshots.latest().unwrap();
        assert!(latest.spawned_cars.is_empty());
        assert_eq!(latest.movements.len(), 1);
        assert_eq!(latest.movements[0].next_direction, MoveOutcome::Step(Direction::Right));
    }

    #[test]
    fn retiring_car_still_appears_with_its_final_row() {
        let mut world = test_world(crossing_city());
        let car = spawn_test_car(&mut world, GridPos::new(0, 2), GridPos::new(4, 2));
        world.resource_mut::<crate::clock::TickClock>().advance();
        world.get_mut::<Car>(car).unwrap().last_move = MoveOutcome::Retired;

        snapshot_schedule().run(&mut world);

        let latest_moves = &world.resource::<SimSnapshots>().latest().unwrap().movements;
        assert_eq!(latest_moves.len(), 1);
        assert_eq!(latest_moves[0].next_direction, MoveOutcome::Retired);
    }

    #[test]
    fn every_light_of_the_crossing_is_reported() {
        let mut world = test_world(crossing_city());

        snapshot_schedule().run(&mut world);

        let latest_lights = &world.resource::<SimSnapshots>().latest().unwrap().lights;
        let ids: Vec<&str> = latest_lights.iter().map(|light| light.id.as_str()).collect();
        assert_eq!(ids, vec!["0202RH", "0202UP"]);
    }

    #[test]
    fn traveling_passengers_are_omitted_until_they_arrive() {
        let mut world = test_world(crossing_city());
        let rider = spawn_test_passenger(&mut world, GridPos::new(1, 1), GridPos::new(3, 3));
        spawn_test_passenger(&mut world, GridPos::new(0, 0), GridPos::new(3, 1));
        world.get_mut::<Passenger>(rider).unwrap().state = PassengerState::Traveling;

        snapshot_schedule().run(&mut world);

        let latest = world.resource::<SimSnapshots>();
        let rows = &latest.latest().unwrap().passengers;
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].x, rows[0].z, rows[0].arrived), (0, 0, false));
    }

    #[test]
    fn history_is_capped_to_the_configured_depth() {
        let mut world = test_world(crossing_city());
        world.resource_mut::<SimSnapshotConfig>().max_snapshots = 3;
        let mut schedule = snapshot_schedule();

        for _ in 0..5 {
            world.resource_mut::<crate::clock::TickClock>().advance();
            schedule.run(&mut world);
        }

        let snapshots = world.resource::<SimSnapshots>();
        assert_eq!(snapshots.snapshots.len(), 3);
        assert_eq!(snapshots.snapshots.front().unwrap().tick, 3);
        assert_eq!(snapshots.latest().unwrap().tick, 5);
    }
}
