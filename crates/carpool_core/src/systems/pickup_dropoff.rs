//! Pickup and dropoff stage. A car whose objective passenger stands on
//! a sidewalk beside it boards them; a car carrying its objective
//! passenger beside their destination lets them off there.

use bevy_ecs::prelude::{Entity, Query, ResMut};

use crate::ecs::{Car, Objective, Passenger, PassengerState, Position};
use crate::spatial::GridIndex;
use crate::telemetry::SimTelemetry;

pub fn pick_drop_passengers_system(
    mut telemetry: ResMut<SimTelemetry>,
    mut index: ResMut<GridIndex>,
    mut cars: Query<(Entity, &mut Car)>,
    mut passengers: Query<(&mut Passenger, &mut Position)>,
) {
    let mut car_ids: Vec<Entity> = cars.iter().map(|(entity, _)| entity).collect();
    car_ids.sort();

    for car_entity in car_ids {
        let Ok((_, mut car)) = cars.get_mut(car_entity) else {
            continue;
        };
        let Some(Objective::Passenger(passenger_entity)) = car.objective else {
            continue;
        };
        let Some(car_cell) = index.car_cell(car_entity) else {
            continue;
        };
        let Ok((mut passenger, mut position)) = passengers.get_mut(passenger_entity) else {
            continue;
        };

        match passenger.state {
            PassengerState::Waiting
                if index
                    .passenger_cell(passenger_entity)
                    .is_some_and(|cell| cell.is_adjacent(&car_cell)) =>
            {
                // Boarding leaves the passenger on their sidewalk cell;
                // they start tracking the car once it moves.
                passenger.state = PassengerState::Traveling;
                car.onboard.push(passenger_entity);
                car.reservation = None;
                car.objective = None;
            }
            PassengerState::Traveling if passenger.destination.is_adjacent(&car_cell) => {
                passenger.state = PassengerState::Arrived;
                let vacated = position.0;
                position.0 = passenger.destination;
                index.update_passenger_position(passenger_entity, vacated, passenger.destination);
                telemetry.add_delivered_passenger();
                car.onboard.retain(|&rider| rider != passenger_entity);
                car.objective = None;
            }
            _ => {}
        }
    }
}
