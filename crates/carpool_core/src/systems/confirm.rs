//! Confirm stage: passengers weigh the offers they just received and
//! commit to the car proposing the shortest route.

use bevy_ecs::prelude::{Entity, Query, ResMut};

use crate::ecs::{Car, Passenger, PassengerState, Reservation, WorldCounters};

pub fn confirm_rides_system(
    mut counters: ResMut<WorldCounters>,
    mut passengers: Query<(Entity, &mut Passenger)>,
    mut cars: Query<&mut Car>,
) {
    let mut deciding: Vec<Entity> = passengers
        .iter()
        .filter(|(_, passenger)| {
            passenger.state == PassengerState::NeedsRide && !passenger.offers.is_empty()
        })
        .map(|(entity, _)| entity)
        .collect();
    deciding.sort();

    for passenger_entity in deciding {
        let Ok((_, mut passenger)) = passengers.get_mut(passenger_entity) else {
            continue;
        };
        // Shortest route wins; the lower car id settles equal lengths.
        let best = passenger
            .offers
            .iter()
            .min_by_key(|(car_entity, route)| (route.len(), **car_entity))
            .map(|(car_entity, route)| (*car_entity, route.clone()));
        let Some((car_entity, route)) = best else {
            continue;
        };
        passenger.offers.clear();
        passenger.state = PassengerState::Waiting;
        counters.passengers_unmatched = counters.passengers_unmatched.saturating_sub(1);
        if let Ok(mut car) = cars.get_mut(car_entity) {
            car.reservation = Some(Reservation {
                passenger: passenger_entity,
                route,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, GridPos};
    use crate::test_helpers::{corridor_city, spawn_test_car, spawn_test_passenger, test_world};
    use bevy_ecs::prelude::Schedule;

    fn confirm_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(confirm_rides_system);
        schedule
    }

    #[test]
    fn passenger_accepts_the_shortest_offer() {
        let mut world = test_world(corridor_city(6));
        let far_car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(5, 0));
        let near_car = spawn_test_car(&mut world, GridPos::new(3, 0), GridPos::new(5, 0));
        let passenger = spawn_test_passenger(&mut world, GridPos::new(4, 1), GridPos::new(1, 1));

        {
            let mut state = world.get_mut::<Passenger>(passenger).unwrap();
            state.offers.insert(far_car, vec![Direction::Right; 4]);
            state.offers.insert(near_car, vec![Direction::Right]);
        }

        confirm_schedule().run(&mut world);

        let state = world.get::<Passenger>(passenger).unwrap();
        assert_eq!(state.state, PassengerState::Waiting);
        assert!(state.offers.is_empty());
        let reservation = world.get::<Car>(near_car).unwrap().reservation.clone().unwrap();
        assert_eq!(reservation.passenger, passenger);
        assert_eq!(reservation.route, vec![Direction::Right]);
        assert!(world.get::<Car>(far_car).unwrap().reservation.is_none());
        assert_eq!(world.resource::<WorldCounters>().passengers_unmatched, 0);
    }

    #[test]
    fn equal_length_offers_fall_to_the_lower_car_id() {
        let mut world = test_world(corridor_city(6));
        let first_car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(5, 0));
        let second_car = spawn_test_car(&mut world, GridPos::new(1, 0), GridPos::new(5, 0));
        let passenger = spawn_test_passenger(&mut world, GridPos::new(3, 1), GridPos::new(1, 1));

        {
            let mut state = world.get_mut::<Passenger>(passenger).unwrap();
            state.offers.insert(second_car, vec![Direction::Right; 2]);
            state.offers.insert(first_car, vec![Direction::Right; 2]);
        }

        confirm_schedule().run(&mut world);

        let winner = first_car.min(second_car);
        let loser = first_car.max(second_car);
        assert!(world.get::<Car>(winner).unwrap().reservation.is_some());
        assert!(world.get::<Car>(loser).unwrap().reservation.is_none());
    }

    #[test]
    fn waiting_passengers_do_not_reconfirm() {
        let mut world = test_world(corridor_city(4));
        let car = spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(3, 0));
        let passenger = spawn_test_passenger(&mut world, GridPos::new(2, 1), GridPos::new(3, 1));

        {
            let mut state = world.get_mut::<Passenger>(passenger).unwrap();
            state.state = PassengerState::Waiting;
            state.offers.insert(car, vec![Direction::Right]);
        }

        confirm_schedule().run(&mut world);

        assert!(world.get::<Car>(car).unwrap().reservation.is_none());
        // The stale offer stays untouched for this stage.
        assert_eq!(world.get::<Passenger>(passenger).unwrap().offers.len(), 1);
    }
}
