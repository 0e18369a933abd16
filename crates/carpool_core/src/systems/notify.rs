//! Notify stage: every unreserved car with spare seats searches for the
//! nearest passenger still needing a ride and leaves them an offer.

use bevy_ecs::prelude::{Entity, Query, Res};

use crate::ecs::{Car, Passenger, PassengerState, Position};
use crate::grid::{CityGrid, GridPos};
use crate::routing::nearest_pickup;
use crate::spatial::GridIndex;

pub fn notify_passengers_system(
    grid: Res<CityGrid>,
    index: Res<GridIndex>,
    cars: Query<(Entity, &Car, &Position)>,
    mut passengers: Query<&mut Passenger>,
) {
    let mut offering: Vec<(Entity, GridPos)> = cars
        .iter()
        .filter(|(_, car, _)| car.reservation.is_none() && car.has_capacity())
        .map(|(entity, _, position)| (entity, position.0))
        .collect();
    // Fixed processing order keeps the offer set reproducible per seed.
    offering.sort_by_key(|&(entity, _)| entity);

    for (car_entity, origin) in offering {
        let found = nearest_pickup(&grid, &index, origin, |candidate| {
            passengers
                .get(candidate)
                .map_or(false, |passenger| passenger.state == PassengerState::NeedsRide)
        });
        if let Some((passenger_entity, route)) = found {
            if let Ok(mut passenger) = passengers.get_mut(passenger_entity) {
                passenger.offers.insert(car_entity, route);
            }
        }
    }
}
