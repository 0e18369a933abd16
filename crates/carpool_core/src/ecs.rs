use std::collections::{HashMap, VecDeque};

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Serialize, Serializer};

use crate::grid::{Direction, GridPos};

/// Most passengers a single car will carry at once.
pub const CAR_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerState {
    /// Standing on a sidewalk, visible to notifying cars.
    NeedsRide,
    /// Accepted an offer and is waiting for that car to arrive.
    Waiting,
    /// Onboard a car.
    Traveling,
    /// Dropped off at the destination.
    Arrived,
}

#[derive(Debug, Clone, Component)]
pub struct Passenger {
    pub state: PassengerState,
    pub destination: GridPos,
    /// Routes proposed this tick, keyed by the offering car.
    pub offers: HashMap<Entity, Vec<Direction>>,
}

impl Passenger {
    pub fn new(destination: GridPos) -> Self {
        Self {
            state: PassengerState::NeedsRide,
            destination,
            offers: HashMap::new(),
        }
    }
}

/// What a car is currently driving toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Serve this passenger: collect them, or deliver them if onboard.
    Passenger(Entity),
    /// Head to the car's own destination and leave the simulation.
    Home,
}

/// A confirmed pickup the car has not completed yet.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub passenger: Entity,
    pub route: Vec<Direction>,
}

#[derive(Debug, Clone, Component)]
pub struct Car {
    /// Where the car retires once it has no more passengers to serve.
    pub destination: GridPos,
    pub facing: Direction,
    pub route: VecDeque<Direction>,
    pub objective: Option<Objective>,
    pub reservation: Option<Reservation>,
    /// Passengers currently riding, in pickup order.
    pub onboard: Vec<Entity>,
    pub last_move: MoveOutcome,
    pub spawned_at: u64,
}

impl Car {
    pub fn new(destination: GridPos, facing: Direction, spawned_at: u64) -> Self {
        Self {
            destination,
            facing,
            route: VecDeque::new(),
            objective: None,
            reservation: None,
            onboard: Vec::new(),
            last_move: MoveOutcome::Hold,
            spawned_at,
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.onboard.len() < CAR_CAPACITY
    }
}

/// What a car did during the movement stage of the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Advanced one cell in the given direction.
    Step(Direction),
    /// Stayed in place, reported as "NA" on the wire.
    Hold,
    /// Reached its own destination and left, reported as "PA".
    Retired,
}

impl MoveOutcome {
    pub fn code(self) -> &'static str {
        match self {
            MoveOutcome::Step(direction) => direction.code(),
            MoveOutcome::Hold => "NA",
            MoveOutcome::Retired => "PA",
        }
    }
}

impl Serialize for MoveOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Position(pub GridPos);

/// Global tallies the agents consult when deciding their next action.
#[derive(Debug, Default, Clone, Copy, Resource)]
pub struct WorldCounters {
    /// Passengers in [`PassengerState::NeedsRide`].
    pub passengers_unmatched: usize,
    /// Cars that have not retired yet.
    pub cars_in_transit: usize,
}

/// Entities flagged during the tick and despawned at its end.
#[derive(Debug, Default, Resource)]
pub struct KillList(pub Vec<Entity>);

/// Deterministic random source shared by the decision systems.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_outcome_wire_codes() {
        assert_eq!(MoveOutcome::Step(Direction::Up).code(), "UP");
        assert_eq!(MoveOutcome::Step(Direction::Left).code(), "LF");
        assert_eq!(MoveOutcome::Step(Direction::Right).code(), "RH");
        assert_eq!(MoveOutcome::Step(Direction::Down).code(), "DW");
        assert_eq!(MoveOutcome::Hold.code(), "NA");
        assert_eq!(MoveOutcome::Retired.code(), "PA");
    }

    #[test]
    fn fresh_car_is_idle_with_capacity() {
        let car = Car::new(GridPos::new(4, 4), Direction::Right, 7);
        assert!(car.has_capacity());
        assert!(car.route.is_empty());
        assert_eq!(car.objective, None);
        assert_eq!(car.last_move, MoveOutcome::Hold);
        assert_eq!(car.spawned_at, 7);
    }
}
