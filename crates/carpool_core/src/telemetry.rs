//! Per-tick snapshots and run-level counters.
//!
//! Snapshots carry exactly what the visualization clients consume: the
//! realized movement of every live car, the state of every traffic
//! light, where new cars appeared, and where waiting passengers stand.
//! Grid `y` is emitted as `z` with a constant `y = 0`, matching the
//! 3D client convention.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};
use serde::{Serialize, Serializer};

use crate::ecs::MoveOutcome;
use crate::grid::{Direction, GridPos};
use crate::signal::LightState;

/// Run-level counters, monotonically increasing over the whole run.
#[derive(Debug, Default, Clone, Copy, Resource)]
pub struct SimTelemetry {
    pub movements_total: u64,
    pub cars_retired_total: u64,
    pub passengers_delivered_total: u64,
}

impl SimTelemetry {
    pub fn add_movement(&mut self) {
        self.movements_total += 1;
    }

    pub fn add_retired_car(&mut self) {
        self.cars_retired_total += 1;
    }

    pub fn add_delivered_passenger(&mut self) {
        self.passengers_delivered_total += 1;
    }
}

fn entity_bits<S: Serializer>(entity: &Entity, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(entity.to_bits())
}

/// What one live car did this tick.
#[derive(Debug, Clone, Serialize)]
pub struct CarMoveRecord {
    #[serde(serialize_with = "entity_bits")]
    pub car: Entity,
    pub next_direction: MoveOutcome,
}

/// State of one traffic light this tick.
#[derive(Debug, Clone, Serialize)]
pub struct LightRecord {
    pub id: String,
    pub state: LightState,
}

/// Stable wire id of a traffic light: zero-padded coordinates of its
/// intersection plus the gated direction's code.
pub fn light_id(position: GridPos, direction: Direction) -> String {
    format!("{:02}{:02}{}", position.x, position.y, direction.code())
}

/// Cell where a car appeared this tick.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpawnRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SpawnRecord {
    pub fn at(pos: GridPos) -> Self {
        Self {
            x: pos.x,
            y: 0,
            z: pos.y,
        }
    }
}

/// A passenger not currently riding, with their arrival flag.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PassengerRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub arrived: bool,
}

impl PassengerRecord {
    pub fn at(pos: GridPos, arrived: bool) -> Self {
        Self {
            x: pos.x,
            y: 0,
            z: pos.y,
            arrived,
        }
    }
}

/// Everything observable about one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub movements: Vec<CarMoveRecord>,
    pub lights: Vec<LightRecord>,
    pub spawned_cars: Vec<SpawnRecord>,
    pub passengers: Vec<PassengerRecord>,
}

/// Bounds the snapshot history kept in memory.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimSnapshotConfig {
    pub max_snapshots: usize,
}

impl Default for SimSnapshotConfig {
    fn default() -> Self {
        Self {
            max_snapshots: 10_000,
        }
    }
}

/// Rolling history of tick snapshots, oldest first.
#[derive(Debug, Default, Resource)]
pub struct SimSnapshots {
    pub snapshots: VecDeque<TickSnapshot>,
}

impl SimSnapshots {
    pub fn latest(&self) -> Option<&TickSnapshot> {
        self.snapshots.back()
    }
}
