//! Traffic light state machines. Each intersection cycles a green window
//! through its gated directions on a fixed cadence.

use bevy_ecs::prelude::*;
use serde::{Serialize, Serializer};

use crate::grid::{CityGrid, Direction, GridPos, IntersectionId, IntersectionSpec};

/// Ticks between light rotations. The tick before a rotation the active
/// light warns by turning yellow.
pub const TICKS_TO_CHANGE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

impl LightState {
    /// Numeric wire value consumed by the visualization clients.
    pub fn value(self) -> u8 {
        match self {
            LightState::Red => 0,
            LightState::Yellow => 1,
            LightState::Green => 2,
        }
    }
}

impl Serialize for LightState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    pub direction: Direction,
    pub state: LightState,
}

impl TrafficLight {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            state: LightState::Red,
        }
    }

    /// Advance the red/green half of the cycle. Yellow falls to red,
    /// red rises to green, green stays put.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            LightState::Yellow => LightState::Red,
            LightState::Red => LightState::Green,
            LightState::Green => LightState::Green,
        };
    }

    pub fn warn_change(&mut self) {
        self.state = LightState::Yellow;
    }
}

/// Runtime signal state for one intersection. `lights` is index-aligned
/// with the spec's `directions_to_stop`.
#[derive(Debug, Clone)]
pub struct SignalController {
    pub position: GridPos,
    pub lights: Vec<TrafficLight>,
    active: usize,
    next: usize,
    countdown: u32,
}

impl SignalController {
    pub fn new(spec: &IntersectionSpec) -> Self {
        let mut lights: Vec<TrafficLight> = spec
            .directions_to_stop
            .iter()
            .map(|direction| TrafficLight::new(*direction))
            .collect();
        lights[0].toggle();
        Self {
            position: spec.position,
            lights,
            active: 0,
            next: 0,
            countdown: TICKS_TO_CHANGE,
        }
    }

    /// One clock step: warn the tick before the rotation, then hand the
    /// green window to the next direction and restart the countdown.
    pub fn tick(&mut self) {
        self.countdown -= 1;
        if self.countdown == 1 {
            self.next = (self.active + 1) % self.lights.len();
            self.lights[self.active].warn_change();
        } else if self.countdown == 0 {
            self.lights[self.active].toggle();
            self.lights[self.next].toggle();
            self.active = self.next;
            self.countdown = TICKS_TO_CHANGE;
        }
    }

    /// The direction currently holding the green window. The window
    /// keeps admitting its direction while the light is yellow.
    pub fn active_direction(&self) -> Direction {
        self.lights[self.active].direction
    }

    pub fn admits(&self, direction: Direction) -> bool {
        self.active_direction() == direction
    }
}

/// All signal controllers, index-aligned with the grid's intersections.
#[derive(Debug, Clone, Resource)]
pub struct Signals {
    pub controllers: Vec<SignalController>,
}

impl Signals {
    pub fn from_grid(grid: &CityGrid) -> Self {
        Self {
            controllers: grid
                .intersections()
                .iter()
                .map(SignalController::new)
                .collect(),
        }
    }

    pub fn controller(&self, id: IntersectionId) -> &SignalController {
        &self.controllers[id.0]
    }

    pub fn admits(&self, id: IntersectionId, direction: Direction) -> bool {
        self.controller(id).admits(direction)
    }
}
