//! Signal stage: advance every intersection's light cycle one tick.

use bevy_ecs::prelude::ResMut;

use crate::signal::Signals;

pub fn tick_signals_system(mut signals: ResMut<Signals>) {
    for controller in &mut signals.controllers {
        controller.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;
    use crate::signal::LightState;
    use crate::test_helpers::{crossing_city, test_world};
    use bevy_ecs::prelude::Schedule;

    #[test]
    fn every_controller_advances_together() {
        let mut world = test_world(crossing_city());
        let mut schedule = Schedule::default();
        schedule.add_systems(tick_signals_system);

        schedule.run(&mut world);

        let signals = world.resource::<Signals>();
        for controller in &signals.controllers {
            assert_eq!(controller.lights[0].state, LightState::Yellow);
            assert_eq!(controller.active_direction(), Direction::Right);
        }
    }
}
