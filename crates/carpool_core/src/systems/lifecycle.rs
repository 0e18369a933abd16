//! Retirement stage: despawn the cars flagged during this tick.

use bevy_ecs::prelude::{Commands, ResMut};

use crate::ecs::KillList;
use crate::spatial::GridIndex;

pub fn retire_cars_system(
    mut commands: Commands,
    mut kill_list: ResMut<KillList>,
    mut index: ResMut<GridIndex>,
) {
    for entity in kill_list.0.drain(..) {
        index.remove_car(entity);
        commands.entity(entity).despawn();
    }
}
