//! Cell → entity mappings for efficient spatial queries.
//!
//! Maintains mappings from grid cells to entities (passengers and cars)
//! so adjacency scans are O(1) per cell instead of a pass over all
//! entities. Updated incrementally as entities spawn, move, or retire.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::grid::GridPos;

#[derive(Debug, Resource, Default)]
pub struct GridIndex {
    /// Map from cell to passenger entities standing on it
    passengers_by_cell: HashMap<GridPos, Vec<Entity>>,
    /// Map from cell to car entities standing on it
    cars_by_cell: HashMap<GridPos, Vec<Entity>>,
    /// Reverse mapping: passenger entity → current cell
    passenger_entity_to_cell: HashMap<Entity, GridPos>,
    /// Reverse mapping: car entity → current cell
    car_entity_to_cell: HashMap<Entity, GridPos>,
}

impl GridIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a passenger entity at the given cell.
    pub fn insert_passenger(&mut self, entity: Entity, cell: GridPos) {
        self.passengers_by_cell.entry(cell).or_default().push(entity);
        self.passenger_entity_to_cell.insert(entity, cell);
    }

    /// Insert a car entity at the given cell.
    pub fn insert_car(&mut self, entity: Entity, cell: GridPos) {
        self.cars_by_cell.entry(cell).or_default().push(entity);
        self.car_entity_to_cell.insert(entity, cell);
    }

    /// Remove a passenger entity from the index.
    pub fn remove_passenger(&mut self, entity: Entity) {
        if let Some(cell) = self.passenger_entity_to_cell.remove(&entity) {
            if let Some(entities) = self.passengers_by_cell.get_mut(&cell) {
                entities.retain(|&e| e != entity);
                if entities.is_empty() {
                    self.passengers_by_cell.remove(&cell);
                }
            }
        }
    }

    /// Remove a car entity from the index.
    pub fn remove_car(&mut self, entity: Entity) {
        if let Some(cell) = self.car_entity_to_cell.remove(&entity) {
            if let Some(entities) = self.cars_by_cell.get_mut(&cell) {
                entities.retain(|&e| e != entity);
                if entities.is_empty() {
                    self.cars_by_cell.remove(&cell);
                }
            }
        }
    }

    /// Update a passenger's position (remove from old cell, add to new cell).
    pub fn update_passenger_position(
        &mut self,
        entity: Entity,
        old_cell: GridPos,
        new_cell: GridPos,
    ) {
        if old_cell == new_cell {
            return;
        }
        if let Some(entities) = self.passengers_by_cell.get_mut(&old_cell) {
            entities.retain(|&e| e != entity);
            if entities.is_empty() {
                self.passengers_by_cell.remove(&old_cell);
            }
        }
        self.passengers_by_cell
            .entry(new_cell)
            .or_default()
            .push(entity);
        self.passenger_entity_to_cell.insert(entity, new_cell);
    }

    /// Update a car's position (remove from old cell, add to new cell).
    pub fn update_car_position(&mut self, entity: Entity, old_cell: GridPos, new_cell: GridPos) {
        if old_cell == new_cell {
            return;
        }
        if let Some(entities) = self.cars_by_cell.get_mut(&old_cell) {
            entities.retain(|&e| e != entity);
            if entities.is_empty() {
                self.cars_by_cell.remove(&old_cell);
            }
        }
        self.cars_by_cell.entry(new_cell).or_default().push(entity);
        self.car_entity_to_cell.insert(entity, new_cell);
    }

    /// Passenger entities standing on the given cell.
    pub fn passengers_at(&self, cell: GridPos) -> &[Entity] {
        self.passengers_by_cell
            .get(&cell)
            .map(|entities| entities.as_slice())
            .unwrap_or(&[])
    }

    /// Car entities standing on the given cell.
    pub fn cars_at(&self, cell: GridPos) -> &[Entity] {
        self.cars_by_cell
            .get(&cell)
            .map(|entities| entities.as_slice())
            .unwrap_or(&[])
    }

    /// Get a passenger's current cell.
    pub fn passenger_cell(&self, entity: Entity) -> Option<GridPos> {
        self.passenger_entity_to_cell.get(&entity).copied()
    }

    /// Get a car's current cell.
    pub fn car_cell(&self, entity: Entity) -> Option<GridPos> {
        self.car_entity_to_cell.get(&entity).copied()
    }

    /// Clear all mappings.
    pub fn clear(&mut self) {
        self.passengers_by_cell.clear();
        self.cars_by_cell.clear();
        self.passenger_entity_to_cell.clear();
        self.car_entity_to_cell.clear();
    }
}
