//! Scenario setup: install the city layout, signal state, and spawner
//! budgets into a fresh world.

mod build;
mod params;

pub use build::build_scenario;
pub use params::ScenarioParams;
