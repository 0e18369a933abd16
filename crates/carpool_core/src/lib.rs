pub mod clock;
pub mod ecs;
pub mod grid;
pub mod routing;
pub mod runner;
pub mod scenario;
pub mod signal;
pub mod spatial;
pub mod spawner;
pub mod systems;
pub mod telemetry;
pub mod telemetry_export;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
