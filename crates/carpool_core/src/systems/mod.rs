pub mod spawner;
pub mod notify;
pub mod confirm;
pub mod signal_tick;
pub mod movement;
pub mod pickup_dropoff;
pub mod snapshot;
pub mod lifecycle;
