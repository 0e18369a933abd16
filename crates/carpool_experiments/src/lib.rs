//! Headless experimentation for the carpool simulation.
//!
//! This crate parses city layouts into grids the engine can run, sweeps
//! scenario parameters in parallel, extracts per-run metrics, and
//! exports results for analysis.
//!
//! # Quick Start
//!
//! ```no_run
//! use carpool_experiments::{built_in_city, run_parallel_experiments, ParameterSpace};
//!
//! let city = built_in_city();
//! let space = ParameterSpace::grid()
//!     .car_fleet(vec![(5, 1, 1), (10, 1, 1)])
//!     .passenger_demand(vec![(20, 1, 1)])
//!     .replications(2);
//! let parameter_sets = space.generate();
//! let results = run_parallel_experiments(&parameter_sets, &city, None);
//! assert_eq!(results.len(), 4);
//! ```
//!
//! # Architecture
//!
//! - [`map`]: text layouts into [`carpool_core::grid::CityGrid`]
//! - [`parameters`]: parameter grids and random samples for sweeps
//! - [`parameter_spaces`]: ready-made sweep definitions
//! - [`runner`]: parallel execution on rayon
//! - [`metrics`]: result extraction from a finished world
//! - [`export`]: CSV and JSON writers

pub mod export;
pub mod map;
pub mod metrics;
pub mod parameter_spaces;
pub mod parameters;
pub mod runner;

pub use export::{export_to_csv, export_to_json};
pub use map::{built_in_city, parse_city_map, MapError};
pub use metrics::{extract_metrics, SimulationResult};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{
    run_parallel_experiments, run_parallel_experiments_with_progress, run_single_simulation,
};
