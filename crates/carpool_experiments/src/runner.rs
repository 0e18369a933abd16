//! Parallel scenario execution.

use bevy_ecs::prelude::World;
use carpool_core::grid::CityGrid;
use carpool_core::runner::{run_until_settled, tick_schedule};
use carpool_core::scenario::build_scenario;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::metrics::{extract_metrics, SimulationResult};
use crate::parameters::ParameterSet;

/// Upper bound on a single run. A healthy scenario settles far below
/// this; a stuck one is cut off instead of spinning forever.
pub const MAX_TICKS_PER_RUN: u64 = 20_000;

/// Run one parameter set on `city` to completion and extract metrics.
pub fn run_single_simulation(param_set: &ParameterSet, city: &CityGrid) -> SimulationResult {
    let mut world = World::new();
    let params = param_set.params.clone().with_seed(param_set.seed);
    build_scenario(&mut world, city.clone(), params);

    let mut schedule = tick_schedule();
    let ticks = run_until_settled(&mut world, &mut schedule, MAX_TICKS_PER_RUN);
    extract_metrics(&mut world, ticks)
}

/// Run every parameter set on `city` in parallel, with a progress bar.
///
/// Results come back in input order. `num_threads` of `None` uses
/// rayon's default.
pub fn run_parallel_experiments(
    parameter_sets: &[ParameterSet],
    city: &CityGrid,
    num_threads: Option<usize>,
) -> Vec<SimulationResult> {
    run_parallel_experiments_with_progress(parameter_sets, city, num_threads, true)
}

/// [`run_parallel_experiments`] with the progress bar optional, for
/// drivers that manage their own output.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: &[ParameterSet],
    city: &CityGrid,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Vec<SimulationResult> {
    let total = parameter_sets.len();
    let bar = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .expect("progress template must parse")
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let pool = if let Some(threads) = num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("failed to create thread pool")
    } else {
        rayon::ThreadPoolBuilder::new()
            .build()
            .expect("failed to create thread pool")
    };

    let bar_for_runs = bar.clone();
    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set, city);
                if let Some(ref progress) = bar_for_runs {
                    progress.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(ref progress) = bar {
        progress.finish_with_message("completed");
    }

    results
}
