//! Runs a fleet sizing sweep on the built-in city and exports the
//! results.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example run_city
//! ```

use carpool_experiments::parameter_spaces::fleet_sizing_space;
use carpool_experiments::{built_in_city, export_to_csv, export_to_json, run_parallel_experiments};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let city = built_in_city();
    log::info!("parsed the built-in city: {}x{}", city.width(), city.height());

    let space = fleet_sizing_space();
    let parameter_sets = space.generate();
    log::info!("generated {} parameter sets", parameter_sets.len());

    let results = run_parallel_experiments(&parameter_sets, &city, None);

    println!(
        "\n{:<12} {:>4} {:>6} {:>11} {:>10} {:>8} {:>7} {:>6}",
        "experiment", "run", "cars", "passengers", "delivered", "waiting", "ticks", "rate"
    );
    for (set, result) in parameter_sets.iter().zip(&results) {
        println!(
            "{:<12} {:>4} {:>6} {:>11} {:>10} {:>8} {:>7} {:>5.0}%",
            set.experiment_id,
            set.run_id,
            result.cars_spawned,
            result.passengers_spawned,
            result.passengers_delivered,
            result.passengers_waiting,
            result.ticks,
            result.delivery_rate * 100.0
        );
    }

    export_to_csv(&results, &parameter_sets, "fleet_sweep.csv")?;
    export_to_json(&results, "fleet_sweep.json")?;
    log::info!("exported fleet_sweep.csv and fleet_sweep.json");

    Ok(())
}
