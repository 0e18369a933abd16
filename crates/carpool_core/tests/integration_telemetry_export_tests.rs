use std::fs::File;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use carpool_core::grid::GridPos;
use carpool_core::runner::{run_ticks, tick_schedule};
use carpool_core::telemetry::SimSnapshots;
use carpool_core::telemetry_export::{
    write_lights_parquet, write_movements_parquet, write_passenger_positions_parquet,
};
use carpool_core::test_helpers::{
    corridor_city, crossing_city, spawn_test_car, spawn_test_passenger, test_world,
};

fn temp_parquet_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{nanos}.parquet"))
}

fn parquet_field_specs(path: &PathBuf) -> Vec<(String, String, bool)> {
    let file = File::open(path).expect("parquet file should exist");
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet reader should build");
    builder
        .schema()
        .fields()
        .iter()
        .map(|field| {
            (
                field.name().to_string(),
                field.data_type().to_string(),
                field.is_nullable(),
            )
        })
        .collect()
}

fn parquet_row_count(path: &PathBuf) -> usize {
    let file = File::open(path).expect("parquet file should exist");
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .expect("parquet reader should build")
        .build()
        .expect("parquet reader should start");
    reader
        .map(|batch| batch.expect("record batch should read").num_rows())
        .sum()
}

#[test]
fn movement_export_schema_matches_expected_columns() {
    let snapshots = SimSnapshots::default();
    let path = temp_parquet_path("movements_schema");

    write_movements_parquet(&path, &snapshots).expect("movements parquet should write");

    let specs = parquet_field_specs(&path);
    assert_eq!(
        specs,
        vec![
            ("tick".to_string(), "UInt64".to_string(), false),
            ("car".to_string(), "UInt64".to_string(), false),
            ("movement".to_string(), "UInt8".to_string(), false),
        ]
    );

    std::fs::remove_file(path).expect("temp parquet file should be removable");
}

#[test]
fn light_export_schema_matches_expected_columns() {
    let snapshots = SimSnapshots::default();
    let path = temp_parquet_path("lights_schema");

    write_lights_parquet(&path, &snapshots).expect("lights parquet should write");

    let specs = parquet_field_specs(&path);
    assert_eq!(
        specs,
        vec![
            ("tick".to_string(), "UInt64".to_string(), false),
            ("light".to_string(), "Utf8".to_string(), false),
            ("state".to_string(), "UInt8".to_string(), false),
        ]
    );

    std::fs::remove_file(path).expect("temp parquet file should be removable");
}

#[test]
fn passenger_position_export_schema_matches_expected_columns() {
    let snapshots = SimSnapshots::default();
    let path = temp_parquet_path("passenger_positions_schema");

    write_passenger_positions_parquet(&path, &snapshots)
        .expect("passenger positions parquet should write");

    let specs = parquet_field_specs(&path);
    assert_eq!(
        specs,
        vec![
            ("tick".to_string(), "UInt64".to_string(), false),
            ("x".to_string(), "Int32".to_string(), false),
            ("z".to_string(), "Int32".to_string(), false),
            ("arrived".to_string(), "Boolean".to_string(), false),
        ]
    );

    std::fs::remove_file(path).expect("temp parquet file should be removable");
}

#[test]
fn short_run_exports_one_movement_row_per_live_car_tick() {
    let mut world = test_world(corridor_city(3));
    spawn_test_car(&mut world, GridPos::new(0, 0), GridPos::new(2, 0));
    let mut schedule = tick_schedule();

    // Two steps and one retirement, each snapshotted while the car lives.
    run_ticks(&mut world, &mut schedule, 3);

    let path = temp_parquet_path("movements_rows");
    write_movements_parquet(&path, world.resource::<SimSnapshots>())
        .expect("movements parquet should write");

    assert_eq!(parquet_row_count(&path), 3);
    std::fs::remove_file(path).expect("temp parquet file should be removable");
}

#[test]
fn light_rows_cover_every_controller_every_tick() {
    let mut world = test_world(crossing_city());
    let mut schedule = tick_schedule();

    run_ticks(&mut world, &mut schedule, 4);

    let path = temp_parquet_path("light_rows");
    write_lights_parquet(&path, world.resource::<SimSnapshots>())
        .expect("lights parquet should write");

    // The crossing gates two directions, so two rows per tick.
    assert_eq!(parquet_row_count(&path), 8);
    std::fs::remove_file(path).expect("temp parquet file should be removable");
}

#[test]
fn waiting_passengers_appear_in_every_tick_of_the_position_export() {
    let mut world = test_world(corridor_city(4));
    spawn_test_passenger(&mut world, GridPos::new(1, 1), GridPos::new(3, 1));
    let mut schedule = tick_schedule();

    run_ticks(&mut world, &mut schedule, 2);

    let path = temp_parquet_path("passenger_rows");
    write_passenger_positions_parquet(&path, world.resource::<SimSnapshots>())
        .expect("passenger positions parquet should write");

    assert_eq!(parquet_row_count(&path), 2);
    std::fs::remove_file(path).expect("temp parquet file should be removable");
}
