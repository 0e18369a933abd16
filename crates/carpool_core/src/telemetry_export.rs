use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int32Array, StringArray, UInt64Array, UInt8Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::ecs::MoveOutcome;
use crate::grid::Direction;
use crate::telemetry::SimSnapshots;

/// One row per live car per tick: what it did during that tick.
pub fn write_movements_parquet<P: AsRef<Path>>(
    path: P,
    snapshots: &SimSnapshots,
) -> Result<(), Box<dyn Error>> {
    let mut tick = Vec::new();
    let mut car = Vec::new();
    let mut movement = Vec::new();

    for snapshot in &snapshots.snapshots {
        for record in &snapshot.movements {
            tick.push(snapshot.tick);
            car.push(record.car.to_bits());
            movement.push(movement_code(record.next_direction));
        }
    }

    let schema = Schema::new(vec![
        Field::new("tick", DataType::UInt64, false),
        Field::new("car", DataType::UInt64, false),
        Field::new("movement", DataType::UInt8, false),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(tick)),
        Arc::new(UInt64Array::from(car)),
        Arc::new(UInt8Array::from(movement)),
    ];

    write_record_batch(path, schema, arrays)
}

/// One row per traffic light per tick, keyed by the light's wire id.
pub fn write_lights_parquet<P: AsRef<Path>>(
    path: P,
    snapshots: &SimSnapshots,
) -> Result<(), Box<dyn Error>> {
    let mut tick = Vec::new();
    let mut light = Vec::new();
    let mut state = Vec::new();

    for snapshot in &snapshots.snapshots {
        for record in &snapshot.lights {
            tick.push(snapshot.tick);
            light.push(record.id.clone());
            state.push(record.state.value());
        }
    }

    let schema = Schema::new(vec![
        Field::new("tick", DataType::UInt64, false),
        Field::new("light", DataType::Utf8, false),
        Field::new("state", DataType::UInt8, false),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(tick)),
        Arc::new(StringArray::from(light)),
        Arc::new(UInt8Array::from(state)),
    ];

    write_record_batch(path, schema, arrays)
}

/// One row per waiting or arrived passenger per tick.
pub fn write_passenger_positions_parquet<P: AsRef<Path>>(
    path: P,
    snapshots: &SimSnapshots,
) -> Result<(), Box<dyn Error>> {
    let mut tick = Vec::new();
    let mut x = Vec::new();
    let mut z = Vec::new();
    let mut arrived = Vec::new();

    for snapshot in &snapshots.snapshots {
        for record in &snapshot.passengers {
            tick.push(snapshot.tick);
            x.push(record.x);
            z.push(record.z);
            arrived.push(record.arrived);
        }
    }

    let schema = Schema::new(vec![
        Field::new("tick", DataType::UInt64, false),
        Field::new("x", DataType::Int32, false),
        Field::new("z", DataType::Int32, false),
        Field::new("arrived", DataType::Boolean, false),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(tick)),
        Arc::new(Int32Array::from(x)),
        Arc::new(Int32Array::from(z)),
        Arc::new(BooleanArray::from(arrived)),
    ];

    write_record_batch(path, schema, arrays)
}

fn write_record_batch<P: AsRef<Path>>(
    path: P,
    schema: Schema,
    arrays: Vec<ArrayRef>,
) -> Result<(), Box<dyn Error>> {
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn movement_code(outcome: MoveOutcome) -> u8 {
    match outcome {
        MoveOutcome::Step(Direction::Up) => 0,
        MoveOutcome::Step(Direction::Left) => 1,
        MoveOutcome::Step(Direction::Right) => 2,
        MoveOutcome::Step(Direction::Down) => 3,
        MoveOutcome::Hold => 4,
        MoveOutcome::Retired => 5,
    }
}
