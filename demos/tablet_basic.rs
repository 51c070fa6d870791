//! Basic Tablet Usage
//!
//! Stages readings for one device, flushing a record batch each time the
//! tablet fills up.
//!
//! Run with `RUST_LOG=debug cargo run --example tablet_basic` to see the
//! tablet lifecycle logs.

use anyhow::Result;
use arrow::array::Array;
use tablet::{MeasurementSchema, Tablet, TabletConfig};

fn main() -> Result<()> {
    env_logger::init();

    let schema: Vec<MeasurementSchema> = serde_json::from_str(
        r#"[
            {"name": "temperature", "data_type": "double"},
            {"name": "humidity", "data_type": "float"},
            {"name": "door_open", "data_type": "boolean"},
            {"name": "firmware", "data_type": "text"}
        ]"#,
    )?;
    let config = TabletConfig::default().with_max_rows(4);
    let mut tablet = Tablet::with_config(schema, config)?.with_device_id("root.site1.fridge3");

    let start_ms = 1_738_108_800_000i64;
    for i in 0..10i64 {
        let row = tablet.row_count();
        tablet.set_timestamp(row, start_ms + i * 1_000)?;
        tablet.set_value(row, "temperature", 4.0 + i as f64 * 0.1)?;
        if i % 3 != 0 {
            tablet.set_value(row, "humidity", 41.5f32)?;
        }
        tablet.set_value(row, "door_open", i == 5)?;
        if i == 0 {
            tablet.set_value(row, "firmware", "v2.4.1")?;
        }

        if tablet.is_full() {
            flush(&mut tablet)?;
        }
    }
    if !tablet.is_empty() {
        flush(&mut tablet)?;
    }

    Ok(())
}

fn flush(tablet: &mut Tablet) -> Result<()> {
    let batch = tablet.to_record_batch()?;
    let (min_ts, max_ts) = tablet.time_range().unwrap_or_default();
    println!(
        "{}: {} rows [{min_ts}, {max_ts}]",
        tablet.device_id().unwrap_or("<unknown>"),
        batch.num_rows()
    );
    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        println!("  {:<12} nulls={}", field.name(), column.null_count());
    }
    tablet.reset();
    Ok(())
}
