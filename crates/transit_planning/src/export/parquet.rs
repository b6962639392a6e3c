use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use transit_core::orchestrator::ScheduleCell;

use crate::runner::PlannedDay;

pub(crate) fn export_cells_impl(
    days: &[PlannedDay],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    write_batch(build_cells_batch(days)?, file)
}

pub(crate) fn export_metrics_impl(
    days: &[PlannedDay],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    write_batch(build_metrics_batch(days)?, file)
}

fn write_batch(batch: RecordBatch, file: std::fs::File) -> Result<(), Box<dyn std::error::Error>> {
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}

fn cells_schema() -> Schema {
    Schema::new(vec![
        Field::new("plan_id", DataType::Utf8, false),
        Field::new("run_id", DataType::UInt64, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("route_id", DataType::Utf8, false),
        Field::new("hour", DataType::UInt32, false),
        Field::new("predicted_passengers", DataType::UInt32, false),
        Field::new("recommended_buses", DataType::UInt32, false),
        Field::new("frequency_minutes", DataType::UInt32, false),
        Field::new("cost_per_hour", DataType::Float64, false),
        Field::new("utilization_rate", DataType::Float64, false),
        Field::new("weather_factor", DataType::Float64, false),
        Field::new("festival_factor", DataType::Float64, false),
        Field::new("market_factor", DataType::Float64, false),
        Field::new("jitter", DataType::Float64, false),
    ])
}

fn build_cells_batch(days: &[PlannedDay]) -> Result<RecordBatch, arrow::error::ArrowError> {
    let mut rows: Vec<(&PlannedDay, &ScheduleCell)> = Vec::new();
    for day in days {
        for cell in &day.daily.cells {
            rows.push((day, cell));
        }
    }

    let f64_column = |f: fn(&ScheduleCell) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(
            rows.iter().map(|(_, c)| f(c)).collect::<Vec<_>>(),
        ))
    };
    let u32_column = |f: fn(&ScheduleCell) -> u32| -> ArrayRef {
        Arc::new(UInt32Array::from(
            rows.iter().map(|(_, c)| f(c)).collect::<Vec<_>>(),
        ))
    };

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            rows.iter()
                .map(|(d, _)| d.run.plan_id.clone())
                .collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.iter()
                .map(|(d, _)| d.run.run_id as u64)
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|(_, c)| c.prediction_date.to_string())
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|(_, c)| c.route_id.clone())
                .collect::<Vec<_>>(),
        )),
        u32_column(|c| u32::from(c.hour)),
        u32_column(|c| c.predicted_passengers),
        u32_column(|c| c.recommended_buses),
        u32_column(|c| c.frequency_minutes),
        f64_column(|c| c.cost_per_hour),
        f64_column(|c| c.utilization_rate),
        f64_column(|c| c.factors.weather),
        f64_column(|c| c.factors.festival),
        f64_column(|c| c.factors.market),
        f64_column(|c| c.factors.jitter),
    ];

    RecordBatch::try_new(Arc::new(cells_schema()), arrays)
}

fn metrics_schema() -> Schema {
    Schema::new(vec![
        Field::new("plan_id", DataType::Utf8, false),
        Field::new("seed", DataType::UInt64, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("total_buses_needed", DataType::UInt32, false),
        Field::new("estimated_cost", DataType::Float64, false),
        Field::new("total_predicted_passengers", DataType::UInt64, false),
        Field::new("peak_hour", DataType::UInt32, false),
        Field::new("peak_hour_buses", DataType::UInt32, false),
        Field::new("mean_utilization", DataType::Float64, false),
        Field::new("cost_per_passenger", DataType::Float64, false),
        Field::new("weather_factor", DataType::Float64, false),
        Field::new("weather_alert", DataType::Boolean, false),
        Field::new("festival_name", DataType::Utf8, true),
        Field::new("fleet_delta", DataType::Int64, true),
    ])
}

fn build_metrics_batch(days: &[PlannedDay]) -> Result<RecordBatch, arrow::error::ArrowError> {
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            days.iter()
                .map(|d| d.run.plan_id.clone())
                .collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            days.iter().map(|d| d.run.seed).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            days.iter()
                .map(|d| d.metrics.date.to_string())
                .collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            days.iter()
                .map(|d| d.metrics.total_buses_needed)
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            days.iter()
                .map(|d| d.metrics.estimated_cost)
                .collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            days.iter()
                .map(|d| d.metrics.total_predicted_passengers)
                .collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            days.iter()
                .map(|d| u32::from(d.metrics.peak_hour))
                .collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            days.iter()
                .map(|d| d.metrics.peak_hour_buses)
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            days.iter()
                .map(|d| d.metrics.mean_utilization)
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            days.iter()
                .map(|d| d.metrics.cost_per_passenger)
                .collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            days.iter()
                .map(|d| d.metrics.weather_factor)
                .collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            days.iter()
                .map(|d| d.metrics.weather_alert)
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            days.iter()
                .map(|d| d.metrics.festival_name.clone())
                .collect::<Vec<_>>(),
        )),
        Arc::new(Int64Array::from(
            days.iter()
                .map(|d| d.metrics.fleet_delta)
                .collect::<Vec<_>>(),
        )),
    ];

    RecordBatch::try_new(Arc::new(metrics_schema()), arrays)
}
