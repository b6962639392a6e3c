use transit_core::backfill::HistoricalDemand;

use crate::runner::PlannedDay;

pub(crate) fn export_cells_impl(
    days: &[PlannedDay],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "plan_id",
        "run_id",
        "date",
        "route_id",
        "hour",
        "predicted_passengers",
        "recommended_buses",
        "frequency_minutes",
        "cost_per_hour",
        "utilization_rate",
        "weather_factor",
        "festival_factor",
        "market_factor",
        "jitter",
    ])?;

    for day in days {
        for cell in &day.daily.cells {
            wtr.write_record(vec![
                day.run.plan_id.clone(),
                day.run.run_id.to_string(),
                cell.prediction_date.to_string(),
                cell.route_id.clone(),
                cell.hour.to_string(),
                cell.predicted_passengers.to_string(),
                cell.recommended_buses.to_string(),
                cell.frequency_minutes.to_string(),
                format!("{:.2}", cell.cost_per_hour),
                format!("{:.4}", cell.utilization_rate),
                cell.factors.weather.to_string(),
                cell.factors.festival.to_string(),
                cell.factors.market.to_string(),
                format!("{:.4}", cell.factors.jitter),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_summaries_impl(
    days: &[PlannedDay],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "plan_id",
        "run_id",
        "seed",
        "date",
        "weather_condition",
        "weather_factor",
        "weather_alert",
        "festival_name",
        "day_type",
        "total_buses_needed",
        "estimated_cost",
        "total_predicted_passengers",
        "peak_hour",
        "peak_hour_buses",
        "mean_utilization",
        "cost_per_passenger",
        "fleet_delta",
    ])?;

    for day in days {
        let summary = &day.daily.summary;
        let factors = &day.daily.external_factors;
        let metrics = &day.metrics;
        wtr.write_record(vec![
            day.run.plan_id.clone(),
            day.run.run_id.to_string(),
            day.run.seed.to_string(),
            summary.prediction_date.to_string(),
            factors.weather_condition.label().to_string(),
            summary.weather_factor.to_string(),
            summary.weather_alert.to_string(),
            summary.festival_name.clone().unwrap_or_default(),
            factors.day_type.as_str().to_string(),
            summary.total_buses_needed.to_string(),
            format!("{:.2}", summary.estimated_cost),
            summary.total_predicted_passengers.to_string(),
            metrics.peak_hour.to_string(),
            metrics.peak_hour_buses.to_string(),
            format!("{:.4}", summary.mean_utilization),
            format!("{:.4}", metrics.cost_per_passenger),
            metrics
                .fleet_delta
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_history_impl(
    records: &[HistoricalDemand],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
