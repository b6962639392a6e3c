//! Metrics derived from a completed daily run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use transit_core::orchestrator::{DailyRun, ScheduleCell};

/// Aggregates for one route on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub route_id: String,
    pub bus_hours: u32,
    pub predicted_passengers: u64,
    pub cost: f64,
    /// Mean over hours with at least one bus.
    pub mean_utilization: f64,
    pub peak_hour: u8,
    pub peak_buses: u32,
}

/// Aggregated metrics from a single daily run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    pub date: NaiveDate,
    pub total_buses_needed: u32,
    pub estimated_cost: f64,
    pub total_predicted_passengers: u64,
    /// Hour with the most buses summed over routes (earliest on ties).
    pub peak_hour: u8,
    pub peak_hour_buses: u32,
    /// Mean over every cell with at least one bus.
    pub mean_utilization: f64,
    /// Zero when no passengers are predicted.
    pub cost_per_passenger: f64,
    pub weather_factor: f64,
    pub festival_name: Option<String>,
    pub weather_alert: bool,
    pub fleet_delta: Option<i64>,
    pub routes: Vec<RouteMetrics>,
}

pub fn extract_metrics(run: &DailyRun) -> PlanMetrics {
    let (peak_hour, peak_hour_buses) = peak_by_hour(&run.cells);
    let summary = &run.summary;
    let cost_per_passenger = if summary.total_predicted_passengers == 0 {
        0.0
    } else {
        summary.estimated_cost / summary.total_predicted_passengers as f64
    };

    let mut route_ids: Vec<&str> = Vec::new();
    for cell in &run.cells {
        if !route_ids.contains(&cell.route_id.as_str()) {
            route_ids.push(&cell.route_id);
        }
    }
    let routes = route_ids
        .into_iter()
        .map(|route_id| {
            let cells: Vec<&ScheduleCell> = run.cells_for(route_id).collect();
            route_metrics(route_id, &cells)
        })
        .collect();

    PlanMetrics {
        date: summary.prediction_date,
        total_buses_needed: summary.total_buses_needed,
        estimated_cost: summary.estimated_cost,
        total_predicted_passengers: summary.total_predicted_passengers,
        peak_hour,
        peak_hour_buses,
        mean_utilization: summary.mean_utilization,
        cost_per_passenger,
        weather_factor: summary.weather_factor,
        festival_name: summary.festival_name.clone(),
        weather_alert: summary.weather_alert,
        fleet_delta: run.fleet_change.as_ref().map(|n| n.delta),
        routes,
    }
}

fn route_metrics(route_id: &str, cells: &[&ScheduleCell]) -> RouteMetrics {
    let mut bus_hours = 0;
    let mut passengers = 0u64;
    let mut cost = 0.0;
    let mut peak = (0u8, 0u32);
    for cell in cells {
        bus_hours += cell.recommended_buses;
        passengers += u64::from(cell.predicted_passengers);
        cost += cell.cost_per_hour;
        if cell.recommended_buses > peak.1 {
            peak = (cell.hour, cell.recommended_buses);
        }
    }
    RouteMetrics {
        route_id: route_id.to_string(),
        bus_hours,
        predicted_passengers: passengers,
        cost,
        mean_utilization: mean_active_utilization(cells),
        peak_hour: peak.0,
        peak_buses: peak.1,
    }
}

fn peak_by_hour(cells: &[ScheduleCell]) -> (u8, u32) {
    let mut per_hour = [0u32; 24];
    for cell in cells {
        if let Some(slot) = per_hour.get_mut(usize::from(cell.hour)) {
            *slot += cell.recommended_buses;
        }
    }
    per_hour
        .iter()
        .enumerate()
        .fold((0u8, 0u32), |best, (hour, &buses)| {
            if buses > best.1 {
                (hour as u8, buses)
            } else {
                best
            }
        })
}

fn mean_active_utilization(cells: &[&ScheduleCell]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for cell in cells.iter().filter(|c| c.recommended_buses > 0) {
        sum += cell.utilization_rate;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
