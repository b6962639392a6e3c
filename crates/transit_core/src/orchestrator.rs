//! Daily update: every route × every hour for one target date.
//!
//! A run samples the weather once, resolves the calendar event once and the
//! market flag once per route, then pushes each of the `routes × 24` cells
//! through demand → schedule → cost. Any failing cell fails the whole run;
//! a partial daily schedule is never returned.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calendar::DayType;
use crate::config::ForecastConfig;
use crate::cost::CostEstimate;
use crate::demand::{DayContext, DemandComposer, DemandFactors};
use crate::distributions::UniformSource;
use crate::error::{ForecastError, Result};
use crate::reference::ReferenceData;
use crate::routes::Route;
use crate::schedule::ScheduleDecision;
use crate::weather::{EnvironmentalSnapshot, WeatherCondition};

pub const HOURS_PER_DAY: u8 = 24;

/// Result for one (route, hour) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCell {
    pub route_id: String,
    pub prediction_date: NaiveDate,
    pub hour: u8,
    pub predicted_passengers: u32,
    pub recommended_buses: u32,
    pub frequency_minutes: u32,
    pub cost_per_hour: f64,
    pub utilization_rate: f64,
    pub factors: DemandFactors,
    pub cost: CostEstimate,
}

/// External conditions recorded for the target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFactors {
    pub date: NaiveDate,
    pub weather_condition: WeatherCondition,
    pub temperature_c: f64,
    pub rainfall_mm: f64,
    pub humidity_pct: f64,
    pub is_festival: bool,
    pub festival_name: Option<String>,
    pub festival_impact: f64,
    pub day_type: DayType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub prediction_date: NaiveDate,
    pub weather_factor: f64,
    pub is_festival: bool,
    pub festival_name: Option<String>,
    pub total_buses_needed: u32,
    /// Rounded to two decimals.
    pub estimated_cost: f64,
    pub total_predicted_passengers: u64,
    /// Mean utilization over cells with at least one bus, 0.0 when none run.
    pub mean_utilization: f64,
    /// Rainfall above the heavy-rain threshold.
    pub weather_alert: bool,
}

/// Raised when tomorrow's bus total departs notably from today's fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetChangeNotice {
    pub total_buses_needed: u32,
    pub current_fleet: u32,
    pub delta: i64,
    pub message: String,
}

impl FleetChangeNotice {
    /// `Some` when `|total - current| > threshold`.
    pub fn evaluate(total_buses_needed: u32, current_fleet: u32, threshold: u32) -> Option<Self> {
        let delta = i64::from(total_buses_needed) - i64::from(current_fleet);
        if delta.unsigned_abs() <= u64::from(threshold) {
            return None;
        }
        let sign = if delta > 0 { "+" } else { "" };
        Some(Self {
            total_buses_needed,
            current_fleet,
            delta,
            message: format!(
                "Tomorrow requires {total_buses_needed} buses ({sign}{delta} from today)"
            ),
        })
    }
}

/// Everything a daily run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRun {
    pub summary: DailySummary,
    pub cells: Vec<ScheduleCell>,
    pub external_factors: ExternalFactors,
    pub snapshot: EnvironmentalSnapshot,
    pub fleet_change: Option<FleetChangeNotice>,
}

impl DailyRun {
    pub fn cells_for<'r>(
        &'r self,
        route_id: &'r str,
    ) -> impl Iterator<Item = &'r ScheduleCell> + 'r {
        self.cells.iter().filter(move |c| c.route_id == route_id)
    }

    pub fn cell(&self, route_id: &str, hour: u8) -> Option<&ScheduleCell> {
        self.cells
            .iter()
            .find(|c| c.route_id == route_id && c.hour == hour)
    }

    /// Unrounded sum of every cell's hourly cost.
    pub fn raw_total_cost(&self) -> f64 {
        self.cells.iter().map(|c| c.cost_per_hour).sum()
    }
}

/// The day after `today`; the daily update always plans for tomorrow.
pub fn next_day(today: NaiveDate) -> Result<NaiveDate> {
    today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| ForecastError::invalid(format!("no day after {today}")))
}

/// Drives the pipeline for one date.
#[derive(Debug, Clone, Copy)]
pub struct DailyUpdate<'a> {
    reference: &'a ReferenceData,
    config: &'a ForecastConfig,
}

impl<'a> DailyUpdate<'a> {
    pub fn new(reference: &'a ReferenceData, config: &'a ForecastConfig) -> Self {
        Self { reference, config }
    }

    /// Run against the configured current fleet.
    pub fn run(&self, target_date: NaiveDate, source: &mut dyn UniformSource) -> Result<DailyRun> {
        self.run_against(target_date, self.config.current_fleet, source)
    }

    /// Run and compare the bus total with a caller-supplied fleet size.
    ///
    /// Draw order from `source` is fixed: the weather snapshot first, then
    /// one jitter per cell in route-table order, hour 0 to 23.
    pub fn run_against(
        &self,
        target_date: NaiveDate,
        current_fleet: u32,
        source: &mut dyn UniformSource,
    ) -> Result<DailyRun> {
        self.reference.validate()?;
        self.config.validate()?;

        let snapshot = EnvironmentalSnapshot::generate(target_date.month(), source)?;
        let day = DayContext::resolve(target_date, &snapshot, self.reference);
        let composer = DemandComposer::new(
            self.reference,
            self.config.forward.jitter,
            self.config.forward.rounding,
        );

        let cells = self.schedule_cells(&composer, &day, source)?;
        let total_buses: u32 = cells.iter().map(|c| c.recommended_buses).sum();
        let total_cost: f64 = cells.iter().map(|c| c.cost_per_hour).sum();
        let total_passengers: u64 = cells
            .iter()
            .map(|c| u64::from(c.predicted_passengers))
            .sum();

        let summary = DailySummary {
            prediction_date: target_date,
            weather_factor: snapshot.weather_factor,
            is_festival: day.festival_name.is_some(),
            festival_name: day.festival_name.clone(),
            total_buses_needed: total_buses,
            estimated_cost: round_cents(total_cost),
            total_predicted_passengers: total_passengers,
            mean_utilization: mean_active_utilization(&cells),
            weather_alert: snapshot.is_heavy_rain(),
        };

        let external_factors = ExternalFactors {
            date: target_date,
            weather_condition: snapshot.condition,
            temperature_c: snapshot.temperature_c,
            rainfall_mm: snapshot.rainfall_mm,
            humidity_pct: snapshot.humidity_pct,
            is_festival: summary.is_festival,
            festival_name: day.festival_name.clone(),
            festival_impact: day.festival_factor,
            day_type: DayType::classify(target_date, &self.reference.calendar),
        };

        let fleet_change = FleetChangeNotice::evaluate(
            total_buses,
            current_fleet,
            self.config.fleet_change_threshold,
        );

        if summary.weather_alert {
            warn!(
                date = %target_date,
                rainfall_mm = snapshot.rainfall_mm,
                "heavy rainfall expected, demand raised"
            );
        }
        if let Some(notice) = &fleet_change {
            warn!(date = %target_date, delta = notice.delta, "{}", notice.message);
        }
        info!(
            date = %target_date,
            total_buses = summary.total_buses_needed,
            estimated_cost = summary.estimated_cost,
            festival = summary.festival_name.as_deref().unwrap_or("-"),
            "daily update complete"
        );

        Ok(DailyRun {
            summary,
            cells,
            external_factors,
            snapshot,
            fleet_change,
        })
    }

    /// Every route × hour cell, in draw order. The market multiplier is
    /// resolved once per route.
    fn schedule_cells(
        &self,
        composer: &DemandComposer<'_>,
        day: &DayContext,
        source: &mut dyn UniformSource,
    ) -> Result<Vec<ScheduleCell>> {
        let capacity = self.reference.routes.len() * usize::from(HOURS_PER_DAY);
        let mut cells = Vec::with_capacity(capacity);
        for route in self.reference.routes.iter() {
            let market = composer.market_factor(&route.id, day);
            let mut route_buses = 0;
            for hour in 0..HOURS_PER_DAY {
                let cell = self
                    .compute_cell(composer, route, hour, day, market, source)
                    .map_err(|e| e.at_cell(&route.id, hour))?;
                route_buses += cell.recommended_buses;
                cells.push(cell);
            }
            debug!(route = %route.id, market, buses = route_buses, "route scheduled");
        }
        Ok(cells)
    }

    fn compute_cell(
        &self,
        composer: &DemandComposer<'_>,
        route: &Route,
        hour: u8,
        day: &DayContext,
        market: f64,
        source: &mut dyn UniformSource,
    ) -> Result<ScheduleCell> {
        let id = route.id.as_str();
        let forecast = composer.predict_with_market(id, hour, day, market, source)?;
        let demand = forecast.predicted_passengers;
        let decision = ScheduleDecision::for_demand(demand, self.config.bus_capacity);
        let cost = self
            .config
            .cost_rates
            .allocation_cost(decision.allocation(), route.distance_km)?;

        Ok(ScheduleCell {
            route_id: route.id.clone(),
            prediction_date: day.date,
            hour,
            predicted_passengers: forecast.predicted_passengers,
            recommended_buses: decision.buses,
            frequency_minutes: decision.frequency_minutes,
            cost_per_hour: cost.total,
            utilization_rate: decision.utilization,
            factors: forecast.factors,
            cost,
        })
    }
}

fn mean_active_utilization(cells: &[ScheduleCell]) -> f64 {
    let active: Vec<f64> = cells
        .iter()
        .filter(|c| c.recommended_buses > 0)
        .map(|c| c.utilization_rate)
        .collect();
    if active.is_empty() {
        0.0
    } else {
        active.iter().sum::<f64>() / active.len() as f64
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
