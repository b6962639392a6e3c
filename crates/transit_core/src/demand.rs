//! Demand composer: baseline curve scaled by the day's external factors.
//!
//! `predicted = base[route][hour] * weather * festival * market * jitter`
//!
//! The jitter band and the truncation policy are parameters so that each
//! caller states which preset it runs with (see [`JitterBand`] and
//! [`RoundingPolicy`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::weekday_index;
use crate::distributions::{JitterBand, UniformSource};
use crate::error::{ForecastError, Result};
use crate::reference::ReferenceData;
use crate::weather::EnvironmentalSnapshot;

/// How the fractional product is turned back into a passenger count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Multiply everything in f64 and truncate toward zero once.
    #[default]
    TruncateOnce,
    /// Truncate after every multiplication (weather, festival, market,
    /// jitter, in that order).
    TruncateEachStep,
}

/// The multipliers that produced one forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandFactors {
    pub weather: f64,
    pub festival: f64,
    pub market: f64,
    pub jitter: f64,
}

impl DemandFactors {
    pub const NEUTRAL: DemandFactors = DemandFactors {
        weather: 1.0,
        festival: 1.0,
        market: 1.0,
        jitter: 1.0,
    };

    pub fn composed(&self) -> f64 {
        self.weather * self.festival * self.market * self.jitter
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("weather", self.weather),
            ("festival", self.festival),
            ("market", self.market),
            ("jitter", self.jitter),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ForecastError::invalid(format!(
                    "{name} multiplier must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Apply the factors to a baseline count.
pub fn compose(base: u32, factors: &DemandFactors, rounding: RoundingPolicy) -> Result<u32> {
    factors.validate()?;
    let predicted = match rounding {
        RoundingPolicy::TruncateOnce => f64::from(base) * factors.composed(),
        RoundingPolicy::TruncateEachStep => {
            let weathered = (f64::from(base) * factors.weather).trunc();
            let festive = (weathered * factors.festival).trunc();
            let marketed = (festive * factors.market).trunc();
            marketed * factors.jitter
        }
    };
    // `as` saturates: negatives and NaN land on 0.
    Ok(predicted.trunc().max(0.0) as u32)
}

/// Factors that are fixed for a whole target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayContext {
    pub date: NaiveDate,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u8,
    pub weather_factor: f64,
    pub festival_factor: f64,
    pub festival_name: Option<String>,
}

impl DayContext {
    pub fn resolve(
        date: NaiveDate,
        snapshot: &EnvironmentalSnapshot,
        reference: &ReferenceData,
    ) -> Self {
        let event = reference.calendar.event_on(date);
        Self {
            date,
            weekday: weekday_index(date),
            weather_factor: snapshot.weather_factor,
            festival_factor: event.map(|e| e.multiplier).unwrap_or(1.0),
            festival_name: event.map(|e| e.name.clone()),
        }
    }

    /// Context with every date-level factor at 1.0.
    pub fn neutral(date: NaiveDate) -> Self {
        Self {
            date,
            weekday: weekday_index(date),
            weather_factor: 1.0,
            festival_factor: 1.0,
            festival_name: None,
        }
    }
}

/// Predicted passengers for one route-hour and how they were derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub route_id: String,
    pub date: NaiveDate,
    pub hour: u8,
    pub base_passengers: u32,
    pub predicted_passengers: u32,
    pub factors: DemandFactors,
    pub composed_factor: f64,
}

/// Composes forecasts against a fixed set of reference tables.
#[derive(Debug, Clone, Copy)]
pub struct DemandComposer<'a> {
    reference: &'a ReferenceData,
    jitter: JitterBand,
    rounding: RoundingPolicy,
}

impl<'a> DemandComposer<'a> {
    pub fn new(reference: &'a ReferenceData, jitter: JitterBand, rounding: RoundingPolicy) -> Self {
        Self {
            reference,
            jitter,
            rounding,
        }
    }

    /// Composer for the daily forward prediction (±5% jitter).
    pub fn forward(reference: &'a ReferenceData) -> Self {
        Self::new(reference, JitterBand::FORWARD, RoundingPolicy::default())
    }

    /// Composer for historical backfill (±20% jitter).
    pub fn backfill(reference: &'a ReferenceData) -> Self {
        Self::new(reference, JitterBand::BACKFILL, RoundingPolicy::default())
    }

    pub fn jitter(&self) -> JitterBand {
        self.jitter
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    /// Market multiplier for a route on the day's weekday.
    pub fn market_factor(&self, route_id: &str, day: &DayContext) -> f64 {
        self.reference.markets.multiplier(route_id, day.weekday)
    }

    /// Forecast one cell with date-level factors already resolved.
    ///
    /// Draws exactly one jitter value from `source`.
    pub fn predict_in(
        &self,
        route_id: &str,
        hour: u8,
        day: &DayContext,
        source: &mut dyn UniformSource,
    ) -> Result<DemandForecast> {
        let market = self.market_factor(route_id, day);
        self.predict_with_market(route_id, hour, day, market, source)
    }

    /// Like [`predict_in`](Self::predict_in), with the route's market
    /// multiplier resolved by the caller once per route.
    pub fn predict_with_market(
        &self,
        route_id: &str,
        hour: u8,
        day: &DayContext,
        market: f64,
        source: &mut dyn UniformSource,
    ) -> Result<DemandForecast> {
        let base = self.reference.profiles.baseline(route_id, hour)?;
        let factors = DemandFactors {
            weather: day.weather_factor,
            festival: day.festival_factor,
            market,
            jitter: self.jitter.sample(source),
        };
        self.forecast_from(route_id, hour, day.date, base, factors)
    }

    /// Forecast one cell, resolving the date's event and market day.
    pub fn predict(
        &self,
        route_id: &str,
        hour: u8,
        date: NaiveDate,
        snapshot: &EnvironmentalSnapshot,
        source: &mut dyn UniformSource,
    ) -> Result<DemandForecast> {
        let day = DayContext::resolve(date, snapshot, self.reference);
        self.predict_in(route_id, hour, &day, source)
    }

    /// Forecast one cell from explicit factors; no randomness involved.
    pub fn forecast_from(
        &self,
        route_id: &str,
        hour: u8,
        date: NaiveDate,
        base: u32,
        factors: DemandFactors,
    ) -> Result<DemandForecast> {
        let predicted_passengers = compose(base, &factors, self.rounding)?;
        Ok(DemandForecast {
            route_id: route_id.to_string(),
            date,
            hour,
            base_passengers: base,
            predicted_passengers,
            composed_factor: factors.composed(),
            factors,
        })
    }
}
