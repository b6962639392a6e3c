//! Bulk generation of past demand records.
//!
//! Seeds an empty history with plausible observations: baseline × festival ×
//! market × jitter, using the wide backfill band. Weather is not applied on
//! this path.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::CallSitePolicy;
use crate::demand::{DayContext, DemandComposer};
use crate::distributions::UniformSource;
use crate::error::{ForecastError, Result};
use crate::orchestrator::HOURS_PER_DAY;
use crate::reference::ReferenceData;

/// One observed (route, date, hour) passenger count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDemand {
    pub route_id: String,
    pub date: NaiveDate,
    pub hour: u8,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    pub passenger_count: u32,
    pub festival_factor: f64,
    pub market_factor: f64,
}

/// Generate `days` days of history ending at `end_date` (inclusive), newest
/// day first.
pub fn generate_history(
    reference: &ReferenceData,
    policy: CallSitePolicy,
    end_date: NaiveDate,
    days: u32,
    source: &mut dyn UniformSource,
) -> Result<Vec<HistoricalDemand>> {
    reference.validate()?;
    policy.jitter.validate()?;

    let composer = DemandComposer::new(reference, policy.jitter, policy.rounding);
    let cells_per_day = reference.routes.len() * usize::from(HOURS_PER_DAY);
    let mut records = Vec::with_capacity(days as usize * cells_per_day);

    for days_back in 0..days {
        let date = end_date
            .checked_sub_days(Days::new(u64::from(days_back)))
            .ok_or_else(|| out_of_range(days_back, end_date))?;
        let mut day = DayContext::neutral(date);
        day.festival_factor = reference.calendar.multiplier_on(date);

        for route in reference.routes.iter() {
            let market = composer.market_factor(&route.id, &day);
            for hour in 0..HOURS_PER_DAY {
                let forecast = composer
                    .predict_with_market(&route.id, hour, &day, market, source)
                    .map_err(|e| e.at_cell(&route.id, hour))?;
                records.push(HistoricalDemand {
                    route_id: route.id.clone(),
                    date,
                    hour,
                    day_of_week: day.weekday,
                    passenger_count: forecast.predicted_passengers,
                    festival_factor: forecast.factors.festival,
                    market_factor: forecast.factors.market,
                });
            }
        }
    }

    info!(days, records = records.len(), end = %end_date, "history backfilled");
    Ok(records)
}

fn out_of_range(days_back: u32, end_date: NaiveDate) -> ForecastError {
    ForecastError::invalid(format!(
        "{days_back} days before {end_date} is out of range"
    ))
}

/// Passengers per (route, date).
pub fn daily_totals(records: &[HistoricalDemand]) -> BTreeMap<(String, NaiveDate), u64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals
            .entry((record.route_id.clone(), record.date))
            .or_insert(0) += u64::from(record.passenger_count);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{MidpointUniform, SeededUniform};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn record_count_and_order() {
        let reference = ReferenceData::tiruppur_defaults();
        let records = generate_history(
            &reference,
            CallSitePolicy::BACKFILL,
            date(2025, 11, 10),
            30,
            &mut SeededUniform::from_seed(5),
        )
        .unwrap();
        assert_eq!(records.len(), 30 * 3 * 24);
        assert_eq!(records[0].date, date(2025, 11, 10));
        assert_eq!(records.last().unwrap().date, date(2025, 10, 12));
    }

    #[test]
    fn counts_stay_within_backfill_band() {
        let reference = ReferenceData::tiruppur_defaults();
        let records = generate_history(
            &reference,
            CallSitePolicy::BACKFILL,
            date(2025, 11, 10),
            14,
            &mut SeededUniform::from_seed(21),
        )
        .unwrap();
        for record in &records {
            let base = reference.profiles.baseline(&record.route_id, record.hour);
            let scaled = f64::from(base.unwrap()) * record.festival_factor;
            let scaled = scaled * record.market_factor;
            let count = f64::from(record.passenger_count);
            assert!(count >= (scaled * 0.8).floor() - 1.0, "{record:?}");
            assert!(count <= scaled * 1.2 + 1e-6, "{record:?}");
        }
    }

    #[test]
    fn festival_and_market_factors_recorded() {
        let reference = ReferenceData::tiruppur_defaults();
        // Single day: Diwali 2025-11-01, a Saturday (market on tp_cb and tp_sl).
        let records = generate_history(
            &reference,
            CallSitePolicy::BACKFILL,
            date(2025, 11, 1),
            1,
            &mut MidpointUniform,
        )
        .unwrap();
        let cb = records
            .iter()
            .find(|r| r.route_id == "tp_cb" && r.hour == 17)
            .unwrap();
        assert_eq!(cb.festival_factor, 1.9);
        assert_eq!(cb.market_factor, 1.3);
        assert_eq!(cb.day_of_week, 5);
        let pc = records
            .iter()
            .find(|r| r.route_id == "tp_pc" && r.hour == 17)
            .unwrap();
        assert_eq!(pc.market_factor, 1.0);
    }

    #[test]
    fn daily_totals_aggregate_hours() {
        let reference = ReferenceData::tiruppur_defaults();
        // 2025-11-04: Tuesday, market day only on tp_pc, no festival.
        let records = generate_history(
            &reference,
            CallSitePolicy::BACKFILL,
            date(2025, 11, 4),
            1,
            &mut MidpointUniform,
        )
        .unwrap();
        let totals = daily_totals(&records);
        let cb = totals[&("tp_cb".to_string(), date(2025, 11, 4))];
        let baseline = reference.profiles.daily_total("tp_cb").unwrap();
        assert_eq!(cb, u64::from(baseline));
    }

    #[test]
    fn zero_days_is_empty() {
        let reference = ReferenceData::tiruppur_defaults();
        let records = generate_history(
            &reference,
            CallSitePolicy::BACKFILL,
            date(2025, 11, 4),
            0,
            &mut MidpointUniform,
        )
        .unwrap();
        assert!(records.is_empty());
    }
}
