//! Planning horizon: which dates to run and with which seeds.
//!
//! Each date gets its own seed (`base_seed + day offset`) so a multi-day run
//! produces the same numbers regardless of how rayon schedules the work.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use transit_core::error::{ForecastError, Result};

/// One date to plan, with the seed its random source starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRun {
    /// Identifier shared by every date of one horizon.
    pub plan_id: String,
    /// Day offset from the start of the horizon.
    pub run_id: usize,
    pub date: NaiveDate,
    pub seed: u64,
}

/// A contiguous range of target dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningHorizon {
    pub start: NaiveDate,
    pub days: u32,
    pub base_seed: u64,
}

impl PlanningHorizon {
    pub fn new(start: NaiveDate, days: u32, base_seed: u64) -> Self {
        Self {
            start,
            days,
            base_seed,
        }
    }

    /// Stable identifier, e.g. `plan-2025-11-01-7d-s42`.
    pub fn plan_id(&self) -> String {
        format!("plan-{}-{}d-s{}", self.start, self.days, self.base_seed)
    }

    pub fn end(&self) -> Result<NaiveDate> {
        let span = u64::from(self.days.saturating_sub(1));
        self.start
            .checked_add_days(Days::new(span))
            .ok_or_else(|| beyond_calendar(self.start, span))
    }

    /// One entry per date, in calendar order.
    pub fn generate(&self) -> Result<Vec<DateRun>> {
        let plan_id = self.plan_id();
        (0..self.days)
            .map(|offset| {
                let offset_days = u64::from(offset);
                let date = self
                    .start
                    .checked_add_days(Days::new(offset_days))
                    .ok_or_else(|| beyond_calendar(self.start, offset_days))?;
                Ok(DateRun {
                    plan_id: plan_id.clone(),
                    run_id: offset as usize,
                    date,
                    seed: self.base_seed.wrapping_add(offset_days),
                })
            })
            .collect()
    }
}

fn beyond_calendar(start: NaiveDate, offset_days: u64) -> ForecastError {
    ForecastError::invalid(format!("{start} + {offset_days} days is out of range"))
}
