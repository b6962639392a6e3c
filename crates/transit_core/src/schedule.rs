//! Tiered fleet-allocation policy.
//!
//! Predicted demand maps to a bus count and a dispatch interval through an
//! ordered table of bands scanned top-down; demand above the last band falls
//! through to an overflow rule.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Seats per bus used by the default utilization calculation.
pub const DEFAULT_BUS_CAPACITY: u32 = 45;

/// Passengers per bus assumed by the overflow rule.
const OVERFLOW_PASSENGERS_PER_BUS: u32 = 45;
const OVERFLOW_MIN_BUSES: u32 = 3;
const OVERFLOW_MAX_BUSES: u32 = 8;
const OVERFLOW_MIN_FREQUENCY: u32 = 10;

/// One band of the allocation policy: demand up to and including
/// `max_demand` gets `buses` buses every `frequency_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTier {
    pub max_demand: u32,
    pub buses: u32,
    pub frequency_minutes: u32,
}

const fn tier(max_demand: u32, buses: u32, frequency_minutes: u32) -> ScheduleTier {
    ScheduleTier {
        max_demand,
        buses,
        frequency_minutes,
    }
}

/// Ascending bands; the first band whose `max_demand` covers the demand wins.
pub const SCHEDULE_TIERS: [ScheduleTier; 8] = [
    tier(0, 0, 120),
    tier(20, 1, 90),
    tier(45, 1, 60),
    tier(90, 2, 45),
    tier(135, 2, 30),
    tier(200, 3, 25),
    tier(300, 4, 20),
    tier(400, 5, 15),
];

/// Bus count and dispatch interval for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetAllocation {
    pub buses: u32,
    /// Minutes between departures, always positive.
    pub frequency_minutes: u32,
}

/// Allocation for a demand level. Total over all non-negative demand.
pub fn optimal_schedule(demand: u32) -> FleetAllocation {
    SCHEDULE_TIERS
        .iter()
        .find(|t| demand <= t.max_demand)
        .map(|t| FleetAllocation {
            buses: t.buses,
            frequency_minutes: t.frequency_minutes,
        })
        .unwrap_or_else(|| overflow_allocation(demand))
}

/// Signed entry point for callers holding raw counts; negative demand is a
/// caller bug and is rejected.
pub fn optimal_schedule_checked(demand: i64) -> Result<FleetAllocation> {
    let demand = u32::try_from(demand).map_err(|_| {
        ForecastError::invalid(format!(
            "demand must be a non-negative 32-bit count, got {demand}"
        ))
    })?;
    Ok(optimal_schedule(demand))
}

fn overflow_allocation(demand: u32) -> FleetAllocation {
    let buses = demand
        .div_ceil(OVERFLOW_PASSENGERS_PER_BUS)
        .clamp(OVERFLOW_MIN_BUSES, OVERFLOW_MAX_BUSES);
    let dispatch_slots = buses.saturating_sub(2).max(1);
    let frequency_minutes = (60 / dispatch_slots).max(OVERFLOW_MIN_FREQUENCY);
    FleetAllocation {
        buses,
        frequency_minutes,
    }
}

/// Share of offered seats filled, capped at 1.0. Zero when no bus runs.
pub fn utilization(demand: u32, buses: u32, capacity: u32) -> f64 {
    if buses == 0 || capacity == 0 {
        return 0.0;
    }
    let seats = f64::from(buses) * f64::from(capacity);
    (f64::from(demand) / seats).min(1.0)
}

/// Allocation plus its utilization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDecision {
    pub buses: u32,
    pub frequency_minutes: u32,
    pub utilization: f64,
}

impl ScheduleDecision {
    pub fn for_demand(demand: u32, capacity: u32) -> Self {
        let allocation = optimal_schedule(demand);
        Self {
            buses: allocation.buses,
            frequency_minutes: allocation.frequency_minutes,
            utilization: utilization(demand, allocation.buses, capacity),
        }
    }

    pub fn allocation(&self) -> FleetAllocation {
        FleetAllocation {
            buses: self.buses,
            frequency_minutes: self.frequency_minutes,
        }
    }
}
