//! Hourly operating cost of a fleet allocation.
//!
//! Formula (per hour, `trips = 60 / frequency_minutes`):
//!
//! ```text
//! fuel        = distance_km * fuel_per_km        * trips * buses
//! driver      = driver_per_hour * buses
//! maintenance = distance_km * maintenance_per_km * trips * buses
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::routes::RouteTable;
use crate::schedule::FleetAllocation;

/// Fuel cost per km, per trip, per bus.
pub const FUEL_PER_KM: f64 = 8.5;

/// Driver wage per bus-hour.
pub const DRIVER_PER_HOUR: f64 = 120.0;

/// Maintenance cost per km, per trip, per bus.
pub const MAINTENANCE_PER_KM: f64 = 3.2;

/// Unit rates feeding the cost formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    pub fuel_per_km: f64,
    pub driver_per_hour: f64,
    pub maintenance_per_km: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            fuel_per_km: FUEL_PER_KM,
            driver_per_hour: DRIVER_PER_HOUR,
            maintenance_per_km: MAINTENANCE_PER_KM,
        }
    }
}

/// Hourly cost split into its components. Every field is non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub fuel: f64,
    pub driver: f64,
    pub maintenance: f64,
    pub total: f64,
}

impl CostRates {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("fuel_per_km", self.fuel_per_km),
            ("driver_per_hour", self.driver_per_hour),
            ("maintenance_per_km", self.maintenance_per_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::invalid(format!(
                    "{name} must be a non-negative rate, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Cost of running `buses` buses for one hour on a route of
    /// `distance_km`, dispatching every `frequency_minutes`.
    pub fn hourly_cost(
        &self,
        buses: u32,
        distance_km: u32,
        frequency_minutes: u32,
    ) -> Result<CostEstimate> {
        if buses == 0 {
            return Ok(CostEstimate::default());
        }
        if distance_km == 0 {
            return Err(ForecastError::invalid("route distance must be positive"));
        }
        if frequency_minutes == 0 {
            return Err(ForecastError::invalid(format!(
                "frequency must be positive when {buses} buses run"
            )));
        }

        let trips_per_hour = 60.0 / f64::from(frequency_minutes);
        let bus_km = f64::from(distance_km) * trips_per_hour * f64::from(buses);

        let fuel = bus_km * self.fuel_per_km;
        let driver = self.driver_per_hour * f64::from(buses);
        let maintenance = bus_km * self.maintenance_per_km;

        Ok(CostEstimate {
            fuel,
            driver,
            maintenance,
            total: fuel + driver + maintenance,
        })
    }

    pub fn allocation_cost(
        &self,
        allocation: FleetAllocation,
        distance_km: u32,
    ) -> Result<CostEstimate> {
        self.hourly_cost(allocation.buses, distance_km, allocation.frequency_minutes)
    }

    /// Same as [`CostRates::allocation_cost`], resolving the distance from
    /// the route table.
    pub fn route_hourly_cost(
        &self,
        routes: &RouteTable,
        route_id: &str,
        allocation: FleetAllocation,
    ) -> Result<CostEstimate> {
        let route = routes.require(route_id)?;
        self.allocation_cost(allocation, route.distance_km)
    }
}

/// Hourly cost at the default rates.
pub fn hourly_cost(buses: u32, distance_km: u32, frequency_minutes: u32) -> Result<CostEstimate> {
    let rates = CostRates::default();
    rates.hourly_cost(buses, distance_km, frequency_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_buses_costs_nothing() {
        for (distance, frequency) in [(0, 120), (85, 90), (113, 10), (65, 0)] {
            let cost = hourly_cost(0, distance, frequency).unwrap();
            assert_eq!(cost, CostEstimate::default());
        }
    }

    #[test]
    fn single_bus_pollachi_reference() {
        let cost = hourly_cost(1, 85, 90).unwrap();
        assert!((cost.total - 782.9).abs() < 0.5, "{cost:?}");
        assert!((cost.fuel - 481.67).abs() < 0.01);
        assert_eq!(cost.driver, 120.0);
        assert!((cost.maintenance - 181.33).abs() < 0.01);
    }

    #[test]
    fn components_sum_to_total() {
        let cost = hourly_cost(8, 113, 10).unwrap();
        let parts = cost.fuel + cost.driver + cost.maintenance;
        assert!((parts - cost.total).abs() < 1e-9);
        for part in [cost.fuel, cost.driver, cost.maintenance] {
            assert!(part >= 0.0);
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(hourly_cost(1, 0, 90).is_err());
        assert!(hourly_cost(2, 65, 0).is_err());
    }

    #[test]
    fn route_cost_uses_route_distance() {
        let routes = RouteTable::tiruppur_defaults();
        let rates = CostRates::default();
        let allocation = FleetAllocation {
            buses: 1,
            frequency_minutes: 90,
        };
        let via_route = rates.route_hourly_cost(&routes, "tp_pc", allocation);
        let direct = rates.hourly_cost(1, 85, 90).unwrap();
        assert_eq!(via_route.unwrap(), direct);
        let unknown = rates.route_hourly_cost(&routes, "tp_zz", allocation);
        assert!(unknown.is_err());
    }

    #[test]
    fn negative_rates_fail_validation() {
        let rates = CostRates {
            fuel_per_km: -1.0,
            ..CostRates::default()
        };
        assert!(rates.validate().is_err());
        assert!(CostRates::default().validate().is_ok());
    }
}
