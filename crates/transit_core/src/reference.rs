//! Bundle of the static tables every run reads.

use serde::{Deserialize, Serialize};

use crate::calendar::{EventCalendar, MarketDays};
use crate::error::{ForecastError, Result};
use crate::patterns::BaseDemandProfiles;
use crate::routes::RouteTable;

/// Immutable reference data, loaded once and shared read-only by every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub routes: RouteTable,
    pub calendar: EventCalendar,
    pub markets: MarketDays,
    pub profiles: BaseDemandProfiles,
}

impl ReferenceData {
    pub fn new(
        routes: RouteTable,
        calendar: EventCalendar,
        markets: MarketDays,
        profiles: BaseDemandProfiles,
    ) -> Result<Self> {
        let data = Self {
            routes,
            calendar,
            markets,
            profiles,
        };
        data.validate()?;
        Ok(data)
    }

    /// Tables for the three Tiruppur corridors and the Tamil Nadu calendar.
    pub fn tiruppur_defaults() -> Self {
        Self {
            routes: RouteTable::tiruppur_defaults(),
            calendar: EventCalendar::tamil_nadu_defaults(),
            markets: MarketDays::tiruppur_defaults(),
            profiles: BaseDemandProfiles::tiruppur_defaults(),
        }
    }

    /// Route and calendar invariants hold, and every route has a baseline
    /// curve. Tables loaded with serde are only checked here.
    pub fn validate(&self) -> Result<()> {
        if self.routes.is_empty() {
            return Err(ForecastError::invalid("reference data has no routes"));
        }
        self.routes.validate()?;
        self.calendar.validate()?;
        for route in self.routes.iter() {
            if self.profiles.profile(&route.id).is_none() {
                return Err(ForecastError::invalid(format!(
                    "route '{}' has no base demand profile",
                    route.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::Route;

    #[test]
    fn defaults_are_consistent() {
        assert!(ReferenceData::tiruppur_defaults().validate().is_ok());
    }

    fn patched(edit: impl FnOnce(&mut serde_json::Value)) -> ReferenceData {
        let defaults = ReferenceData::tiruppur_defaults();
        let mut value = serde_json::to_value(defaults).unwrap();
        edit(&mut value);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn repeated_route_from_json_is_rejected() {
        let reference = patched(|value| {
            let routes = value["routes"]["routes"].as_array_mut().unwrap();
            let copy = routes[1].clone();
            routes.push(copy);
        });
        assert_eq!(reference.routes.len(), 4);
        assert!(reference.validate().is_err());
    }

    #[test]
    fn zero_distance_from_json_is_rejected() {
        let reference = patched(|value| {
            value["routes"]["routes"][0]["distance_km"] = serde_json::json!(0);
        });
        assert!(reference.validate().is_err());
    }

    #[test]
    fn misfiled_event_from_json_is_rejected() {
        let reference = patched(|value| {
            value["calendar"]["events"]["2025-11-01"]["date"] = serde_json::json!("2025-11-02");
        });
        assert!(reference.validate().is_err());

        let reference = patched(|value| {
            value["calendar"]["events"]["2025-11-01"]["multiplier"] = serde_json::json!(-1.0);
        });
        assert!(reference.validate().is_err());
    }

    #[test]
    fn route_without_profile_is_rejected() {
        let route = Route::new("x", "X", 10, 20, 1, 100);
        let routes = RouteTable::new(vec![route]).unwrap();
        let result = ReferenceData::new(
            routes,
            EventCalendar::new(),
            MarketDays::new(),
            BaseDemandProfiles::new(),
        );
        assert!(result.is_err());
    }
}
