//! Route reference data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// One bus corridor. Immutable once the reference tables are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    /// One-way distance in kilometres.
    pub distance_km: u32,
    /// Nominal one-way travel time in minutes.
    pub travel_time_minutes: u32,
    pub current_buses: u32,
    pub daily_passengers: u32,
}

impl Route {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        distance_km: u32,
        travel_time_minutes: u32,
        current_buses: u32,
        daily_passengers: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            distance_km,
            travel_time_minutes,
            current_buses,
            daily_passengers,
        }
    }
}

/// Ordered set of routes. Iteration order is insertion order, which fixes the
/// order in which a daily run consumes random draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Result<Self> {
        let mut table = Self::default();
        for route in routes {
            table.insert(route)?;
        }
        Ok(table)
    }

    pub fn tiruppur_defaults() -> Self {
        Self {
            routes: vec![
                Route::new("tp_pc", "Tiruppur to Pollachi", 85, 120, 12, 2800),
                Route::new("tp_cb", "Tiruppur to Coimbatore", 65, 90, 18, 4200),
                Route::new("tp_sl", "Tiruppur to Salem", 113, 150, 15, 3500),
            ],
        }
    }

    /// Add a route. Rejects duplicate identifiers and zero distances.
    pub fn insert(&mut self, route: Route) -> Result<()> {
        check_distance(&route)?;
        if self.get(&route.id).is_some() {
            return Err(duplicate_id(&route.id));
        }
        self.routes.push(route);
        Ok(())
    }

    /// Re-check the `insert` invariants on a table that did not go through
    /// it, e.g. one loaded with serde.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.routes.len());
        for route in &self.routes {
            check_distance(route)?;
            if !seen.insert(route.id.as_str()) {
                return Err(duplicate_id(&route.id));
            }
        }
        Ok(())
    }

    pub fn get(&self, route_id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == route_id)
    }

    pub fn require(&self, route_id: &str) -> Result<&Route> {
        self.get(route_id)
            .ok_or_else(|| ForecastError::unknown_route(route_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Buses currently in service across every route.
    pub fn current_fleet(&self) -> u32 {
        self.routes.iter().map(|r| r.current_buses).sum()
    }
}

fn check_distance(route: &Route) -> Result<()> {
    if route.distance_km == 0 {
        return Err(ForecastError::invalid(format!(
            "route '{}' must have a positive distance",
            route.id
        )));
    }
    Ok(())
}

fn duplicate_id(route_id: &str) -> ForecastError {
    ForecastError::invalid(format!("duplicate route identifier '{route_id}'"))
}
