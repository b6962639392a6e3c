#![allow(dead_code)]

use chrono::NaiveDate;
use transit_core::config::ForecastConfig;
use transit_core::distributions::{MidpointUniform, SeededUniform};
use transit_core::error::Result;
use transit_core::orchestrator::{DailyRun, DailyUpdate};
use transit_core::reference::ReferenceData;

/// Runs the daily update against fixed tables and a chosen random source.
pub struct PipelineHarness {
    pub reference: ReferenceData,
    pub config: ForecastConfig,
}

impl Default for PipelineHarness {
    fn default() -> Self {
        Self::new(ReferenceData::tiruppur_defaults())
    }
}

impl PipelineHarness {
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            reference,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    /// Every jitter draw lands on exactly 1.0.
    pub fn run_midpoint(&self, date: NaiveDate) -> Result<DailyRun> {
        DailyUpdate::new(&self.reference, &self.config).run(date, &mut MidpointUniform)
    }

    pub fn run_seeded(&self, date: NaiveDate, seed: u64) -> Result<DailyRun> {
        DailyUpdate::new(&self.reference, &self.config)
            .run(date, &mut SeededUniform::from_seed(seed))
    }
}

/// Reference tables with one route's distance forced to zero, bypassing the
/// checks `RouteTable::insert` applies.
pub fn reference_with_zero_distance(route_id: &str) -> ReferenceData {
    patch_routes(|routes| {
        for route in routes.iter_mut() {
            if route["id"] == route_id {
                route["distance_km"] = serde_json::json!(0);
            }
        }
    })
}

/// Reference tables listing one route twice.
pub fn reference_with_repeated_route(route_id: &str) -> ReferenceData {
    patch_routes(|routes| {
        let copy = routes.iter().find(|r| r["id"] == route_id).cloned();
        routes.extend(copy);
    })
}

fn patch_routes(edit: impl FnOnce(&mut Vec<serde_json::Value>)) -> ReferenceData {
    let defaults = ReferenceData::tiruppur_defaults();
    let mut value = serde_json::to_value(defaults).expect("reference data should serialize");
    let routes = value["routes"]["routes"]
        .as_array_mut()
        .expect("routes array");
    edit(routes);
    serde_json::from_value(value).expect("patched reference data should deserialize")
}
