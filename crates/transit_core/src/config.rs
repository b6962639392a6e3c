//! Pipeline configuration.
//!
//! Every field has a default matching the reference deployment, so a config
//! file only needs to list the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cost::CostRates;
use crate::demand::RoundingPolicy;
use crate::distributions::JitterBand;
use crate::error::{ForecastError, Result};
use crate::schedule::DEFAULT_BUS_CAPACITY;

/// Jitter band and truncation policy for one caller of the demand composer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallSitePolicy {
    pub jitter: JitterBand,
    pub rounding: RoundingPolicy,
}

impl CallSitePolicy {
    pub const FORWARD: CallSitePolicy = CallSitePolicy {
        jitter: JitterBand::FORWARD,
        rounding: RoundingPolicy::TruncateOnce,
    };

    pub const BACKFILL: CallSitePolicy = CallSitePolicy {
        jitter: JitterBand::BACKFILL,
        rounding: RoundingPolicy::TruncateOnce,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Seats per bus for utilization.
    pub bus_capacity: u32,
    pub cost_rates: CostRates,
    /// Daily-update path.
    pub forward: CallSitePolicy,
    /// Historical backfill path.
    pub backfill: CallSitePolicy,
    /// A fleet-change notice is raised when the daily total moves by more
    /// than this many buses.
    pub fleet_change_threshold: u32,
    /// Baseline fleet the daily total is compared against.
    pub current_fleet: u32,
    pub backfill_days: u32,
    pub upcoming_event_limit: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            bus_capacity: DEFAULT_BUS_CAPACITY,
            cost_rates: CostRates::default(),
            forward: CallSitePolicy::FORWARD,
            backfill: CallSitePolicy::BACKFILL,
            fleet_change_threshold: 5,
            current_fleet: 45,
            backfill_days: 30,
            upcoming_event_limit: 10,
        }
    }
}

impl ForecastConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ForecastError::config("invalid config JSON", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let context = format!("cannot read {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ForecastError::config(&context, e))?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::config("cannot serialize config", e))
    }

    pub fn validate(&self) -> Result<()> {
        if self.bus_capacity == 0 {
            return Err(ForecastError::invalid("bus_capacity must be positive"));
        }
        self.cost_rates.validate()?;
        self.forward.jitter.validate()?;
        self.backfill.jitter.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = ForecastConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ForecastConfig::default());
    }

    #[test]
    fn partial_override() {
        let json = r#"{
            "bus_capacity": 60,
            "forward": { "jitter": { "spread": 0.0 }, "rounding": "truncate_each_step" }
        }"#;
        let config = ForecastConfig::from_json_str(json).unwrap();
        assert_eq!(config.bus_capacity, 60);
        assert_eq!(config.forward.jitter, JitterBand::NONE);
        assert_eq!(config.forward.rounding, RoundingPolicy::TruncateEachStep);
        assert_eq!(config.backfill, CallSitePolicy::BACKFILL);
        assert_eq!(config.fleet_change_threshold, 5);
    }

    #[test]
    fn round_trips_through_json() {
        let config = ForecastConfig {
            current_fleet: 50,
            ..ForecastConfig::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert_eq!(ForecastConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn invalid_values_rejected() {
        let parse = ForecastConfig::from_json_str;
        assert!(parse(r#"{ "bus_capacity": 0 }"#).is_err());
        let wide = r#"{
            "backfill": { "jitter": { "spread": 1.5 }, "rounding": "truncate_once" }
        }"#;
        assert!(parse(wide).is_err());
        assert!(parse("not json").is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = ForecastConfig::from_json_file("/definitely/not/here.json");
        assert!(matches!(result, Err(ForecastError::Config(_))));
    }
}
