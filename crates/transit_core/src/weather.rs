//! Seasonal weather snapshots and their demand multiplier.
//!
//! Weather is a property of the date, not the hour: a daily run samples one
//! snapshot and applies its multiplier to every cell.

use serde::{Deserialize, Serialize};

use crate::distributions::{pick_index, UniformSource};
use crate::error::{ForecastError, Result};

/// Rainfall above which a heavy-rain alert is raised (mm).
pub const HEAVY_RAIN_THRESHOLD_MM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    /// June to September.
    Monsoon,
    /// March to May.
    Summer,
    /// Everything else (winter / post-monsoon).
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Rain,
    HeavyRain,
    Cloudy,
    Clear,
    Hot,
    Sunny,
    PartlyCloudy,
}

impl WeatherCondition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Cloudy => "Cloudy",
            Self::Clear => "Clear",
            Self::Hot => "Hot",
            Self::Sunny => "Sunny",
            Self::PartlyCloudy => "Partly Cloudy",
        }
    }
}

/// Sampling ranges for one season.
#[derive(Debug, Clone, Copy)]
pub struct SeasonProfile {
    pub temperature_c: (f64, f64),
    pub rainfall_mm: (f64, f64),
    pub conditions: &'static [WeatherCondition],
    pub multiplier: f64,
}

const HUMIDITY_PCT: (f64, f64) = (60.0, 85.0);

static MONSOON: SeasonProfile = SeasonProfile {
    temperature_c: (22.0, 32.0),
    rainfall_mm: (5.0, 30.0),
    conditions: &[
        WeatherCondition::Rain,
        WeatherCondition::HeavyRain,
        WeatherCondition::Cloudy,
    ],
    multiplier: 1.2,
};

static SUMMER: SeasonProfile = SeasonProfile {
    temperature_c: (28.0, 38.0),
    rainfall_mm: (0.0, 0.0),
    conditions: &[
        WeatherCondition::Clear,
        WeatherCondition::Hot,
        WeatherCondition::Sunny,
    ],
    multiplier: 1.1,
};

static WINTER: SeasonProfile = SeasonProfile {
    temperature_c: (18.0, 28.0),
    rainfall_mm: (0.0, 5.0),
    conditions: &[WeatherCondition::Clear, WeatherCondition::PartlyCloudy],
    multiplier: 1.0,
};

impl Season {
    pub fn for_month(month: u32) -> Result<Self> {
        match month {
            6..=9 => Ok(Self::Monsoon),
            3..=5 => Ok(Self::Summer),
            1 | 2 | 10..=12 => Ok(Self::Winter),
            _ => Err(ForecastError::invalid(format!(
                "month must be in 1..=12, got {month}"
            ))),
        }
    }

    pub fn profile(&self) -> &'static SeasonProfile {
        match self {
            Self::Monsoon => &MONSOON,
            Self::Summer => &SUMMER,
            Self::Winter => &WINTER,
        }
    }
}

/// One sampled weather state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSnapshot {
    pub season: Season,
    pub temperature_c: f64,
    pub rainfall_mm: f64,
    pub humidity_pct: f64,
    pub condition: WeatherCondition,
    /// Demand multiplier, always >= 1.0.
    pub weather_factor: f64,
}

impl EnvironmentalSnapshot {
    /// Sample a snapshot for a month (1-12).
    ///
    /// Draw order is fixed: temperature, rainfall, condition, humidity.
    pub fn generate(month: u32, source: &mut dyn UniformSource) -> Result<Self> {
        let season = Season::for_month(month)?;
        let profile = season.profile();

        let (temp_low, temp_high) = profile.temperature_c;
        let temperature_c = source.next_uniform(temp_low, temp_high);
        let (rain_low, rain_high) = profile.rainfall_mm;
        let rainfall_mm = source.next_uniform(rain_low, rain_high);
        let condition = profile.conditions[pick_index(source, profile.conditions.len())];
        let humidity_pct = source.next_uniform(HUMIDITY_PCT.0, HUMIDITY_PCT.1);

        Ok(Self {
            season,
            temperature_c,
            rainfall_mm,
            humidity_pct,
            condition,
            weather_factor: profile.multiplier,
        })
    }

    /// Neutral snapshot with a 1.0 multiplier.
    pub fn neutral() -> Self {
        Self {
            season: Season::Winter,
            temperature_c: 23.0,
            rainfall_mm: 0.0,
            humidity_pct: 72.5,
            condition: WeatherCondition::Clear,
            weather_factor: 1.0,
        }
    }

    pub fn is_heavy_rain(&self) -> bool {
        self.rainfall_mm > HEAVY_RAIN_THRESHOLD_MM
    }
}
