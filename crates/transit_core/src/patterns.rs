//! Hourly baseline passenger curves per route.
//!
//! Each curve holds 24 averages (index 0 = midnight, index 23 = 11 PM) drawn
//! from historical ridership. The demand composer scales these values by the
//! day's external factors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Tiruppur to Pollachi.
pub const TP_PC_PROFILE: [u32; 24] = [
    35, 25, 15, 10, 20, 60, // 12 AM - 6 AM
    140, 380, 320, 180, // 6 AM - 10 AM (morning rush)
    150, 130, 115, 100, 90, 75, // 10 AM - 4 PM
    220, 450, 350, 240, // 4 PM - 8 PM (evening rush)
    140, 90, 60, 45, // 8 PM - 12 AM
];

/// Tiruppur to Coimbatore.
pub const TP_CB_PROFILE: [u32; 24] = [
    50, 35, 25, 20, 30, 90, // 12 AM - 6 AM
    200, 580, 460, 280, // 6 AM - 10 AM (morning rush)
    220, 190, 165, 145, 125, 110, // 10 AM - 4 PM
    320, 620, 520, 360, // 4 PM - 8 PM (evening rush)
    220, 150, 90, 70, // 8 PM - 12 AM
];

/// Tiruppur to Salem.
pub const TP_SL_PROFILE: [u32; 24] = [
    40, 30, 22, 18, 28, 75, // 12 AM - 6 AM
    175, 440, 380, 240, // 6 AM - 10 AM (morning rush)
    195, 165, 145, 125, 110, 95, // 10 AM - 4 PM
    280, 500, 400, 290, // 4 PM - 8 PM (evening rush)
    185, 125, 75, 55, // 8 PM - 12 AM
];

/// Baseline curves keyed by route identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseDemandProfiles {
    profiles: BTreeMap<String, [u32; 24]>,
}

impl BaseDemandProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Curves for the three Tiruppur corridors.
    pub fn tiruppur_defaults() -> Self {
        Self::new()
            .with_profile("tp_pc", TP_PC_PROFILE)
            .with_profile("tp_cb", TP_CB_PROFILE)
            .with_profile("tp_sl", TP_SL_PROFILE)
    }

    pub fn with_profile(mut self, route_id: impl Into<String>, profile: [u32; 24]) -> Self {
        self.profiles.insert(route_id.into(), profile);
        self
    }

    pub fn profile(&self, route_id: &str) -> Option<&[u32; 24]> {
        self.profiles.get(route_id)
    }

    /// Baseline passengers for one route and hour.
    pub fn baseline(&self, route_id: &str, hour: u8) -> Result<u32> {
        if hour > 23 {
            return Err(ForecastError::invalid(format!(
                "hour must be in 0..=23, got {hour}"
            )));
        }
        let profile = self
            .profile(route_id)
            .ok_or_else(|| ForecastError::unknown_route(route_id))?;
        Ok(profile[hour as usize])
    }

    pub fn route_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Sum of the curve, i.e. the baseline daily ridership.
    pub fn daily_total(&self, route_id: &str) -> Option<u32> {
        self.profile(route_id).map(|p| p.iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evening_peak_is_hour_17() {
        for profile in [TP_PC_PROFILE, TP_CB_PROFILE, TP_SL_PROFILE] {
            let (peak_hour, _) = profile
                .iter()
                .enumerate()
                .max_by_key(|(_, v)| **v)
                .expect("non-empty profile");
            assert_eq!(peak_hour, 17);
        }
    }

    #[test]
    fn baseline_lookup() {
        let profiles = BaseDemandProfiles::tiruppur_defaults();
        assert_eq!(profiles.baseline("tp_cb", 17).unwrap(), 620);
        assert_eq!(profiles.baseline("tp_pc", 0).unwrap(), 35);
        assert!(profiles.baseline("tp_xx", 3).is_err());
        assert!(profiles.baseline("tp_cb", 24).is_err());
    }

    #[test]
    fn daily_total_sums_curve() {
        let profiles = BaseDemandProfiles::new().with_profile("r", [10; 24]);
        assert_eq!(profiles.daily_total("r"), Some(240));
        assert_eq!(profiles.daily_total("missing"), None);
    }
}
