//! Shared fixtures for unit, integration and bench code.

use chrono::NaiveDate;

use crate::calendar::{EventCalendar, MarketDays};
use crate::patterns::BaseDemandProfiles;
use crate::reference::ReferenceData;
use crate::routes::{Route, RouteTable};

/// A Wednesday in a winter month with no calendar event. Market day on tp_cb.
pub const QUIET_WEDNESDAY: (i32, u32, u32) = (2025, 11, 5);

/// Diwali 2025, a Saturday.
pub const DIWALI: (i32, u32, u32) = (2025, 11, 1);

/// # Panics
///
/// Panics on an impossible date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn quiet_wednesday() -> NaiveDate {
    let (y, m, d) = QUIET_WEDNESDAY;
    date(y, m, d)
}

pub fn diwali() -> NaiveDate {
    let (y, m, d) = DIWALI;
    date(y, m, d)
}

/// Default Tiruppur tables.
pub fn reference_data() -> ReferenceData {
    ReferenceData::tiruppur_defaults()
}

/// One route with a flat hourly baseline, no events and no market days.
pub fn flat_single_route(
    route_id: &str,
    distance_km: u32,
    passengers_per_hour: u32,
) -> ReferenceData {
    let name = format!("Test route {route_id}");
    let daily = passengers_per_hour * 24;
    let route = Route::new(route_id, name, distance_km, 60, 4, daily);
    let routes = RouteTable::new(vec![route]).expect("valid single route table");
    let curve = [passengers_per_hour; 24];
    let profiles = BaseDemandProfiles::new().with_profile(route_id, curve);
    ReferenceData::new(routes, EventCalendar::new(), MarketDays::new(), profiles)
        .expect("valid single route reference")
}
