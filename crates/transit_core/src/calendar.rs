//! Festival/event calendar and weekly market days.
//!
//! Both tables are pure lookups over immutable data. An unknown date means
//! "no event" and an unknown route means "no market", never an error.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Demand multiplier on a route's market day.
pub const MARKET_DAY_MULTIPLIER: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Major,
    Regional,
    National,
    Cultural,
    Religious,
    Economic,
    Industrial,
    Celebration,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Regional => "regional",
            Self::National => "national",
            Self::Cultural => "cultural",
            Self::Religious => "religious",
            Self::Economic => "economic",
            Self::Industrial => "industrial",
            Self::Celebration => "celebration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub name: String,
    /// Expected demand relative to baseline, strictly positive.
    pub multiplier: f64,
    pub category: EventCategory,
}

/// An event on or after a reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub date: NaiveDate,
    pub name: String,
    pub category: EventCategory,
    pub multiplier: f64,
    pub days_away: i64,
}

// (year, month, day, name, multiplier, category)
const TAMIL_NADU_EVENTS: &[(i32, u32, u32, &str, f64, EventCategory)] = &[
    (2025, 9, 12, "Ganesh Chaturthi", 1.8, EventCategory::Major),
    (2025, 9, 17, "Onam", 1.5, EventCategory::Regional),
    (2025, 10, 2, "Gandhi Jayanti", 1.4, EventCategory::National),
    (2025, 10, 12, "Vijaya Dashami", 1.7, EventCategory::Major),
    (2025, 10, 31, "Halloween", 1.2, EventCategory::Cultural),
    (2025, 11, 1, "Diwali", 1.9, EventCategory::Major),
    (2025, 11, 15, "Karthikai Deepam", 1.6, EventCategory::Regional),
    (2025, 12, 1, "Global Investors Meet TN", 1.3, EventCategory::Economic),
    (2025, 12, 25, "Christmas", 1.5, EventCategory::National),
    (2025, 12, 31, "New Year Eve", 1.8, EventCategory::Celebration),
    (2026, 1, 14, "Thai Pusam", 1.7, EventCategory::Regional),
    (2026, 1, 20, "Auto Expo Chennai", 1.4, EventCategory::Industrial),
    (2026, 1, 26, "Republic Day", 1.4, EventCategory::National),
    (2026, 2, 13, "Maha Shivratri", 1.5, EventCategory::Religious),
    (2026, 3, 13, "Holi", 1.6, EventCategory::National),
    (2026, 4, 14, "Tamil New Year", 1.8, EventCategory::Regional),
    (2026, 8, 15, "Independence Day", 1.4, EventCategory::National),
];

/// Date-keyed event table. At most one event per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCalendar {
    events: BTreeMap<NaiveDate, CalendarEvent>,
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The 2025-2026 Tamil Nadu festival and events calendar.
    pub fn tamil_nadu_defaults() -> Self {
        let mut calendar = Self::new();
        for &(year, month, day, name, multiplier, category) in TAMIL_NADU_EVENTS {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                debug_assert!(false, "invalid calendar literal {year}-{month}-{day}");
                continue;
            };
            calendar.events.insert(
                date,
                CalendarEvent {
                    date,
                    name: name.to_string(),
                    multiplier,
                    category,
                },
            );
        }
        calendar
    }

    /// Add an event. Rejects non-positive multipliers and a second event on
    /// the same date.
    pub fn insert(&mut self, event: CalendarEvent) -> Result<()> {
        check_multiplier(&event)?;
        if let Some(existing) = self.events.get(&event.date) {
            return Err(ForecastError::invalid(format!(
                "{} already has event '{}'",
                event.date, existing.name
            )));
        }
        self.events.insert(event.date, event);
        Ok(())
    }

    /// Re-check the `insert` invariants on a calendar loaded with serde: each
    /// entry sits under its own date and has a positive multiplier.
    pub fn validate(&self) -> Result<()> {
        for (date, event) in &self.events {
            if *date != event.date {
                return Err(ForecastError::invalid(format!(
                    "event '{}' dated {} is filed under {date}",
                    event.name, event.date
                )));
            }
            check_multiplier(event)?;
        }
        Ok(())
    }

    pub fn with_event(
        mut self,
        date: NaiveDate,
        name: impl Into<String>,
        multiplier: f64,
        category: EventCategory,
    ) -> Result<Self> {
        self.insert(CalendarEvent {
            date,
            name: name.into(),
            multiplier,
            category,
        })?;
        Ok(self)
    }

    pub fn event_on(&self, date: NaiveDate) -> Option<&CalendarEvent> {
        self.events.get(&date)
    }

    /// Event multiplier for a date, 1.0 when nothing is scheduled.
    pub fn multiplier_on(&self, date: NaiveDate) -> f64 {
        self.event_on(date).map(|e| e.multiplier).unwrap_or(1.0)
    }

    /// Events on or after `from`, nearest first, at most `limit` of them.
    pub fn upcoming(&self, from: NaiveDate, limit: usize) -> Vec<UpcomingEvent> {
        self.events
            .range(from..)
            .take(limit)
            .map(|(date, event)| UpcomingEvent {
                date: *date,
                name: event.name.clone(),
                category: event.category,
                multiplier: event.multiplier,
                days_away: (*date - from).num_days(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn check_multiplier(event: &CalendarEvent) -> Result<()> {
    if !(event.multiplier.is_finite() && event.multiplier > 0.0) {
        return Err(ForecastError::invalid(format!(
            "event '{}' multiplier must be positive, got {}",
            event.name, event.multiplier
        )));
    }
    Ok(())
}

/// Weekdays (0 = Monday .. 6 = Sunday) with a local market, per route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDays {
    days: BTreeMap<String, BTreeSet<u8>>,
}

impl MarketDays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiruppur_defaults() -> Self {
        Self::new()
            .with_days("tp_pc", [1, 4]) // Tuesday, Friday
            .with_days("tp_cb", [0, 2, 5]) // Monday, Wednesday, Saturday
            .with_days("tp_sl", [2, 5]) // Wednesday, Saturday
    }

    /// Register market weekdays for a route. Values above 6 are ignored.
    pub fn with_days(
        mut self,
        route_id: impl Into<String>,
        weekdays: impl IntoIterator<Item = u8>,
    ) -> Self {
        let entry = self.days.entry(route_id.into()).or_default();
        entry.extend(weekdays.into_iter().filter(|d| *d < 7));
        self
    }

    pub fn is_market_day(&self, route_id: &str, weekday: u8) -> bool {
        self.days
            .get(route_id)
            .is_some_and(|set| set.contains(&weekday))
    }

    pub fn multiplier(&self, route_id: &str, weekday: u8) -> f64 {
        if self.is_market_day(route_id, weekday) {
            MARKET_DAY_MULTIPLIER
        } else {
            1.0
        }
    }
}

/// Weekday index with Monday = 0.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// How a date is treated operationally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Festival,
    Weekend,
    Weekday,
}

impl DayType {
    /// Festival wins over weekend.
    pub fn classify(date: NaiveDate, calendar: &EventCalendar) -> Self {
        if calendar.event_on(date).is_some() {
            Self::Festival
        } else if weekday_index(date) >= 5 {
            Self::Weekend
        } else {
            Self::Weekday
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Festival => "festival",
            Self::Weekend => "weekend",
            Self::Weekday => "weekday",
        }
    }
}
