pub mod backfill;
pub mod calendar;
pub mod config;
pub mod cost;
pub mod demand;
pub mod distributions;
pub mod error;
pub mod orchestrator;
pub mod patterns;
pub mod reference;
pub mod routes;
pub mod schedule;
pub mod weather;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
