//! Multi-day planning on top of `transit_core`.
//!
//! Runs the daily update for a range of dates in parallel, derives per-date
//! metrics and exports cells, summaries and backfilled history.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use transit_core::config::ForecastConfig;
//! use transit_core::reference::ReferenceData;
//! use transit_planning::{export_summaries_to_csv, run_planning_horizon, PlanningHorizon};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
//! let runs = PlanningHorizon::new(start, 7, 42).generate().unwrap();
//! let days = run_planning_horizon(
//!     &ReferenceData::tiruppur_defaults(),
//!     &ForecastConfig::default(),
//!     runs,
//!     None,
//! )
//! .unwrap();
//! export_summaries_to_csv(&days, "plan.csv").unwrap();
//! ```
//!
//! - [`parameters`]: planning horizon and per-date seeds
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: per-date aggregates
//! - [`export`]: CSV, JSON and Parquet writers

pub mod export;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use export::{
    export_cells_to_csv, export_cells_to_parquet, export_history_to_csv, export_metrics_to_parquet,
    export_summaries_to_csv, export_to_json,
};
pub use metrics::{extract_metrics, PlanMetrics, RouteMetrics};
pub use parameters::{DateRun, PlanningHorizon};
pub use runner::{run_planning_horizon, run_single_date, PlannedDay, PlanningFailure};
