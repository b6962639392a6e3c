//! Parallel daily runs across a planning horizon using rayon.
//!
//! Dates are independent: each one gets its own seeded source and a shared,
//! read-only view of the reference tables and config.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use transit_core::config::ForecastConfig;
use transit_core::distributions::SeededUniform;
use transit_core::error::ForecastError;
use transit_core::orchestrator::{DailyRun, DailyUpdate};
use transit_core::reference::ReferenceData;

use crate::metrics::{extract_metrics, PlanMetrics};
use crate::parameters::DateRun;

/// A planned date: the raw run plus its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedDay {
    pub run: DateRun,
    pub daily: DailyRun,
    pub metrics: PlanMetrics,
}

/// One date whose daily run failed.
#[derive(Debug)]
pub struct DateFailure {
    pub run: DateRun,
    pub error: ForecastError,
}

/// Every failed date of a horizon. Successful dates are discarded: a plan
/// with holes is not returned.
#[derive(Debug, Error)]
#[error("{} of {total} planned dates failed", .failures.len())]
pub struct PlanningFailure {
    pub total: usize,
    pub failures: Vec<DateFailure>,
}

/// Run a single date with the given seed.
pub fn run_single_date(
    reference: &ReferenceData,
    config: &ForecastConfig,
    date_run: &DateRun,
) -> Result<PlannedDay, ForecastError> {
    let mut source = SeededUniform::from_seed(date_run.seed);
    let update = DailyUpdate::new(reference, config);
    let daily = update.run(date_run.date, &mut source)?;
    let metrics = extract_metrics(&daily);
    Ok(PlannedDay {
        run: date_run.clone(),
        daily,
        metrics,
    })
}

/// Run every date in parallel with a progress bar.
pub fn run_planning_horizon(
    reference: &ReferenceData,
    config: &ForecastConfig,
    date_runs: Vec<DateRun>,
    num_threads: Option<usize>,
) -> Result<Vec<PlannedDay>, Box<dyn std::error::Error>> {
    run_planning_horizon_with_progress(reference, config, date_runs, num_threads, true)
}

/// Run every date in parallel.
///
/// Output is in input order whatever the thread count. Any failing date
/// fails the whole horizon with a [`PlanningFailure`] listing each one.
pub fn run_planning_horizon_with_progress(
    reference: &ReferenceData,
    config: &ForecastConfig,
    date_runs: Vec<DateRun>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<PlannedDay>, Box<dyn std::error::Error>> {
    let total = date_runs.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let pb_clone = pb.clone();
    let outcomes: Vec<(DateRun, Result<PlannedDay, ForecastError>)> = pool.install(|| {
        date_runs
            .into_par_iter()
            .map(|date_run| {
                let outcome = run_single_date(reference, config, &date_run);
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                (date_run, outcome)
            })
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    let mut planned = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (run, outcome) in outcomes {
        match outcome {
            Ok(day) => planned.push(day),
            Err(error) => {
                warn!(date = %run.date, seed = run.seed, %error, "planned date failed");
                failures.push(DateFailure { run, error });
            }
        }
    }

    if !failures.is_empty() {
        return Err(Box::new(PlanningFailure { total, failures }));
    }

    info!(dates = planned.len(), "planning horizon complete");
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::PlanningHorizon;
    use transit_core::routes::RouteTable;
    use transit_core::test_helpers::{date, reference_data};

    #[test]
    fn single_date_matches_direct_run() {
        let reference = reference_data();
        let config = ForecastConfig::default();
        let horizon = PlanningHorizon::new(date(2025, 11, 5), 1, 42);
        let runs = horizon.generate().unwrap();
        let planned = run_single_date(&reference, &config, &runs[0]).unwrap();

        let direct = DailyUpdate::new(&reference, &config)
            .run(date(2025, 11, 5), &mut SeededUniform::from_seed(42))
            .unwrap();
        assert_eq!(planned.daily, direct);
    }

    #[test]
    fn parallel_results_independent_of_threads() {
        let reference = reference_data();
        let config = ForecastConfig::default();
        let horizon = PlanningHorizon::new(date(2025, 10, 28), 10, 7);
        let runs = horizon.generate().unwrap();
        let run_with = |threads| {
            let runs = runs.clone();
            run_planning_horizon_with_progress(&reference, &config, runs, threads, false)
        };

        let serial = run_with(Some(1)).unwrap();
        let parallel = run_with(Some(4)).unwrap();

        assert_eq!(serial.len(), 10);
        assert_eq!(serial, parallel);
        assert_eq!(serial[4].run.date, date(2025, 11, 1));
        assert_eq!(serial[4].metrics.festival_name.as_deref(), Some("Diwali"));
    }

    #[test]
    fn failed_dates_are_reported() {
        // No routes: every date fails reference validation.
        let reference = ReferenceData {
            routes: RouteTable::default(),
            ..reference_data()
        };
        let config = ForecastConfig::default();
        let horizon = PlanningHorizon::new(date(2025, 11, 1), 3, 1);
        let runs = horizon.generate().unwrap();
        let err = run_planning_horizon_with_progress(&reference, &config, runs, Some(2), false)
            .unwrap_err();
        let failure = err.downcast_ref::<PlanningFailure>();
        let failure = failure.expect("planning failure");
        assert_eq!(failure.total, 3);
        assert_eq!(failure.failures.len(), 3);
    }
}
