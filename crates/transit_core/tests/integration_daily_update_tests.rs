mod support;

use support::pipeline::{
    reference_with_repeated_route, reference_with_zero_distance, PipelineHarness,
};
use transit_core::error::ForecastError;
use transit_core::orchestrator::HOURS_PER_DAY;
use transit_core::test_helpers::{date, diwali, flat_single_route, quiet_wednesday};
use transit_core::weather::Season;

#[test]
fn market_day_peak_hits_overflow_tier() {
    let harness = PipelineHarness::default();
    let run = harness.run_midpoint(quiet_wednesday()).expect("daily run");

    assert_eq!(run.snapshot.season, Season::Winter);
    assert_eq!(run.summary.weather_factor, 1.0);
    assert!(!run.summary.is_festival);

    // 620 baseline * 1.3 market on a Wednesday.
    let cell = run.cell("tp_cb", 17).expect("tp_cb 17:00");
    assert_eq!(cell.predicted_passengers, 806);
    assert_eq!(cell.recommended_buses, 8);
    assert_eq!(cell.frequency_minutes, 10);
    assert_eq!(cell.utilization_rate, 1.0);
    // 65 km * 6 trips * 8 buses = 3120 bus-km.
    assert!((cell.cost.fuel - 26_520.0).abs() < 1e-6);
    assert!((cell.cost.driver - 960.0).abs() < 1e-6);
    assert!((cell.cost.maintenance - 9_984.0).abs() < 1e-6);
    assert!((cell.cost_per_hour - 37_464.0).abs() < 1e-6);
}

#[test]
fn same_seed_replays_identically() {
    let harness = PipelineHarness::default();
    let day = date(2026, 7, 14);
    let first = harness.run_seeded(day, 42).expect("first run");
    let second = harness.run_seeded(day, 42).expect("second run");
    assert_eq!(first, second);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn every_cell_within_domain() {
    let harness = PipelineHarness::default();
    let day = date(2026, 1, 14);
    for seed in 0..8 {
        let run = harness.run_seeded(day, seed).expect("daily run");
        assert_eq!(run.cells.len(), 3 * HOURS_PER_DAY as usize);
        for cell in &run.cells {
            assert!((0.0..=1.0).contains(&cell.utilization_rate), "{cell:?}");
            assert!(cell.frequency_minutes > 0);
            assert!(cell.cost_per_hour >= 0.0);
            if cell.recommended_buses == 0 {
                assert_eq!(cell.cost_per_hour, 0.0);
            }
        }
    }
}

#[test]
fn monsoon_raises_weather_factor() {
    let harness = PipelineHarness::default();
    let run = harness.run_midpoint(date(2026, 7, 14)).expect("daily run");
    assert_eq!(run.snapshot.season, Season::Monsoon);
    assert_eq!(run.summary.weather_factor, 1.2);
    // Midpoint rainfall is 17.5 mm, above the heavy-rain threshold.
    assert!(run.summary.weather_alert);
}

#[test]
fn festival_day_needs_more_buses() {
    let harness = PipelineHarness::default();
    let festival = harness.run_midpoint(diwali()).expect("festival run");
    let saturday = date(2025, 11, 8);
    let ordinary = harness.run_midpoint(saturday).expect("ordinary run");
    let (festival, ordinary) = (festival.summary, ordinary.summary);
    assert_eq!(festival.festival_name.as_deref(), Some("Diwali"));
    assert!(festival.total_buses_needed > ordinary.total_buses_needed);
    let busy = festival.total_predicted_passengers;
    assert!(busy > ordinary.total_predicted_passengers);
}

#[test]
fn corrupt_reference_rejected_before_any_cell() {
    let corrupt = [
        reference_with_zero_distance("tp_cb"),
        reference_with_repeated_route("tp_sl"),
    ];
    for reference in corrupt {
        let harness = PipelineHarness::new(reference);
        let err = harness.run_midpoint(quiet_wednesday()).unwrap_err();
        assert!(
            matches!(err, ForecastError::InvalidInput { .. }),
            "expected up-front rejection, got {err:?}"
        );
    }
}

#[test]
fn idle_route_costs_nothing() {
    let reference = flat_single_route("idle", 40, 0);
    let run = PipelineHarness::new(reference)
        .run_midpoint(quiet_wednesday())
        .expect("daily run");
    assert_eq!(run.summary.total_buses_needed, 0);
    assert_eq!(run.summary.estimated_cost, 0.0);
    assert!(run.cells.iter().all(|c| c.frequency_minutes == 120));
}

#[test]
fn fleet_notice_compares_against_current_fleet() {
    let harness = PipelineHarness::default();
    let run = harness.run_midpoint(quiet_wednesday()).expect("daily run");
    let total = run.summary.total_buses_needed;
    assert!(total > 50, "expected well over 45 buses, got {total}");
    let notice = run.fleet_change.expect("fleet change notice");
    assert_eq!(notice.current_fleet, 45);
    assert_eq!(notice.delta, i64::from(total) - 45);
    let prefix = format!("Tomorrow requires {total} buses (+");
    assert!(notice.message.starts_with(&prefix));
}
