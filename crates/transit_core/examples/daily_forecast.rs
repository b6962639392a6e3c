//! Forecast a market-day Wednesday and print the evening rush per route.
//!
//! Run with: cargo run -p transit_core --example daily_forecast

use chrono::NaiveDate;
use transit_core::config::ForecastConfig;
use transit_core::distributions::SeededUniform;
use transit_core::orchestrator::DailyUpdate;
use transit_core::reference::ReferenceData;

fn main() {
    const SEED: u64 = 123;

    let reference = ReferenceData::tiruppur_defaults();
    let config = ForecastConfig::default();
    let target = NaiveDate::from_ymd_opt(2025, 11, 5).expect("valid date");

    let run = DailyUpdate::new(&reference, &config)
        .run(target, &mut SeededUniform::from_seed(SEED))
        .expect("daily run");

    println!("--- Daily forecast for {target} (seed {SEED}) ---");
    println!(
        "Weather: {} ({:.1} C, {:.1} mm rain), factor {:.2}",
        run.snapshot.condition.label(),
        run.snapshot.temperature_c,
        run.snapshot.rainfall_mm,
        run.summary.weather_factor
    );
    println!("Total buses needed: {}", run.summary.total_buses_needed);
    println!("Estimated cost: {:.2}", run.summary.estimated_cost);
    if let Some(notice) = &run.fleet_change {
        println!("{}", notice.message);
    }

    println!("\nEvening rush (16:00-19:00):");
    for route in reference.routes.iter() {
        let evening = run
            .cells_for(&route.id)
            .filter(|c| (16..=19).contains(&c.hour));
        for cell in evening {
            println!(
                "  {:<6} {:02}:00  passengers={:>4}  buses={}  every {:>3} min  utilization={:.2}  cost={:.2}",
                cell.route_id,
                cell.hour,
                cell.predicted_passengers,
                cell.recommended_buses,
                cell.frequency_minutes,
                cell.utilization_rate,
                cell.cost_per_hour
            );
        }
    }
}
