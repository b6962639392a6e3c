use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use transit_core::backfill::{daily_totals, generate_history};
use transit_core::config::ForecastConfig;
use transit_core::distributions::SeededUniform;
use transit_core::orchestrator::{next_day, DailyUpdate};
use transit_core::reference::ReferenceData;
use transit_planning::{
    export_cells_to_csv, export_cells_to_parquet, export_history_to_csv,
    export_metrics_to_parquet, export_summaries_to_csv, export_to_json, run_planning_horizon,
    PlanningHorizon,
};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the transit demand planning workspace",
    long_about = "A unified CLI for daily demand forecasts, historical backfills,\n\
                  multi-day planning runs, benchmarks and CI checks."
)]
struct Cli {
    /// JSON file overriding the default forecast configuration
    #[arg(long, global = true, env = "TRANSIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast demand and schedule every route for one date
    Forecast {
        /// Target date (defaults to tomorrow)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Seed for the random source; entropy when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Fleet size the bus total is compared against
        #[arg(long, conflicts_with = "fleet_from_routes")]
        current_fleet: Option<u32>,
        /// Compare against the sum of the routes' current fleets
        #[arg(long)]
        fleet_from_routes: bool,
        /// Write the full run (cells, summary, factors) as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate past demand records ending at a date
    Backfill {
        /// Last day of history (defaults to today)
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Days of history (defaults to the configured count)
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        /// Output CSV path
        #[arg(long, default_value = "historical_demand.csv")]
        output: PathBuf,
    },
    /// List upcoming calendar events
    Events {
        /// First date considered (defaults to today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Maximum number of events (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Plan a range of dates in parallel and export the results
    Plan {
        /// First date of the horizon (defaults to tomorrow)
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Base seed; each date uses seed + day offset
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Worker threads (defaults to rayon's choice)
        #[arg(long)]
        threads: Option<usize>,
        #[arg(value_enum, long, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        #[arg(long, default_value = "plan_output")]
        out_dir: PathBuf,
    },
    /// Print the effective configuration as JSON
    Config,
    /// Run Criterion benchmarks
    Bench,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
    Parquet,
    All,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run the examples
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn load_config(path: Option<&Path>) -> Result<ForecastConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            Ok(ForecastConfig::from_json_file(path)?)
        }
        None => Ok(ForecastConfig::default()),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ── forecasting commands ───────────────────────────────────────────

fn forecast(
    config: &ForecastConfig,
    date: Option<NaiveDate>,
    seed: Option<u64>,
    current_fleet: Option<u32>,
    fleet_from_routes: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let reference = ReferenceData::tiruppur_defaults();
    let target = match date {
        Some(date) => date,
        None => next_day(today())?,
    };
    let fleet = if fleet_from_routes {
        reference.routes.current_fleet()
    } else {
        current_fleet.unwrap_or(config.current_fleet)
    };

    let mut source = SeededUniform::new(seed);
    let update = DailyUpdate::new(&reference, config);
    let run = update.run_against(target, fleet, &mut source)?;

    println!("{}", serde_json::to_string_pretty(&run.summary)?);
    if let Some(notice) = &run.fleet_change {
        println!("{}", notice.message);
    }
    if let Some(path) = output {
        fs::write(path, serde_json::to_string_pretty(&run)?)?;
        info!(path = %path.display(), cells = run.cells.len(), "daily run written");
    }
    Ok(())
}

fn backfill(
    config: &ForecastConfig,
    end_date: Option<NaiveDate>,
    days: Option<u32>,
    seed: Option<u64>,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let reference = ReferenceData::tiruppur_defaults();
    let end = end_date.unwrap_or_else(today);
    let days = days.unwrap_or(config.backfill_days);

    let mut source = SeededUniform::new(seed);
    let records = generate_history(&reference, config.backfill, end, days, &mut source)?;
    export_history_to_csv(&records, output)?;

    let totals = daily_totals(&records);
    eprintln!(
        "{} records over {} route-days written to {}",
        records.len(),
        totals.len(),
        output.display()
    );
    Ok(())
}

fn events(
    config: &ForecastConfig,
    from: Option<NaiveDate>,
    limit: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let reference = ReferenceData::tiruppur_defaults();
    let from = from.unwrap_or_else(today);
    let limit = limit.unwrap_or(config.upcoming_event_limit);
    let upcoming = reference.calendar.upcoming(from, limit);
    println!("{}", serde_json::to_string_pretty(&upcoming)?);
    Ok(())
}

fn plan(
    config: &ForecastConfig,
    start: Option<NaiveDate>,
    days: u32,
    seed: u64,
    threads: Option<usize>,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let reference = ReferenceData::tiruppur_defaults();
    let start = match start {
        Some(date) => date,
        None => next_day(today())?,
    };
    let horizon = PlanningHorizon::new(start, days, seed);
    let planned = run_planning_horizon(&reference, config, horizon.generate()?, threads)?;

    fs::create_dir_all(out_dir)?;
    let id = horizon.plan_id();
    if matches!(format, ExportFormat::Csv | ExportFormat::All) {
        export_summaries_to_csv(&planned, out_dir.join(format!("{id}-summaries.csv")))?;
        export_cells_to_csv(&planned, out_dir.join(format!("{id}-cells.csv")))?;
    }
    if matches!(format, ExportFormat::Json | ExportFormat::All) {
        export_to_json(&planned, out_dir.join(format!("{id}.json")))?;
    }
    if matches!(format, ExportFormat::Parquet | ExportFormat::All) {
        export_metrics_to_parquet(&planned, out_dir.join(format!("{id}-metrics.parquet")))?;
        export_cells_to_parquet(&planned, out_dir.join(format!("{id}-cells.parquet")))?;
    }

    for day in &planned {
        eprintln!(
            "{}  buses {:>4}  cost {:>12.2}  peak {:02}:00  {}",
            day.metrics.date,
            day.metrics.total_buses_needed,
            day.metrics.estimated_cost,
            day.metrics.peak_hour,
            day.metrics.festival_name.as_deref().unwrap_or("")
        );
    }
    eprintln!("\nResults written to {}", out_dir.display());
    Ok(())
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test transit_core");
    run_cargo(&["test", "-p", "transit_core"]);

    step("Test transit_planning");
    run_cargo(&["test", "-p", "transit_planning"]);
}

fn ci_examples() {
    step("Run daily_forecast");
    run_cargo(&[
        "run",
        "-p",
        "transit_core",
        "--example",
        "daily_forecast",
        "--release",
    ]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_benchmarks();
}

fn run_benchmarks() {
    run_cargo(&["bench", "-p", "transit_core", "--bench", "performance"]);
}

// ── main ───────────────────────────────────────────────────────────

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Forecast {
            date,
            seed,
            current_fleet,
            fleet_from_routes,
            output,
        } => forecast(
            &config,
            date,
            seed,
            current_fleet,
            fleet_from_routes,
            output.as_deref(),
        )?,
        Commands::Backfill {
            end_date,
            days,
            seed,
            output,
        } => backfill(&config, end_date, days, seed, &output)?,
        Commands::Events { from, limit } => events(&config, from, limit)?,
        Commands::Plan {
            start,
            days,
            seed,
            threads,
            format,
            out_dir,
        } => plan(&config, start, days, seed, threads, format, &out_dir)?,
        Commands::Config => println!("{}", config.to_json_pretty()?),
        Commands::Bench => run_benchmarks(),
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        exit(1);
    }
}
