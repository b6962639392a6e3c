//! Export of planned days to CSV, JSON and Parquet.

use std::path::Path;

use transit_core::backfill::HistoricalDemand;

use crate::runner::PlannedDay;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/parquet.rs"]
mod parquet;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export every (date, route, hour) cell to CSV.
///
/// # Errors
///
/// Returns an error if `days` is empty or file creation or CSV writing fails.
pub fn export_cells_to_csv(
    days: &[PlannedDay],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(days)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_cells_impl(days, file)
}

/// Export one row per date (summary plus derived metrics) to CSV.
pub fn export_summaries_to_csv(
    days: &[PlannedDay],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(days)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_summaries_impl(days, file)
}

/// Export backfilled history to CSV, one row per record.
pub fn export_history_to_csv(
    records: &[HistoricalDemand],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(records)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_history_impl(records, file)
}

/// Export planned days to JSON: an array of runs with cells, summary and
/// metrics.
pub fn export_to_json(
    days: &[PlannedDay],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(days, file)
}

/// Export every cell to Parquet.
///
/// # Errors
///
/// Returns an error if `days` is empty or file creation or Parquet writing
/// fails.
pub fn export_cells_to_parquet(
    days: &[PlannedDay],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(days)?;
    let file = writer_utils::create_output_file(path)?;
    parquet::export_cells_impl(days, file)
}

/// Export one metrics row per date to Parquet.
pub fn export_metrics_to_parquet(
    days: &[PlannedDay],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(days)?;
    let file = writer_utils::create_output_file(path)?;
    parquet::export_metrics_impl(days, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::PlanningHorizon;
    use crate::runner::run_planning_horizon_with_progress;
    use tempfile::NamedTempFile;
    use transit_core::backfill::generate_history;
    use transit_core::config::ForecastConfig;
    use transit_core::distributions::MidpointUniform;
    use transit_core::test_helpers::{date, reference_data};

    fn planned_days(days: u32) -> Vec<PlannedDay> {
        let reference = reference_data();
        let config = ForecastConfig::default();
        let runs = PlanningHorizon::new(date(2025, 11, 3), days, 42)
            .generate()
            .unwrap();
        run_planning_horizon_with_progress(&reference, &config, runs, Some(2), false).unwrap()
    }

    #[test]
    fn test_export_cells_to_csv() {
        let days = planned_days(2);
        let file = NamedTempFile::new().unwrap();
        export_cells_to_csv(&days, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = contents.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("plan_id,run_id,date,route_id,hour"));
        assert_eq!(lines.count(), 2 * 72);
    }

    #[test]
    fn test_export_summaries_to_csv() {
        let days = planned_days(3);
        let file = NamedTempFile::new().unwrap();
        export_summaries_to_csv(&days, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 4);
        assert!(contents.contains("2025-11-05"));
    }

    #[test]
    fn test_export_to_json() {
        let days = planned_days(1);
        let file = NamedTempFile::new().unwrap();
        export_to_json(&days, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.contains("total_buses_needed"));
        let parsed: Vec<PlannedDay> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].run, days[0].run);
        assert_eq!(parsed[0].daily.cells.len(), 72);
    }

    #[test]
    fn test_export_to_parquet() {
        let days = planned_days(2);
        let cells = NamedTempFile::new().unwrap();
        let metrics = NamedTempFile::new().unwrap();
        export_cells_to_parquet(&days, cells.path()).unwrap();
        export_metrics_to_parquet(&days, metrics.path()).unwrap();

        assert!(std::fs::metadata(cells.path()).unwrap().len() > 0);
        assert!(std::fs::metadata(metrics.path()).unwrap().len() > 0);
    }

    #[test]
    fn test_export_history_to_csv() {
        let reference = reference_data();
        let records = generate_history(
            &reference,
            ForecastConfig::default().backfill,
            date(2025, 11, 3),
            2,
            &mut MidpointUniform,
        )
        .unwrap();
        let file = NamedTempFile::new().unwrap();
        export_history_to_csv(&records, file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 1 + 2 * 72);
        let header = contents.lines().next().unwrap();
        assert!(header.contains("passenger_count"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        assert!(export_cells_to_csv(&[], file.path()).is_err());
        assert!(export_metrics_to_parquet(&[], file.path()).is_err());
    }
}
