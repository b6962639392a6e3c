//! Error types for the forecast-to-schedule pipeline.

use thiserror::Error;

/// Errors surfaced by the forecasting pipeline.
///
/// Every pipeline function is total over its documented domain; anything
/// outside that domain is reported instead of being clamped.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A caller handed the pipeline a value outside its domain.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// One (route, hour) cell failed, so the whole daily run is rejected.
    #[error("computation failed for route {route_id} at hour {hour}: {source}")]
    PartialComputationFailure {
        route_id: String,
        hour: u8,
        #[source]
        source: Box<ForecastError>,
    },

    /// A configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ForecastError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn unknown_route(route_id: &str) -> Self {
        Self::invalid(format!("unknown route identifier '{route_id}'"))
    }

    pub(crate) fn config(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Config(format!("{context}: {err}"))
    }

    pub(crate) fn at_cell(self, route_id: &str, hour: u8) -> Self {
        Self::PartialComputationFailure {
            route_id: route_id.to_string(),
            hour,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_failure_reports_coordinates() {
        let err = ForecastError::unknown_route("tp_xx").at_cell("tp_xx", 7);
        let message = err.to_string();
        assert!(message.contains("tp_xx"));
        assert!(message.contains("hour 7"));
        match err {
            ForecastError::PartialComputationFailure { route_id, hour, .. } => {
                assert_eq!(route_id, "tp_xx");
                assert_eq!(hour, 7);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
