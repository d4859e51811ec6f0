//! Engineering Tolerance API Routes
//!
//! Endpoint for classifying a batch of part measurements by its population
//! variance against variance tolerance limits.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use analysis_engine::{analyze_tolerance, parse_measurements};
use volatility_core::{Thresholds, ToleranceReport};

use crate::{ApiResponse, AppError, AppState};

// Default variance tolerance limits
const DEFAULT_LOW_LIMIT: f64 = 0.0004;
const DEFAULT_HIGH_LIMIT: f64 = 0.0016;

fn default_low_limit() -> f64 {
    DEFAULT_LOW_LIMIT
}

fn default_high_limit() -> f64 {
    DEFAULT_HIGH_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ToleranceParams {
    /// Comma-separated measurement values, e.g. "10.02, 10.05, 10.03"
    pub measurements: String,
    #[serde(default = "default_low_limit")]
    pub low_limit: f64,
    #[serde(default = "default_high_limit")]
    pub high_limit: f64,
}

pub fn tolerance_routes() -> Router<AppState> {
    Router::new().route("/api/tolerance", post(analyze_measurements))
}

async fn analyze_measurements(
    State(_state): State<AppState>,
    Json(params): Json<ToleranceParams>,
) -> Result<Json<ApiResponse<ToleranceReport>>, AppError> {
    let values = parse_measurements(&params.measurements)?;
    let thresholds = Thresholds::new(params.low_limit, params.high_limit);
    let report = analyze_tolerance(&values, &thresholds)?;
    Ok(Json(ApiResponse::success(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fill_slider_defaults() {
        let params: ToleranceParams =
            serde_json::from_str(r#"{ "measurements": "10.02, 10.05" }"#).unwrap();
        assert_eq!(params.low_limit, 0.0004);
        assert_eq!(params.high_limit, 0.0016);
    }
}
