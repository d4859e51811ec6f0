//! Stock Volatility API Routes
//!
//! Endpoint for classifying tickers into risk bands by the standard
//! deviation of their daily returns.

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

use analysis_engine::VolatilityRequest;
use volatility_core::{AnalysisError, BatchReport, Thresholds};

use crate::{ApiResponse, AppError, AppState};

// Default risk knobs when the request leaves them unset
const DEFAULT_LOW: f64 = 0.015;
const DEFAULT_HIGH: f64 = 0.03;
const DEFAULT_WINDOW: usize = 30;
const DEFAULT_LOOKBACK_DAYS: u64 = 365;

fn out_of_range(date: NaiveDate) -> AnalysisError {
    AnalysisError::InvalidInput(format!("Date {date} is out of the supported range"))
}

fn default_low() -> f64 {
    DEFAULT_LOW
}

fn default_high() -> f64 {
    DEFAULT_HIGH
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

#[derive(Debug, Deserialize)]
pub struct VolatilityParams {
    pub symbols: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_low")]
    pub low_threshold: f64,
    #[serde(default = "default_high")]
    pub high_threshold: f64,
    #[serde(default = "default_window")]
    pub window: usize,
}

impl VolatilityParams {
    fn into_request(self) -> Result<VolatilityRequest, AnalysisError> {
        let end_date = self.end_date.unwrap_or_else(|| Utc::now().date_naive());
        let start_date = match self.start_date {
            Some(date) => date,
            None => end_date
                .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                .ok_or_else(|| out_of_range(end_date))?,
        };

        // End is inclusive for callers; the fetch range is exclusive
        let start = start_date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = end_date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| out_of_range(end_date))?
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();

        Ok(VolatilityRequest {
            symbols: self.symbols,
            start,
            end,
            thresholds: Thresholds::new(self.low_threshold, self.high_threshold),
            window: self.window,
        })
    }
}

pub fn volatility_routes() -> Router<AppState> {
    Router::new().route("/api/volatility", post(analyze_volatility))
}

async fn analyze_volatility(
    State(state): State<AppState>,
    Json(params): Json<VolatilityParams>,
) -> Result<Json<ApiResponse<BatchReport>>, AppError> {
    let request = params.into_request()?;
    let report = state.engine.analyze_tickers(&request).await?;
    Ok(Json(ApiResponse::success(report)))
}
