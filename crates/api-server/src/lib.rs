pub mod tolerance_routes;
pub mod volatility_routes;

use analysis_engine::AnalysisEngine;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use insight_client::GeminiClient;
use market_data::YahooChartClient;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use volatility_core::AnalysisError;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
}

/// Uniform JSON envelope for every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Route-level error: analysis errors keep their message and map to a
/// meaningful status; everything else becomes an opaque 500.
pub enum AppError {
    Analysis(AnalysisError),
    Internal(anyhow::Error),
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        AppError::Analysis(e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Analysis(e) => {
                let status = match &e {
                    AnalysisError::InvalidInput(_) | AnalysisError::InsufficientData(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    AnalysisError::SymbolNotFound(_) => StatusCode::NOT_FOUND,
                    AnalysisError::ApiError(_) => StatusCode::BAD_GATEWAY,
                    AnalysisError::CalculationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let engine = AnalysisEngine::new(Arc::new(YahooChartClient::new()));
    let engine = match GeminiClient::from_env() {
        Some(client) => {
            tracing::info!("Gemini insight provider configured");
            engine.with_insight(Arc::new(client))
        }
        None => {
            tracing::info!("GEMINI_API_KEY not set; running without insight commentary");
            engine
        }
    };

    let state = AppState {
        engine: Arc::new(engine),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .merge(volatility_routes::volatility_routes())
        .merge(tolerance_routes::tolerance_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port: u16 = std::env::var("API_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
