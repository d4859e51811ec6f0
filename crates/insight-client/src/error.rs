use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type InsightResult<T> = Result<T, InsightError>;
