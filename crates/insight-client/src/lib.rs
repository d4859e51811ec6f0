pub mod error;

pub use error::{InsightError, InsightResult};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use volatility_core::{AnalysisError, InsightDigest, InsightProvider};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for the Gemini insight service
#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl InsightConfig {
    /// Build from environment; `None` when no GEMINI_API_KEY is set,
    /// in which case analysis runs without commentary.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        Some(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(20),
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Gemini-backed commentary client
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: InsightConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url,
            model: config.model,
            api_key: config.api_key,
        }
    }

    pub fn from_env() -> Option<Self> {
        InsightConfig::from_env().map(Self::new)
    }

    async fn generate(&self, prompt: String) -> InsightResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(InsightError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| InsightError::InvalidResponse("No candidates returned".to_string()))
    }
}

/// Build the commentary prompt from an analysis digest
pub fn build_prompt(digest: &InsightDigest) -> String {
    let labels: Vec<&str> = digest.risk_levels.iter().map(|r| r.label()).collect();
    format!(
        "Analyze these stock metrics and provide a 3-4 line investment insight:\n\
         - Tickers: {:?}\n\
         - Volatilities (SD of daily returns): {:?}\n\
         - Risk Levels: {:?}\n\
         - Analysis Period: {} to {}\n\
         - Risk Thresholds: Low(<{}), Medium(<{}), High(>{})\n\
         - Window: {}-day rolling\n\n\
         Focus on:\n\
         1. Comparative risk analysis\n\
         2. Market condition implications\n\
         3. Investor recommendations\n\
         Use simple financial terms.",
        digest.symbols,
        digest.std_devs,
        labels,
        digest.start.format("%Y-%m-%d"),
        digest.end.format("%Y-%m-%d"),
        digest.thresholds.low,
        digest.thresholds.high,
        digest.thresholds.high,
        digest.window,
    )
}

#[async_trait]
impl InsightProvider for GeminiClient {
    async fn summarize(&self, digest: &InsightDigest) -> Result<Option<String>, AnalysisError> {
        match self.generate(build_prompt(digest)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                // Commentary is best-effort: never fail the analysis over it
                tracing::warn!("Insight generation failed, continuing without: {}", e);
                Ok(None)
            }
        }
    }
}

/// Provider used when no credential is configured
pub struct NoInsight;

#[async_trait]
impl InsightProvider for NoInsight {
    async fn summarize(&self, _digest: &InsightDigest) -> Result<Option<String>, AnalysisError> {
        Ok(None)
    }
}
