use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use volatility_core::{AnalysisError, PricePoint, PriceSource};

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            // A zero budget would leave acquire() with no slot to ever wait on
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            let wait_until = ts.front().unwrap().checked_add(self.window).unwrap();
            let sleep_dur = wait_until.duration_since(now) + Duration::from_millis(50);
            drop(ts);
            tracing::debug!(
                "Rate limiter: waiting {:.1}s for chart API slot",
                sleep_dur.as_secs_f64()
            );
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Daily close-price client backed by the Yahoo Finance chart API
#[derive(Clone)]
pub struct YahooChartClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl YahooChartClient {
    pub fn new() -> Self {
        // The chart endpoint tolerates modest request rates from
        // browser-identified clients. Override with MARKET_DATA_RATE_LIMIT.
        let rate_limit: usize = std::env::var("MARKET_DATA_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(60);

        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
        }
    }

    /// Get daily closes for a symbol over [from, to]
    pub async fn get_daily_closes(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, AnalysisError> {
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            CHART_URL,
            symbol,
            from.timestamp(),
            to.timestamp()
        );

        self.rate_limiter.acquire().await;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(AnalysisError::SymbolNotFound(symbol.to_string()));
        }
        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {} from chart API for {}",
                response.status(),
                symbol
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

        parse_chart_response(symbol, &json)
    }
}

impl Default for YahooChartClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for YahooChartClient {
    async fn fetch_closes(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, AnalysisError> {
        self.get_daily_closes(symbol, from, to).await
    }
}

/// Walk the chart JSON down to paired (timestamp, close) rows.
/// Rows with a null close (halts, partial sessions) are skipped.
fn parse_chart_response(
    symbol: &str,
    json: &serde_json::Value,
) -> Result<Vec<PricePoint>, AnalysisError> {
    let result = json
        .get("chart")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| AnalysisError::SymbolNotFound(symbol.to_string()))?;

    let timestamps = result
        .get("timestamp")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AnalysisError::SymbolNotFound(symbol.to_string()))?;

    let closes = result
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("close"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            AnalysisError::ApiError(format!("Malformed chart response for {}", symbol))
        })?;

    let points: Vec<PricePoint> = timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let ts = ts.as_i64()?;
            let close = close.as_f64()?;
            let timestamp = DateTime::from_timestamp(ts, 0)?;
            Some(PricePoint { timestamp, close })
        })
        .collect();

    if points.is_empty() {
        return Err(AnalysisError::SymbolNotFound(symbol.to_string()));
    }

    Ok(points)
}
