use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use volatility_core::{
    classify, stats, AnalysisError, BatchReport, CorrelationMatrix, InsightDigest,
    InsightProvider, PricePoint, PriceSource, Thresholds, TickerReport, VarianceMode, Window,
};

pub mod tolerance;
pub use tolerance::{analyze_tolerance, parse_measurements};

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

// Raw fetches are memoized for an hour, keyed by symbol and date range
const CACHE_TTL_SECS: i64 = 3600;

/// One volatility analysis invocation: symbols, date range, and the
/// user-facing risk knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityRequest {
    pub symbols: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub thresholds: Thresholds,
    pub window: usize,
}

pub struct AnalysisEngine {
    source: Arc<dyn PriceSource>,
    insight: Option<Arc<dyn InsightProvider>>,
    /// Cache closes per (symbol, date range)
    closes_cache: DashMap<String, CacheEntry<Vec<PricePoint>>>,
}

impl AnalysisEngine {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            insight: None,
            closes_cache: DashMap::new(),
        }
    }

    /// Attach an optional commentary provider
    pub fn with_insight(mut self, provider: Arc<dyn InsightProvider>) -> Self {
        self.insight = Some(provider);
        self
    }

    /// Fetch daily closes through the TTL cache
    async fn get_closes(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, AnalysisError> {
        let key = format!("{}:{}:{}", symbol, from.date_naive(), to.date_naive());

        if let Some(entry) = self.closes_cache.get(&key) {
            if (Utc::now() - entry.cached_at).num_seconds() < CACHE_TTL_SECS {
                return Ok(entry.data.clone());
            }
        }

        let closes = self.source.fetch_closes(symbol, from, to).await?;
        self.closes_cache.insert(
            key,
            CacheEntry {
                data: closes.clone(),
                cached_at: Utc::now(),
            },
        );
        Ok(closes)
    }

    /// Analyze a batch of tickers against shared thresholds and window.
    ///
    /// Any per-symbol failure (unknown symbol, too little data) aborts the
    /// whole batch: the cross-symbol correlation matrix needs every series.
    pub async fn analyze_tickers(
        &self,
        request: &VolatilityRequest,
    ) -> Result<BatchReport, AnalysisError> {
        let symbols = normalize_symbols(&request.symbols)?;
        request.thresholds.validate()?;
        let window = Window::new(request.window)?;
        if request.start >= request.end {
            return Err(AnalysisError::InvalidInput(
                "Start date must precede end date".to_string(),
            ));
        }

        tracing::info!(
            "Analyzing {} symbols over {} to {} (window {})",
            symbols.len(),
            request.start.date_naive(),
            request.end.date_naive(),
            window.get()
        );

        let mut fetched: Vec<(String, Vec<PricePoint>)> = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let closes = self.get_closes(symbol, request.start, request.end).await?;
            fetched.push((symbol.clone(), closes));
        }

        // Per-symbol statistics are independent, so fan out across symbols
        let analyzed: Vec<(TickerReport, Vec<(NaiveDate, f64)>)> = fetched
            .par_iter()
            .map(|(symbol, points)| {
                analyze_symbol(symbol, points, &request.thresholds, window.get())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (reports, dated_returns): (Vec<TickerReport>, Vec<Vec<(NaiveDate, f64)>>) =
            analyzed.into_iter().unzip();

        let correlation = correlate(&symbols, &dated_returns);

        let digest = InsightDigest {
            symbols: symbols.clone(),
            std_devs: reports.iter().map(|r| r.std_dev).collect(),
            risk_levels: reports.iter().map(|r| r.risk_level).collect(),
            start: request.start,
            end: request.end,
            thresholds: request.thresholds,
            window: window.get(),
        };
        let insight = match &self.insight {
            Some(provider) => match provider.summarize(&digest).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Insight provider failed: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(BatchReport {
            reports,
            correlation,
            insight,
            thresholds: request.thresholds,
            window: window.get(),
            start: request.start,
            end: request.end,
        })
    }
}

/// Trim, uppercase, dedupe (order-preserving); empty selection is an input error
fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>, AnalysisError> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for s in symbols {
        let s = s.trim().to_uppercase();
        if !s.is_empty() && seen.insert(s.clone()) {
            out.push(s);
        }
    }
    if out.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Select at least one symbol".to_string(),
        ));
    }
    Ok(out)
}

/// Full per-symbol pipeline: closes → returns → dispersion → risk band
fn analyze_symbol(
    symbol: &str,
    points: &[PricePoint],
    thresholds: &Thresholds,
    window: usize,
) -> Result<(TickerReport, Vec<(NaiveDate, f64)>), AnalysisError> {
    if points.is_empty() {
        return Err(AnalysisError::SymbolNotFound(symbol.to_string()));
    }

    let clean: Vec<(NaiveDate, f64)> = points
        .iter()
        .filter(|p| p.close.is_finite())
        .map(|p| (p.timestamp.date_naive(), p.close))
        .collect();

    // Return at index i belongs to the date of close i+1
    let mut dated_returns: Vec<(NaiveDate, f64)> = clean
        .windows(2)
        .map(|w| (w[1].0, (w[1].1 - w[0].1) / w[0].1))
        .collect();
    dated_returns.retain(|(_, r)| r.is_finite());

    if dated_returns.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "{}: need at least 2 clean returns, got {}",
            symbol,
            dated_returns.len()
        )));
    }

    let returns: Vec<f64> = dated_returns.iter().map(|(_, r)| *r).collect();
    let closes: Vec<f64> = clean.iter().map(|(_, c)| *c).collect();

    let variance = stats::variance(&returns, VarianceMode::Sample)?;
    let std_dev = variance.sqrt();
    let risk_level = classify(std_dev, thresholds);

    let report = TickerReport {
        symbol: symbol.to_string(),
        std_dev,
        variance,
        risk_level,
        rolling_volatility: stats::rolling_std_dev(&returns, window, VarianceMode::Sample),
        moving_average: stats::rolling_mean(&closes, window),
        returns,
    };

    Ok((report, dated_returns))
}

/// Correlation over the date range common to all symbols: inner join on date,
/// dropping any date missing from any series.
fn correlate(symbols: &[String], dated_returns: &[Vec<(NaiveDate, f64)>]) -> CorrelationMatrix {
    let maps: Vec<HashMap<NaiveDate, f64>> = dated_returns
        .iter()
        .map(|series| series.iter().copied().collect())
        .collect();

    let mut common: BTreeSet<NaiveDate> = match dated_returns.first() {
        Some(first) => first.iter().map(|(d, _)| *d).collect(),
        None => BTreeSet::new(),
    };
    for map in &maps[1..] {
        common.retain(|d| map.contains_key(d));
    }

    let aligned: Vec<Vec<f64>> = maps
        .iter()
        .map(|map| common.iter().map(|d| map[d]).collect())
        .collect();

    CorrelationMatrix {
        symbols: symbols.to_vec(),
        values: stats::correlation_matrix(&aligned),
    }
}
