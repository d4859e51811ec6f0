use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Risk band derived from comparing a dispersion value to two thresholds.
/// Totally ordered: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Human-readable label for the risk band
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }
}

/// Boundaries of the three risk bands.
///
/// `classify` is defined for any pair, but the configuration boundary rejects
/// misordered or negative thresholds so classification stays monotone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Thresholds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(AnalysisError::InvalidInput(
                "Thresholds must be finite numbers".to_string(),
            ));
        }
        if self.low < 0.0 || self.high < 0.0 {
            return Err(AnalysisError::InvalidInput(
                "Thresholds must be non-negative".to_string(),
            ));
        }
        if self.low > self.high {
            return Err(AnalysisError::InvalidInput(format!(
                "Low threshold {} exceeds high threshold {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Number of trailing observations used for rolling statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Window(usize);

impl Window {
    pub fn new(size: usize) -> Result<Self, AnalysisError> {
        if size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Rolling window must be at least 1".to_string(),
            ));
        }
        Ok(Self(size))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

/// Denominator convention for variance: sample (n-1) or population (n).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarianceMode {
    Sample,
    Population,
}

impl VarianceMode {
    pub fn ddof(&self) -> usize {
        match self {
            VarianceMode::Sample => 1,
            VarianceMode::Population => 0,
        }
    }
}

/// Daily close observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Ordered numeric samples with non-finite entries removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    values: Vec<f64>,
}

impl ObservationSeries {
    /// Build a series, dropping NaN and infinite entries. Cleaning an
    /// already-clean series is a no-op.
    pub fn from_values(values: Vec<f64>) -> Self {
        let values = values.into_iter().filter(|v| v.is_finite()).collect();
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-symbol analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerReport {
    pub symbol: String,
    /// Sample standard deviation of daily returns
    pub std_dev: f64,
    /// Sample variance of daily returns
    pub variance: f64,
    pub risk_level: RiskLevel,
    pub returns: Vec<f64>,
    /// Rolling std-dev of returns over the request window
    pub rolling_volatility: Vec<f64>,
    /// Rolling mean of closes over the request window
    pub moving_average: Vec<f64>,
}

/// Pearson correlations over the symbols' return series, inner-joined on date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Full batch result for a volatility analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub reports: Vec<TickerReport>,
    pub correlation: CorrelationMatrix,
    /// Free-text commentary from the insight collaborator, if configured
    pub insight: Option<String>,
    pub thresholds: Thresholds,
    pub window: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Result of a measurement-tolerance analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToleranceReport {
    /// Population variance of the measurements
    pub variance: f64,
    pub std_dev: f64,
    pub risk_level: RiskLevel,
    pub samples: usize,
}

/// Serializable digest handed to the insight collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightDigest {
    pub symbols: Vec<String>,
    pub std_devs: Vec<f64>,
    pub risk_levels: Vec<RiskLevel>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub thresholds: Thresholds,
    pub window: usize,
}
