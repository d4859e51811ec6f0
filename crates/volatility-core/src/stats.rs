use statrs::statistics::Statistics;

use crate::{AnalysisError, VarianceMode};

/// Variance with the caller's denominator convention.
/// Errors when `n - ddof <= 0` (no meaningful dispersion).
pub fn variance(data: &[f64], mode: VarianceMode) -> Result<f64, AnalysisError> {
    if data.len() <= mode.ddof() {
        return Err(AnalysisError::InsufficientData(format!(
            "Need at least {} observations for variance, got {}",
            mode.ddof() + 1,
            data.len()
        )));
    }
    let value = match mode {
        VarianceMode::Sample => data.variance(),
        VarianceMode::Population => data.population_variance(),
    };
    Ok(value)
}

/// Standard deviation: square root of `variance`
pub fn std_dev(data: &[f64], mode: VarianceMode) -> Result<f64, AnalysisError> {
    Ok(variance(data, mode)?.sqrt())
}

/// Simple percentage returns, `(p[i] - p[i-1]) / p[i-1]`.
/// The first element is undefined and dropped; output is one shorter than input.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Trailing rolling variance: for each position `i >= window - 1`, the
/// variance of the `window` observations ending at `i`. Positions with fewer
/// prior observations are undefined and dropped, so the output is
/// `window - 1` shorter than the input; a window longer than the series
/// yields an empty vec, not an error.
///
/// Each window is recomputed from scratch with the two-pass formula, so
/// rerunning on identical input always produces bit-identical output.
pub fn rolling_variance(data: &[f64], window: usize, mode: VarianceMode) -> Vec<f64> {
    // window <= ddof would make every position undefined
    if window <= mode.ddof() || data.len() < window {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - window + 1);
    for i in window - 1..data.len() {
        let slice = &data[i + 1 - window..=i];
        let value = match mode {
            VarianceMode::Sample => slice.variance(),
            VarianceMode::Population => slice.population_variance(),
        };
        result.push(value);
    }
    result
}

/// Trailing rolling standard deviation, same windowing rule as `rolling_variance`
pub fn rolling_std_dev(data: &[f64], window: usize, mode: VarianceMode) -> Vec<f64> {
    rolling_variance(data, window, mode)
        .into_iter()
        .map(f64::sqrt)
        .collect()
}

/// Trailing simple moving average
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || data.len() < window {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - window + 1);
    for i in window - 1..data.len() {
        let sum: f64 = data[i + 1 - window..=i].iter().sum();
        result.push(sum / window as f64);
    }
    result
}

/// Pearson correlation between two equal-length series.
/// Zero-variance input yields 0.0 rather than NaN so downstream matrices
/// stay JSON-serializable.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }

    let x_mean = x[..n].iter().sum::<f64>() / n as f64;
    let y_mean = y[..n].iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut x_var = 0.0;
    let mut y_var = 0.0;
    for i in 0..n {
        let dx = x[i] - x_mean;
        let dy = y[i] - y_mean;
        covariance += dx * dy;
        x_var += dx * dx;
        y_var += dy * dy;
    }

    let denom = (x_var * y_var).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    covariance / denom
}

/// Pairwise Pearson correlation matrix over pre-aligned equal-length series
pub fn correlation_matrix(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = series.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in i + 1..n {
            let r = pearson(&series[i], &series[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}
