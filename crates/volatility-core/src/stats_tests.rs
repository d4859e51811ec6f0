use crate::stats::*;
use crate::types::{ObservationSeries, Thresholds, VarianceMode};
use crate::{classify, RiskLevel};

// Measurements from the engineering-tolerance walkthrough
fn sample_measurements() -> Vec<f64> {
    vec![10.02, 10.05, 10.03, 9.98, 10.00]
}

#[test]
fn test_population_variance_of_measurements() {
    let m = sample_measurements();
    let var = variance(&m, VarianceMode::Population).unwrap();

    // mean 10.016, sum of squared deviations 0.00292, / 5
    assert!((var - 0.000584).abs() < 1e-9);

    let t = Thresholds::new(0.0004, 0.0016);
    assert_eq!(classify(var, &t), RiskLevel::Medium);
}

#[test]
fn test_identical_measurements_have_zero_variance() {
    let m = vec![10.00, 10.00, 10.00];
    let var = variance(&m, VarianceMode::Population).unwrap();
    assert_eq!(var, 0.0);

    let t = Thresholds::new(0.0004, 0.0016);
    assert_eq!(classify(var, &t), RiskLevel::Low);
}

#[test]
fn test_variance_insufficient_data() {
    assert!(variance(&[], VarianceMode::Population).is_err());
    assert!(variance(&[10.0], VarianceMode::Sample).is_err());
    // One observation is enough for population variance (ddof = 0)
    assert!(variance(&[10.0], VarianceMode::Population).is_ok());
}

#[test]
fn test_std_dev_is_sqrt_of_variance() {
    let m = sample_measurements();
    for mode in [VarianceMode::Sample, VarianceMode::Population] {
        let var = variance(&m, mode).unwrap();
        let sd = std_dev(&m, mode).unwrap();
        assert!((sd - var.sqrt()).abs() < 1e-9);
    }
}

#[test]
fn test_simple_returns() {
    let prices = vec![100.0, 102.0, 101.0, 105.0];
    let returns = simple_returns(&prices);

    assert_eq!(returns.len(), 3);
    assert!((returns[0] - 0.02).abs() < 1e-9);
    assert!((returns[1] - (-1.0 / 102.0)).abs() < 1e-9);
    assert!((returns[2] - (4.0 / 101.0)).abs() < 1e-9);

    // ddof=1 over the 3 return samples
    let sd = std_dev(&returns, VarianceMode::Sample).unwrap();
    let var = variance(&returns, VarianceMode::Sample).unwrap();
    assert!((sd - var.sqrt()).abs() < 1e-9);
    assert!(sd > 0.0);
}

#[test]
fn test_rolling_mean_basic() {
    let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    let result = rolling_mean(&data, 3);

    assert_eq!(result.len(), 3);
    assert!((result[0] - 2.0).abs() < 1e-9); // (1+2+3)/3
    assert!((result[1] - 3.0).abs() < 1e-9); // (2+3+4)/3
    assert!((result[2] - 4.0).abs() < 1e-9); // (3+4+5)/3
}

#[test]
fn test_rolling_variance_matches_per_window_variance() {
    let data = vec![1.0, 4.0, 2.0, 8.0, 5.0, 3.0];
    let window = 3;
    let rolled = rolling_variance(&data, window, VarianceMode::Sample);

    assert_eq!(rolled.len(), data.len() - window + 1);
    for (i, value) in rolled.iter().enumerate() {
        let expected = variance(&data[i..i + window], VarianceMode::Sample).unwrap();
        assert!((value - expected).abs() < 1e-9);
    }
}

#[test]
fn test_rolling_window_longer_than_series_is_empty() {
    // 20-row series, 30-day window: every position is undefined
    let data: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    assert!(rolling_variance(&data, 30, VarianceMode::Sample).is_empty());
    assert!(rolling_std_dev(&data, 30, VarianceMode::Sample).is_empty());
    assert!(rolling_mean(&data, 30).is_empty());
}

#[test]
fn test_rolling_variance_window_one_sample_is_empty() {
    // window 1 with ddof 1 leaves zero degrees of freedom
    let data = vec![1.0, 2.0, 3.0];
    assert!(rolling_variance(&data, 1, VarianceMode::Sample).is_empty());
    // population mode is defined: each window of one has variance 0
    let pop = rolling_variance(&data, 1, VarianceMode::Population);
    assert_eq!(pop, vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_rolling_computation_is_restartable() {
    let data: Vec<f64> = (0..200)
        .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
        .collect();
    let first = rolling_variance(&data, 30, VarianceMode::Sample);
    let second = rolling_variance(&data, 30, VarianceMode::Sample);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_pearson_perfectly_correlated() {
    let x = vec![1.0, 2.0, 3.0, 4.0];
    let y = vec![2.0, 4.0, 6.0, 8.0];
    assert!((pearson(&x, &y) - 1.0).abs() < 1e-9);

    let inverse: Vec<f64> = y.iter().map(|v| -v).collect();
    assert!((pearson(&x, &inverse) + 1.0).abs() < 1e-9);
}

#[test]
fn test_pearson_zero_variance_series() {
    let flat = vec![5.0, 5.0, 5.0];
    let moving = vec![1.0, 2.0, 3.0];
    assert_eq!(pearson(&flat, &moving), 0.0);
}

#[test]
fn test_correlation_matrix_shape_and_symmetry() {
    let series = vec![
        vec![0.01, -0.02, 0.03, 0.00],
        vec![0.02, -0.01, 0.02, 0.01],
        vec![-0.01, 0.02, -0.03, 0.00],
    ];
    let matrix = correlation_matrix(&series);

    assert_eq!(matrix.len(), 3);
    for i in 0..3 {
        assert!((matrix[i][i] - 1.0).abs() < 1e-9);
        for j in 0..3 {
            assert!((matrix[i][j] - matrix[j][i]).abs() < 1e-12);
        }
    }
}

#[test]
fn test_cleaned_series_feeds_variance() {
    let series = ObservationSeries::from_values(vec![10.02, f64::NAN, 10.05, 10.03, 9.98, 10.00]);
    assert_eq!(series.len(), 5);
    let var = variance(series.values(), VarianceMode::Population).unwrap();
    assert!((var - 0.000584).abs() < 1e-9);
}
