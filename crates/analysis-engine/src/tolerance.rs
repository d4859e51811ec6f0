use volatility_core::{
    classify, stats, AnalysisError, ObservationSeries, Thresholds, ToleranceReport, VarianceMode,
};

/// Parse a comma-separated measurement list. Whitespace around tokens is
/// ignored and empty tokens are skipped; any other non-numeric token is an
/// input error.
pub fn parse_measurements(input: &str) -> Result<Vec<f64>, AnalysisError> {
    let mut values = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let value: f64 = token.parse().map_err(|_| {
            AnalysisError::InvalidInput(format!("'{}' is not a number", token))
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Classify a batch of physical measurements by its population variance.
///
/// Unlike the ticker path this classifies on variance, not standard
/// deviation: tolerance limits are quoted in variance units.
pub fn analyze_tolerance(
    measurements: &[f64],
    thresholds: &Thresholds,
) -> Result<ToleranceReport, AnalysisError> {
    thresholds.validate()?;

    let series = ObservationSeries::from_values(measurements.to_vec());
    if series.len() < 2 {
        return Err(AnalysisError::InsufficientData(
            "Please provide at least two measurements".to_string(),
        ));
    }

    let variance = stats::variance(series.values(), VarianceMode::Population)?;
    let std_dev = variance.sqrt();

    Ok(ToleranceReport {
        variance,
        std_dev,
        risk_level: classify(variance, thresholds),
        samples: series.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use volatility_core::RiskLevel;

    fn limits() -> Thresholds {
        Thresholds::new(0.0004, 0.0016)
    }

    #[test]
    fn steel_rod_batch_is_medium_risk() {
        let measurements = [10.02, 10.05, 10.03, 9.98, 10.00];
        let report = analyze_tolerance(&measurements, &limits()).unwrap();

        assert!((report.variance - 0.000584).abs() < 1e-9);
        assert!((report.std_dev - report.variance.sqrt()).abs() < 1e-12);
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert_eq!(report.samples, 5);
    }

    #[test]
    fn identical_measurements_are_low_risk() {
        let report = analyze_tolerance(&[10.00, 10.00, 10.00], &limits()).unwrap();
        assert_eq!(report.variance, 0.0);
        assert_eq!(report.risk_level, RiskLevel::Low);
    }

    #[test]
    fn too_few_measurements_rejected() {
        assert!(matches!(
            analyze_tolerance(&[], &limits()),
            Err(AnalysisError::InsufficientData(_))
        ));
        assert!(matches!(
            analyze_tolerance(&[10.0], &limits()),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn nan_measurements_are_dropped_before_the_count_check() {
        let err = analyze_tolerance(&[10.0, f64::NAN], &limits()).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
    }

    #[test]
    fn parse_accepts_spaces_and_trailing_comma() {
        let values = parse_measurements("10.02, 10.05 ,10.03,").unwrap();
        assert_eq!(values, vec![10.02, 10.05, 10.03]);
    }

    #[test]
    fn parse_rejects_non_numeric_token() {
        let err = parse_measurements("10.02, abc, 10.03").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn empty_input_parses_to_no_measurements() {
        assert!(parse_measurements("").unwrap().is_empty());
    }
}
