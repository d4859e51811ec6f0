use crate::{RiskLevel, Thresholds};

/// Map a dispersion measure to a risk band.
///
/// Strict comparisons at both boundaries: a value exactly equal to a
/// threshold falls in the band below it. Pure and total; defined for any
/// threshold pair, and monotone in `dispersion` whenever `low <= high`
/// (which `Thresholds::validate` guarantees at the configuration boundary).
pub fn classify(dispersion: f64, thresholds: &Thresholds) -> RiskLevel {
    if dispersion > thresholds.high {
        RiskLevel::High
    } else if dispersion > thresholds.low {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn classify_boundaries_are_strict() {
        let t = Thresholds::new(0.015, 0.03);

        assert_eq!(classify(0.015, &t), RiskLevel::Low);
        assert_eq!(classify(0.015 + EPS, &t), RiskLevel::Medium);
        assert_eq!(classify(0.03, &t), RiskLevel::Medium);
        assert_eq!(classify(0.03 + EPS, &t), RiskLevel::High);
    }

    #[test]
    fn classify_zero_dispersion_is_low() {
        let t = Thresholds::new(0.0004, 0.0016);
        assert_eq!(classify(0.0, &t), RiskLevel::Low);
    }

    #[test]
    fn classify_is_monotone_in_dispersion() {
        let t = Thresholds::new(0.01, 0.05);
        let samples = [0.0, 0.005, 0.01, 0.02, 0.05, 0.08, 0.5];

        let mut previous = RiskLevel::Low;
        for d in samples {
            let level = classify(d, &t);
            assert!(level >= previous, "risk dropped as dispersion rose at {}", d);
            previous = level;
        }
    }

    #[test]
    fn classify_equal_thresholds_skips_medium() {
        let t = Thresholds::new(0.02, 0.02);
        assert_eq!(classify(0.02, &t), RiskLevel::Low);
        assert_eq!(classify(0.02 + EPS, &t), RiskLevel::High);
    }
}
