//! Nonlinear HRV analysis
//!
//! Poincare-plot dispersion (SD1/SD2 and ellipse area) and Sample Entropy
//! over the RR interval series.

/// Sample Entropy template length (m)
const SAMPEN_TEMPLATE_LEN: usize = 2;

/// Sample Entropy tolerance factor (r), applied to the series std
const SAMPEN_TOLERANCE_FACTOR: f64 = 0.2;

/// Nonlinear slice of the metrics aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonlinearMetrics {
    /// Short-term dispersion along the Poincare minor axis (ms)
    pub sd1: f64,
    /// Long-term dispersion along the Poincare major axis (ms)
    pub sd2: f64,
    /// Poincare ellipse area (pi * sd1 * sd2)
    pub ellipse_area: f64,
    /// Sample entropy (m=2, r=0.2); 0 when no template pair matches
    pub sample_entropy: f64,
}

/// Compute Poincare dispersion and Sample Entropy over an RR series.
///
/// Returns `None` for fewer than 2 intervals.
pub fn compute_nonlinear(rr_ms: &[f64]) -> Option<NonlinearMetrics> {
    if rr_ms.len() < 2 {
        return None;
    }

    let rr1 = &rr_ms[..rr_ms.len() - 1];
    let rr2 = &rr_ms[1..];

    let diff_series: Vec<f64> = rr1.iter().zip(rr2).map(|(&a, &b)| b - a).collect();
    let sum_series: Vec<f64> = rr1.iter().zip(rr2).map(|(&a, &b)| b + a).collect();

    let sd1 = population_std(&diff_series) / 2.0_f64.sqrt();
    let sd2 = population_std(&sum_series) / 2.0_f64.sqrt();
    let ellipse_area = std::f64::consts::PI * sd1 * sd2;

    Some(NonlinearMetrics {
        sd1,
        sd2,
        ellipse_area,
        sample_entropy: sample_entropy(rr_ms),
    })
}

/// Sample Entropy with m=2 and tolerance 0.2 * std of the series.
///
/// Counts ordered template pairs that match within tolerance at lengths m and
/// m+1 and returns `-ln(phi(m+1) / phi(m))`. Series with no matching
/// templates at either length score 0 rather than a non-finite value, as do
/// series shorter than m+1. Deliberately O(n^2 * m), matching the reference
/// behavior; do not swap in an approximation.
fn sample_entropy(rr_ms: &[f64]) -> f64 {
    if rr_ms.len() < SAMPEN_TEMPLATE_LEN + 1 {
        return 0.0;
    }

    let tolerance = SAMPEN_TOLERANCE_FACTOR * population_std(rr_ms);
    let phi_m = count_matches(rr_ms, SAMPEN_TEMPLATE_LEN, tolerance);
    if phi_m == 0 {
        return 0.0;
    }
    let phi_m1 = count_matches(rr_ms, SAMPEN_TEMPLATE_LEN + 1, tolerance);
    if phi_m1 == 0 {
        return 0.0;
    }

    -(phi_m1 as f64 / phi_m as f64).ln()
}

/// Count ordered pairs of length-`len` templates matching within `tolerance`
fn count_matches(rr_ms: &[f64], len: usize, tolerance: f64) -> usize {
    let windows = rr_ms.len().saturating_sub(len);
    let mut matches = 0;

    for i in 0..windows {
        for j in (i + 1)..windows {
            let matched = (0..len).all(|k| (rr_ms[i + k] - rr_ms[j + k]).abs() <= tolerance);
            if matched {
                matches += 1;
            }
        }
    }

    matches
}

/// Population standard deviation (denominator n)
fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_poincare_known_values() {
        // diff series [20, -40, 30], sum series [1620, 1600, 1590]
        let metrics = compute_nonlinear(&[800.0, 820.0, 780.0, 810.0]).unwrap();

        assert!(close(metrics.sd1, 30.912 / 2.0_f64.sqrt(), 1e-3));
        assert!(close(metrics.sd2, 12.472 / 2.0_f64.sqrt(), 1e-3));
        assert!(close(
            metrics.ellipse_area,
            std::f64::consts::PI * metrics.sd1 * metrics.sd2,
            1e-9
        ));
    }

    #[test]
    fn test_ellipse_area_invariant_under_reversal() {
        let rr = vec![810.0, 790.0, 830.0, 805.0, 815.0, 780.0, 825.0, 800.0];
        let reversed: Vec<f64> = rr.iter().rev().copied().collect();

        let forward = compute_nonlinear(&rr).unwrap();
        let backward = compute_nonlinear(&reversed).unwrap();

        // Reversal negates the diff series and reverses the sum series;
        // std is insensitive to both, so the ellipse is unchanged.
        assert!(close(forward.sd1, backward.sd1, 1e-9));
        assert!(close(forward.sd2, backward.sd2, 1e-9));
        assert!(close(forward.ellipse_area, backward.ellipse_area, 1e-9));
    }

    #[test]
    fn test_sample_entropy_near_zero_for_periodic_series() {
        // Perfectly periodic with period 2: template matches abound
        let rr: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 800.0 } else { 820.0 })
            .collect();
        let metrics = compute_nonlinear(&rr).unwrap();

        assert!(metrics.sample_entropy >= 0.0);
        assert!(metrics.sample_entropy < 0.2);
    }

    #[test]
    fn test_sample_entropy_zero_when_no_templates_match() {
        // Steps of 100 ms dwarf the tolerance, so phi(m) is 0
        let rr: Vec<f64> = (0..10).map(|i| 400.0 + i as f64 * 100.0).collect();
        let metrics = compute_nonlinear(&rr).unwrap();
        assert_eq!(metrics.sample_entropy, 0.0);
    }

    #[test]
    fn test_sample_entropy_zero_below_template_length() {
        // Two intervals cannot form an m+1 template
        let metrics = compute_nonlinear(&[800.0, 820.0]).unwrap();
        assert_eq!(metrics.sample_entropy, 0.0);
        assert_eq!(metrics.sd1, 0.0);
        assert_eq!(metrics.sd2, 0.0);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(compute_nonlinear(&[]).is_none());
        assert!(compute_nonlinear(&[800.0]).is_none());
    }

    #[test]
    fn test_sample_entropy_finite_and_nonnegative() {
        let rr: Vec<f64> = (0..40)
            .map(|i| 800.0 + ((i * 37) % 11) as f64 * 6.0)
            .collect();
        let metrics = compute_nonlinear(&rr).unwrap();
        assert!(metrics.sample_entropy.is_finite());
        assert!(metrics.sample_entropy >= 0.0);
    }
}
