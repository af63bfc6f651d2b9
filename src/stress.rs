//! Stress index composition
//!
//! Combines the HRV metrics aggregate into derived stress indices, a
//! composite 0-100 score, and a 1-5 severity level. Division-by-zero
//! candidates substitute 0 at each use site; this stage trusts upstream
//! length checks and does no validation of its own.

use crate::types::{HrvMetrics, StressIndices, StressLevel};

/// Composite score weights: tension, autonomic balance, resistance, recovery
const SCORE_WEIGHTS: (f64, f64, f64, f64) = (0.3, 0.2, 0.2, 0.3);

/// Scale applied to the autonomic balance term of the composite score
const ANS_BALANCE_SCALE: f64 = 10.0;

/// Compose stress indices from a fully-populated metrics aggregate
pub fn compose_stress_indices(metrics: &HrvMetrics) -> StressIndices {
    let stress_index = if metrics.sdnn > 0.0 {
        1000.0 / metrics.sdnn
    } else {
        0.0
    };
    let ans_balance = metrics.lf_hf_ratio;
    let hrv_index = metrics.rmssd;
    let stress_resistance = if metrics.rmssd > 0.0 {
        100.0 / metrics.rmssd
    } else {
        0.0
    };
    let hr_stability = if metrics.sdnn > 0.0 {
        metrics.mean_rr / metrics.sdnn
    } else {
        0.0
    };
    let recovery_index = metrics.pnn50;
    let activation_index = metrics.lf_hf_ratio;
    let relaxation_index = if metrics.hf > 0.0 {
        metrics.hf.ln()
    } else {
        0.0
    };

    let (w_tension, w_balance, w_resistance, w_recovery) = SCORE_WEIGHTS;
    let raw_score = stress_index * w_tension
        + ans_balance * ANS_BALANCE_SCALE * w_balance
        + stress_resistance * w_resistance
        + (100.0 - recovery_index) * w_recovery;
    let overall_stress_score = raw_score.clamp(0.0, 100.0);

    StressIndices {
        stress_index,
        ans_balance,
        hrv_index,
        stress_resistance,
        hr_stability,
        recovery_index,
        activation_index,
        relaxation_index,
        overall_stress_score,
        stress_level: stress_level_for(overall_stress_score),
    }
}

/// Map the composite score onto the 1-5 severity scale
fn stress_level_for(score: f64) -> StressLevel {
    if score < 20.0 {
        1
    } else if score < 40.0 {
        2
    } else if score < 60.0 {
        3
    } else if score < 80.0 {
        4
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(sdnn: f64, rmssd: f64, pnn50: f64, lf_hf_ratio: f64, hf: f64) -> HrvMetrics {
        HrvMetrics {
            mean_rr: 800.0,
            bpm: 75.0,
            sdnn,
            rmssd,
            pnn50,
            lf: lf_hf_ratio * hf,
            hf,
            lf_hf_ratio,
            sd1: 20.0,
            sd2: 40.0,
            ellipse_area: std::f64::consts::PI * 800.0,
            sample_entropy: 1.1,
        }
    }

    #[test]
    fn test_index_formulas() {
        let hf = std::f64::consts::E.powi(2);
        let indices = compose_stress_indices(&metrics(50.0, 40.0, 30.0, 2.0, hf));

        assert_eq!(indices.stress_index, 20.0);
        assert_eq!(indices.ans_balance, 2.0);
        assert_eq!(indices.hrv_index, 40.0);
        assert_eq!(indices.stress_resistance, 2.5);
        assert_eq!(indices.hr_stability, 16.0);
        assert_eq!(indices.recovery_index, 30.0);
        assert_eq!(indices.activation_index, 2.0);
        assert!((indices.relaxation_index - 2.0).abs() < 1e-9);

        // 20*0.3 + 2*10*0.2 + 2.5*0.2 + 70*0.3 = 31.5
        assert!((indices.overall_stress_score - 31.5).abs() < 1e-9);
        assert_eq!(indices.stress_level, 2);
    }

    #[test]
    fn test_zero_guards_substitute_zero() {
        let indices = compose_stress_indices(&metrics(0.0, 0.0, 0.0, 0.0, 0.0));

        assert_eq!(indices.stress_index, 0.0);
        assert_eq!(indices.stress_resistance, 0.0);
        assert_eq!(indices.hr_stability, 0.0);
        assert_eq!(indices.relaxation_index, 0.0);
        assert!(indices.overall_stress_score.is_finite());
    }

    #[test]
    fn test_score_clamped_at_100() {
        // Near-zero SDNN explodes the tension term; the score must clamp
        // to exactly 100, never beyond
        let indices = compose_stress_indices(&metrics(0.001, 40.0, 10.0, 1.0, 100.0));

        assert_eq!(indices.overall_stress_score, 100.0);
        assert_eq!(indices.stress_level, 5);
    }

    #[test]
    fn test_score_floor_at_zero() {
        // pNN50 of 100 zeroes the recovery term; nothing drives the score
        // negative, but the clamp guards the lower bound as well
        let indices = compose_stress_indices(&metrics(1000.0, 1000.0, 100.0, 0.0, 0.0));
        assert!(indices.overall_stress_score >= 0.0);
        assert_eq!(indices.stress_level, 1);
    }

    #[test]
    fn test_level_boundaries() {
        for (score, level) in [
            (0.0, 1),
            (19.99, 1),
            (20.0, 2),
            (39.99, 2),
            (40.0, 3),
            (60.0, 4),
            (79.99, 4),
            (80.0, 5),
            (100.0, 5),
        ] {
            assert_eq!(stress_level_for(score), level, "score {score}");
        }
    }
}
