//! Core types for the Synheart Pulse engine
//!
//! This module defines the data structures that flow through each stage of the
//! analysis: raw biosensor samples, the HRV metrics aggregate, derived stress
//! indices, and the encoded payload structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single raw biosensor sample as delivered by the telemetry relay.
///
/// Only the `ir` channel feeds the HRV engine; the remaining channels are
/// passthrough display data owned by the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    /// Infrared PPG intensity (the analysis channel)
    pub ir: f64,
    /// Red PPG intensity
    #[serde(default)]
    pub red: Option<f64>,
    /// Green PPG intensity
    #[serde(default)]
    pub green: Option<f64>,
    /// Blood oxygen saturation (percentage, 0-100)
    #[serde(default)]
    pub spo2: Option<f64>,
    /// Device-reported heart rate (bpm)
    #[serde(default)]
    pub hr: Option<f64>,
    /// Skin temperature (celsius)
    #[serde(default)]
    pub temp_c: Option<f64>,
    /// Device battery level (percentage, 0-100)
    #[serde(default)]
    pub battery_pct: Option<f64>,
    /// When the sample was recorded (UTC)
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RawSample {
    /// Create a sample carrying only the IR channel
    pub fn from_ir(ir: f64) -> Self {
        Self {
            ir,
            red: None,
            green: None,
            spo2: None,
            hr: None,
            temp_c: None,
            battery_pct: None,
            recorded_at: None,
        }
    }

    /// Whether the IR value is usable for peak detection (finite and positive)
    pub fn has_valid_ir(&self) -> bool {
        self.ir.is_finite() && self.ir > 0.0
    }
}

/// One point of the Poincare scatter: RR(n) against RR(n+1).
///
/// Used only for visualization by downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoincarePoint {
    /// RR(n) in milliseconds
    pub x: f64,
    /// RR(n+1) in milliseconds
    pub y: f64,
}

/// Immutable aggregate of all time-, frequency-, and nonlinear-domain HRV
/// scalars. Built once per invocation; a fresh one replaces it wholesale on
/// every recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrvMetrics {
    /// Mean RR interval (ms)
    pub mean_rr: f64,
    /// Heart rate derived from mean RR (bpm)
    pub bpm: f64,
    /// Standard deviation of RR intervals, n-1 denominator (ms)
    pub sdnn: f64,
    /// Root mean square of successive RR differences (ms)
    pub rmssd: f64,
    /// Percentage of successive differences exceeding 50 ms
    pub pnn50: f64,
    /// Spectral power in the 0.04-0.15 Hz band
    pub lf: f64,
    /// Spectral power in the 0.15-0.40 Hz band
    pub hf: f64,
    /// LF/HF power ratio (0 when HF is 0)
    pub lf_hf_ratio: f64,
    /// Poincare short-term dispersion (ms)
    pub sd1: f64,
    /// Poincare long-term dispersion (ms)
    pub sd2: f64,
    /// Poincare ellipse area (pi * sd1 * sd2)
    pub ellipse_area: f64,
    /// Sample entropy of the RR series (m=2, r=0.2)
    pub sample_entropy: f64,
}

/// Stress severity level derived from the overall stress score.
///
/// 1 = minimal, 5 = severe. Serialized as its integer value.
pub type StressLevel = u8;

/// Derived stress indices, built strictly from an [`HrvMetrics`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressIndices {
    /// Baevsky-style tension index: 1000 / SDNN
    pub stress_index: f64,
    /// Autonomic balance (LF/HF ratio)
    pub ans_balance: f64,
    /// Vagal tone proxy (RMSSD)
    pub hrv_index: f64,
    /// Resistance to stressors: 100 / RMSSD
    pub stress_resistance: f64,
    /// Heart rhythm stability: mean RR / SDNN
    pub hr_stability: f64,
    /// Parasympathetic recovery marker (pNN50)
    pub recovery_index: f64,
    /// Sympathetic activation marker (LF/HF ratio)
    pub activation_index: f64,
    /// Parasympathetic relaxation marker: ln(HF)
    pub relaxation_index: f64,
    /// Composite stress score, clamped to 0-100
    pub overall_stress_score: f64,
    /// Severity level 1-5 derived from the score
    pub stress_level: StressLevel,
}

/// Quality flag recording how the engine degraded or recovered on this input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    /// Fewer than 10 valid IR samples; nothing was computed
    InsufficientSamples,
    /// Fewer than 2 peaks were found; no RR series could be built
    InsufficientPeaks,
    /// Fewer than 2 RR intervals survived filtering; no metrics
    InsufficientIntervals,
    /// The detector fell back to the lowered peak threshold
    RelaxedPeakThreshold,
    /// The extractor fell back to the widened physiological band
    WidenedIntervalBand,
    /// RR series too short for spectral analysis; LF/HF reported as zero
    ShortSeriesForSpectrum,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::InsufficientSamples => "insufficient_samples",
            QualityFlag::InsufficientPeaks => "insufficient_peaks",
            QualityFlag::InsufficientIntervals => "insufficient_intervals",
            QualityFlag::RelaxedPeakThreshold => "relaxed_peak_threshold",
            QualityFlag::WidenedIntervalBand => "widened_interval_band",
            QualityFlag::ShortSeriesForSpectrum => "short_series_for_spectrum",
        }
    }
}

/// Complete output of one pipeline invocation.
///
/// `metrics` and `stress` are `None` when the input carried too little data;
/// callers can distinguish "not enough data yet" from "computed and genuinely
/// zero". Stale results must be replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrvAnalysis {
    /// Filtered RR interval series (ms)
    pub rr_ms: Vec<f64>,
    /// Number of heartbeat peaks accepted by the detector
    pub beats_detected: usize,
    /// HRV metrics, absent on insufficient data
    pub metrics: Option<HrvMetrics>,
    /// Poincare scatter points for visualization
    pub poincare: Vec<PoincarePoint>,
    /// Stress indices, absent whenever `metrics` is absent
    pub stress: Option<StressIndices>,
    /// Degradation/recovery provenance for this invocation
    pub quality: Vec<QualityFlag>,
}

impl HrvAnalysis {
    /// An analysis carrying no results, tagged with the given flag
    pub fn empty(flag: QualityFlag) -> Self {
        Self {
            rr_ms: Vec::new(),
            beats_detected: 0,
            metrics: None,
            poincare: Vec::new(),
            stress: None,
            quality: vec![flag],
        }
    }

    /// Whether the invocation produced a metrics aggregate
    pub fn has_metrics(&self) -> bool {
        self.metrics.is_some()
    }
}

/// Payload producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Payload provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseProvenance {
    pub source_device_id: String,
    pub observed_at_utc: String,
    pub computed_at_utc: String,
}

/// Payload quality metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseQuality {
    /// Peaks accepted by the detector
    pub beats_detected: usize,
    /// RR intervals that survived filtering
    pub rr_count: usize,
    /// Quality flags raised during analysis
    pub flags: Vec<String>,
}

/// Complete encoded payload handed to display collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulsePayload {
    pub schema_version: String,
    pub producer: PulseProducer,
    pub provenance: PulseProvenance,
    pub quality: PulseQuality,
    /// HRV metrics; `null` when the batch carried too little data
    pub hrv: Option<HrvMetrics>,
    /// Stress indices; `null` whenever `hrv` is `null`
    pub stress: Option<StressIndices>,
    pub rr_ms: Vec<f64>,
    pub poincare: Vec<PoincarePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raw_sample_validity() {
        assert!(RawSample::from_ir(1024.0).has_valid_ir());
        assert!(!RawSample::from_ir(0.0).has_valid_ir());
        assert!(!RawSample::from_ir(-12.0).has_valid_ir());
        assert!(!RawSample::from_ir(f64::NAN).has_valid_ir());
        assert!(!RawSample::from_ir(f64::INFINITY).has_valid_ir());
    }

    #[test]
    fn test_raw_sample_deserializes_with_ir_only() {
        let sample: RawSample = serde_json::from_str(r#"{"ir": 512.5}"#).unwrap();
        assert_eq!(sample.ir, 512.5);
        assert_eq!(sample.spo2, None);
        assert_eq!(sample.recorded_at, None);
    }

    #[test]
    fn test_quality_flag_serialization() {
        let json = serde_json::to_string(&QualityFlag::RelaxedPeakThreshold).unwrap();
        assert_eq!(json, r#""relaxed_peak_threshold""#);
    }

    #[test]
    fn test_empty_analysis() {
        let analysis = HrvAnalysis::empty(QualityFlag::InsufficientSamples);
        assert!(!analysis.has_metrics());
        assert!(analysis.rr_ms.is_empty());
        assert_eq!(analysis.quality, vec![QualityFlag::InsufficientSamples]);
    }
}
