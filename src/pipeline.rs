//! Pipeline orchestration
//!
//! This module provides the public API of the engine. One invocation takes a
//! raw IR intensity series and re-derives everything from scratch: peaks, RR
//! intervals, time/frequency/nonlinear metrics, and stress indices. There is
//! no state carried between invocations; callers replace the previous result
//! wholesale whenever a new sample batch arrives.

use chrono::Utc;

use crate::adapter::{ir_series, parse_batch};
use crate::encoder::PulseEncoder;
use crate::error::ComputeError;
use crate::frequency::{compute_frequency_domain, MIN_RR_FOR_SPECTRUM};
use crate::nonlinear::compute_nonlinear;
use crate::peaks::detect_peaks;
use crate::rr::extract_rr_intervals;
use crate::stress::compose_stress_indices;
use crate::time_domain::compute_time_domain;
use crate::types::{HrvAnalysis, HrvMetrics, PoincarePoint, QualityFlag, RawSample};

/// Default biosensor sampling rate (Hz)
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 100.0;

/// Minimum count of valid IR samples before anything is computed
const MIN_VALID_SAMPLES: usize = 10;

/// Analyze a raw IR intensity series.
///
/// Pipeline stages:
/// 1. Discard non-finite and non-positive samples
/// 2. Peak detection (adaptive threshold with lowered-threshold retry)
/// 3. RR interval extraction (physiological band with widened-band retry)
/// 4. Time-domain, frequency-domain, and nonlinear metrics off the RR series
/// 5. Stress index composition
///
/// Insufficient data at any stage degrades to an absent-metrics result; this
/// function never fails.
pub fn analyze(ir_samples: &[f64], sampling_rate_hz: f64) -> HrvAnalysis {
    let valid: Vec<f64> = ir_samples
        .iter()
        .copied()
        .filter(|x| x.is_finite() && *x > 0.0)
        .collect();

    if valid.len() < MIN_VALID_SAMPLES {
        return HrvAnalysis::empty(QualityFlag::InsufficientSamples);
    }

    let mut quality = Vec::new();

    // Stage 2: locate heartbeat peaks
    let detection = detect_peaks(&valid, sampling_rate_hz);
    if detection.relaxed_threshold {
        quality.push(QualityFlag::RelaxedPeakThreshold);
    }
    if detection.indices.len() < 2 {
        quality.push(QualityFlag::InsufficientPeaks);
        return HrvAnalysis {
            rr_ms: Vec::new(),
            beats_detected: detection.indices.len(),
            metrics: None,
            poincare: Vec::new(),
            stress: None,
            quality,
        };
    }

    // Stage 3: convert peaks to RR intervals
    let extraction = extract_rr_intervals(&detection.indices, sampling_rate_hz);
    if extraction.widened_band {
        quality.push(QualityFlag::WidenedIntervalBand);
    }
    let rr_ms = extraction.intervals;
    let poincare = poincare_points(&rr_ms);

    // Stage 4: metrics off the RR series
    let time = match compute_time_domain(&rr_ms) {
        Some(time) => time,
        None => {
            quality.push(QualityFlag::InsufficientIntervals);
            return HrvAnalysis {
                rr_ms,
                beats_detected: detection.indices.len(),
                metrics: None,
                poincare,
                stress: None,
                quality,
            };
        }
    };

    if rr_ms.len() < MIN_RR_FOR_SPECTRUM {
        quality.push(QualityFlag::ShortSeriesForSpectrum);
    }
    let freq = compute_frequency_domain(&rr_ms);

    // compute_nonlinear only refuses series shorter than 2, which the
    // time-domain stage has already ruled out
    let nonlinear = match compute_nonlinear(&rr_ms) {
        Some(nonlinear) => nonlinear,
        None => {
            quality.push(QualityFlag::InsufficientIntervals);
            return HrvAnalysis {
                rr_ms,
                beats_detected: detection.indices.len(),
                metrics: None,
                poincare,
                stress: None,
                quality,
            };
        }
    };

    let metrics = HrvMetrics {
        mean_rr: time.mean_rr,
        bpm: time.bpm,
        sdnn: time.sdnn,
        rmssd: time.rmssd,
        pnn50: time.pnn50,
        lf: freq.lf,
        hf: freq.hf,
        lf_hf_ratio: freq.lf_hf_ratio,
        sd1: nonlinear.sd1,
        sd2: nonlinear.sd2,
        ellipse_area: nonlinear.ellipse_area,
        sample_entropy: nonlinear.sample_entropy,
    };

    // Stage 5: derived stress indices
    let stress = compose_stress_indices(&metrics);

    HrvAnalysis {
        rr_ms,
        beats_detected: detection.indices.len(),
        metrics: Some(metrics),
        poincare,
        stress: Some(stress),
        quality,
    }
}

/// Analyze a batch of raw sensor samples.
///
/// Extracts the IR channel and delegates to [`analyze`]; all other channels
/// are passthrough data for display collaborators.
pub fn analyze_batch(samples: &[RawSample], sampling_rate_hz: f64) -> HrvAnalysis {
    analyze(&ir_series(samples), sampling_rate_hz)
}

/// Analyze a telemetry batch JSON and encode the result (stateless, one-shot).
///
/// The sampling rate and device id come from the batch envelope when present,
/// falling back to 100 Hz and the given default.
///
/// # Example
/// ```ignore
/// let payload_json = analyze_batch_json(batch_json, "hub-3/sensor-1")?;
/// ```
pub fn analyze_batch_json(raw_json: &str, default_device_id: &str) -> Result<String, ComputeError> {
    PulseProcessor::new().process_batch_json(raw_json, default_device_id)
}

fn poincare_points(rr_ms: &[f64]) -> Vec<PoincarePoint> {
    rr_ms
        .windows(2)
        .map(|pair| PoincarePoint {
            x: pair[0],
            y: pair[1],
        })
        .collect()
}

/// Processor tying the pipeline to a payload encoder.
///
/// Holds no numeric state; only the encoder instance id persists across
/// calls so payloads from one deployment are attributable to it.
pub struct PulseProcessor {
    encoder: PulseEncoder,
}

impl Default for PulseProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseProcessor {
    /// Create a new processor with a fresh encoder instance id
    pub fn new() -> Self {
        Self {
            encoder: PulseEncoder::new(),
        }
    }

    /// Create a processor with a specific encoder instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            encoder: PulseEncoder::with_instance_id(instance_id),
        }
    }

    /// Parse a telemetry batch, run the pipeline, and encode the payload
    pub fn process_batch_json(
        &self,
        raw_json: &str,
        default_device_id: &str,
    ) -> Result<String, ComputeError> {
        let batch = parse_batch(raw_json)?;

        let sampling_rate_hz = batch.sampling_rate_hz.unwrap_or(DEFAULT_SAMPLING_RATE_HZ);
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(ComputeError::InvalidSamplingRate(sampling_rate_hz));
        }

        let device_id = batch
            .device_id
            .clone()
            .unwrap_or_else(|| default_device_id.to_string());
        let observed_at = batch
            .samples
            .iter()
            .rev()
            .find_map(|s| s.recorded_at)
            .unwrap_or_else(Utc::now);

        let analysis = analyze_batch(&batch.samples, sampling_rate_hz);
        self.encoder.encode_to_json(&analysis, &device_id, observed_at)
    }
}
