//! Telemetry batch adapter
//!
//! Parses sensor batch JSON as delivered by the telemetry relay and extracts
//! the IR intensity series the engine runs on. The relay sends either a bare
//! array of samples or an envelope carrying device metadata.

use crate::error::ComputeError;
use crate::types::RawSample;
use serde::Deserialize;

/// A parsed telemetry batch
#[derive(Debug, Clone)]
pub struct TelemetryBatch {
    /// Device identifier, when the envelope carries one
    pub device_id: Option<String>,
    /// Sampling rate reported by the device (Hz)
    pub sampling_rate_hz: Option<f64>,
    /// Samples in arrival order
    pub samples: Vec<RawSample>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchPayload {
    Envelope {
        #[serde(default)]
        device_id: Option<String>,
        #[serde(default)]
        sampling_rate_hz: Option<f64>,
        samples: Vec<RawSample>,
    },
    Bare(Vec<RawSample>),
}

/// Parse a telemetry batch from JSON.
///
/// Accepts either `[{"ir": ...}, ...]` or
/// `{"device_id": ..., "sampling_rate_hz": ..., "samples": [...]}`.
pub fn parse_batch(raw_json: &str) -> Result<TelemetryBatch, ComputeError> {
    let payload: BatchPayload = serde_json::from_str(raw_json)
        .map_err(|e| ComputeError::ParseError(e.to_string()))?;

    Ok(match payload {
        BatchPayload::Envelope {
            device_id,
            sampling_rate_hz,
            samples,
        } => TelemetryBatch {
            device_id,
            sampling_rate_hz,
            samples,
        },
        BatchPayload::Bare(samples) => TelemetryBatch {
            device_id: None,
            sampling_rate_hz: None,
            samples,
        },
    })
}

/// Extract the usable IR intensity series from a sample batch.
///
/// Non-finite and non-positive IR values are discarded here, before peak
/// detection ever sees them.
pub fn ir_series(samples: &[RawSample]) -> Vec<f64> {
    samples
        .iter()
        .filter(|s| s.has_valid_ir())
        .map(|s| s.ir)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_bare_array() {
        let batch = parse_batch(r#"[{"ir": 100.0}, {"ir": 101.5, "spo2": 98.0}]"#).unwrap();
        assert_eq!(batch.device_id, None);
        assert_eq!(batch.samples.len(), 2);
        assert_eq!(batch.samples[1].spo2, Some(98.0));
    }

    #[test]
    fn test_parse_envelope() {
        let json = r#"{
            "device_id": "hub-7/sensor-2",
            "sampling_rate_hz": 100.0,
            "samples": [{"ir": 100.0, "hr": 72.0, "battery_pct": 81.0}]
        }"#;
        let batch = parse_batch(json).unwrap();

        assert_eq!(batch.device_id.as_deref(), Some("hub-7/sensor-2"));
        assert_eq!(batch.sampling_rate_hz, Some(100.0));
        assert_eq!(batch.samples.len(), 1);
        assert_eq!(batch.samples[0].hr, Some(72.0));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_batch("not valid json").is_err());
        assert!(parse_batch(r#"{"samples": "nope"}"#).is_err());
    }

    #[test]
    fn test_ir_series_drops_invalid_values() {
        let samples = vec![
            RawSample::from_ir(100.0),
            RawSample::from_ir(0.0),
            RawSample::from_ir(-5.0),
            RawSample::from_ir(f64::NAN),
            RawSample::from_ir(102.0),
        ];
        assert_eq!(ir_series(&samples), vec![100.0, 102.0]);
    }
}
