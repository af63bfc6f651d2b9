//! Payload encoding
//!
//! This module encodes an analysis result into the versioned JSON payload
//! handed to the display and relay collaborators. Absent metrics encode as
//! JSON `null`, never as zeroed structs, so consumers can tell "not enough
//! data yet" apart from a genuine zero.

use crate::error::ComputeError;
use crate::types::{HrvAnalysis, PulsePayload, PulseProducer, PulseProvenance, PulseQuality};
use crate::{PRODUCER_NAME, PULSE_VERSION};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current payload schema version
pub const PULSE_SCHEMA_VERSION: &str = "1.0.0";

/// Encoder for producing versioned analysis payloads
pub struct PulseEncoder {
    instance_id: String,
}

impl Default for PulseEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an analysis into a payload
    pub fn encode(
        &self,
        analysis: &HrvAnalysis,
        device_id: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<PulsePayload, ComputeError> {
        let computed_at = Utc::now();

        let producer = PulseProducer {
            name: PRODUCER_NAME.to_string(),
            version: PULSE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = PulseProvenance {
            source_device_id: device_id.to_string(),
            observed_at_utc: observed_at.to_rfc3339(),
            computed_at_utc: computed_at.to_rfc3339(),
        };

        let quality = PulseQuality {
            beats_detected: analysis.beats_detected,
            rr_count: analysis.rr_ms.len(),
            flags: analysis
                .quality
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
        };

        Ok(PulsePayload {
            schema_version: PULSE_SCHEMA_VERSION.to_string(),
            producer,
            provenance,
            quality,
            hrv: analysis.metrics,
            stress: analysis.stress,
            rr_ms: analysis.rr_ms.clone(),
            poincare: analysis.poincare.clone(),
        })
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        analysis: &HrvAnalysis,
        device_id: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(analysis, device_id, observed_at)?;
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze;
    use crate::types::QualityFlag;
    use pretty_assertions::assert_eq;

    fn sample_analysis() -> HrvAnalysis {
        let mut samples = vec![100.0; 940];
        for b in 0..12 {
            samples[30 + b * 75] = 180.0;
        }
        analyze(&samples, 100.0)
    }

    #[test]
    fn test_encode_payload_shape() {
        let analysis = sample_analysis();
        let encoder = PulseEncoder::with_instance_id("test-instance".to_string());
        let payload = encoder
            .encode(&analysis, "hub-3/sensor-1", Utc::now())
            .unwrap();

        assert_eq!(payload.schema_version, PULSE_SCHEMA_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.version, PULSE_VERSION);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.provenance.source_device_id, "hub-3/sensor-1");

        assert_eq!(payload.quality.beats_detected, 12);
        assert_eq!(payload.quality.rr_count, 11);
        assert!(payload.hrv.is_some());
        assert!(payload.stress.is_some());
        assert_eq!(payload.poincare.len(), 10);
    }

    #[test]
    fn test_absent_metrics_encode_as_null() {
        let analysis = HrvAnalysis::empty(QualityFlag::InsufficientSamples);
        let encoder = PulseEncoder::new();
        let json = encoder.encode_to_json(&analysis, "dev", Utc::now()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["hrv"].is_null());
        assert!(parsed["stress"].is_null());
        assert_eq!(parsed["quality"]["flags"][0], "insufficient_samples");
        assert_eq!(parsed["quality"]["rr_count"], 0);
    }

    #[test]
    fn test_encode_to_json_is_valid() {
        let analysis = sample_analysis();
        let encoder = PulseEncoder::new();
        let json = encoder.encode_to_json(&analysis, "dev", Utc::now()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("schema_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("provenance").is_some());
        assert!(parsed.get("quality").is_some());
        assert!(parsed["hrv"]["bpm"].as_f64().is_some());
    }
}
