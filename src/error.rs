//! Error types for Synheart Pulse

use thiserror::Error;

/// Errors that can occur around the analysis pipeline.
///
/// The numeric pipeline itself never fails: short or noisy input degrades to
/// an absent-metrics result instead. These errors cover the parsing and
/// encoding surfaces wrapped around it.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse telemetry batch: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid sampling rate: {0} Hz")]
    InvalidSamplingRate(f64),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
