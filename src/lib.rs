//! Synheart Pulse - On-device HRV analysis engine for PPG pulse waveforms
//!
//! Pulse converts a raw photoplethysmography (PPG) IR intensity series into
//! heart-rate-variability metrics and derived stress indices through a
//! deterministic pipeline: peak detection → RR interval extraction →
//! time/frequency/nonlinear analysis → stress index composition.
//!
//! The pipeline is a pure, stateless transform: every invocation re-derives
//! everything from the sample batch it is given, and short or noisy input
//! degrades to an absent-metrics result instead of an error.

pub mod adapter;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod nonlinear;
pub mod peaks;
pub mod pipeline;
pub mod rr;
pub mod stress;
pub mod time_domain;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;
pub use pipeline::{
    analyze, analyze_batch, analyze_batch_json, PulseProcessor, DEFAULT_SAMPLING_RATE_HZ,
};
pub use types::{
    HrvAnalysis, HrvMetrics, PoincarePoint, QualityFlag, RawSample, StressIndices,
};

/// Pulse version embedded in all encoded payloads
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for encoded payloads
pub const PRODUCER_NAME: &str = "synheart-pulse";
