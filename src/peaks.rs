//! Heartbeat peak detection
//!
//! This module locates heartbeat peaks in a raw PPG intensity series using an
//! adaptive statistical threshold. Weak signals that yield too few peaks are
//! rescanned once with a lowered threshold.

/// Primary threshold offset above the mean, in population standard deviations
const PRIMARY_THRESHOLD_SIGMA: f64 = 0.5;

/// Lowered threshold offset used by the retry scan
const RELAXED_THRESHOLD_SIGMA: f64 = 0.2;

/// Minimum accepted peak count before the detector falls back to the
/// lowered threshold
const MIN_PEAK_COUNT: usize = 10;

/// Refractory spacing between accepted peaks, as a fraction of one second
const MIN_PEAK_SPACING_SEC: f64 = 0.4;

/// Result of one detection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakDetection {
    /// Strictly increasing indices into the input series
    pub indices: Vec<usize>,
    /// Whether the result came from the lowered-threshold rescan
    pub relaxed_threshold: bool,
}

impl PeakDetection {
    fn primary(indices: Vec<usize>) -> Self {
        Self {
            indices,
            relaxed_threshold: false,
        }
    }
}

/// Detect heartbeat peaks in an intensity series sampled at `sampling_rate_hz`.
///
/// A sample qualifies as a peak when it exceeds `mean + 0.5*std` of the whole
/// series, is strictly greater than both neighbors, and lies more than
/// `floor(fs * 0.4)` samples after the previously accepted peak. When fewer
/// than 10 peaks are accepted, the whole scan is repeated once at
/// `mean + 0.2*std` and that result is used even if it is still short.
///
/// Fewer than 3 samples yield an empty result with no retry.
pub fn detect_peaks(samples: &[f64], sampling_rate_hz: f64) -> PeakDetection {
    if samples.len() < 3 {
        return PeakDetection::primary(Vec::new());
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let std = population_std(samples, mean);
    let min_distance = (sampling_rate_hz * MIN_PEAK_SPACING_SEC).floor() as usize;

    let primary = scan(samples, mean + PRIMARY_THRESHOLD_SIGMA * std, min_distance);
    if primary.len() >= MIN_PEAK_COUNT {
        return PeakDetection::primary(primary);
    }

    let relaxed = scan(samples, mean + RELAXED_THRESHOLD_SIGMA * std, min_distance);
    PeakDetection {
        indices: relaxed,
        relaxed_threshold: true,
    }
}

/// Single threshold scan over the interior samples
fn scan(samples: &[f64], threshold: f64, min_distance: usize) -> Vec<usize> {
    let mut peaks: Vec<usize> = Vec::new();

    for i in 1..samples.len() - 1 {
        if samples[i] <= threshold {
            continue;
        }
        if samples[i] <= samples[i - 1] || samples[i] <= samples[i + 1] {
            continue;
        }
        match peaks.last() {
            Some(&last) if i - last <= min_distance => continue,
            _ => peaks.push(i),
        }
    }

    peaks
}

/// Population standard deviation (denominator n)
fn population_std(samples: &[f64], mean: f64) -> f64 {
    let variance = samples
        .iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>()
        / samples.len() as f64;
    variance.sqrt()
}
