//! RR interval extraction
//!
//! Converts consecutive peak positions into RR intervals in milliseconds,
//! keeping only physiologically plausible values. When the strict band leaves
//! too few intervals, the extraction is redone once with a widened band.

/// Strict physiological band (ms): 30-200 bpm
const STRICT_BAND_MS: (f64, f64) = (300.0, 2000.0);

/// Widened fallback band (ms)
const WIDE_BAND_MS: (f64, f64) = (200.0, 3000.0);

/// Minimum surviving interval count before the extractor falls back to the
/// widened band
const MIN_INTERVAL_COUNT: usize = 5;

/// Result of one extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct RrExtraction {
    /// Surviving RR intervals (ms), in beat order
    pub intervals: Vec<f64>,
    /// Whether the result came from the widened-band retry
    pub widened_band: bool,
}

/// Extract RR intervals from peak indices sampled at `sampling_rate_hz`.
///
/// Each consecutive peak pair yields `(idx[i] - idx[i-1]) * (1000 / fs)` ms.
/// Intervals outside [300, 2000] ms are dropped; if fewer than 5 survive, the
/// whole extraction is redone against [200, 3000] ms and that result is used
/// even if it is still short. Fewer than 2 peaks yield an empty result with
/// no retry.
pub fn extract_rr_intervals(peak_indices: &[usize], sampling_rate_hz: f64) -> RrExtraction {
    if peak_indices.len() < 2 {
        return RrExtraction {
            intervals: Vec::new(),
            widened_band: false,
        };
    }

    let strict = filter_band(peak_indices, sampling_rate_hz, STRICT_BAND_MS);
    if strict.len() >= MIN_INTERVAL_COUNT {
        return RrExtraction {
            intervals: strict,
            widened_band: false,
        };
    }

    let wide = filter_band(peak_indices, sampling_rate_hz, WIDE_BAND_MS);
    RrExtraction {
        intervals: wide,
        widened_band: true,
    }
}

fn filter_band(peak_indices: &[usize], sampling_rate_hz: f64, band: (f64, f64)) -> Vec<f64> {
    let ms_per_sample = 1000.0 / sampling_rate_hz;
    peak_indices
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64 * ms_per_sample)
        .filter(|&interval| interval >= band.0 && interval <= band.1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_regular_intervals() {
        // Peaks every 80 samples at 100 Hz -> 800 ms intervals
        let peaks: Vec<usize> = (0..8).map(|i| i * 80).collect();
        let extraction = extract_rr_intervals(&peaks, 100.0);

        assert!(!extraction.widened_band);
        assert_eq!(extraction.intervals, vec![800.0; 7]);
    }

    #[test]
    fn test_out_of_band_intervals_dropped() {
        // 800 ms, 800 ms, 8000 ms gap, 800 ms, 800 ms, 800 ms
        let peaks = vec![0, 80, 160, 960, 1040, 1120, 1200];
        let extraction = extract_rr_intervals(&peaks, 100.0);

        assert!(!extraction.widened_band);
        assert_eq!(extraction.intervals, vec![800.0; 5]);
    }

    #[test]
    fn test_widened_band_recovers_short_intervals() {
        // Four in-band 800 ms intervals plus three 250 ms ones. The strict
        // band keeps 4 (< 5), so the extractor must widen and recover all 7.
        let peaks = vec![0, 80, 160, 240, 320, 345, 370, 395];
        let extraction = extract_rr_intervals(&peaks, 100.0);

        assert!(extraction.widened_band);
        assert_eq!(
            extraction.intervals,
            vec![800.0, 800.0, 800.0, 800.0, 250.0, 250.0, 250.0]
        );
    }

    #[test]
    fn test_too_few_peaks_yields_empty_without_retry() {
        let extraction = extract_rr_intervals(&[42], 100.0);
        assert!(extraction.intervals.is_empty());
        assert!(!extraction.widened_band);

        let extraction = extract_rr_intervals(&[], 100.0);
        assert!(extraction.intervals.is_empty());
        assert!(!extraction.widened_band);
    }

    #[test]
    fn test_interval_scaling_follows_sampling_rate() {
        // Same index gap reads differently at different sampling rates
        let peaks = vec![0, 50, 100];
        let at_100hz = extract_rr_intervals(&peaks, 100.0);
        let at_50hz = extract_rr_intervals(&peaks, 50.0);

        assert_eq!(at_100hz.intervals, vec![500.0, 500.0]);
        assert_eq!(at_50hz.intervals, vec![1000.0, 1000.0]);
    }
}
