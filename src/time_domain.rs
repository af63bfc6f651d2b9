//! Time-domain HRV metrics
//!
//! Statistical metrics computed directly over the RR interval series:
//! mean RR, derived heart rate, SDNN, RMSSD, and pNN50.

/// Successive-difference threshold for pNN50 (ms)
const NN50_THRESHOLD_MS: f64 = 50.0;

/// Time-domain slice of the metrics aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeDomainMetrics {
    /// Mean RR interval (ms)
    pub mean_rr: f64,
    /// Heart rate derived from mean RR (bpm)
    pub bpm: f64,
    /// Standard deviation of RR intervals, n-1 denominator (ms)
    pub sdnn: f64,
    /// Root mean square of successive differences (ms)
    pub rmssd: f64,
    /// Percentage of successive differences exceeding 50 ms
    pub pnn50: f64,
}

/// Compute time-domain metrics over an RR series.
///
/// Returns `None` for fewer than 2 intervals: the whole metrics aggregate is
/// then "insufficient data", not a zeroed struct.
pub fn compute_time_domain(rr_ms: &[f64]) -> Option<TimeDomainMetrics> {
    if rr_ms.len() < 2 {
        return None;
    }

    let n = rr_ms.len() as f64;
    let mean_rr = rr_ms.iter().sum::<f64>() / n;
    let bpm = 60_000.0 / mean_rr;

    // SDNN uses the unbiased n-1 denominator
    let variance = rr_ms
        .iter()
        .map(|&rr| (rr - mean_rr).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let sdnn = variance.sqrt();

    // RMSSD and pNN50 both run over the successive-difference series
    let diffs: Vec<f64> = rr_ms.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let rmssd = (diffs.iter().map(|&d| d * d).sum::<f64>() / diffs.len() as f64).sqrt();
    let over_50 = diffs
        .iter()
        .filter(|d| d.abs() > NN50_THRESHOLD_MS)
        .count();
    let pnn50 = over_50 as f64 / diffs.len() as f64 * 100.0;

    Some(TimeDomainMetrics {
        mean_rr,
        bpm,
        sdnn,
        rmssd,
        pnn50,
    })
}
