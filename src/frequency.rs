//! Frequency-domain HRV analysis
//!
//! Resamples the RR series onto a uniform 4 Hz grid with a zero-order hold,
//! computes an unwindowed discrete Fourier transform, and integrates spectral
//! power over the LF and HF bands.

/// Uniform resampling rate for the RR series (Hz)
const RESAMPLE_RATE_HZ: f64 = 4.0;

/// Minimum RR count for spectral analysis; shorter series report zero power
pub(crate) const MIN_RR_FOR_SPECTRUM: usize = 10;

/// Low-frequency band bounds (Hz), inclusive
const LF_BAND_HZ: (f64, f64) = (0.04, 0.15);

/// High-frequency band bounds (Hz), inclusive
const HF_BAND_HZ: (f64, f64) = (0.15, 0.40);

/// Frequency-domain slice of the metrics aggregate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrequencyDomainMetrics {
    /// Power in the 0.04-0.15 Hz band
    pub lf: f64,
    /// Power in the 0.15-0.40 Hz band
    pub hf: f64,
    /// LF/HF ratio, 0 when HF is 0
    pub lf_hf_ratio: f64,
}

/// Compute LF/HF band powers over an RR series.
///
/// Series shorter than 10 intervals return the all-zero result rather than an
/// error; the time-domain minimum has already been met by then and the caller
/// only needs to know that no spectral content was measurable.
pub fn compute_frequency_domain(rr_ms: &[f64]) -> FrequencyDomainMetrics {
    if rr_ms.len() < MIN_RR_FOR_SPECTRUM {
        return FrequencyDomainMetrics::default();
    }

    let resampled = resample_zero_order_hold(rr_ms);
    if resampled.is_empty() {
        return FrequencyDomainMetrics::default();
    }

    let magnitudes = dft_magnitudes(&resampled);

    let n = resampled.len() as f64;
    let mut lf = 0.0;
    let mut hf = 0.0;
    for (k, &mag) in magnitudes.iter().enumerate() {
        let freq = k as f64 * RESAMPLE_RATE_HZ / n;
        let power = mag * mag;
        if freq >= LF_BAND_HZ.0 && freq <= LF_BAND_HZ.1 {
            lf += power;
        }
        if freq >= HF_BAND_HZ.0 && freq <= HF_BAND_HZ.1 {
            hf += power;
        }
    }

    let lf_hf_ratio = if hf > 0.0 { lf / hf } else { 0.0 };

    FrequencyDomainMetrics {
        lf,
        hf,
        lf_hf_ratio,
    }
}

/// Resample the RR series onto a uniform 4 Hz grid.
///
/// The series is laid out on the time axis by cumulative duration; the value
/// at each output slot `i / 4` s is the RR interval in progress at that
/// instant (zero-order hold).
fn resample_zero_order_hold(rr_ms: &[f64]) -> Vec<f64> {
    let duration_sec = rr_ms.iter().sum::<f64>() / 1000.0;
    let slots = (duration_sec * RESAMPLE_RATE_HZ).floor() as usize;

    let mut resampled = Vec::with_capacity(slots);
    let mut idx = 0;
    let mut interval_end_sec = rr_ms[0] / 1000.0;

    for i in 0..slots {
        let t = i as f64 / RESAMPLE_RATE_HZ;
        while idx + 1 < rr_ms.len() && interval_end_sec <= t {
            idx += 1;
            interval_end_sec += rr_ms[idx] / 1000.0;
        }
        resampled.push(rr_ms[idx]);
    }

    resampled
}

/// Unwindowed DFT magnitude spectrum, direct O(n^2) summation
fn dft_magnitudes(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let mut magnitudes = Vec::with_capacity(n);

    for k in 0..n {
        let mut re = 0.0;
        let mut im = 0.0;
        for (t, &x) in signal.iter().enumerate() {
            let angle = 2.0 * std::f64::consts::PI * k as f64 * t as f64 / n as f64;
            re += x * angle.cos();
            im -= x * angle.sin();
        }
        magnitudes.push((re * re + im * im).sqrt());
    }

    magnitudes
}
