//! Analysis tools for verifying mastering stages

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Calculate RMS (Root Mean Square) level
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Calculate peak level
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Convert linear amplitude to dB
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -100.0 // Silence
    } else {
        20.0 * linear.log10()
    }
}

/// Extract one channel from interleaved samples
pub fn extract_channel(samples: &[f32], channels: usize, channel: usize) -> Vec<f32> {
    samples
        .iter()
        .skip(channel)
        .step_by(channels.max(1))
        .copied()
        .collect()
}

/// Magnitude spectrum of a mono signal (Hann window)
///
/// Returns `(frequency_hz, magnitude)` for bins up to Nyquist. Magnitudes
/// are normalized so a full-scale sine on a bin centre reads ~1.0.
pub fn magnitude_spectrum(samples: &[f32], sample_rate: u32) -> Vec<(f32, f32)> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos();
            Complex::new(s * w, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    // Hann coherent gain is 0.5
    let scale = 4.0 / n as f32;
    let bin_hz = sample_rate as f32 / n as f32;
    buffer[..=n / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f32 * bin_hz, c.norm() * scale))
        .collect()
}

/// Largest spectral magnitude within `tolerance_hz` of `frequency`
pub fn magnitude_near(spectrum: &[(f32, f32)], frequency: f32, tolerance_hz: f32) -> f32 {
    spectrum
        .iter()
        .filter(|(f, _)| (f - frequency).abs() <= tolerance_hz)
        .map(|(_, m)| *m)
        .fold(0.0, f32::max)
}

/// Gain in dB of `output` over `input` at one frequency
pub fn gain_at_frequency(input: &[f32], output: &[f32], frequency: f32, sample_rate: u32) -> f32 {
    let tolerance = 2.0 * sample_rate as f32 / input.len().max(1) as f32;
    let before = magnitude_near(&magnitude_spectrum(input, sample_rate), frequency, tolerance);
    let after = magnitude_near(&magnitude_spectrum(output, sample_rate), frequency, tolerance);
    linear_to_db(after) - linear_to_db(before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::signals::generate_sine_wave;

    #[test]
    fn rms_of_sine() {
        let sine = generate_sine_wave(1000.0, 48000, 1.0, 1.0, 1);
        assert!((calculate_rms(&sine) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn spectrum_finds_tone() {
        let sine = generate_sine_wave(1000.0, 48000, 0.5, 0.5, 1);
        let spectrum = magnitude_spectrum(&sine, 48000);
        let at_tone = magnitude_near(&spectrum, 1000.0, 4.0);
        let elsewhere = magnitude_near(&spectrum, 5000.0, 4.0);
        assert!((at_tone - 0.5).abs() < 0.02);
        assert!(elsewhere < 1e-3);
    }
}
