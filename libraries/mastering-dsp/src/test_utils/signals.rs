//! Test signal generation
//!
//! Noise generators take an explicit seed so test runs are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Generate a sine wave
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Peak amplitude (0.0 to 1.0)
/// * `channels` - Number of interleaved channels (same signal in each)
pub fn generate_sine_wave(
    frequency: f32,
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
    channels: usize,
) -> Vec<f32> {
    let num_frames = (sample_rate as f32 * duration) as usize;
    let mut samples = Vec::with_capacity(num_frames * channels);

    for i in 0..num_frames {
        let t = i as f64 / f64::from(sample_rate);
        let sample = ((2.0 * std::f64::consts::PI * f64::from(frequency) * t).sin()
            * f64::from(amplitude)) as f32;
        samples.extend(std::iter::repeat(sample).take(channels));
    }

    samples
}

/// Convert dBFS to a linear peak amplitude
pub fn dbfs_to_amplitude(dbfs: f32) -> f32 {
    10.0_f32.powf(dbfs / 20.0)
}

/// Generate pink noise (1/f noise)
///
/// Power decreases by 3dB per octave. Uses Paul Kellett's refined method.
/// Each channel gets its own independent noise stream.
pub fn generate_pink_noise(
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
    channels: usize,
    seed: u64,
) -> Vec<f32> {
    let num_frames = (sample_rate as f32 * duration) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = vec![[0.0_f32; 7]; channels];
    let mut samples = Vec::with_capacity(num_frames * channels);

    for _ in 0..num_frames {
        for b in state.iter_mut() {
            let white: f32 = rng.gen_range(-1.0..1.0);

            b[0] = 0.99886 * b[0] + white * 0.0555179;
            b[1] = 0.99332 * b[1] + white * 0.0750759;
            b[2] = 0.96900 * b[2] + white * 0.1538520;
            b[3] = 0.86650 * b[3] + white * 0.3104856;
            b[4] = 0.55000 * b[4] + white * 0.5329522;
            b[5] = -0.7616 * b[5] - white * 0.0168980;

            let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
            b[6] = white * 0.115926;

            samples.push(pink * 0.11 * amplitude); // Scale down
        }
    }

    samples
}

/// Generate white noise with a fixed seed
pub fn generate_white_noise(
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
    channels: usize,
    seed: u64,
) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration) as usize * channels;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_samples)
        .map(|_| rng.gen_range(-1.0_f32..1.0) * amplitude)
        .collect()
}

/// Generate digital silence
pub fn generate_silence(sample_rate: u32, duration: f32, channels: usize) -> Vec<f32> {
    vec![0.0; (sample_rate as f32 * duration) as usize * channels]
}

/// Generate a tone burst: `burst` seconds of sine followed by `gap` seconds
/// of silence, repeated to fill `duration`
///
/// Useful for exercising compressor attack and release.
pub fn generate_tone_bursts(
    frequency: f32,
    sample_rate: u32,
    duration: f32,
    burst: f32,
    gap: f32,
    amplitude: f32,
) -> Vec<f32> {
    let period = burst + gap;
    let num_frames = (sample_rate as f32 * duration) as usize;
    (0..num_frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            if t % period < burst {
                (2.0 * PI * frequency * t).sin() * amplitude
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_wave_generation() {
        let samples = generate_sine_wave(1000.0, 44100, 0.1, 0.5, 2);
        assert_eq!(samples.len(), 4410 * 2);
        let peak = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.01);
    }

    #[test]
    fn pink_noise_is_seeded() {
        let a = generate_pink_noise(44100, 0.1, 0.5, 2, 7);
        let b = generate_pink_noise(44100, 0.1, 0.5, 2, 7);
        let c = generate_pink_noise(44100, 0.1, 0.5, 2, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn pink_noise_channels_differ() {
        let noise = generate_pink_noise(44100, 0.1, 0.5, 2, 1);
        let left: Vec<f32> = noise.iter().step_by(2).copied().collect();
        let right: Vec<f32> = noise.iter().skip(1).step_by(2).copied().collect();
        assert_ne!(left, right);
    }

    #[test]
    fn bursts_have_gaps() {
        let samples = generate_tone_bursts(1000.0, 44100, 1.0, 0.1, 0.1, 0.8);
        assert_eq!(samples.len(), 44100);
        // Middle of the first gap
        assert!(samples[6615..8000].iter().all(|&s| s == 0.0));
    }
}
