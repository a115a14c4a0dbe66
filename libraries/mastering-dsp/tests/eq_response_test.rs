//! Spectral checks of the mastering EQ
//!
//! Measures the gain the EQ applies to individual tones with an FFT.

use mastering_core::MasteringSettings;
use mastering_dsp::effects::{apply_eq, EqBand, Equalizer};
use mastering_dsp::test_utils::{
    calculate_rms, extract_channel, gain_at_frequency, generate_pink_noise, generate_sine_wave,
};

const SR: u32 = 48_000;

/// Run `settings` over a mono tone and return the gain in dB at that tone
fn eq_gain(settings: &MasteringSettings, frequency: f32) -> f32 {
    let input = generate_sine_wave(frequency, SR, 1.0, 0.25, 1);
    let mut output = input.clone();
    apply_eq(&mut output, 1, SR, settings).unwrap();

    // Skip the filter start-up transient
    let start = SR as usize / 2;
    gain_at_frequency(&input[start..], &output[start..], frequency, SR)
}

#[test]
fn bass_boost_lifts_lows_only() {
    let settings = MasteringSettings {
        bass_boost_db: 6.0,
        ..Default::default()
    };
    assert!(eq_gain(&settings, 50.0) > 5.0);
    assert!(eq_gain(&settings, 5000.0).abs() < 0.1);
}

#[test]
fn treble_boost_lifts_highs_only() {
    let settings = MasteringSettings {
        treble_boost_db: 6.0,
        ..Default::default()
    };
    assert!(eq_gain(&settings, 20_000.0) > 5.0);
    assert!(eq_gain(&settings, 200.0).abs() < 0.1);
}

#[test]
fn treble_cut_tilts_down_everything_below_the_corner() {
    // x*g + f*(1-g): the high-passed part is kept, the rest scaled by g
    let settings = MasteringSettings {
        treble_boost_db: -6.0,
        ..Default::default()
    };
    assert!(eq_gain(&settings, 20_000.0).abs() < 0.5);
    assert!((eq_gain(&settings, 200.0) + 6.0).abs() < 0.1);
}

#[test]
fn default_q_bells_barely_touch_the_spectrum() {
    // Band edges coincide at Q = 1, leaving a hair-thin band
    let settings = MasteringSettings {
        mid_cut_db: 6.0,
        presence_boost_db: 6.0,
        ..Default::default()
    };
    for frequency in [300.0, 2500.0, 10_000.0] {
        assert!(eq_gain(&settings, frequency).abs() < 0.1, "{frequency} Hz");
    }
}

#[test]
fn wide_bell_shapes_the_midrange() {
    let eq = Equalizer::new(&[EqBand::bell_with_q(1000.0, -6.0, 4.0)], SR).unwrap();
    let input = generate_sine_wave(1000.0, SR, 1.0, 0.25, 1);
    let mut output = input.clone();
    eq.apply(&mut output, 1);

    let start = SR as usize / 2;
    let gain = gain_at_frequency(&input[start..], &output[start..], 1000.0, SR);
    assert!((gain + 6.0).abs() < 0.3, "gain was {gain} dB");
}

#[test]
fn stereo_noise_stays_finite_and_balanced() {
    let settings = MasteringSettings {
        bass_boost_db: 4.0,
        mid_cut_db: 3.0,
        presence_boost_db: 1.0,
        treble_boost_db: 3.0,
        ..Default::default()
    };
    let input = generate_pink_noise(SR, 2.0, 0.5, 2, 42);
    let mut output = input.clone();
    apply_eq(&mut output, 2, SR, &settings).unwrap();

    assert!(output.iter().all(|s| s.is_finite()));
    let left = calculate_rms(&extract_channel(&output, 2, 0));
    let right = calculate_rms(&extract_channel(&output, 2, 1));
    assert!((left / right - 1.0).abs() < 0.2);
}
