//! EBU R128 loudness analysis
//!
//! Integrated loudness is measured on a mono downmix (the per-frame average
//! of all channels) with the `ebur128` meter: K-weighting, 400 ms blocks,
//! absolute gate at -70 LUFS and relative gate 10 LU under the ungated
//! level.

use crate::error::{LoudnessError, Result};
use ebur128::{EbuR128, Mode};
use mastering_core::AudioBuffer;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::debug;

/// Sample rates the meter accepts
pub const SUPPORTED_SAMPLE_RATES: RangeInclusive<u32> = 8000..=384_000;

/// Largest interleaved channel count the analyzer downmixes
pub const MAX_CHANNELS: u32 = 8;

/// Loudness characteristics of a programme
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessInfo {
    /// Integrated loudness in LUFS
    ///
    /// `None` when the meter has nothing to gate: digital silence, or less
    /// than one full 400 ms block of audio.
    pub integrated_lufs: Option<f64>,

    /// Largest absolute sample value across all channels, in dBFS
    pub sample_peak_dbfs: f64,

    /// Duration of the analyzed audio in seconds
    pub duration_seconds: f64,

    /// Sample rate of the analyzed audio
    pub sample_rate: u32,

    /// Number of channels in the analyzed (pre-downmix) audio
    pub channels: u32,
}

impl LoudnessInfo {
    /// Whether the integrated loudness is defined
    pub fn is_measurable(&self) -> bool {
        self.integrated_lufs.is_some()
    }
}

impl fmt::Display for LoudnessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.integrated_lufs {
            Some(lufs) => write!(f, "Loudness: {:.1} LUFS", lufs)?,
            None => write!(f, "Loudness: undefined")?,
        }
        write!(
            f,
            ", Sample Peak: {:.1} dBFS, Duration: {:.2}s",
            self.sample_peak_dbfs, self.duration_seconds
        )
    }
}

/// EBU R128 loudness analyzer
///
/// # Example
///
/// ```ignore
/// use mastering_loudness::LoudnessAnalyzer;
///
/// let mut analyzer = LoudnessAnalyzer::new(44100, 2)?;
///
/// // Feed audio samples (interleaved f32), in as many calls as needed
/// analyzer.add_frames(&audio_samples)?;
///
/// let info = analyzer.finalize()?;
/// println!("{info}");
/// ```
pub struct LoudnessAnalyzer {
    /// Mono EBU R128 meter fed with the downmix
    ebur128: EbuR128,
    sample_rate: u32,
    channels: u32,
    /// Scratch buffer for the downmix of the current call
    downmix: Vec<f32>,
    frames_processed: usize,
    peak: f32,
}

impl LoudnessAnalyzer {
    /// Create a new loudness analyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz (8000-384000)
    /// * `channels` - Number of interleaved input channels (1-8)
    ///
    /// # Errors
    /// Returns error if sample rate or channel count is invalid
    pub fn new(sample_rate: u32, channels: u32) -> Result<Self> {
        Self::check_format(sample_rate, channels)?;

        let ebur128 = EbuR128::new(1, sample_rate, Mode::I)?;

        Ok(Self {
            ebur128,
            sample_rate,
            channels,
            downmix: Vec::new(),
            frames_processed: 0,
            peak: 0.0,
        })
    }

    /// Check that a programme format can be metered, without building a meter
    pub fn check_format(sample_rate: u32, channels: u32) -> Result<()> {
        if !SUPPORTED_SAMPLE_RATES.contains(&sample_rate) {
            return Err(LoudnessError::InvalidSampleRate(sample_rate));
        }
        if !(1..=MAX_CHANNELS).contains(&channels) {
            return Err(LoudnessError::InvalidChannelCount(channels));
        }
        Ok(())
    }

    /// Add interleaved audio frames for analysis
    ///
    /// Length must be divisible by the channel count.
    pub fn add_frames(&mut self, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let channels = self.channels as usize;
        if samples.len() % channels != 0 {
            return Err(LoudnessError::PartialFrame {
                len: samples.len(),
                channels: self.channels,
            });
        }

        self.peak = samples.iter().fold(self.peak, |peak, s| peak.max(s.abs()));

        if channels == 1 {
            self.ebur128.add_frames_f32(samples)?;
        } else {
            self.downmix.clear();
            self.downmix.extend(
                samples
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
            self.ebur128.add_frames_f32(&self.downmix)?;
        }
        self.frames_processed += samples.len() / channels;

        Ok(())
    }

    /// Number of frames analyzed so far
    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }

    /// Finish analysis
    pub fn finalize(self) -> Result<LoudnessInfo> {
        let global = self.ebur128.loudness_global()?;
        // ebur128 reports -inf when no block survives the gates
        let integrated_lufs = global.is_finite().then_some(global);

        let sample_peak_dbfs = if self.peak > 0.0 {
            20.0 * f64::from(self.peak).log10()
        } else {
            f64::NEG_INFINITY
        };

        let info = LoudnessInfo {
            integrated_lufs,
            sample_peak_dbfs,
            duration_seconds: self.frames_processed as f64 / f64::from(self.sample_rate),
            sample_rate: self.sample_rate,
            channels: self.channels,
        };
        debug!(%info, "Loudness analysis finished");
        Ok(info)
    }
}

/// Measure the integrated loudness of a whole buffer
///
/// Returns `Ok(None)` for silence and for programmes shorter than one
/// gating block.
pub fn measure_integrated(buffer: &AudioBuffer) -> Result<Option<f64>> {
    let channels = u32::try_from(buffer.channels()).unwrap_or(u32::MAX);
    let mut analyzer = LoudnessAnalyzer::new(buffer.sample_rate(), channels)?;
    analyzer.add_frames(&buffer.samples)?;
    Ok(analyzer.finalize()?.integrated_lufs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastering_core::{AudioFormat, SampleRate};
    use std::f32::consts::PI;

    fn sine(amplitude: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * 1000.0 * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_analyzer_creation() {
        assert!(LoudnessAnalyzer::new(44100, 2).is_ok());
        assert!(LoudnessAnalyzer::new(48000, 1).is_ok());

        assert_eq!(
            LoudnessAnalyzer::new(100, 2).err(),
            Some(LoudnessError::InvalidSampleRate(100))
        );
        assert_eq!(
            LoudnessAnalyzer::new(44100, 0).err(),
            Some(LoudnessError::InvalidChannelCount(0))
        );
    }

    #[test]
    fn format_check_matches_constructor() {
        assert!(LoudnessAnalyzer::check_format(8000, 1).is_ok());
        assert!(LoudnessAnalyzer::check_format(384_000, 8).is_ok());
        assert_eq!(
            LoudnessAnalyzer::check_format(6000, 1),
            Err(LoudnessError::InvalidSampleRate(6000))
        );
        assert_eq!(
            LoudnessAnalyzer::check_format(44_100, 9),
            Err(LoudnessError::InvalidChannelCount(9))
        );
    }

    #[test]
    fn test_sine_reference_level() {
        // A 1 kHz sine at amplitude 0.5 (-6 dBFS) reads about -9 LUFS
        let mut analyzer = LoudnessAnalyzer::new(48000, 1).unwrap();
        analyzer.add_frames(&sine(0.5, 48000, 3.0)).unwrap();
        let info = analyzer.finalize().unwrap();

        let lufs = info.integrated_lufs.unwrap();
        assert!((lufs + 9.03).abs() < 0.3, "measured {lufs}");
        assert!((info.sample_peak_dbfs + 6.02).abs() < 0.01);
        assert!((info.duration_seconds - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stereo_is_measured_as_downmix() {
        let mono = sine(0.25, 44100, 2.0);
        let stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, s]).collect();

        let format = AudioFormat::new(SampleRate::new(44100), 1, 16);
        let mono_lufs = measure_integrated(&AudioBuffer::new(mono, format)).unwrap();
        let format = AudioFormat::new(SampleRate::new(44100), 2, 16);
        let stereo_lufs = measure_integrated(&AudioBuffer::new(stereo, format)).unwrap();

        assert!((mono_lufs.unwrap() - stereo_lufs.unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_incremental_matches_single_call() {
        let signal = sine(0.3, 44100, 2.0);

        let mut whole = LoudnessAnalyzer::new(44100, 1).unwrap();
        whole.add_frames(&signal).unwrap();

        let mut pieces = LoudnessAnalyzer::new(44100, 1).unwrap();
        for chunk in signal.chunks(1234) {
            pieces.add_frames(chunk).unwrap();
        }
        assert_eq!(pieces.frames_processed(), signal.len());

        let a = whole.finalize().unwrap().integrated_lufs.unwrap();
        let b = pieces.finalize().unwrap().integrated_lufs.unwrap();
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_silence_and_short_input_are_undefined() {
        let mut analyzer = LoudnessAnalyzer::new(44100, 2).unwrap();
        analyzer.add_frames(&vec![0.0; 44100 * 2]).unwrap();
        let info = analyzer.finalize().unwrap();
        assert_eq!(info.integrated_lufs, None);
        assert_eq!(info.sample_peak_dbfs, f64::NEG_INFINITY);

        let mut analyzer = LoudnessAnalyzer::new(44100, 1).unwrap();
        analyzer.add_frames(&sine(0.5, 44100, 0.3)).unwrap();
        assert!(!analyzer.finalize().unwrap().is_measurable());

        let analyzer = LoudnessAnalyzer::new(44100, 1).unwrap();
        assert_eq!(analyzer.finalize().unwrap().integrated_lufs, None);
    }

    #[test]
    fn test_partial_frame_rejected() {
        let mut analyzer = LoudnessAnalyzer::new(44100, 2).unwrap();
        assert_eq!(
            analyzer.add_frames(&[0.1, 0.2, 0.3]),
            Err(LoudnessError::PartialFrame {
                len: 3,
                channels: 2
            })
        );
    }
}
