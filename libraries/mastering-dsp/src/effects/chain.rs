//! Stage chain for processing audio chunks
//!
//! This module provides a trait-based architecture for chaining mastering
//! stages. Stages are processed in order, and all operate on interleaved f32
//! samples in [-1.0, 1.0] range.
use super::{Equalizer, MultibandCompressor, Saturator, StereoImager};
use crate::error::{DspError, Result};
use mastering_core::MasteringSettings;
use tracing::debug;

/// Trait for processing stages that can be chained together
///
/// Stages hold only configuration and designed coefficients. All signal
/// state lives inside a single `process` call, so one stage value can be
/// shared by workers processing different chunks.
pub trait AudioStage: Send + Sync {
    /// Process an interleaved block in place
    ///
    /// # Arguments
    /// * `samples` - Interleaved samples (L, R, L, R, ... for stereo)
    /// * `channels` - Channel count of the interleaving
    fn process(&self, samples: &mut [f32], channels: usize) -> Result<()>;

    /// Whether the stage would change anything; inactive stages are skipped
    fn is_active(&self) -> bool {
        true
    }

    /// Get stage name (for logging and error attribution)
    fn name(&self) -> &str;
}

/// Chain of stages processed in order
#[derive(Default)]
pub struct StageChain {
    stages: Vec<Box<dyn AudioStage>>,
}

impl StageChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Per-chunk mastering chain: saturation, EQ, width, then multiband
    /// compression when enabled
    pub fn for_chunks(settings: &MasteringSettings, sample_rate: u32) -> Result<Self> {
        let mut chain = Self::new();
        chain.add_stage(Box::new(Saturator::new(settings.saturation_percent)));
        chain.add_stage(Box::new(Equalizer::from_settings(settings, sample_rate)?));
        chain.add_stage(Box::new(StereoImager::new(settings.stereo_width)));
        if settings.multiband_enabled {
            chain.add_stage(Box::new(MultibandCompressor::from_settings(
                settings,
                sample_rate,
            )?));
        }
        debug!(sample_rate, stages = ?chain.active_stage_names(), "Built chunk chain");
        Ok(chain)
    }

    /// Add a stage to the end of the chain
    pub fn add_stage(&mut self, stage: Box<dyn AudioStage>) {
        self.stages.push(stage);
    }

    /// Process a block through every active stage
    ///
    /// Fails if the block is not made of whole frames, or if a stage
    /// leaves a non-finite sample behind.
    pub fn process(&self, samples: &mut [f32], channels: usize) -> Result<()> {
        if channels == 0 || samples.len() % channels != 0 {
            return Err(DspError::InvalidLayout {
                len: samples.len(),
                channels,
            });
        }

        for stage in self.stages.iter().filter(|s| s.is_active()) {
            stage.process(samples, channels)?;
            if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
                return Err(DspError::NonFinite {
                    stage: stage.name().to_string(),
                    index,
                });
            }
        }
        Ok(())
    }

    /// Names of the stages that will run
    pub fn active_stage_names(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.name())
            .collect()
    }

    /// Get number of stages in chain
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if chain is empty
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Clear all stages from the chain
    pub fn clear(&mut self) {
        self.stages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastering_core::BandSettings;

    // Mock stage for testing
    struct GainStage {
        gain: f32,
        active: bool,
    }

    impl AudioStage for GainStage {
        fn process(&self, samples: &mut [f32], _channels: usize) -> Result<()> {
            for sample in samples.iter_mut() {
                *sample *= self.gain;
            }
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn name(&self) -> &str {
            "Gain"
        }
    }

    #[test]
    fn create_empty_chain() {
        let chain = StageChain::new();
        assert_eq!(chain.len(), 0);
        assert!(chain.is_empty());
    }

    #[test]
    fn stages_run_in_order_and_inactive_are_skipped() {
        let mut chain = StageChain::new();
        chain.add_stage(Box::new(GainStage {
            gain: 0.5,
            active: true,
        }));
        chain.add_stage(Box::new(GainStage {
            gain: 100.0,
            active: false,
        }));
        chain.add_stage(Box::new(GainStage {
            gain: 0.5,
            active: true,
        }));

        let mut buffer = vec![1.0; 10];
        chain.process(&mut buffer, 2).unwrap();

        for sample in buffer {
            assert!((sample - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn non_finite_output_names_the_stage() {
        let mut chain = StageChain::new();
        chain.add_stage(Box::new(GainStage {
            gain: f32::INFINITY,
            active: true,
        }));

        let mut buffer = vec![0.0, 0.5];
        let err = chain.process(&mut buffer, 1).unwrap_err();
        assert_eq!(
            err,
            DspError::NonFinite {
                stage: "Gain".into(),
                index: 0
            }
        );
    }

    #[test]
    fn partial_frames_are_rejected() {
        let chain = StageChain::new();
        let mut buffer = vec![0.0; 3];
        assert!(matches!(
            chain.process(&mut buffer, 2),
            Err(DspError::InvalidLayout { len: 3, channels: 2 })
        ));
    }

    #[test]
    fn chunk_chain_order() {
        let settings = MasteringSettings {
            saturation_percent: 30.0,
            bass_boost_db: 2.0,
            stereo_width: 1.5,
            multiband_enabled: true,
            low_band: BandSettings::LOW,
            ..Default::default()
        };
        let chain = StageChain::for_chunks(&settings, 44_100).unwrap();
        assert_eq!(
            chain.active_stage_names(),
            vec!["Saturator", "Equalizer", "Stereo Imager", "Multiband Compressor"]
        );

        let neutral = StageChain::for_chunks(&MasteringSettings::default(), 44_100).unwrap();
        assert_eq!(neutral.len(), 3);
        assert!(neutral.active_stage_names().is_empty());
    }
}
