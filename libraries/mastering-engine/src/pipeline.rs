//! Chunked mastering pipeline
//!
//! Order of operations for one job:
//!
//! 1. validate engine config, settings and input buffer
//! 2. per chunk, in place: saturation, EQ, stereo width, multiband
//!    compression (when enabled)
//! 3. after every chunk is done: loudness normalization on the whole
//!    programme (when a target is set)
//! 4. soft limiting on the whole programme
//!
//! Chunks are written back into the input buffer, so reassembly is a no-op
//! and nothing accumulates per chunk. No filter memory crosses a chunk
//! boundary.

use crate::cancel::CancellationToken;
use crate::chunker::ChunkPlan;
use crate::config::EngineConfig;
use crate::progress::{ProgressEvent, ProgressObserver};
use mastering_core::{AudioBuffer, MasteringError, MasteringSettings, Result};
use mastering_dsp::effects::StageChain;
use mastering_loudness::{LoudnessAnalyzer, LoudnessNormalizer};
use std::fmt;
use tracing::{debug, info, warn};

/// Where a job currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Decoding,
    ChunkProcessing { index: usize, count: usize },
    Reassembling,
    GlobalNormalizing,
    Limiting,
    Encoding,
    Done,
    Failed,
    Cancelled,
}

impl PipelineState {
    /// Whether the job has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Decoding => write!(f, "Decoding"),
            Self::ChunkProcessing { index, count } => {
                write!(f, "ChunkProcessing({}/{})", index + 1, count)
            }
            Self::Reassembling => write!(f, "Reassembling"),
            Self::GlobalNormalizing => write!(f, "GlobalNormalizing"),
            Self::Limiting => write!(f, "Limiting"),
            Self::Encoding => write!(f, "Encoding"),
            Self::Done => write!(f, "Done"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Summary of a finished job
#[derive(Debug, Clone, PartialEq)]
pub struct MasteringReport {
    /// Chunks processed
    pub chunk_count: usize,
    /// Integrated loudness before normalization, when it was measured and
    /// defined
    pub measured_lufs: Option<f64>,
    /// Normalization gain in dB (0 when skipped)
    pub applied_gain_db: f64,
    /// Sample peak after limiting (linear)
    pub output_peak: f32,
    /// Programme duration in seconds
    pub duration_secs: f64,
}

/// Mastered audio and its report
#[derive(Debug, Clone, PartialEq)]
pub struct Mastered {
    pub buffer: AudioBuffer,
    pub report: MasteringReport,
}

/// Runs mastering jobs through the state machine
#[derive(Debug, Clone)]
pub struct MasteringPipeline {
    config: EngineConfig,
    cancel: CancellationToken,
    state: PipelineState,
}

impl Default for MasteringPipeline {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MasteringPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
            state: PipelineState::Idle,
        }
    }

    /// Use an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this pipeline's jobs
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Master `buffer` and finish the job (`Done`)
    pub fn run(
        &mut self,
        buffer: AudioBuffer,
        settings: &MasteringSettings,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Mastered> {
        let mastered = self.master(buffer, settings, observer)?;
        self.enter(PipelineState::Done, observer);
        Ok(mastered)
    }

    /// Master `buffer`, stopping after the limiter
    ///
    /// The pipeline is left in `Limiting` on success so a caller can go on
    /// to encode. On error it moves to `Failed` or `Cancelled`.
    pub fn master(
        &mut self,
        buffer: AudioBuffer,
        settings: &MasteringSettings,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Mastered> {
        match self.master_inner(buffer, settings, observer) {
            Ok(mastered) => Ok(mastered),
            Err(err) => Err(self.fail(err, observer)),
        }
    }

    /// Record a state transition
    pub(crate) fn enter(&mut self, state: PipelineState, observer: &mut dyn ProgressObserver) {
        debug!(from = %self.state, to = %state, "Pipeline state change");
        self.state = state;
        observer.on_state(&state);
    }

    /// Move to the terminal state matching `err` and hand it back
    pub(crate) fn fail(
        &mut self,
        err: MasteringError,
        observer: &mut dyn ProgressObserver,
    ) -> MasteringError {
        let state = if matches!(err, MasteringError::Cancelled { .. }) {
            PipelineState::Cancelled
        } else {
            PipelineState::Failed
        };
        warn!(kind = %err.kind(), error = %err, "Mastering job stopped");
        self.enter(state, observer);
        err
    }

    fn master_inner(
        &mut self,
        mut buffer: AudioBuffer,
        settings: &MasteringSettings,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Mastered> {
        self.config.validate()?;
        settings.validate()?;
        buffer.validate()?;

        let sample_rate = buffer.sample_rate();
        let channels = buffer.channels();
        if settings.target_lufs.is_some() {
            LoudnessAnalyzer::check_format(sample_rate, channels as u32)?;
        }
        let plan = ChunkPlan::for_duration(buffer.frames(), sample_rate, self.config.chunk_duration_ms);
        let chain = StageChain::for_chunks(settings, sample_rate)?;

        info!(
            sample_rate,
            channels,
            frames = buffer.frames(),
            chunks = plan.count(),
            stages = ?chain.active_stage_names(),
            "Starting mastering job"
        );

        self.process_chunks(&mut buffer.samples, channels, &plan, &chain, observer)?;

        // Chunks were processed in place
        self.enter(PipelineState::Reassembling, observer);

        let mut measured_lufs = None;
        let mut applied_gain_db = 0.0;
        if let Some(target) = settings.target_lufs {
            self.enter(PipelineState::GlobalNormalizing, observer);
            let outcome = LoudnessNormalizer::new(target).normalize(&mut buffer)?;
            measured_lufs = outcome.measured_lufs;
            applied_gain_db = outcome.applied_gain_db;
        }

        self.enter(PipelineState::Limiting, observer);
        self.config.limiter().apply(&mut buffer.samples);

        let report = MasteringReport {
            chunk_count: plan.count(),
            measured_lufs,
            applied_gain_db,
            output_peak: buffer.peak(),
            duration_secs: buffer.duration_secs(),
        };
        info!(
            chunks = report.chunk_count,
            gain_db = report.applied_gain_db,
            peak = report.output_peak,
            "Mastering finished"
        );

        Ok(Mastered { buffer, report })
    }

    fn process_chunks(
        &mut self,
        samples: &mut [f32],
        channels: usize,
        plan: &ChunkPlan,
        chain: &StageChain,
        observer: &mut dyn ProgressObserver,
    ) -> Result<()> {
        if self.config.parallel {
            #[cfg(feature = "parallel")]
            return self.process_chunks_parallel(samples, channels, plan, chain, observer);

            #[cfg(not(feature = "parallel"))]
            warn!("Parallel chunk processing requested without the `parallel` feature");
        }

        let count = plan.count();

        for (index, frames) in plan.ranges().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(MasteringError::Cancelled {
                    completed_chunks: index,
                    chunk_count: count,
                });
            }

            self.enter(PipelineState::ChunkProcessing { index, count }, observer);
            let chunk = &mut samples[frames.start * channels..frames.end * channels];
            chain.process(chunk, channels)?;
            debug!(index, count, frames = frames.len(), "Chunk processed");
            observer.on_progress(ProgressEvent::chunk_done(index, count));
        }

        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn process_chunks_parallel(
        &mut self,
        samples: &mut [f32],
        channels: usize,
        plan: &ChunkPlan,
        chain: &StageChain,
        observer: &mut dyn ProgressObserver,
    ) -> Result<()> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Mutex;

        let count = plan.count();
        let chunk_len = plan.chunk_frames().saturating_mul(channels);
        self.enter(PipelineState::ChunkProcessing { index: 0, count }, observer);

        let completed = AtomicUsize::new(0);
        let cancel = &self.cancel;
        let observer = Mutex::new(observer);

        // Every chunk finishes (or fails) before this returns
        samples
            .par_chunks_mut(chunk_len)
            .enumerate()
            .try_for_each(|(index, chunk)| -> Result<()> {
                if cancel.is_cancelled() {
                    return Err(MasteringError::Cancelled {
                        completed_chunks: completed.load(Ordering::SeqCst),
                        chunk_count: count,
                    });
                }

                chain.process(chunk, channels)?;
                completed.fetch_add(1, Ordering::SeqCst);
                debug!(index, count, "Chunk processed");

                if let Ok(mut observer) = observer.lock() {
                    observer.on_progress(ProgressEvent::chunk_done(index, count));
                }
                Ok(())
            })
    }
}

/// Master a decoded buffer with the default engine configuration
///
/// # Example
///
/// ```rust
/// use mastering_core::{AudioBuffer, AudioFormat, MasteringSettings};
/// use mastering_engine::{process, ProgressEvent};
///
/// let buffer = AudioBuffer::new(vec![0.1; 44_100 * 2], AudioFormat::cd_quality());
/// let settings = MasteringSettings::default();
///
/// let output = process(buffer, &settings, |event: ProgressEvent| {
///     println!("{}", event.message);
/// })
/// .unwrap();
/// assert_eq!(output.frames(), 44_100);
/// ```
pub fn process<O: ProgressObserver>(
    buffer: AudioBuffer,
    settings: &MasteringSettings,
    mut on_progress: O,
) -> Result<AudioBuffer> {
    MasteringPipeline::default()
        .run(buffer, settings, &mut on_progress)
        .map(|mastered| mastered.buffer)
}
