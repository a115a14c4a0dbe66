//! Soul Mastering Engine
//!
//! Offline mastering of a decoded programme:
//!
//! ```text
//! AudioBuffer ─▶ chunks ─▶ Saturator ─▶ Equalizer ─▶ Stereo Imager ─▶ (Multiband)
//!                                                                        │
//!      encode ◀── Soft Limiter ◀── Loudness Normalizer (optional) ◀── reassembled
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use mastering_engine::{EngineConfig, JobRequest, MasteringJob, WavCodec};
//!
//! # fn main() -> mastering_core::Result<()> {
//! let request = JobRequest::from_json(
//!     r#"{"input_uri": "gs://uploads/song.wav", "settings": {"preset": "pop", "lufs": -14}}"#,
//! )?;
//! let input = std::fs::read("song.wav")
//!     .map_err(|e| mastering_core::MasteringError::decode(e.to_string()))?;
//!
//! let mut job = MasteringJob::new(WavCodec::new(), WavCodec::new(), EngineConfig::load()?);
//! let (tx, rx) = std::sync::mpsc::channel();
//! let output = job.run_request(&request, &input, &mut tx.clone())?;
//! drop(tx);
//!
//! for event in rx {
//!     println!("{}", event.message);
//! }
//! println!("{} -> {} bytes", request.output_object_name(), output.bytes.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod cancel;
mod chunker;
mod config;
mod job;
mod pipeline;
mod progress;
mod wav;

pub use cancel::CancellationToken;
pub use chunker::{ChunkPlan, DEFAULT_CHUNK_DURATION_MS};
pub use config::{EngineConfig, CONFIG_FILE, ENV_PREFIX};
pub use job::{JobOutput, JobRequest, MasteringJob, COMPLETION_SUFFIX, OUTPUT_PREFIX};
pub use pipeline::{process, Mastered, MasteringPipeline, MasteringReport, PipelineState};
pub use progress::{NoProgress, ProgressEvent, ProgressObserver};
pub use wav::WavCodec;
