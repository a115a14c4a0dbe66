//! Job wrapper: decode, master, encode
//!
//! Transport (queues, object storage) stays outside the engine. A
//! [`JobRequest`] carries what the queue delivers; [`MasteringJob`] turns
//! input bytes into output bytes with injected codec collaborators.

use crate::config::EngineConfig;
use crate::pipeline::{MasteringPipeline, MasteringReport, PipelineState};
use crate::progress::ProgressObserver;
use crate::CancellationToken;
use mastering_core::{
    AudioDecoder, AudioEncoder, MasteringError, MasteringSettings, Result, SettingsMessage,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Prefix for mastered output objects
pub const OUTPUT_PREFIX: &str = "processed/mastered_";

/// Suffix of the empty marker object written after the output
pub const COMPLETION_SUFFIX: &str = ".complete";

/// One queued mastering request
///
/// ```json
/// {"gcs_uri": "gs://bucket/uploads/song.wav", "settings": {"preset": "pop", "lufs": -14}}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobRequest {
    /// Location of the source audio (`scheme://bucket/object`)
    #[serde(alias = "gcs_uri")]
    pub input_uri: String,

    /// Flat settings message
    #[serde(default)]
    pub settings: SettingsMessage,
}

impl JobRequest {
    /// Parse a queue message
    pub fn from_json(json: &str) -> Result<Self> {
        let request: Self = serde_json::from_str(json)?;
        if request.input_uri.trim().is_empty() {
            return Err(MasteringError::validation("Job request has an empty input URI"));
        }
        Ok(request)
    }

    /// Resolve the settings message (preset first, explicit keys on top)
    pub fn mastering_settings(&self) -> Result<MasteringSettings> {
        self.settings.clone().into_settings()
    }

    /// Bucket and object name of the input
    pub fn location(&self) -> Result<(&str, &str)> {
        let path = self
            .input_uri
            .split_once("://")
            .map_or(self.input_uri.as_str(), |(_, rest)| rest);
        match path.split_once('/') {
            Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => {
                Ok((bucket, object))
            }
            _ => Err(MasteringError::validation(format!(
                "Input URI '{}' has no bucket/object path",
                self.input_uri
            ))),
        }
    }

    /// File name of the input object
    pub fn basename(&self) -> &str {
        self.input_uri
            .rsplit('/')
            .next()
            .unwrap_or(self.input_uri.as_str())
    }

    /// `processed/mastered_<basename>`
    pub fn output_object_name(&self) -> String {
        format!("{}{}", OUTPUT_PREFIX, self.basename())
    }

    /// `<output object>.complete`
    pub fn completion_marker_name(&self) -> String {
        format!("{}{}", self.output_object_name(), COMPLETION_SUFFIX)
    }
}

/// Encoded output of a finished job
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutput {
    pub bytes: Vec<u8>,
    pub report: MasteringReport,
}

/// Drives one job through decode, mastering and encode
pub struct MasteringJob<D, E> {
    decoder: D,
    encoder: E,
    pipeline: MasteringPipeline,
}

impl<D: AudioDecoder, E: AudioEncoder> MasteringJob<D, E> {
    pub fn new(decoder: D, encoder: E, config: EngineConfig) -> Self {
        Self {
            decoder,
            encoder,
            pipeline: MasteringPipeline::new(config),
        }
    }

    /// Use an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.pipeline = self.pipeline.with_cancellation(token);
        self
    }

    pub fn state(&self) -> PipelineState {
        self.pipeline.state()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.pipeline.cancellation_token()
    }

    /// Run the job on encoded input bytes
    pub fn run(
        &mut self,
        input: &[u8],
        settings: &MasteringSettings,
        observer: &mut dyn ProgressObserver,
    ) -> Result<JobOutput> {
        self.pipeline.enter(PipelineState::Decoding, observer);
        let buffer = match self.decoder.decode(input) {
            Ok(buffer) => buffer,
            Err(err) => return Err(self.pipeline.fail(err, observer)),
        };

        let mastered = self.pipeline.master(buffer, settings, observer)?;

        self.pipeline.enter(PipelineState::Encoding, observer);
        let bytes = match self.encoder.encode(&mastered.buffer) {
            Ok(bytes) => bytes,
            Err(err) => return Err(self.pipeline.fail(err, observer)),
        };

        self.pipeline.enter(PipelineState::Done, observer);
        info!(
            bytes = bytes.len(),
            extension = self.encoder.extension(),
            "Job complete"
        );

        Ok(JobOutput {
            bytes,
            report: mastered.report,
        })
    }

    /// Run a queued request whose input bytes were already fetched
    pub fn run_request(
        &mut self,
        request: &JobRequest,
        input: &[u8],
        observer: &mut dyn ProgressObserver,
    ) -> Result<JobOutput> {
        let settings = match request.mastering_settings() {
            Ok(settings) => settings,
            Err(err) => return Err(self.pipeline.fail(err, observer)),
        };
        info!(input = %request.input_uri, output = %request.output_object_name(), "Starting job");
        self.run(input, &settings, observer)
    }
}
