//! WAV decoder/encoder collaborator (hound)

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use mastering_core::{
    AudioBuffer, AudioDecoder, AudioEncoder, AudioFormat, MasteringError, Result, SampleRate,
};
use std::io::Cursor;
use tracing::debug;

/// Reference WAV codec
///
/// Decodes 8/16/24/32-bit integer PCM and 32-bit float. Encoding follows
/// the buffer's format: float sources are written as float, integer PCM is
/// clipped and re-quantized at `bits_per_sample`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavCodec;

impl WavCodec {
    pub fn new() -> Self {
        Self
    }
}

fn decode_error(err: hound::Error) -> MasteringError {
    MasteringError::decode(format!("Invalid WAV data: {}", err))
}

fn encode_error(err: hound::Error) -> MasteringError {
    MasteringError::encode(format!("Failed to write WAV: {}", err))
}

impl AudioDecoder for WavCodec {
    fn decode(&mut self, bytes: &[u8]) -> Result<AudioBuffer> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(decode_error)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(decode_error)?,
            (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
                let scale = 2.0_f64.powi(i32::from(bits) - 1);
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| (f64::from(s) / scale) as f32))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(decode_error)?
            }
            (format, bits) => {
                return Err(MasteringError::decode(format!(
                    "Unsupported WAV sample format: {:?} {}-bit",
                    format, bits
                )))
            }
        };

        let sample_rate = SampleRate::new(spec.sample_rate);
        let format = if spec.sample_format == SampleFormat::Float {
            AudioFormat::float(sample_rate, spec.channels)
        } else {
            AudioFormat::new(sample_rate, spec.channels, spec.bits_per_sample)
        };
        debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            float = format.is_float,
            samples = samples.len(),
            "Decoded WAV"
        );

        Ok(AudioBuffer::new(samples, format))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_ascii_lowercase().as_str(), "wav" | "wave")
    }
}

impl AudioEncoder for WavCodec {
    fn encode(&mut self, buffer: &AudioBuffer) -> Result<Vec<u8>> {
        let bits = buffer.format.bits_per_sample;
        let spec = if buffer.format.is_float {
            WavSpec {
                channels: buffer.format.channels,
                sample_rate: buffer.sample_rate(),
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            }
        } else {
            if !matches!(bits, 8 | 16 | 24 | 32) {
                return Err(MasteringError::encode(format!(
                    "Cannot write {}-bit integer WAV",
                    bits
                )));
            }
            WavSpec {
                channels: buffer.format.channels,
                sample_rate: buffer.sample_rate(),
                bits_per_sample: bits,
                sample_format: SampleFormat::Int,
            }
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(encode_error)?;
            if buffer.format.is_float {
                for &sample in &buffer.samples {
                    writer.write_sample(sample).map_err(encode_error)?;
                }
            } else {
                for sample in buffer.quantize() {
                    writer.write_sample(sample).map_err(encode_error)?;
                }
            }
            writer.finalize().map_err(encode_error)?;
        }

        Ok(cursor.into_inner())
    }

    fn extension(&self) -> &str {
        "wav"
    }
}
