//! Collaborator traits for the mastering engine
//!
//! The engine never touches files or object storage itself. Decoding and
//! encoding go through these traits so callers can plug in whatever
//! container support they need.
use crate::error::Result;
use crate::types::AudioBuffer;

/// Audio decoder trait
///
/// Implementers turn an encoded byte stream into an `AudioBuffer` with
/// samples normalized to [-1.0, 1.0].
pub trait AudioDecoder: Send {
    /// Decode a complete encoded file held in memory
    ///
    /// # Errors
    /// Returns a decode error if the bytes are corrupt, truncated or
    /// in an unsupported format
    fn decode(&mut self, bytes: &[u8]) -> Result<AudioBuffer>;

    /// Check if the decoder recognizes the given file extension
    fn supports_extension(&self, extension: &str) -> bool;
}

/// Audio encoder trait
///
/// Implementers write an `AudioBuffer` back out, re-quantized to the bit
/// depth recorded in its format.
pub trait AudioEncoder: Send {
    /// Encode the buffer to bytes
    ///
    /// # Errors
    /// Returns an encode error if the format cannot be represented
    fn encode(&mut self, buffer: &AudioBuffer) -> Result<Vec<u8>>;

    /// File extension of the encoded output (without the dot)
    fn extension(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AudioFormat;

    /// Raw little-endian f32 "codec" for exercising the trait objects
    struct RawF32Codec {
        format: AudioFormat,
    }

    impl AudioDecoder for RawF32Codec {
        fn decode(&mut self, bytes: &[u8]) -> Result<AudioBuffer> {
            if bytes.len() % 4 != 0 {
                return Err(crate::MasteringError::decode("truncated sample"));
            }
            let samples = bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            Ok(AudioBuffer::new(samples, self.format))
        }

        fn supports_extension(&self, extension: &str) -> bool {
            extension.eq_ignore_ascii_case("raw")
        }
    }

    impl AudioEncoder for RawF32Codec {
        fn encode(&mut self, buffer: &AudioBuffer) -> Result<Vec<u8>> {
            Ok(buffer.samples.iter().flat_map(|s| s.to_le_bytes()).collect())
        }

        fn extension(&self) -> &str {
            "raw"
        }
    }

    #[test]
    fn codecs_work_as_trait_objects() {
        let format = AudioFormat::cd_quality();
        let buffer = AudioBuffer::new(vec![0.25, -0.5, 1.0, 0.0], format);

        let mut encoder: Box<dyn AudioEncoder> = Box::new(RawF32Codec { format });
        let bytes = encoder.encode(&buffer).unwrap();

        let mut decoder: Box<dyn AudioDecoder> = Box::new(RawF32Codec { format });
        assert!(decoder.supports_extension("RAW"));
        assert_eq!(decoder.decode(&bytes).unwrap(), buffer);
        assert!(decoder.decode(&bytes[..3]).is_err());
    }
}
