//! WAV encoding
//!
//! Samples are written as 16-bit PCM, the layout every downstream corpus
//! format (Piper, FestVox, Common Voice) expects.

use std::io::Cursor;

use crate::{Error, Result};

use super::AudioSamples;

/// Bits per sample for encoded WAV output
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Encode planar samples as a 16-bit PCM WAV payload
pub fn encode_wav(samples: &AudioSamples, sample_rate: u32) -> Result<Vec<u8>> {
    if samples.channel_count() == 0 {
        return Err(Error::Encode("No channels to encode".to_string()));
    }
    if sample_rate == 0 {
        return Err(Error::Encode("Sample rate must be positive".to_string()));
    }

    let spec = hound::WavSpec {
        channels: samples.channel_count() as u16,
        sample_rate,
        bits_per_sample: WAV_BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| Error::Encode(format!("Failed to create WAV writer: {}", e)))?;
        for sample in samples.to_interleaved() {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer
                .write_sample(value)
                .map_err(|e| Error::Encode(format!("Failed to write sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| Error::Encode(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(cursor.into_inner())
}
