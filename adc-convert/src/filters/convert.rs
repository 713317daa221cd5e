//! Format and channel conversion

use adc_common::{AudioFormat, AudioRecord, Result};

use super::{decode_or_warn, with_wav_samples};
use crate::pipeline::Filter;
use crate::session::Session;

/// Mixes multi-channel audio down to mono; output is WAV
#[derive(Debug, Default)]
pub struct ConvertToMono;

impl Filter for ConvertToMono {
    fn name(&self) -> &'static str {
        "convert-to-mono"
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        let Some(decoded) = decode_or_warn(&record, self.name()) else {
            return Ok(Vec::new());
        };
        if decoded.samples.is_mono() {
            return Ok(vec![record]);
        }

        tracing::info!(audio_name = %record.audio_name(), channels = decoded.samples.channel_count(), "Converting to mono");
        let mono = decoded.samples.to_mono();
        Ok(vec![with_wav_samples(&record, mono, decoded.sample_rate)?])
    }
}

/// Re-encodes non-WAV audio as WAV
#[derive(Debug, Default)]
pub struct ConvertToWav;

impl Filter for ConvertToWav {
    fn name(&self) -> &'static str {
        "convert-to-wav"
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        if record.format() == AudioFormat::Wav {
            return Ok(vec![record]);
        }
        let Some(decoded) = decode_or_warn(&record, self.name()) else {
            return Ok(Vec::new());
        };

        tracing::info!(audio_name = %record.audio_name(), "Converting to WAV");
        Ok(vec![with_wav_samples(&record, decoded.samples, decoded.sample_rate)?])
    }
}
