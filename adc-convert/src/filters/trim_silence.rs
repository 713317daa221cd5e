//! Leading/trailing silence removal

use adc_common::{AudioRecord, Error, Result};
use clap::Args;

use super::{decode_or_warn, with_wav_samples};
use crate::dsp::{nonsilent_range, TrimParams};
use crate::pipeline::Filter;
use crate::session::Session;

/// Options for `trim-silence`
#[derive(Args, Debug, Clone)]
pub struct TrimSilenceOptions {
    /// The threshold (in decibels) below reference to consider as silence
    #[arg(long = "top_db", default_value_t = 60.0)]
    pub top_db: f64,

    /// The number of samples per analysis frame
    #[arg(long = "frame_length", default_value_t = 2048)]
    pub frame_length: usize,

    /// The number of samples between analysis frames
    #[arg(long = "hop_length", default_value_t = 512)]
    pub hop_length: usize,
}

impl Default for TrimSilenceOptions {
    fn default() -> Self {
        let params = TrimParams::default();
        Self {
            top_db: params.top_db,
            frame_length: params.frame_length,
            hop_length: params.hop_length,
        }
    }
}

/// Trims leading and trailing silence; output is always WAV
#[derive(Debug)]
pub struct TrimSilence {
    params: TrimParams,
}

impl TrimSilence {
    pub fn new(options: TrimSilenceOptions) -> Self {
        Self {
            params: TrimParams {
                top_db: options.top_db,
                frame_length: options.frame_length,
                hop_length: options.hop_length,
            },
        }
    }
}

impl Filter for TrimSilence {
    fn name(&self) -> &'static str {
        "trim-silence"
    }

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        if self.params.frame_length == 0 || self.params.hop_length == 0 {
            return Err(Error::Config("Frame and hop length must be positive".to_string()));
        }
        Ok(())
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        let Some(decoded) = decode_or_warn(&record, self.name()) else {
            return Ok(Vec::new());
        };

        let (start, end) = nonsilent_range(&decoded.samples, &self.params);
        tracing::info!(
            audio_name = %record.audio_name(),
            before = decoded.samples.frames(),
            after = end - start,
            "Trimmed silence"
        );
        let trimmed = decoded.samples.slice_frames(start, end);
        Ok(vec![with_wav_samples(&record, trimmed, decoded.sample_rate)?])
    }
}
