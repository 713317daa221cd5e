//! Sample rate conversion filter

use adc_common::{AudioRecord, Error, Result};
use clap::Args;

use super::{decode_or_warn, with_wav_samples};
use crate::dsp::{self, ResampleType};
use crate::pipeline::Filter;
use crate::session::Session;

pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Options for `resample`
#[derive(Args, Debug, Clone)]
pub struct ResampleOptions {
    /// The sample rate to use for the audio
    #[arg(short = 's', long = "sample_rate", default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// The resampling type to apply
    #[arg(short = 't', long = "resample_type", value_enum, default_value_t = ResampleType::default())]
    pub resample_type: ResampleType,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            resample_type: ResampleType::default(),
        }
    }
}

/// Resamples audio to a fixed rate; resampled output is WAV
#[derive(Debug)]
pub struct Resample {
    options: ResampleOptions,
}

impl Resample {
    pub fn new(options: ResampleOptions) -> Self {
        Self { options }
    }
}

impl Filter for Resample {
    fn name(&self) -> &'static str {
        "resample"
    }

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        if self.options.sample_rate == 0 {
            return Err(Error::Config("Sample rate must be positive".to_string()));
        }
        Ok(())
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        let target = self.options.sample_rate;
        if record.sample_rate() == Some(target) {
            return Ok(vec![record]);
        }
        let Some(decoded) = decode_or_warn(&record, self.name()) else {
            return Ok(Vec::new());
        };
        if decoded.sample_rate == target {
            return Ok(vec![record]);
        }

        tracing::info!(
            audio_name = %record.audio_name(),
            from = decoded.sample_rate,
            to = target,
            kind = ?self.options.resample_type,
            "Resampling"
        );
        let samples = dsp::resample(&decoded.samples, decoded.sample_rate, target, self.options.resample_type)?;
        Ok(vec![with_wav_samples(&record, samples, target)?])
    }
}
