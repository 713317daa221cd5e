//! Time stretching augmentation (speed up/slow down)

use adc_common::{AudioFormat, AudioRecord, Error, Result};
use clap::Args;

use super::augmentation::{interpolate, Augmentation, AugmentationFilter, AugmentationOptions};
use crate::dsp;

/// Options for `time-stretch`
#[derive(Args, Debug, Clone, Default)]
pub struct TimeStretchOptions {
    #[command(flatten)]
    pub augmentation: AugmentationOptions,

    /// The minimum stretch factor (<1: slow down, 1: same, >1: speed up)
    #[arg(short = 'f', long = "from_rate")]
    pub from_rate: Option<f64>,

    /// The maximum stretch factor (<1: slow down, 1: same, >1: speed up)
    #[arg(short = 't', long = "to_rate")]
    pub to_rate: Option<f64>,
}

pub type TimeStretchFilter = AugmentationFilter<TimeStretch>;

/// Stretches by a rate drawn from `[from_rate, to_rate]`
#[derive(Debug, Clone)]
pub struct TimeStretch {
    from_rate: Option<f64>,
    to_rate: Option<f64>,
}

impl TimeStretch {
    pub fn filter(options: TimeStretchOptions) -> TimeStretchFilter {
        let augmentation = TimeStretch {
            from_rate: options.from_rate,
            to_rate: options.to_rate,
        };
        AugmentationFilter::new(options.augmentation, augmentation)
    }
}

impl Augmentation for TimeStretch {
    fn name(&self) -> &'static str {
        "time-stretch"
    }

    fn default_suffix(&self) -> &'static str {
        "-stretched"
    }

    fn can_augment(&self) -> bool {
        self.from_rate.is_some() && self.to_rate.is_some()
    }

    fn validate(&self) -> Result<()> {
        for rate in [self.from_rate, self.to_rate].into_iter().flatten() {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(Error::Config(format!("Stretch rate must be positive, got: {}", rate)));
            }
        }
        Ok(())
    }

    fn augment(&self, record: &AudioRecord, aug_seed: Option<u64>, audio_name: &str) -> Result<Option<AudioRecord>> {
        let (Some(from), Some(to)) = (self.from_rate, self.to_rate) else {
            return Ok(Some(record.clone()));
        };
        let Some(decoded) = record.decoded() else {
            return Ok(None);
        };

        let rate = interpolate(from, to, aug_seed);
        tracing::info!(audio_name = %record.audio_name(), rate, "Stretching");

        let samples = dsp::time_stretch(&decoded.samples, rate)?;
        Ok(Some(
            record
                .to_builder()
                .audio_name(audio_name)
                .format(AudioFormat::Wav)
                .samples(samples, decoded.sample_rate)
                .build()?,
        ))
    }
}
