//! Pitch shifting augmentation

use adc_common::{AudioFormat, AudioRecord, Error, Result};
use clap::Args;

use super::augmentation::{interpolate, Augmentation, AugmentationFilter, AugmentationOptions};
use crate::dsp::{self, ResampleType};

/// Options for `pitch-shift`
#[derive(Args, Debug, Clone)]
pub struct PitchShiftOptions {
    #[command(flatten)]
    pub augmentation: AugmentationOptions,

    /// The minimum (fractional) steps to shift
    #[arg(short = 'f', long = "from_steps")]
    pub from_steps: Option<f64>,

    /// The maximum (fractional) steps to shift
    #[arg(short = 't', long = "to_steps")]
    pub to_steps: Option<f64>,

    /// How many steps per octave
    #[arg(long = "bins_per_octave", default_value_t = 12)]
    pub bins_per_octave: u32,

    /// The resampling type to apply
    #[arg(long = "resample_type", value_enum, default_value_t = ResampleType::default())]
    pub resample_type: ResampleType,
}

impl Default for PitchShiftOptions {
    fn default() -> Self {
        Self {
            augmentation: AugmentationOptions::default(),
            from_steps: None,
            to_steps: None,
            bins_per_octave: 12,
            resample_type: ResampleType::default(),
        }
    }
}

pub type PitchShiftFilter = AugmentationFilter<PitchShift>;

/// Shifts the pitch by a number of steps drawn from `[from_steps, to_steps]`
#[derive(Debug, Clone)]
pub struct PitchShift {
    from_steps: Option<f64>,
    to_steps: Option<f64>,
    bins_per_octave: u32,
    resample_type: ResampleType,
}

impl PitchShift {
    pub fn filter(options: PitchShiftOptions) -> PitchShiftFilter {
        let augmentation = PitchShift {
            from_steps: options.from_steps,
            to_steps: options.to_steps,
            bins_per_octave: options.bins_per_octave,
            resample_type: options.resample_type,
        };
        AugmentationFilter::new(options.augmentation, augmentation)
    }
}

impl Augmentation for PitchShift {
    fn name(&self) -> &'static str {
        "pitch-shift"
    }

    fn default_suffix(&self) -> &'static str {
        "-shifted"
    }

    fn can_augment(&self) -> bool {
        self.from_steps.is_some() && self.to_steps.is_some()
    }

    fn validate(&self) -> Result<()> {
        if self.bins_per_octave == 0 {
            return Err(Error::Config("bins_per_octave must be positive".to_string()));
        }
        for steps in [self.from_steps, self.to_steps].into_iter().flatten() {
            if !steps.is_finite() {
                return Err(Error::Config(format!("Invalid number of steps: {}", steps)));
            }
        }
        Ok(())
    }

    fn augment(&self, record: &AudioRecord, aug_seed: Option<u64>, audio_name: &str) -> Result<Option<AudioRecord>> {
        let (Some(from), Some(to)) = (self.from_steps, self.to_steps) else {
            return Ok(Some(record.clone()));
        };
        let Some(decoded) = record.decoded() else {
            return Ok(None);
        };

        let steps = interpolate(from, to, aug_seed);
        tracing::info!(audio_name = %record.audio_name(), steps, "Shifting pitch");

        let samples = dsp::pitch_shift(&decoded.samples, steps, self.bins_per_octave, self.resample_type)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Filter;
    use crate::session::Session;

    #[test]
    fn test_zero_bins_per_octave_fails_at_initialize() {
        let mut filter = PitchShift::filter(PitchShiftOptions {
            from_steps: Some(-1.0),
            to_steps: Some(1.0),
            bins_per_octave: 0,
            ..Default::default()
        });
        assert!(matches!(filter.initialize(&Session::default()), Err(Error::Config(_))));
    }

    #[test]
    fn test_infinite_steps_fail_at_initialize() {
        let mut filter = PitchShift::filter(PitchShiftOptions {
            from_steps: Some(f64::INFINITY),
            to_steps: Some(1.0),
            ..Default::default()
        });
        assert!(matches!(filter.initialize(&Session::default()), Err(Error::Config(_))));
        assert!(PitchShift::filter(PitchShiftOptions::default())
            .initialize(&Session::default())
            .is_ok());
    }
}
