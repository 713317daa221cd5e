//! Probabilistic augmentation filters
//!
//! [`AugmentationFilter`] owns the policy shared by all augmentations: one
//! seeded random stream per filter decides whether a record is augmented
//! (`draw < threshold` passes it through) and optionally draws a per-record
//! seed in `[MIN_RAND, MAX_RAND]`. The concrete [`Augmentation`] derives its
//! own generator from that seed, so how many values it draws does not change
//! the filter's stream.

use adc_common::{AudioFormat, AudioRecord, Error, Result};
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::pipeline::Filter;
use crate::session::Session;

/// Lower bound of per-record augmentation seeds
pub const MIN_RAND: u64 = 0;

/// Upper bound (inclusive) of per-record augmentation seeds
pub const MAX_RAND: u64 = 1000;

/// What to emit for an augmented record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AugmentationMode {
    /// Emit only the augmented record
    #[default]
    Replace,
    /// Emit the original followed by the augmented record
    Add,
}

/// Options shared by all augmentation filters
#[derive(Args, Debug, Clone, Default)]
pub struct AugmentationOptions {
    /// The augmentation mode to use
    #[arg(short = 'm', long = "mode", value_enum, default_value_t = AugmentationMode::Replace)]
    pub mode: AugmentationMode,

    /// The suffix to use for the file names in case of augmentation mode 'add'
    #[arg(long = "suffix")]
    pub suffix: Option<String>,

    /// The seed value to use for the random number generator; randomly seeded if not provided
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Whether to seed the augmentation with a value drawn from the seeded generator
    #[arg(short = 'a', long = "seed_augmentation")]
    pub seed_augmentation: bool,

    /// Draws below this threshold (range 0-1) skip augmentation; 0 means always augment
    #[arg(short = 'T', long = "threshold", default_value_t = 0.0)]
    pub threshold: f64,
}

/// One concrete augmentation
pub trait Augmentation {
    fn name(&self) -> &'static str;

    /// Stem suffix used when no `--suffix` is given
    fn default_suffix(&self) -> &'static str;

    /// Whether the augmentation is configured well enough to run
    fn can_augment(&self) -> bool {
        true
    }

    /// Reject unusable parameters before any record is read
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Produce the augmented record named `audio_name`. `None` means the
    /// audio could not be decoded.
    fn augment(&self, record: &AudioRecord, aug_seed: Option<u64>, audio_name: &str) -> Result<Option<AudioRecord>>;
}

/// Draw a value from `[from, to]` with a generator seeded by `aug_seed`
pub fn interpolate(from: f64, to: f64, aug_seed: Option<u64>) -> f64 {
    let mut rng = match aug_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if from == to {
        return from;
    }
    rng.gen::<f64>() * (to - from) + from
}

/// Filter applying an [`Augmentation`] under the shared random policy
pub struct AugmentationFilter<A: Augmentation> {
    options: AugmentationOptions,
    augmentation: A,
    rng: Option<StdRng>,
}

impl<A: Augmentation> AugmentationFilter<A> {
    pub fn new(options: AugmentationOptions, augmentation: A) -> Self {
        Self {
            options,
            augmentation,
            rng: None,
        }
    }

    pub fn augmentation(&self) -> &A {
        &self.augmentation
    }

    fn suffix(&self) -> &str {
        self.options
            .suffix
            .as_deref()
            .unwrap_or_else(|| self.augmentation.default_suffix())
    }

    /// `stem + suffix + .wav`; augmented audio is always WAV
    fn augmented_name(&self, audio_name: &str) -> String {
        let (stem, _) = adc_common::format::split_extension(audio_name);
        format!("{}{}{}", stem, self.suffix(), AudioFormat::Wav.extension())
    }
}

impl<A: Augmentation> Filter for AugmentationFilter<A> {
    fn name(&self) -> &'static str {
        self.augmentation.name()
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        let threshold = self.options.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "Threshold must be within 0-1, got: {}",
                threshold
            )));
        }
        self.augmentation.validate()?;

        let seed = self.options.seed.or(session.config.augmentation.seed);
        tracing::debug!(filter = self.name(), seed = ?seed, "Seeding augmentation");
        self.rng = Some(match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });
        Ok(())
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        if !self.augmentation.can_augment() {
            return Ok(vec![record]);
        }

        let rng = self
            .rng
            .as_mut()
            .ok_or_else(|| Error::NotInitialized(format!("Filter {} not initialized", self.augmentation.name())))?;

        if rng.gen::<f64>() < self.options.threshold {
            return Ok(vec![record]);
        }

        let aug_seed = if self.options.seed_augmentation {
            Some(rng.gen_range(MIN_RAND..=MAX_RAND))
        } else {
            None
        };

        let audio_name = self.augmented_name(record.audio_name());
        let Some(augmented) = self.augmentation.augment(&record, aug_seed, &audio_name)? else {
            tracing::warn!(audio_name = %record.audio_name(), filter = self.name(), "Cannot decode audio, passing through");
            return Ok(vec![record]);
        };

        Ok(match self.options.mode {
            AugmentationMode::Add => vec![record, augmented],
            AugmentationMode::Replace => vec![augmented],
        })
    }
}
