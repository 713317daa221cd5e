//! Numeric audio transforms used by the filters

mod resampler;
mod silence;
mod stretch;

pub use resampler::{resample, resample_by_ratio, ResampleType};
pub use silence::{nonsilent_range, TrimParams};
pub use stretch::{pitch_shift, time_stretch};
