//! Filters: record transforms between reader and writer

use adc_common::{AudioFormat, AudioRecord, AudioSamples, DecodedAudio, Result};

mod apply_function;
mod attach_metadata;
pub mod augmentation;
mod convert;
mod pitch_shift;
mod resample;
mod strip_annotations;
mod time_stretch;
mod trim_silence;

pub use apply_function::{ApplyFunction, ApplyFunctionOptions};
pub use attach_metadata::{AttachMetadata, AttachMetadataOptions, DEFAULT_METADATA_EXT};
pub use augmentation::{Augmentation, AugmentationFilter, AugmentationMode, AugmentationOptions};
pub use convert::{ConvertToMono, ConvertToWav};
pub use pitch_shift::{PitchShift, PitchShiftFilter, PitchShiftOptions};
pub use resample::{Resample, ResampleOptions, DEFAULT_SAMPLE_RATE};
pub use strip_annotations::StripAnnotations;
pub use time_stretch::{TimeStretch, TimeStretchFilter, TimeStretchOptions};
pub use trim_silence::{TrimSilence, TrimSilenceOptions};

/// Decode a record's audio, logging when that is not possible
fn decode_or_warn(record: &AudioRecord, filter: &str) -> Option<DecodedAudio> {
    let decoded = record.decoded();
    if decoded.is_none() {
        tracing::warn!(audio_name = %record.audio_name(), filter, "Cannot decode audio, dropping record");
    }
    decoded
}

/// Copy of `record` holding new samples, renamed to WAV
fn with_wav_samples(record: &AudioRecord, samples: AudioSamples, sample_rate: u32) -> Result<AudioRecord> {
    record
        .to_builder()
        .audio_name(AudioFormat::Wav.rename(record.audio_name()))
        .format(AudioFormat::Wav)
        .samples(samples, sample_rate)
        .build()
}
