//! Audio sample storage, decoding and encoding

mod decoder;
mod encoder;
mod samples;

pub use decoder::{decode_audio_from_bytes, decode_audio_from_file, DecodedAudio};
pub use encoder::{encode_wav, WAV_BITS_PER_SAMPLE};
pub use samples::AudioSamples;
