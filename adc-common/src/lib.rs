//! # ADC Common Library
//!
//! Shared code for the audio dataset converter:
//! - Audio record data model (AudioRecord, AudioSamples)
//! - Audio format and data type registries
//! - Audio I/O utilities (companion-file lookup, decoding, WAV encoding)
//! - Input file resolution
//! - Function reference registry
//! - Configuration loading

pub mod audio;
pub mod config;
pub mod data_type;
pub mod error;
pub mod format;
pub mod function;
pub mod locate;
pub mod record;

pub use data_type::DataType;
pub use error::{Error, Result};
pub use format::AudioFormat;
pub use audio::{AudioSamples, DecodedAudio};
pub use record::{AudioRecord, Metadata, RecordBuilder};
