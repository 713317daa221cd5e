//! # adc-convert
//!
//! Converts audio datasets between corpus formats by running a pipeline of
//! one reader, optional filters and an optional writer:
//! - Readers: ADAMS reports, Common Voice, FestVox, HF AudioFolder, plain text
//! - Filters: format/channel conversion, resampling, augmentation, silence trimming
//! - Writers: Common Voice, FestVox, Piper, plain text, audio info reports

pub mod cli;
pub mod dsp;
pub mod filters;
pub mod pipeline;
pub mod readers;
pub mod session;
pub mod split;
pub mod writers;

pub use pipeline::{BatchWriter, Filter, Pipeline, PipelineStats, Reader, StreamWriter, Writer};
pub use session::Session;
