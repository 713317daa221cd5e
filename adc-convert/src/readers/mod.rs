//! Readers, one per corpus format
//!
//! All readers share the same input handling: globs and list files are
//! resolved into a queue at initialization, and each `read` consumes one
//! queued file.

use std::collections::VecDeque;
use std::path::PathBuf;

use adc_common::locate::locate_files;
use adc_common::{Error, Result};
use clap::Args;

use crate::session::Session;

mod adams;
mod commonvoice;
mod festvox;
mod hf_audiofolder;
pub mod report;
mod txt;

pub use adams::{AdamsClassificationOptions, AdamsReader, AdamsSpeechOptions};
pub use commonvoice::{CommonVoiceReader, CommonVoiceReaderOptions, COMMONVOICE_HEADER, COMMONVOICE_HEADER_LEGACY};
pub use festvox::{FestVoxReader, FestVoxReaderOptions};
pub use hf_audiofolder::{HfAudioFolderReader, HfAudioFolderReaderOptions, HF_AUDIOFOLDER_HEADER};
pub use txt::{TxtReader, TxtReaderOptions};

/// Input options shared by all readers
#[derive(Args, Debug, Clone, Default)]
pub struct InputOptions {
    /// Path to the file(s) to read; glob syntax and placeholders are supported
    #[arg(short = 'i', long = "input", num_args = 1..)]
    pub input: Vec<String>,

    /// Path to the text file(s) listing the files to use
    #[arg(short = 'I', long = "input_list", num_args = 1..)]
    pub input_list: Vec<String>,

    /// Glob expression matching the file to resume from, e.g., '*/012345.txt'
    #[arg(long = "resume_from")]
    pub resume_from: Option<String>,
}

impl InputOptions {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: vec![input.into()],
            ..Default::default()
        }
    }
}

/// Queue of resolved input files
#[derive(Debug, Default)]
pub struct InputQueue {
    files: Option<VecDeque<PathBuf>>,
}

impl InputQueue {
    /// Resolve the configured inputs. Directories are searched with `default_glob`.
    pub fn resolve(&mut self, options: &InputOptions, default_glob: &str, session: &Session) -> Result<()> {
        let inputs: Vec<String> = options
            .input
            .iter()
            .map(|i| session.expand_placeholders(i))
            .collect();
        let lists: Vec<PathBuf> = options
            .input_list
            .iter()
            .map(|l| PathBuf::from(session.expand_placeholders(l)))
            .collect();

        let files = locate_files(&inputs, &lists, Some(default_glob), options.resume_from.as_deref())?;
        tracing::debug!(count = files.len(), "Located input files");
        self.files = Some(files.into());
        Ok(())
    }

    /// Take the next file and make it the session's current input
    pub fn next(&mut self, reader: &str, session: &mut Session) -> Result<PathBuf> {
        let files = self
            .files
            .as_mut()
            .ok_or_else(|| Error::NotInitialized(format!("Reader {} not initialized", reader)))?;
        let path = files
            .pop_front()
            .ok_or_else(|| Error::InvalidInput(format!("Reader {} has no more inputs", reader)))?;
        tracing::info!(path = %path.display(), "Reading from");
        session.set_current_input(&path);
        Ok(path)
    }

    pub fn has_finished(&self) -> bool {
        self.files.as_ref().map_or(true, VecDeque::is_empty)
    }
}
