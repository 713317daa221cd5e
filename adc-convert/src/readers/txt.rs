//! Reader for plain-text annotation files next to the audio

use std::fs;
use std::path::Path;

use adc_common::locate::locate_audio;
use adc_common::{AudioRecord, DataType, Result};
use clap::Args;

use super::{InputOptions, InputQueue};
use crate::pipeline::Reader;
use crate::session::Session;

/// Options for `from-txt-ac` and `from-txt-sp`
#[derive(Args, Debug, Clone)]
pub struct TxtReaderOptions {
    #[command(flatten)]
    pub input: InputOptions,

    /// The relative path to the audio files
    #[arg(long = "rel_path", default_value = ".")]
    pub rel_path: String,

    /// The file suffix for the companion files that contain the speaker, e.g., '.speaker'
    #[arg(long = "speaker_suffix")]
    pub speaker_suffix: Option<String>,

    /// The key in the meta-data with the speaker name/ID
    #[arg(long = "speaker_key", default_value = "speaker")]
    pub speaker_key: String,
}

impl Default for TxtReaderOptions {
    fn default() -> Self {
        Self {
            input: InputOptions::default(),
            rel_path: ".".to_string(),
            speaker_suffix: None,
            speaker_key: "speaker".to_string(),
        }
    }
}

/// Loads the annotation from the `.txt` file belonging to each audio file
pub struct TxtReader {
    data_type: DataType,
    options: TxtReaderOptions,
    queue: InputQueue,
}

impl TxtReader {
    pub fn new(data_type: DataType, options: TxtReaderOptions) -> Self {
        Self {
            data_type,
            options,
            queue: InputQueue::default(),
        }
    }

    fn read_speaker(&self, path: &Path) -> Option<String> {
        let suffix = self.options.speaker_suffix.as_deref()?;
        let full = path.to_string_lossy();
        let speaker_path = format!("{}{}", adc_common::format::split_extension(&full).0, suffix);
        match fs::read_to_string(&speaker_path) {
            Ok(content) => {
                tracing::info!(path = %speaker_path, "Read speaker");
                Some(content.trim().to_string())
            }
            Err(_) => {
                tracing::warn!(path = %speaker_path, "Speaker file not found");
                None
            }
        }
    }
}

impl Reader for TxtReader {
    fn name(&self) -> &'static str {
        match self.data_type {
            DataType::Classification => "from-txt-ac",
            DataType::Speech => "from-txt-sp",
        }
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        self.queue.resolve(&self.options.input, "*.txt", session)
    }

    fn read(&mut self, session: &mut Session) -> Result<Vec<Option<AudioRecord>>> {
        let path = self.queue.next(self.name(), session)?;
        let annotation = fs::read_to_string(&path)?.trim().to_string();

        let Some(audio) = locate_audio(&path, Some(&self.options.rel_path), None) else {
            tracing::warn!(path = %path.display(), "No associated audio file found");
            return Ok(vec![None]);
        };

        let mut builder = AudioRecord::builder(self.data_type)
            .source(audio)
            .annotation(annotation);
        if self.data_type == DataType::Speech {
            if let Some(speaker) = self.read_speaker(&path) {
                builder = builder.metadata_entry(self.options.speaker_key.clone(), speaker);
            }
        }
        Ok(vec![Some(builder.build()?)])
    }

    fn has_finished(&self) -> bool {
        self.queue.has_finished()
    }
}
