//! Reader for Hugging Face AudioFolder `metadata.csv` manifests
//! (https://huggingface.co/docs/datasets/audio_dataset#audiofolder)

use std::fs;
use std::path::Path;

use adc_common::{AudioRecord, DataType, Error, Result};
use clap::Args;
use serde::Deserialize;

use super::{InputOptions, InputQueue};
use crate::pipeline::Reader;
use crate::session::Session;

/// Required manifest header; rows may carry extra trailing columns, which are ignored
pub const HF_AUDIOFOLDER_HEADER: &str = "file_name,transcription";

/// Options for `from-hf-audiofolder-sp`
#[derive(Args, Debug, Clone, Default)]
pub struct HfAudioFolderReaderOptions {
    #[command(flatten)]
    pub input: InputOptions,
}

#[derive(Debug, Deserialize)]
struct ManifestRow {
    file_name: String,
    transcription: String,
}

/// Reads speech data in the AudioFolder layout; audio paths are relative to the manifest
pub struct HfAudioFolderReader {
    options: HfAudioFolderReaderOptions,
    queue: InputQueue,
}

impl HfAudioFolderReader {
    pub fn new(options: HfAudioFolderReaderOptions) -> Self {
        Self {
            options,
            queue: InputQueue::default(),
        }
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Option<AudioRecord>>> {
        let header = content.lines().next().unwrap_or_default().trim();
        if header != HF_AUDIOFOLDER_HEADER {
            return Err(Error::InvalidInput(format!(
                "Expected header: {}\nSeen header: {}",
                HF_AUDIOFOLDER_HEADER, header
            )));
        }

        let basedir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for row in reader.deserialize::<ManifestRow>() {
            let row = row.map_err(|e| {
                Error::InvalidInput(format!("Malformed row in {}: {}", path.display(), e))
            })?;

            let audio = basedir.join(&row.file_name);
            if !audio.exists() {
                tracing::warn!(path = %audio.display(), "Audio file not found");
                records.push(None);
                continue;
            }

            records.push(Some(
                AudioRecord::builder(DataType::Speech)
                    .source(audio)
                    .annotation(row.transcription)
                    .build()?,
            ));
        }

        Ok(records)
    }
}

impl Reader for HfAudioFolderReader {
    fn name(&self) -> &'static str {
        "from-hf-audiofolder-sp"
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        self.queue.resolve(&self.options.input, "*.csv", session)
    }

    fn read(&mut self, session: &mut Session) -> Result<Vec<Option<AudioRecord>>> {
        let path = self.queue.next(self.name(), session)?;
        let content = fs::read_to_string(&path)?;
        self.parse(&path, &content)
    }

    fn has_finished(&self) -> bool {
        self.queue.has_finished()
    }
}
