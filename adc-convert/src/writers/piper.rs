//! Writer for Piper training data (`metadata.csv` with pipe-separated rows)

use std::path::Path;

use adc_common::{AudioFormat, AudioRecord, Error, Result};
use clap::Args;

use super::{next_output_dir, reject_separators, require_speech, value_text, Manifests, SplitOptions};
use crate::pipeline::BatchWriter;
use crate::session::Session;
use crate::split::RatioSplitter;

/// Speaker written when the speaker key is missing from the metadata
pub const UNKNOWN_SPEAKER: &str = "[unknown]";

/// Options for `to-piper-sp`
#[derive(Args, Debug, Clone)]
pub struct PiperWriterOptions {
    /// The directory to store the audio/metadata files in. Any defined splits get added beneath there
    #[arg(short = 'o', long = "output")]
    pub output: String,

    /// The name of the meta-data file
    #[arg(long = "metadata", default_value = "metadata.csv")]
    pub metadata: String,

    /// The key in the meta-data with the speaker name/ID; assumes single-speaker data if not supplied
    #[arg(long = "speaker_key")]
    pub speaker_key: Option<String>,

    /// The relative path to the audio files
    #[arg(long = "rel_path", default_value = "wav")]
    pub rel_path: String,

    /// Whether to output only the annotations and not the audio files as well
    #[arg(long = "annotations_only")]
    pub annotations_only: bool,

    #[command(flatten)]
    pub split: SplitOptions,
}

impl PiperWriterOptions {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            metadata: "metadata.csv".to_string(),
            speaker_key: None,
            rel_path: "wav".to_string(),
            annotations_only: false,
            split: SplitOptions::default(),
        }
    }
}

/// Saves speech data in Piper format (https://github.com/rhasspy/piper/blob/master/TRAINING.md#dataset-format).
///
/// Without a speaker key the data is treated as single-speaker.
pub struct PiperWriter {
    options: PiperWriterOptions,
    splitter: Option<RatioSplitter>,
    manifests: Manifests,
}

impl PiperWriter {
    pub fn new(options: PiperWriterOptions) -> Self {
        Self {
            options,
            splitter: None,
            manifests: Manifests::default(),
        }
    }

    /// `stem|annotation` or `stem|speaker|annotation`
    fn row(&self, record: &AudioRecord, annotation: &str) -> Result<String> {
        reject_separators(annotation, &['\n', '\r'], "Piper metadata")?;
        let stem = adc_common::format::split_extension(record.audio_name()).0;
        let Some(key) = self.options.speaker_key.as_deref() else {
            return Ok(format!("{}|{}", stem, annotation));
        };
        let speaker = match record.metadata_value(key) {
            Some(value) => value_text(value),
            None => {
                tracing::warn!(key, audio_name = %record.audio_name(), "Failed to locate speaker in meta-data");
                UNKNOWN_SPEAKER.to_string()
            }
        };
        Ok(format!("{}|{}|{}", stem, speaker, annotation))
    }
}

impl BatchWriter for PiperWriter {
    fn name(&self) -> &'static str {
        "to-piper-sp"
    }

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        self.splitter = self.options.split.create_splitter()?;
        Ok(())
    }

    fn write_batch(&mut self, records: &[AudioRecord], session: &Session) -> Result<()> {
        for record in records {
            require_speech(self.name(), record)?;
            let dir = next_output_dir(&self.options.output, &mut self.splitter, record.audio_name(), session)?;

            if !self.options.annotations_only {
                if AudioFormat::from_path(Path::new(record.audio_name())) != Some(AudioFormat::Wav) {
                    return Err(Error::InvalidInput(
                        "Audio data not in WAV! Use convert-to-wav filter!".to_string(),
                    ));
                }
                let path = dir.join(&self.options.rel_path).join(record.audio_name());
                tracing::info!(path = %path.display(), "Writing audio");
                record.save_audio(&path, true)?;
            }

            self.manifests.touch(&dir);
            if let Some(annotation) = record.annotation().filter(|a| !a.is_empty()) {
                let row = self.row(record, annotation)?;
                self.manifests.push(&dir, row);
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let metadata = self.options.metadata.clone();
        self.manifests.write_all(&metadata, None)
    }
}
