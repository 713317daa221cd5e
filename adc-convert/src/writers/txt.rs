//! Writer for audio files with sibling `.txt` transcripts

use std::fs;
use std::path::Path;

use adc_common::{AudioRecord, Result};
use clap::Args;

use super::{next_output_dir, require_speech, value_text, SplitOptions};
use crate::pipeline::StreamWriter;
use crate::session::Session;
use crate::split::RatioSplitter;

/// Options for `to-txt-sp`
#[derive(Args, Debug, Clone)]
pub struct TxtWriterOptions {
    /// The directory to store the audio/.txt files in. Any defined splits get added beneath there
    #[arg(short = 'o', long = "output")]
    pub output: String,

    /// Suffix (incl. extension) of the sidecar file receiving the speaker, e.g. '-speaker.txt'
    #[arg(long = "speaker_suffix")]
    pub speaker_suffix: Option<String>,

    /// The meta-data key holding the speaker
    #[arg(long = "speaker_key", default_value = "speaker")]
    pub speaker_key: String,

    /// Whether to output only the annotations and not the audio files as well
    #[arg(long = "annotations_only")]
    pub annotations_only: bool,

    #[command(flatten)]
    pub split: SplitOptions,
}

impl TxtWriterOptions {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            speaker_suffix: None,
            speaker_key: "speaker".to_string(),
            annotations_only: false,
            split: SplitOptions::default(),
        }
    }
}

/// Saves speech data as audio files with one transcript file each
pub struct TxtWriter {
    options: TxtWriterOptions,
    splitter: Option<RatioSplitter>,
}

impl TxtWriter {
    pub fn new(options: TxtWriterOptions) -> Self {
        Self { options, splitter: None }
    }

    fn write_speaker(&self, record: &AudioRecord, audio_path: &Path, suffix: &str) -> Result<()> {
        let Some(speaker) = record.metadata_value(&self.options.speaker_key) else {
            tracing::warn!(
                key = %self.options.speaker_key,
                audio_name = %record.audio_name(),
                "No speaker in meta-data"
            );
            return Ok(());
        };
        let path = sibling(audio_path, suffix);
        tracing::info!(path = %path.display(), "Writing speaker");
        fs::write(&path, format!("{}\n", value_text(speaker)))?;
        Ok(())
    }
}

/// `dir/stem.wav` -> `dir/stem<suffix>`
fn sibling(audio_path: &Path, suffix: &str) -> std::path::PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    audio_path.with_file_name(format!("{}{}", stem, suffix))
}

impl StreamWriter for TxtWriter {
    fn name(&self) -> &'static str {
        "to-txt-sp"
    }

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        self.splitter = self.options.split.create_splitter()?;
        Ok(())
    }

    fn write_stream(&mut self, record: &AudioRecord, session: &Session) -> Result<()> {
        require_speech(self.name(), record)?;
        let dir = next_output_dir(&self.options.output, &mut self.splitter, record.audio_name(), session)?;
        let audio_path = dir.join(record.audio_name());

        if !self.options.annotations_only {
            tracing::info!(path = %audio_path.display(), "Writing audio");
            record.save_audio(&audio_path, true)?;
        }

        if let Some(transcript) = record.annotation().filter(|a| !a.is_empty()) {
            let path = sibling(&audio_path, ".txt");
            tracing::info!(path = %path.display(), "Writing transcript");
            fs::write(&path, format!("{}\n", transcript))?;
        }

        if let Some(suffix) = self.options.speaker_suffix.as_deref() {
            self.write_speaker(record, &audio_path, suffix)?;
        }
        Ok(())
    }
}
