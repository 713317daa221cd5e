//! Writer for FestVox (`annotations.txt` with `( name "text" )` lines)

use adc_common::{AudioRecord, Result};
use clap::Args;

use super::{next_output_dir, reject_separators, require_speech, Manifests, SplitOptions};
use crate::pipeline::BatchWriter;
use crate::session::Session;
use crate::split::RatioSplitter;

/// Options for `to-festvox-sp`
#[derive(Args, Debug, Clone)]
pub struct FestVoxWriterOptions {
    /// The directory to store the audio/annotation files in. Any defined splits get added beneath there
    #[arg(short = 'o', long = "output")]
    pub output: String,

    /// The relative path to the audio files
    #[arg(long = "rel_path", default_value = ".")]
    pub rel_path: String,

    /// Whether to output only the annotations and not the audio files as well
    #[arg(long = "annotations_only")]
    pub annotations_only: bool,

    #[command(flatten)]
    pub split: SplitOptions,
}

impl FestVoxWriterOptions {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            rel_path: ".".to_string(),
            annotations_only: false,
            split: SplitOptions::default(),
        }
    }
}

/// Saves speech data in FestVox format
pub struct FestVoxWriter {
    options: FestVoxWriterOptions,
    splitter: Option<RatioSplitter>,
    manifests: Manifests,
}

impl FestVoxWriter {
    pub fn new(options: FestVoxWriterOptions) -> Self {
        Self {
            options,
            splitter: None,
            manifests: Manifests::default(),
        }
    }
}

impl BatchWriter for FestVoxWriter {
    fn name(&self) -> &'static str {
        "to-festvox-sp"
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
                let path = dir.join(&self.options.rel_path).join(record.audio_name());
                tracing::info!(path = %path.display(), "Writing audio");
                record.save_audio(&path, true)?;
            }

            self.manifests.touch(&dir);
            if let Some(transcript) = record.annotation().filter(|a| !a.is_empty()) {
                reject_separators(transcript, &['\n', '\r'], "FestVox")?;
                let stem = adc_common::format::split_extension(record.audio_name()).0;
                self.manifests.push(&dir, format!("( {} \"{}\" )", stem, transcript));
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.manifests.write_all("annotations.txt", None)
    }
}
