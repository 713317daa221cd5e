//! Writer for Common Voice (`annotations.tsv` plus audio)

use adc_common::{AudioRecord, Result};
use clap::Args;

use super::{next_output_dir, reject_separators, require_speech, Manifests, SplitOptions};
use crate::pipeline::BatchWriter;
use crate::readers::COMMONVOICE_HEADER;
use crate::session::Session;
use crate::split::RatioSplitter;

/// Options for `to-commonvoice-sp`
#[derive(Args, Debug, Clone)]
pub struct CommonVoiceWriterOptions {
    /// The directory to store the audio/.tsv files in. Any defined splits get added beneath there
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

impl CommonVoiceWriterOptions {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            rel_path: ".".to_string(),
            annotations_only: false,
            split: SplitOptions::default(),
        }
    }
}

/// Saves speech data in Common Voice format (https://commonvoice.mozilla.org/)
pub struct CommonVoiceWriter {
    options: CommonVoiceWriterOptions,
    splitter: Option<RatioSplitter>,
    manifests: Manifests,
}

impl CommonVoiceWriter {
    pub fn new(options: CommonVoiceWriterOptions) -> Self {
        Self {
            options,
            splitter: None,
            manifests: Manifests::default(),
        }
    }

    /// One TSV row; optional columns are left blank, votes are zero
    fn row(record: &AudioRecord, sentence: &str) -> Result<String> {
        reject_separators(record.audio_name(), &['\t', '\n', '\r'], "Common Voice TSV")?;
        reject_separators(sentence, &['\t', '\n', '\r'], "Common Voice TSV")?;
        Ok([
            "",                  // client_id
            record.audio_name(), // path
            sentence,            // sentence
            "0",                 // up_votes
            "0",                 // down_votes
            "",                  // age
            "",                  // gender
            "",                  // accents
            "",                  // locale
            "",                  // segment
        ]
        .join("\t"))
    }
}

impl BatchWriter for CommonVoiceWriter {
    fn name(&self) -> &'static str {
        "to-commonvoice-sp"
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
            if let Some(sentence) = record.annotation().filter(|a| !a.is_empty()) {
                self.manifests.push(&dir, Self::row(record, sentence)?);
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.manifests.write_all("annotations.tsv", Some(COMMONVOICE_HEADER))
    }
}
