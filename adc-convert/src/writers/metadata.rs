//! Writer for per-record meta-data (`<stem>.json`)

use std::fs;

use adc_common::{AudioRecord, Error, Result};
use clap::Args;

use super::{next_output_dir, SplitOptions};
use crate::pipeline::StreamWriter;
use crate::session::Session;
use crate::split::RatioSplitter;

/// Options for `to-metadata`
#[derive(Args, Debug, Clone)]
pub struct MetadataWriterOptions {
    /// The directory to store the meta-data files in. Any defined splits get added beneath there
    #[arg(short = 'o', long = "output")]
    pub output: String,

    #[command(flatten)]
    pub split: SplitOptions,
}

impl MetadataWriterOptions {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            split: SplitOptions::default(),
        }
    }
}

/// Saves the meta-data of each record as a JSON file named after the audio
pub struct MetadataWriter {
    options: MetadataWriterOptions,
    splitter: Option<RatioSplitter>,
}

impl MetadataWriter {
    pub fn new(options: MetadataWriterOptions) -> Self {
        Self { options, splitter: None }
    }
}

impl StreamWriter for MetadataWriter {
    fn name(&self) -> &'static str {
        "to-metadata"
    }

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        self.splitter = self.options.split.create_splitter()?;
        Ok(())
    }

    fn write_stream(&mut self, record: &AudioRecord, session: &Session) -> Result<()> {
        let Some(metadata) = record.metadata() else {
            tracing::warn!(audio_name = %record.audio_name(), "No meta-data, skipping");
            return Ok(());
        };

        let dir = next_output_dir(&self.options.output, &mut self.splitter, record.audio_name(), session)?;
        let stem = adc_common::format::split_extension(record.audio_name()).0;
        let path = dir.join(format!("{}.json", stem));
        let content = serde_json::to_string_pretty(metadata)
            .map_err(|e| Error::Encode(format!("Failed to serialize meta-data: {}", e)))?;
        tracing::info!(path = %path.display(), "Writing meta-data");
        fs::write(&path, format!("{}\n", content))?;
        Ok(())
    }
}
