//! Attaches metadata from per-record JSON files
//!
//! The file for a record is `<metadata_dir>/<stem><metadata_ext>`, where the
//! stem comes from the record's audio name. Its top-level object is merged
//! into the record metadata; keys from the file win.

use std::fs;
use std::path::{Path, PathBuf};

use adc_common::locate::locate_file;
use adc_common::{AudioRecord, Error, Metadata, Result};
use clap::Args;
use serde_json::Value;

use crate::pipeline::Filter;
use crate::session::Session;

pub const DEFAULT_METADATA_EXT: &str = ".json";

/// Options for `attach-metadata`
#[derive(Args, Debug, Clone)]
pub struct AttachMetadataOptions {
    /// The directory containing the meta-data files; placeholders are supported
    #[arg(short = 'd', long = "metadata_dir")]
    pub metadata_dir: String,

    /// The extension of the meta-data files (incl dot)
    #[arg(short = 'e', long = "metadata_ext", default_value = DEFAULT_METADATA_EXT)]
    pub metadata_ext: String,
}

impl AttachMetadataOptions {
    pub fn new(metadata_dir: impl Into<String>) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            metadata_ext: DEFAULT_METADATA_EXT.to_string(),
        }
    }
}

/// Loads meta-data from JSON files and attaches it to the records
#[derive(Debug)]
pub struct AttachMetadata {
    options: AttachMetadataOptions,
    dir: Option<PathBuf>,
}

impl AttachMetadata {
    pub fn new(options: AttachMetadataOptions) -> Self {
        Self { options, dir: None }
    }

    fn load(path: &Path) -> Result<Metadata> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| Error::InvalidInput(format!("Invalid JSON in {}: {}", path.display(), e)))?;
        let Value::Object(entries) = value else {
            return Err(Error::InvalidInput(format!(
                "Expected a JSON object in {}",
                path.display()
            )));
        };
        for (key, value) in &entries {
            if value.is_array() || value.is_object() {
                return Err(Error::InvalidInput(format!(
                    "Meta-data value for '{}' in {} is not a scalar",
                    key,
                    path.display()
                )));
            }
        }
        Ok(entries.into_iter().collect())
    }
}

impl Filter for AttachMetadata {
    fn name(&self) -> &'static str {
        "attach-metadata"
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        let dir = PathBuf::from(session.expand_placeholders(&self.options.metadata_dir));
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "Meta-data directory does not exist: {}",
                dir.display()
            )));
        }
        self.dir = Some(dir);
        Ok(())
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        let dir = self
            .dir
            .as_ref()
            .ok_or_else(|| Error::NotInitialized("Filter attach-metadata not initialized".to_string()))?;

        let candidates = locate_file(
            &dir.join(record.audio_name()),
            &[self.options.metadata_ext.as_str()],
            None,
            None,
        );
        let Some(path) = candidates.into_iter().next() else {
            tracing::debug!(audio_name = %record.audio_name(), "No meta-data file");
            return Ok(vec![record]);
        };

        let loaded = Self::load(&path)?;
        tracing::info!(path = %path.display(), keys = loaded.len(), "Attaching meta-data");
        let mut metadata = record.metadata().cloned().unwrap_or_default();
        metadata.extend(loaded);
        Ok(vec![record.to_builder().metadata(Some(metadata)).build()?])
    }
}
