//! Writers, one per corpus format
//!
//! Splittable writers route each record into `<output>/<split>` via a
//! [`RatioSplitter`]; directories are created on demand.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use adc_common::{AudioRecord, DataType, Error, Result};
use clap::Args;

use crate::session::Session;
use crate::split::{RatioSplitter, Splitter};

mod audioinfo;
mod commonvoice;
mod festvox;
mod metadata;
mod piper;
mod txt;

pub use audioinfo::{AudioInfoOptions, AudioInfoWriter, OutputFormat};
pub use commonvoice::{CommonVoiceWriter, CommonVoiceWriterOptions};
pub use festvox::{FestVoxWriter, FestVoxWriterOptions};
pub use metadata::{MetadataWriter, MetadataWriterOptions};
pub use piper::{PiperWriter, PiperWriterOptions, UNKNOWN_SPEAKER};
pub use txt::{TxtWriter, TxtWriterOptions};

/// Split options shared by the splittable writers
#[derive(Args, Debug, Clone, Default)]
pub struct SplitOptions {
    /// The names of the splits to generate, e.g., train val test
    #[arg(long = "split_names", num_args = 1..)]
    pub split_names: Vec<String>,

    /// The integer ratios of the splits (must sum up to 100)
    #[arg(long = "split_ratios", num_args = 1..)]
    pub split_ratios: Vec<u32>,

    /// Regular expression with a single group used for keeping items in the same split
    #[arg(long = "split_group")]
    pub split_group: Option<String>,
}

impl SplitOptions {
    /// Build the splitter, if any splits are configured
    pub fn create_splitter(&self) -> Result<Option<RatioSplitter>> {
        if self.split_names.is_empty() && self.split_ratios.is_empty() {
            return Ok(None);
        }
        RatioSplitter::new(
            self.split_names.clone(),
            self.split_ratios.clone(),
            self.split_group.as_deref(),
        )
        .map(Some)
    }
}

/// Output directory for the next record: `<output>[/<split>]`, created if absent
fn next_output_dir(
    output: &str,
    splitter: &mut Option<RatioSplitter>,
    audio_name: &str,
    session: &Session,
) -> Result<PathBuf> {
    let mut dir = PathBuf::from(session.expand_placeholders(output));
    if let Some(splitter) = splitter.as_mut() {
        dir.push(splitter.next(Some(audio_name)));
    }
    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        tracing::info!(path = %dir.display(), "Creating dir");
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Manifest lines collected per output directory
#[derive(Debug, Default)]
struct Manifests {
    lines: BTreeMap<PathBuf, Vec<String>>,
}

impl Manifests {
    /// Register a directory so it gets a manifest even without lines
    fn touch(&mut self, dir: &Path) {
        self.lines.entry(dir.to_path_buf()).or_default();
    }

    fn push(&mut self, dir: &Path, line: String) {
        self.lines.entry(dir.to_path_buf()).or_default().push(line);
    }

    /// Write `<dir>/<file_name>` for every directory, optionally preceded by a header line
    fn write_all(&mut self, file_name: &str, header: Option<&str>) -> Result<()> {
        for (dir, lines) in std::mem::take(&mut self.lines) {
            ensure_dir(&dir)?;
            let path = dir.join(file_name);
            let mut content = String::new();
            if let Some(header) = header {
                content.push_str(header);
                content.push('\n');
            }
            for line in &lines {
                content.push_str(line);
                content.push('\n');
            }
            tracing::info!(path = %path.display(), lines = lines.len(), "Writing manifest");
            fs::write(&path, content)?;
        }
        Ok(())
    }
}

fn reject_separators(value: &str, separators: &[char], format: &str) -> Result<()> {
    if value.contains(separators) {
        return Err(Error::InvalidInput(format!(
            "Value cannot be represented in {} without escaping: {:?}",
            format, value
        )));
    }
    Ok(())
}

/// Fail unless the record carries speech data
fn require_speech(writer: &str, record: &AudioRecord) -> Result<()> {
    if record.data_type() != DataType::Speech {
        return Err(Error::InvalidInput(format!(
            "{} accepts only speech data, got {} for {}",
            writer,
            record.data_type(),
            record.audio_name()
        )));
    }
    Ok(())
}

/// Metadata value as plain text (strings without quotes)
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
