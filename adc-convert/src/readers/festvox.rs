//! Reader for FestVox `( name "transcript" )` files

use std::fs;
use std::path::Path;

use adc_common::{AudioRecord, DataType, Error, Result};
use clap::Args;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{InputOptions, InputQueue};
use crate::pipeline::Reader;
use crate::session::Session;

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\( (?P<filename>.*) "(?P<transcription>.*)" \)$"#).expect("valid FestVox regex")
});

/// Options for `from-festvox-sp`
#[derive(Args, Debug, Clone)]
pub struct FestVoxReaderOptions {
    #[command(flatten)]
    pub input: InputOptions,

    /// The relative path to the audio files
    #[arg(short = 'r', long = "rel_path", default_value = ".")]
    pub rel_path: String,
}

impl Default for FestVoxReaderOptions {
    fn default() -> Self {
        Self {
            input: InputOptions::default(),
            rel_path: ".".to_string(),
        }
    }
}

/// Reads speech data in FestVox format
pub struct FestVoxReader {
    options: FestVoxReaderOptions,
    queue: InputQueue,
}

impl FestVoxReader {
    pub fn new(options: FestVoxReaderOptions) -> Self {
        Self {
            options,
            queue: InputQueue::default(),
        }
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Option<AudioRecord>>> {
        let basedir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut records = Vec::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            let caps = LINE_PATTERN
                .captures(line)
                .ok_or_else(|| Error::InvalidInput(format!("Bad FestVox line: {}", line)))?;

            let mut filename = caps["filename"].to_string();
            if !filename.to_lowercase().ends_with(".wav") {
                filename.push_str(".wav");
            }

            let audio = basedir.join(&self.options.rel_path).join(&filename);
            if !audio.exists() {
                tracing::warn!(path = %audio.display(), "Audio file not found");
                records.push(None);
                continue;
            }

            records.push(Some(
                AudioRecord::builder(DataType::Speech)
                    .source(audio)
                    .annotation(&caps["transcription"])
                    .build()?,
            ));
        }

        Ok(records)
    }
}

impl Reader for FestVoxReader {
    fn name(&self) -> &'static str {
        "from-festvox-sp"
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        self.queue.resolve(&self.options.input, "*.txt", session)
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
