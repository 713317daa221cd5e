//! Reader for Common Voice TSV files
//!
//! Fields are split strictly on tabs; quote characters carry no meaning.

use std::fs;
use std::path::Path;

use adc_common::{AudioRecord, DataType, Error, Result};
use clap::Args;

use super::{InputOptions, InputQueue};
use crate::pipeline::Reader;
use crate::session::Session;

/// Current Common Voice header
pub const COMMONVOICE_HEADER: &str =
    "client_id\tpath\tsentence\tup_votes\tdown_votes\tage\tgender\taccents\tlocale\tsegment";

/// Header of older releases (`accent` instead of `accents`)
pub const COMMONVOICE_HEADER_LEGACY: &str =
    "client_id\tpath\tsentence\tup_votes\tdown_votes\tage\tgender\taccent\tlocale\tsegment";

/// Columns copied into the record metadata
const METADATA_COLUMNS: [&str; 6] = ["client_id", "up_votes", "down_votes", "age", "gender", "locale"];

/// Options for `from-commonvoice-sp`
#[derive(Args, Debug, Clone)]
pub struct CommonVoiceReaderOptions {
    #[command(flatten)]
    pub input: InputOptions,

    /// The relative path to the audio files
    #[arg(short = 'r', long = "rel_path", default_value = ".")]
    pub rel_path: String,
}

impl Default for CommonVoiceReaderOptions {
    fn default() -> Self {
        Self {
            input: InputOptions::default(),
            rel_path: ".".to_string(),
        }
    }
}

/// Reads speech data in Common Voice format (https://commonvoice.mozilla.org/)
pub struct CommonVoiceReader {
    options: CommonVoiceReaderOptions,
    queue: InputQueue,
}

impl CommonVoiceReader {
    pub fn new(options: CommonVoiceReaderOptions) -> Self {
        Self {
            options,
            queue: InputQueue::default(),
        }
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<Option<AudioRecord>>> {
        let mut lines = content.split('\n');
        let header = lines.next().unwrap_or_default();
        let columns: Vec<&str> = if header == COMMONVOICE_HEADER {
            COMMONVOICE_HEADER.split('\t').collect()
        } else if header == COMMONVOICE_HEADER_LEGACY {
            COMMONVOICE_HEADER_LEGACY.split('\t').collect()
        } else {
            return Err(Error::InvalidInput(format!(
                "Expected header: {} or {}\nSeen header: {}",
                COMMONVOICE_HEADER, COMMONVOICE_HEADER_LEGACY, header
            )));
        };

        let basedir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut records = Vec::new();
        for line in lines {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let column = |name: &str| -> &str {
                columns
                    .iter()
                    .position(|c| *c == name)
                    .and_then(|i| fields.get(i).copied())
                    .unwrap_or_default()
            };

            let audio = basedir.join(&self.options.rel_path).join(column("path"));
            if !audio.exists() {
                tracing::warn!(path = %audio.display(), "Audio file not found");
                records.push(None);
                continue;
            }

            let mut builder = AudioRecord::builder(DataType::Speech)
                .source(audio)
                .annotation(column("sentence"));
            for name in METADATA_COLUMNS {
                builder = builder.metadata_entry(name, column(name));
            }
            records.push(Some(builder.build()?));
        }

        Ok(records)
    }
}

impl Reader for CommonVoiceReader {
    fn name(&self) -> &'static str {
        "from-commonvoice-sp"
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        self.queue.resolve(&self.options.input, "*.tsv", session)
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
