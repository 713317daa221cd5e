//! Reader for ADAMS `.report` files with companion audio

use adc_common::locate::locate_audio;
use adc_common::{AudioRecord, DataType, Error, Result};
use clap::Args;

use super::report::Report;
use super::{InputOptions, InputQueue};
use crate::pipeline::Reader;
use crate::session::Session;

/// Options for `from-adams-ac`
#[derive(Args, Debug, Clone, Default)]
pub struct AdamsClassificationOptions {
    #[command(flatten)]
    pub input: InputOptions,

    /// The report field containing the audio classification label
    #[arg(short = 'c', long = "class_field", value_name = "FIELD")]
    pub class_field: String,
}

/// Options for `from-adams-sp`
#[derive(Args, Debug, Clone, Default)]
pub struct AdamsSpeechOptions {
    #[command(flatten)]
    pub input: InputOptions,

    /// The report field containing the audio transcription
    #[arg(short = 't', long = "transcript_field", value_name = "FIELD")]
    pub transcript_field: String,
}

/// Loads the annotation from a field of each report; all fields become metadata
pub struct AdamsReader {
    data_type: DataType,
    input: InputOptions,
    field: String,
    queue: InputQueue,
}

impl AdamsReader {
    pub fn new(data_type: DataType, input: InputOptions, field: impl Into<String>) -> Self {
        Self {
            data_type,
            input,
            field: field.into(),
            queue: InputQueue::default(),
        }
    }

    pub fn classification(options: AdamsClassificationOptions) -> Self {
        Self::new(DataType::Classification, options.input, options.class_field)
    }

    pub fn speech(options: AdamsSpeechOptions) -> Self {
        Self::new(DataType::Speech, options.input, options.transcript_field)
    }
}

impl Reader for AdamsReader {
    fn name(&self) -> &'static str {
        match self.data_type {
            DataType::Classification => "from-adams-ac",
            DataType::Speech => "from-adams-sp",
        }
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        if self.field.is_empty() {
            return Err(Error::Config(format!(
                "No annotation field defined for {}",
                self.name()
            )));
        }
        self.queue.resolve(&self.input, "*.report", session)
    }

    fn read(&mut self, session: &mut Session) -> Result<Vec<Option<AudioRecord>>> {
        let path = self.queue.next(self.name(), session)?;
        let report = Report::load(&path)?;

        let Some(audio) = locate_audio(&path, None, None) else {
            tracing::warn!(path = %path.display(), "No associated audio file found");
            return Ok(vec![None]);
        };

        let mut builder = AudioRecord::builder(self.data_type)
            .source(audio)
            .metadata(report.to_metadata());
        if let Some(annotation) = report.string_value(&self.field) {
            builder = builder.annotation(annotation);
        }
        Ok(vec![Some(builder.build()?)])
    }

    fn has_finished(&self) -> bool {
        self.queue.has_finished()
    }
}
