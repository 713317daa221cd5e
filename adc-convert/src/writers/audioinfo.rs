//! Audio information report (text, CSV or JSON)

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use adc_common::{AudioRecord, Error, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Map, Value};

use crate::pipeline::BatchWriter;
use crate::session::Session;

/// Report layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

/// Options for `to-audioinfo`
#[derive(Args, Debug, Clone, Default)]
pub struct AudioInfoOptions {
    /// The file to store the audio information in; outputs to stdout if no file provided
    #[arg(short = 'o', long = "output_file")]
    pub output_file: Option<String>,

    /// The format to use for the output
    #[arg(short = 'f', long = "output_format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

/// One report row
#[derive(Debug, Clone, PartialEq)]
struct AudioInfo {
    file_name: String,
    file_size: Option<u64>,
    sample_rate: Option<u32>,
    mono: Option<bool>,
    duration: Option<f64>,
    annotation: Option<String>,
}

impl AudioInfo {
    /// Collect the information, decoding the audio at most once
    fn of(record: &AudioRecord) -> Self {
        let decoded = match (record.sample_rate(), record.duration(), record.samples()) {
            (Some(_), Some(_), Some(_)) => None,
            _ => record.decoded(),
        };
        let sample_rate = record.sample_rate().or(decoded.as_ref().map(|d| d.sample_rate));
        let duration = record.duration().or(decoded.as_ref().map(|d| d.duration_seconds()));
        let mono = match record.samples() {
            Some(samples) => Some(samples.is_mono()),
            None => decoded.as_ref().map(|d| d.samples.is_mono()),
        };
        Self {
            file_name: record.audio_name().to_string(),
            file_size: record.file_size(),
            sample_rate,
            mono,
            duration,
            annotation: record.annotation().map(str::to_string),
        }
    }
}

/// Outputs information about the audio files: file name, size, sample rate, mono and duration plus the annotation
#[derive(Default)]
pub struct AudioInfoWriter {
    options: AudioInfoOptions,
    rows: Vec<AudioInfo>,
    label: Option<&'static str>,
}

impl AudioInfoWriter {
    pub fn new(options: AudioInfoOptions) -> Self {
        Self {
            options,
            rows: Vec::new(),
            label: None,
        }
    }

    /// Column name of the annotation, taken from the first record's data type
    fn label(&self) -> &'static str {
        self.label.unwrap_or("additional")
    }

    fn output_path(&self) -> Option<PathBuf> {
        self.options
            .output_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
    }

    /// Render the report in the configured format
    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        match self.options.output_format {
            OutputFormat::Text => self.render_text(out),
            OutputFormat::Csv => self.render_csv(out),
            OutputFormat::Json => self.render_json(out),
        }
    }

    fn render_text(&self, out: &mut dyn Write) -> Result<()> {
        let blocks: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                format!(
                    "{}\n  - file_size: {}\n  - sample_rate: {}\n  - mono: {}\n  - duration (sec): {}\n  - {}: {}",
                    row.file_name,
                    text_or_dash(row.file_size),
                    text_or_dash(row.sample_rate),
                    text_or_dash(row.mono),
                    row.duration.map_or_else(|| "-".to_string(), |d| format!("{:.6}", d)),
                    self.label(),
                    row.annotation.as_deref().unwrap_or("-"),
                )
            })
            .collect();
        writeln!(out, "{}", blocks.join("\n"))?;
        Ok(())
    }

    fn render_csv(&self, out: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer
            .write_record(["file_name", "file_size", "sample_rate", "mono", "duration_seconds", self.label()])
            .map_err(csv_error)?;
        for row in &self.rows {
            writer
                .write_record([
                    row.file_name.clone(),
                    text_or_empty(row.file_size),
                    text_or_empty(row.sample_rate),
                    text_or_empty(row.mono),
                    text_or_empty(row.duration),
                    row.annotation.clone().unwrap_or_default(),
                ])
                .map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn render_json(&self, out: &mut dyn Write) -> Result<()> {
        let data: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let mut entry = Map::new();
                entry.insert("file_name".into(), json!(row.file_name));
                entry.insert("file_size".into(), json!(row.file_size));
                entry.insert("sample_rate".into(), json!(row.sample_rate));
                entry.insert("mono".into(), json!(row.mono));
                entry.insert("duration_seconds".into(), json!(row.duration));
                entry.insert(self.label().into(), json!(row.annotation));
                Value::Object(entry)
            })
            .collect();
        let text = serde_json::to_string_pretty(&data)
            .map_err(|e| Error::Encode(format!("Failed to serialize audio info: {}", e)))?;
        writeln!(out, "{}", text)?;
        Ok(())
    }
}

fn text_or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn text_or_empty<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_error(e: csv::Error) -> Error {
    Error::Encode(format!("Failed to write CSV: {}", e))
}

impl BatchWriter for AudioInfoWriter {
    fn name(&self) -> &'static str {
        "to-audioinfo"
    }

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        self.rows.clear();
        self.label = None;
        Ok(())
    }

    fn write_batch(&mut self, records: &[AudioRecord], _session: &Session) -> Result<()> {
        for record in records {
            self.rows.push(AudioInfo::of(record));
            if self.label.is_none() {
                self.label = Some(record.data_type().annotation_key());
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        match self.output_path() {
            Some(path) => {
                tracing::info!(path = %path.display(), rows = self.rows.len(), "Writing audio info");
                let mut out = BufWriter::new(File::create(&path)?);
                self.render(&mut out)?;
                out.flush()?;
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                self.render(&mut out)?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_common::{AudioSamples, DataType};

    fn writer(format: OutputFormat) -> AudioInfoWriter {
        let mut writer = AudioInfoWriter::new(AudioInfoOptions {
            output_file: None,
            output_format: format,
        });
        let record = AudioRecord::builder(DataType::Classification)
            .audio_name("dog.wav")
            .samples(AudioSamples::mono(vec![0.0; 8000]), 16000)
            .annotation("dog")
            .build()
            .unwrap();
        writer.write_batch(&[record], &Session::default()).unwrap();
        writer
    }

    fn rendered(format: OutputFormat) -> String {
        let mut out = Vec::new();
        writer(format).render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_report() {
        let text = rendered(OutputFormat::Text);
        assert!(text.starts_with("dog.wav\n"));
        assert!(text.contains("  - sample_rate: 16000\n"));
        assert!(text.contains("  - mono: true\n"));
        assert!(text.contains("  - duration (sec): 0.500000\n"));
        assert!(text.contains("  - label: dog"));
    }

    #[test]
    fn test_csv_report_uses_label_column() {
        let text = rendered(OutputFormat::Csv);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("file_name,file_size,sample_rate,mono,duration_seconds,label")
        );
        assert_eq!(lines.next(), Some("dog.wav,,16000,true,0.5,dog"));
    }

    #[test]
    fn test_json_report() {
        let value: Value = serde_json::from_str(&rendered(OutputFormat::Json)).unwrap();
        assert_eq!(value[0]["file_name"], "dog.wav");
        assert_eq!(value[0]["sample_rate"], 16000);
        assert_eq!(value[0]["mono"], true);
        assert_eq!(value[0]["label"], "dog");
        assert!(value[0]["file_size"].is_null());
    }

    #[test]
    fn test_empty_label_defaults() {
        assert_eq!(AudioInfoWriter::default().label(), "additional");
    }
}
