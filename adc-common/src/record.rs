//! Audio record data model
//!
//! An [`AudioRecord`] is one audio item plus its annotation and metadata.
//! Records are immutable once built; filters derive new records through
//! [`AudioRecord::to_builder`], which keeps the data type of the original.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::audio::{decode_audio_from_bytes, decode_audio_from_file, encode_wav, AudioSamples, DecodedAudio};
use crate::{AudioFormat, DataType, Error, Result};

/// Record metadata: string keys to scalar values
pub type Metadata = BTreeMap<String, Value>;

/// One audio item plus annotation
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRecord {
    data_type: DataType,
    source: Option<PathBuf>,
    audio_name: String,
    raw_bytes: Option<Vec<u8>>,
    samples: Option<AudioSamples>,
    format: AudioFormat,
    duration: Option<f64>,
    sample_rate: Option<u32>,
    metadata: Option<Metadata>,
    annotation: Option<String>,
}

impl AudioRecord {
    /// Start building a record of the given data type
    pub fn builder(data_type: DataType) -> RecordBuilder {
        RecordBuilder::new(data_type)
    }

    /// Record backed by an audio file on disk, without annotation
    pub fn from_source(data_type: DataType, source: impl Into<PathBuf>) -> Result<Self> {
        RecordBuilder::new(data_type).source(source).build()
    }

    /// Builder pre-filled with every field of this record ("clone with overrides")
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            data_type: self.data_type,
            source: self.source.clone(),
            audio_name: Some(self.audio_name.clone()),
            raw_bytes: self.raw_bytes.clone(),
            samples: self.samples.clone(),
            format: Some(self.format),
            duration: self.duration,
            sample_rate: self.sample_rate,
            metadata: self.metadata.clone(),
            annotation: self
                .annotation
                .as_ref()
                .map(|a| Value::String(a.clone()))
                .unwrap_or(Value::Null),
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Logical file name, used to derive output paths
    pub fn audio_name(&self) -> &str {
        &self.audio_name
    }

    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.raw_bytes.as_deref()
    }

    pub fn samples(&self) -> Option<&AudioSamples> {
        self.samples.as_ref()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// True iff an annotation is present and non-empty
    pub fn has_annotation(&self) -> bool {
        self.annotation.as_ref().is_some_and(|a| !a.is_empty())
    }

    /// Annotation as exchange dictionary (`label` or `transcript` key)
    pub fn annotation_to_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert(
            self.data_type.annotation_key().to_string(),
            self.annotation
                .as_ref()
                .map(|a| Value::String(a.clone()))
                .unwrap_or(Value::Null),
        );
        dict
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Look up one metadata value
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }

    /// Decode the audio on demand.
    ///
    /// Uses in-memory samples when present, otherwise decodes the raw bytes
    /// or the source file. The result is not cached on the record. `None`
    /// means the audio could not be decoded (already logged).
    pub fn decoded(&self) -> Option<DecodedAudio> {
        if let (Some(samples), Some(sample_rate)) = (&self.samples, self.sample_rate) {
            return Some(DecodedAudio {
                samples: samples.clone(),
                sample_rate,
            });
        }
        if let Some(data) = &self.raw_bytes {
            return decode_audio_from_bytes(data, self.format.extension());
        }
        if let Some(source) = &self.source {
            return decode_audio_from_file(source);
        }
        tracing::warn!(audio_name = %self.audio_name, "Record has no audio to decode");
        None
    }

    /// Number of channels, decoding if necessary
    pub fn channel_count(&self) -> Option<usize> {
        match &self.samples {
            Some(samples) => Some(samples.channel_count()),
            None => self.decoded().map(|d| d.samples.channel_count()),
        }
    }

    /// Whether the audio is single-channel, decoding if necessary
    pub fn is_mono(&self) -> Option<bool> {
        self.channel_count().map(|c| c == 1)
    }

    /// Size of the encoded payload in bytes, if known without encoding
    pub fn file_size(&self) -> Option<u64> {
        if let Some(data) = &self.raw_bytes {
            return Some(data.len() as u64);
        }
        self.source
            .as_ref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| m.len())
    }

    /// Encoded audio payload.
    ///
    /// Raw bytes are returned as-is; decoded samples are encoded as WAV (only
    /// valid for WAV records); otherwise the source file is read.
    pub fn audio_bytes(&self) -> Result<Cow<'_, [u8]>> {
        if let Some(data) = &self.raw_bytes {
            return Ok(Cow::Borrowed(data));
        }
        if let Some(samples) = &self.samples {
            if self.format != AudioFormat::Wav {
                return Err(Error::Encode(format!(
                    "Cannot encode {} from samples for {}, convert to WAV first",
                    self.format, self.audio_name
                )));
            }
            let sample_rate = self.sample_rate.ok_or_else(|| {
                Error::Encode(format!("No sample rate for {}", self.audio_name))
            })?;
            return encode_wav(samples, sample_rate).map(Cow::Owned);
        }
        if let Some(source) = &self.source {
            return Ok(Cow::Owned(fs::read(source)?));
        }
        Err(Error::Encode(format!("No audio data for {}", self.audio_name)))
    }

    /// Write the encoded audio to `path`.
    ///
    /// The target extension must agree with the record's format.
    pub fn save_audio(&self, path: &Path, make_dirs: bool) -> Result<()> {
        if let Some(target) = AudioFormat::from_path(path) {
            if target != self.format {
                return Err(Error::Encode(format!(
                    "Record {} is {} but target is {}",
                    self.audio_name,
                    self.format,
                    path.display()
                )));
            }
        }
        if make_dirs {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = self.audio_bytes()?;
        fs::write(path, data.as_ref())?;
        Ok(())
    }
}

/// Builder for [`AudioRecord`]
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    data_type: DataType,
    source: Option<PathBuf>,
    audio_name: Option<String>,
    raw_bytes: Option<Vec<u8>>,
    samples: Option<AudioSamples>,
    format: Option<AudioFormat>,
    duration: Option<f64>,
    sample_rate: Option<u32>,
    metadata: Option<Metadata>,
    annotation: Value,
}

impl RecordBuilder {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            source: None,
            audio_name: None,
            raw_bytes: None,
            samples: None,
            format: None,
            duration: None,
            sample_rate: None,
            metadata: None,
            annotation: Value::Null,
        }
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn audio_name(mut self, name: impl Into<String>) -> Self {
        self.audio_name = Some(name.into());
        self
    }

    pub fn raw_bytes(mut self, data: Vec<u8>) -> Self {
        self.raw_bytes = Some(data);
        self
    }

    /// Set decoded samples and their rate. Drops raw bytes and source, which
    /// no longer describe the audio.
    pub fn samples(mut self, samples: AudioSamples, sample_rate: u32) -> Self {
        self.duration = Some(samples.duration_seconds(sample_rate));
        self.samples = Some(samples);
        self.sample_rate = Some(sample_rate);
        self.raw_bytes = None;
        self.source = None;
        self
    }

    pub fn format(mut self, format: AudioFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration;
        self
    }

    pub fn sample_rate(mut self, sample_rate: Option<u32>) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Value::String(annotation.into());
        self
    }

    /// Untyped annotation, validated against the data type in [`build`](Self::build)
    pub fn annotation_value(mut self, value: Value) -> Self {
        self.annotation = value;
        self
    }

    pub fn clear_annotation(mut self) -> Self {
        self.annotation = Value::Null;
        self
    }

    /// Validate and assemble the record.
    ///
    /// The audio name defaults to the source's file name; the format is taken
    /// from (in order) the explicit setting, the name's extension, a sniff of
    /// the raw bytes or source file, falling back to MP3.
    pub fn build(self) -> Result<AudioRecord> {
        let annotation = self.data_type.validate_annotation(&self.annotation)?;

        let audio_name = match (self.audio_name, &self.source) {
            (Some(name), _) => name,
            (None, Some(source)) => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    Error::InvalidInput(format!("Source has no file name: {}", source.display()))
                })?,
            (None, None) => {
                return Err(Error::InvalidInput(
                    "Record needs an audio name or a source".to_string(),
                ))
            }
        };

        let format = self
            .format
            .or_else(|| AudioFormat::from_extension(crate::format::split_extension(&audio_name).1))
            .unwrap_or_else(|| match (&self.raw_bytes, &self.source) {
                (Some(data), _) => AudioFormat::from_bytes(data),
                (None, Some(source)) => sniff_file(source),
                (None, None) => AudioFormat::Mp3,
            });

        Ok(AudioRecord {
            data_type: self.data_type,
            source: self.source,
            audio_name,
            raw_bytes: self.raw_bytes,
            samples: self.samples,
            format,
            duration: self.duration,
            sample_rate: self.sample_rate,
            metadata: self.metadata,
            annotation,
        })
    }
}

/// Sniff the format from the first bytes of a file
fn sniff_file(path: &Path) -> AudioFormat {
    let mut header = [0u8; 16];
    let read = fs::File::open(path).and_then(|mut f| f.read(&mut header));
    match read {
        Ok(n) => AudioFormat::from_bytes(&header[..n]),
        Err(_) => AudioFormat::Mp3,
    }
}
