//! Audio Decoding Utilities
//!
//! **Purpose:** Turn encoded audio (files or in-memory payloads) into planar
//! f32 samples plus sample rate.
//!
//! Two decoders are chained: `hound` handles PCM/float WAV directly, and
//! `symphonia` is the fallback for everything else (MP3, odd WAV variants).
//! Both failing is not fatal: the error is logged and `None` returned, so a
//! single corrupt file cannot abort a batch run.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::AudioSamples;

/// Decoded audio result
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Planar samples, range [-1.0, 1.0]
    pub samples: AudioSamples,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.duration_seconds(self.sample_rate)
    }
}

/// Decode an audio file, trying `hound` first and `symphonia` second.
///
/// Returns `None` (after logging) when neither decoder can read the file.
pub fn decode_audio_from_file(path: &Path) -> Option<DecodedAudio> {
    tracing::debug!(path = %path.display(), "Decoding audio file");

    let primary = hound::WavReader::open(path)
        .map_err(|e| anyhow!(e))
        .and_then(decode_wav);
    let primary_err = match primary {
        Ok(decoded) => return Some(decoded),
        Err(e) => e,
    };

    tracing::debug!(
        path = %path.display(),
        error = %primary_err,
        "WAV decoder failed, falling back to symphonia"
    );

    let fallback = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))
        .and_then(|file| {
            let ext = path.extension().and_then(|e| e.to_str());
            decode_with_symphonia(Box::new(file), ext)
        });

    match fallback {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                "Failed to read audio: {:?}",
                e.context(primary_err)
            );
            None
        }
    }
}

/// Decode an in-memory payload.
///
/// Tries the WAV decoder on the bytes directly; if that fails the payload is
/// written to a temporary file with extension `ext` and decoded via
/// [`decode_audio_from_file`]. The temporary file is removed on every path.
pub fn decode_audio_from_bytes(data: &[u8], ext: &str) -> Option<DecodedAudio> {
    let in_memory = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| anyhow!(e))
        .and_then(decode_wav);
    if let Ok(decoded) = in_memory {
        return Some(decoded);
    }

    let suffix = if ext.is_empty() || ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    };

    // NamedTempFile deletes itself when dropped at the end of this scope
    let temp = tempfile::Builder::new()
        .prefix("adc-")
        .suffix(&suffix)
        .tempfile()
        .and_then(|mut file| {
            file.write_all(data)?;
            file.flush()?;
            Ok(file)
        });

    match temp {
        Ok(file) => decode_audio_from_file(file.path()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to write temporary audio file");
            None
        }
    }
}

/// Decode a WAV stream with hound
fn decode_wav<R: Read>(reader: hound::WavReader<R>) -> Result<DecodedAudio> {
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Ok(DecodedAudio {
        samples: AudioSamples::from_interleaved(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

/// Decode any symphonia-supported container
///
/// **Algorithm:**
/// 1. Probe format using the extension as hint
/// 2. Find default audio track and create its decoder
/// 3. Decode all packets, converting to interleaved f32
/// 4. De-interleave into planar samples
fn decode_with_symphonia(source: Box<dyn MediaSource>, ext: Option<&str>) -> Result<DecodedAudio> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = ext {
        hint.with_extension(ext.trim_start_matches('.'));
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio")?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channel_count = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut interleaved: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(anyhow!("Error reading packet: {}", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frame: skip it, keep the rest of the stream
            Err(SymphoniaError::DecodeError(msg)) => {
                tracing::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(anyhow!("Failed to decode packet: {}", e)),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channel_count.get_or_insert(spec.channels.count());

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(buffer.samples());
    }

    let sample_rate = sample_rate.context("Sample rate unknown")?;
    let channel_count = channel_count.context("Channels unknown")?;

    Ok(DecodedAudio {
        samples: AudioSamples::from_interleaved(&interleaved, channel_count),
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::encode_wav;
    use serial_test::serial;

    #[test]
    fn test_decode_missing_file_is_none() {
        assert!(decode_audio_from_file(Path::new("/nonexistent/file.wav")).is_none());
    }

    #[test]
    fn test_decode_wav_bytes_in_memory() {
        let samples = AudioSamples::new(vec![vec![0.0, 0.5, -0.5], vec![0.25, 0.0, 0.0]]);
        let bytes = encode_wav(&samples, 8000).unwrap();

        let decoded = decode_audio_from_bytes(&bytes, ".wav").unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.channel_count(), 2);
        assert_eq!(decoded.samples.frames(), 3);
        assert!((decoded.samples.channels()[0][1] - 0.5).abs() < 1e-3);
    }

    #[test]
    #[serial(temp_audio)]
    fn test_decode_garbage_bytes_is_none() {
        let before = temp_audio_files();
        assert!(decode_audio_from_bytes(b"definitely not audio", ".mp3").is_none());
        assert_eq!(temp_audio_files(), before);
    }

    /// Mono 8-bit mu-law WAV (format tag 7), which hound does not support
    fn mulaw_wav(sample_rate: u32, frames: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(4 + 26 + 8 + frames).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&18u32.to_le_bytes());
        bytes.extend_from_slice(&7u16.to_le_bytes()); // mu-law
        bytes.extend_from_slice(&1u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&1u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&8u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(&0u16.to_le_bytes()); // extra size
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&frames.to_le_bytes());
        bytes.extend((0..frames).map(|i| if i % 2 == 0 { 0x80 } else { 0x00 }));
        bytes
    }

    /// Leftover temp files written by the byte-decoding fallback
    fn temp_audio_files() -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("adc-"))
            .collect();
        names.sort();
        names
    }

    #[test]
    #[serial(temp_audio)]
    fn test_decode_falls_back_to_symphonia_and_removes_temp_file() {
        let bytes = mulaw_wav(8000, 800);
        assert!(hound::WavReader::new(Cursor::new(&bytes[..])).is_err());

        let before = temp_audio_files();
        let decoded = decode_audio_from_bytes(&bytes, ".wav").unwrap();
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.channel_count(), 1);
        assert_eq!(decoded.samples.frames(), 800);
        assert_eq!(temp_audio_files(), before);
    }
}
