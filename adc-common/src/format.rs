//! Audio container formats and their canonical file extensions
//!
//! The format table is closed: every format maps to exactly one extension, and
//! extensions are matched case-insensitively when going the other way.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

/// Supported audio container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

/// All formats, in registry order
pub const FORMATS: [AudioFormat; 2] = [AudioFormat::Mp3, AudioFormat::Wav];

impl AudioFormat {
    /// Canonical file extension, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => ".mp3",
            AudioFormat::Wav => ".wav",
        }
    }

    /// Upper-case format name as used in reports
    pub fn name(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "MP3",
            AudioFormat::Wav => "WAV",
        }
    }

    /// Look up the format for an extension (with or without leading dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        FORMATS
            .iter()
            .copied()
            .find(|f| f.extension()[1..] == ext)
    }

    /// Determine the format from a file name's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Determine the format from the leading bytes of an encoded payload.
    ///
    /// RIFF/WAVE headers are reported as WAV. Everything else, including
    /// payloads `infer` does not recognise, falls back to MP3.
    pub fn from_bytes(data: &[u8]) -> Self {
        if infer::audio::is_wav(data) {
            AudioFormat::Wav
        } else {
            if !infer::audio::is_mp3(data) {
                tracing::debug!(
                    len = data.len(),
                    "Unrecognised audio signature, assuming MP3"
                );
            }
            AudioFormat::Mp3
        }
    }

    /// Replace the extension of `name` with this format's canonical extension
    pub fn rename(&self, name: &str) -> String {
        format!("{}{}", split_extension(name).0, self.extension())
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MP3" => Ok(AudioFormat::Mp3),
            "WAV" => Ok(AudioFormat::Wav),
            _ => Err(Error::Config(format!("Unsupported audio format: {}", s))),
        }
    }
}

/// Split a file name into stem and extension (extension keeps its dot).
///
/// Leading dots do not start an extension, so `.hidden` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let file_start = name.rfind(&['/', '\\'][..]).map(|i| i + 1).unwrap_or(0);
    match name[file_start..].rfind('.') {
        Some(0) | None => (name, ""),
        Some(pos) => name.split_at(file_start + pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_round_trip_for_every_format() {
        for format in FORMATS {
            assert_eq!(AudioFormat::from_extension(format.extension()), Some(format));
        }
    }

    #[test]
    fn test_from_extension_is_case_insensitive() {
        assert_eq!(AudioFormat::from_extension(".MP3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_extension("WaV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_extension(".flac"), None);
    }

    #[test]
    fn test_from_bytes_detects_riff_wave() {
        let mut header = Vec::new();
        header.extend_from_slice(b"RIFF");
        header.extend_from_slice(&[0x24, 0, 0, 0]);
        header.extend_from_slice(b"WAVEfmt ");
        assert_eq!(AudioFormat::from_bytes(&header), AudioFormat::Wav);
    }

    #[test]
    fn test_from_bytes_defaults_to_mp3() {
        assert_eq!(AudioFormat::from_bytes(b"ID3\x03\x00"), AudioFormat::Mp3);
        assert_eq!(AudioFormat::from_bytes(b"garbage"), AudioFormat::Mp3);
        assert_eq!(AudioFormat::from_bytes(&[]), AudioFormat::Mp3);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.wav"), ("a", ".wav"));
        assert_eq!(split_extension("dir.x/a"), ("dir.x/a", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("a.b.mp3"), ("a.b", ".mp3"));
    }

    #[test]
    fn test_rename() {
        assert_eq!(AudioFormat::Wav.rename("clip.mp3"), "clip.wav");
        assert_eq!(AudioFormat::Wav.rename("clip"), "clip.wav");
    }

    #[test]
    fn test_parse_format_name() {
        assert_eq!("wav".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
        assert!("ogg".parse::<AudioFormat>().is_err());
    }
}
