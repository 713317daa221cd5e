//! Deterministic WAV fixtures

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Standard fixture sample rate
pub const TEST_SAMPLE_RATE: u32 = 16000;

/// Sine wave, same signal on every channel, 16-bit PCM
pub fn generate_sine_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    channels: u16,
    duration_ms: u64,
    frequency_hz: f32,
    amplitude: f32,
) -> Result<(), hound::Error> {
    ensure_parent(path.as_ref())?;
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let frames = sample_rate as u64 * duration_ms / 1000;
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let value = (amplitude * (2.0 * PI * frequency_hz * t).sin() * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()
}

/// Mono sine burst surrounded by digital silence
pub fn generate_padded_sine_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    silence_ms: u64,
    tone_ms: u64,
) -> Result<(), hound::Error> {
    ensure_parent(path.as_ref())?;
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let silence = sample_rate as u64 * silence_ms / 1000;
    let tone = sample_rate as u64 * tone_ms / 1000;
    for _ in 0..silence {
        writer.write_sample(0i16)?;
    }
    for n in 0..tone {
        let t = n as f32 / sample_rate as f32;
        writer.write_sample((0.5 * (2.0 * PI * 440.0 * t).sin() * i16::MAX as f32) as i16)?;
    }
    for _ in 0..silence {
        writer.write_sample(0i16)?;
    }
    writer.finalize()
}

fn ensure_parent(path: &Path) -> Result<(), hound::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Convenience: one second mono 440 Hz tone at [`TEST_SAMPLE_RATE`]
pub fn generate_tone<P: AsRef<Path>>(path: P) {
    generate_sine_wav(path, TEST_SAMPLE_RATE, 1, 1000, 440.0, 0.5).unwrap();
}

/// (channels, sample rate, frames) of a WAV file
pub fn wav_shape<P: AsRef<Path>>(path: P) -> (u16, u32, u32) {
    let reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    (spec.channels, spec.sample_rate, reader.duration())
}
