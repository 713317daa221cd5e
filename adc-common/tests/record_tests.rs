//! AudioRecord behaviour against files on disk

use std::fs;

use adc_common::audio::encode_wav;
use adc_common::{AudioFormat, AudioRecord, AudioSamples, DataType, Error};
use tempfile::TempDir;

fn tone(frames: usize) -> AudioSamples {
    AudioSamples::mono(
        (0..frames)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect(),
    )
}

#[test]
fn test_source_record_decodes_and_saves() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in.wav");
    fs::write(&source, encode_wav(&tone(800), 8000).unwrap()).unwrap();

    let record = AudioRecord::from_source(DataType::Speech, &source).unwrap();
    assert_eq!(record.format(), AudioFormat::Wav);
    assert_eq!(record.is_mono(), Some(true));

    let decoded = record.decoded().unwrap();
    assert_eq!(decoded.sample_rate, 8000);
    assert_eq!(decoded.samples.frames(), 800);

    let target = dir.path().join("out/nested/in.wav");
    record.save_audio(&target, true).unwrap();
    assert_eq!(fs::read(&target).unwrap(), fs::read(&source).unwrap());
}

#[test]
fn test_save_rejects_mismatched_extension() {
    let dir = TempDir::new().unwrap();
    let record = AudioRecord::builder(DataType::Speech)
        .audio_name("a.wav")
        .samples(tone(10), 8000)
        .build()
        .unwrap();

    let result = record.save_audio(&dir.path().join("a.mp3"), false);
    assert!(matches!(result, Err(Error::Encode(_))));
}

#[test]
fn test_samples_saved_as_wav() {
    let dir = TempDir::new().unwrap();
    let record = AudioRecord::builder(DataType::Classification)
        .audio_name("dog.wav")
        .annotation("dog")
        .samples(tone(160), 16000)
        .build()
        .unwrap();

    let target = dir.path().join("dog.wav");
    record.save_audio(&target, false).unwrap();

    let reader = hound::WavReader::open(&target).unwrap();
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.len(), 160);
}

#[test]
fn test_missing_source_decodes_to_none() {
    let record = AudioRecord::from_source(DataType::Speech, "/nonexistent/x.wav").unwrap();
    assert!(record.decoded().is_none());
    assert!(record.audio_bytes().is_err());
}
