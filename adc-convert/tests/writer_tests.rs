//! Writer integration tests: manifests, audio layout and splits

mod helpers;

use std::fs;
use std::path::Path;

use adc_common::{AudioRecord, DataType, Error};
use adc_convert::pipeline::{BatchWriter, StreamWriter};
use adc_convert::readers::COMMONVOICE_HEADER;
use adc_convert::writers::{
    AudioInfoOptions, AudioInfoWriter, CommonVoiceWriter, CommonVoiceWriterOptions, FestVoxWriter,
    FestVoxWriterOptions, MetadataWriter, MetadataWriterOptions, OutputFormat, PiperWriter, PiperWriterOptions,
    SplitOptions, TxtWriter, TxtWriterOptions,
};
use adc_convert::Session;
use helpers::audio_generator::{generate_tone, wav_shape, TEST_SAMPLE_RATE};
use tempfile::TempDir;

fn speech(dir: &Path, name: &str, transcript: Option<&str>) -> AudioRecord {
    let path = dir.join("in").join(name);
    generate_tone(&path);
    let mut builder = AudioRecord::builder(DataType::Speech).source(path);
    if let Some(t) = transcript {
        builder = builder.annotation(t);
    }
    builder.build().unwrap()
}

fn write_batch(writer: &mut dyn BatchWriter, records: &[AudioRecord]) {
    let session = Session::default();
    writer.initialize(&session).unwrap();
    writer.write_batch(records, &session).unwrap();
    writer.finalize().unwrap();
}

fn output(dir: &TempDir) -> String {
    dir.path().join("out").to_string_lossy().into_owned()
}

#[test]
fn test_commonvoice_writer() {
    let dir = TempDir::new().unwrap();
    let records = [
        speech(dir.path(), "a.wav", Some("first")),
        speech(dir.path(), "b.wav", None),
    ];
    let mut writer = CommonVoiceWriter::new(CommonVoiceWriterOptions::new(output(&dir)));
    write_batch(&mut writer, &records);

    let out = dir.path().join("out");
    let tsv = fs::read_to_string(out.join("annotations.tsv")).unwrap();
    assert_eq!(
        tsv,
        format!("{}\n\ta.wav\tfirst\t0\t0\t\t\t\t\t\n", COMMONVOICE_HEADER)
    );
    assert!(out.join("a.wav").exists());
    assert!(out.join("b.wav").exists());
}

#[test]
fn test_commonvoice_writer_rejects_classification() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("c.wav");
    generate_tone(&path);
    let record = AudioRecord::builder(DataType::Classification)
        .source(path)
        .annotation("dog")
        .build()
        .unwrap();
    let mut writer = CommonVoiceWriter::new(CommonVoiceWriterOptions::new(output(&dir)));
    let session = Session::default();
    writer.initialize(&session).unwrap();
    assert!(matches!(
        writer.write_batch(&[record], &session),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_festvox_writer_annotations_only() {
    let dir = TempDir::new().unwrap();
    let records = [speech(dir.path(), "arctic_1.wav", Some("Hello world"))];
    let mut options = FestVoxWriterOptions::new(output(&dir));
    options.annotations_only = true;
    write_batch(&mut FestVoxWriter::new(options), &records);

    let out = dir.path().join("out");
    assert_eq!(
        fs::read_to_string(out.join("annotations.txt")).unwrap(),
        "( arctic_1 \"Hello world\" )\n"
    );
    assert!(!out.join("arctic_1.wav").exists());
}

#[test]
fn test_piper_writer_with_speaker() {
    let dir = TempDir::new().unwrap();
    let with_speaker = speech(dir.path(), "a.wav", Some("one"))
        .to_builder()
        .metadata_entry("speaker", "alice")
        .build()
        .unwrap();
    let without = speech(dir.path(), "b.wav", Some("two"));

    let mut options = PiperWriterOptions::new(output(&dir));
    options.speaker_key = Some("speaker".to_string());
    write_batch(&mut PiperWriter::new(options), &[with_speaker, without]);

    let out = dir.path().join("out");
    assert_eq!(
        fs::read_to_string(out.join("metadata.csv")).unwrap(),
        "a|alice|one\nb|[unknown]|two\n"
    );
    assert_eq!(wav_shape(out.join("wav/a.wav")), (1, TEST_SAMPLE_RATE, TEST_SAMPLE_RATE));
}

#[test]
fn test_piper_writer_single_speaker() {
    let dir = TempDir::new().unwrap();
    let records = [speech(dir.path(), "a.wav", Some("one"))];
    let mut options = PiperWriterOptions::new(output(&dir));
    options.metadata = "train.csv".to_string();
    write_batch(&mut PiperWriter::new(options), &records);
    assert_eq!(
        fs::read_to_string(dir.path().join("out/train.csv")).unwrap(),
        "a|one\n"
    );
}

#[test]
fn test_piper_writer_requires_wav() {
    let dir = TempDir::new().unwrap();
    let mp3 = AudioRecord::builder(DataType::Speech)
        .audio_name("a.mp3")
        .raw_bytes(vec![0xFF, 0xFB, 0x90, 0x00])
        .annotation("x")
        .build()
        .unwrap();
    let mut writer = PiperWriter::new(PiperWriterOptions::new(output(&dir)));
    let session = Session::default();
    writer.initialize(&session).unwrap();
    match writer.write_batch(&[mp3], &session) {
        Err(Error::InvalidInput(msg)) => assert_eq!(msg, "Audio data not in WAV! Use convert-to-wav filter!"),
        other => panic!("Expected WAV error, got {:?}", other),
    }
}

#[test]
fn test_txt_writer_with_speaker_sidecar() {
    let dir = TempDir::new().unwrap();
    let record = speech(dir.path(), "s.wav", Some("hi there"))
        .to_builder()
        .metadata_entry("speaker", "bob")
        .build()
        .unwrap();

    let mut options = TxtWriterOptions::new(output(&dir));
    options.speaker_suffix = Some(".speaker".to_string());
    let mut writer = TxtWriter::new(options);
    let session = Session::default();
    writer.initialize(&session).unwrap();
    writer.write_stream(&record, &session).unwrap();
    writer.finalize().unwrap();

    let out = dir.path().join("out");
    assert!(out.join("s.wav").exists());
    assert_eq!(fs::read_to_string(out.join("s.txt")).unwrap(), "hi there\n");
    assert_eq!(fs::read_to_string(out.join("s.speaker")).unwrap(), "bob\n");
}

#[test]
fn test_split_writes_manifest_per_split() {
    let dir = TempDir::new().unwrap();
    let records: Vec<AudioRecord> = (0..10)
        .map(|i| speech(dir.path(), &format!("{}.wav", i), Some("text")))
        .collect();

    let mut options = FestVoxWriterOptions::new(output(&dir));
    options.annotations_only = true;
    options.split = SplitOptions {
        split_names: vec!["train".to_string(), "test".to_string()],
        split_ratios: vec![70, 30],
        split_group: None,
    };
    write_batch(&mut FestVoxWriter::new(options), &records);

    let count = |split: &str| {
        fs::read_to_string(dir.path().join("out").join(split).join("annotations.txt"))
            .unwrap()
            .lines()
            .count()
    };
    assert_eq!(count("train"), 7);
    assert_eq!(count("test"), 3);
}

#[test]
fn test_invalid_split_ratios() {
    let dir = TempDir::new().unwrap();
    let mut options = CommonVoiceWriterOptions::new(output(&dir));
    options.split = SplitOptions {
        split_names: vec!["a".to_string(), "b".to_string()],
        split_ratios: vec![50, 40],
        split_group: None,
    };
    let mut writer = CommonVoiceWriter::new(options);
    assert!(matches!(writer.initialize(&Session::default()), Err(Error::Config(_))));
}

#[test]
fn test_audioinfo_to_file() {
    let dir = TempDir::new().unwrap();
    let records = [speech(dir.path(), "a.wav", Some("hello"))];
    let report = dir.path().join("info.json");
    let mut writer = AudioInfoWriter::new(AudioInfoOptions {
        output_file: Some(report.to_string_lossy().into_owned()),
        output_format: OutputFormat::Json,
    });
    write_batch(&mut writer, &records);

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(value[0]["file_name"], "a.wav");
    assert_eq!(value[0]["sample_rate"], TEST_SAMPLE_RATE);
    assert_eq!(value[0]["mono"], true);
    assert_eq!(value[0]["duration_seconds"], 1.0);
    assert_eq!(value[0]["transcript"], "hello");
    assert!(value[0]["file_size"].as_u64().unwrap() > 32000);
}

#[test]
fn test_metadata_writer() {
    let dir = TempDir::new().unwrap();
    let with_metadata = speech(dir.path(), "a.wav", Some("one"))
        .to_builder()
        .metadata_entry("speaker", "alice")
        .metadata_entry("age", 42)
        .build()
        .unwrap();
    let without = speech(dir.path(), "b.wav", Some("two"));

    let mut writer = MetadataWriter::new(MetadataWriterOptions::new(output(&dir)));
    let session = Session::default();
    writer.initialize(&session).unwrap();
    writer.write_stream(&with_metadata, &session).unwrap();
    writer.write_stream(&without, &session).unwrap();
    writer.finalize().unwrap();

    let out = dir.path().join("out");
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("a.json")).unwrap()).unwrap();
    assert_eq!(value, serde_json::json!({"age": 42, "speaker": "alice"}));
    assert!(!out.join("b.json").exists());
    assert!(!out.join("a.wav").exists());
}
