//! Companion-file lookup and input resolution against a real directory tree

use std::fs;
use std::path::PathBuf;

use adc_common::locate::{locate_audio, locate_file, locate_files};
use adc_common::Error;
use tempfile::TempDir;

fn touch(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"x").unwrap();
    path
}

#[test]
fn test_locate_audio_finds_wav() {
    let dir = TempDir::new().unwrap();
    let wav = touch(&dir, "report.wav");
    let report = dir.path().join("report.report");

    assert_eq!(locate_audio(&report, None, None), Some(wav));
}

#[test]
fn test_locate_audio_prefers_mp3() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "report.wav");
    let mp3 = touch(&dir, "report.mp3");
    let report = dir.path().join("report.report");

    assert_eq!(locate_audio(&report, None, None), Some(mp3));
}

#[test]
fn test_locate_audio_missing() {
    let dir = TempDir::new().unwrap();
    let report = touch(&dir, "report.report");
    assert_eq!(locate_audio(&report, None, None), None);
}

#[test]
fn test_locate_file_keeps_extension_order() {
    let dir = TempDir::new().unwrap();
    let upper = touch(&dir, "a.WAV");
    let lower = touch(&dir, "a.mp3");
    let base = dir.path().join("a.txt");

    let found = locate_file(&base, &[".WAV", ".mp3"], None, None);
    assert_eq!(found, vec![upper, lower]);
}

#[test]
fn test_locate_file_with_rel_path_and_suffix() {
    let dir = TempDir::new().unwrap();
    let wav = touch(&dir, "audio/clip.wav");
    let sidecar = dir.path().join("clip-spk.txt");

    let found = locate_file(&sidecar, &[".wav"], Some("audio"), Some("-spk.txt"));
    assert_eq!(found, vec![wav]);
}

#[test]
fn test_locate_files_sorted_and_deduplicated() {
    let dir = TempDir::new().unwrap();
    let b = touch(&dir, "b.txt");
    let a = touch(&dir, "a.txt");
    touch(&dir, "c.wav");

    let glob = format!("{}/*.txt", dir.path().display());
    let files = locate_files(&[glob.clone(), glob], &[], None, None).unwrap();
    assert_eq!(files, vec![a, b]);
}

#[test]
fn test_locate_files_directory_uses_default_glob() {
    let dir = TempDir::new().unwrap();
    let tsv = touch(&dir, "train.tsv");
    touch(&dir, "notes.txt");

    let input = dir.path().display().to_string();
    let files = locate_files(&[input], &[], Some("*.tsv"), None).unwrap();
    assert_eq!(files, vec![tsv]);
}

#[test]
fn test_locate_files_from_list_and_resume() {
    let dir = TempDir::new().unwrap();
    touch(&dir, "1.txt");
    let second = touch(&dir, "2.txt");
    let third = touch(&dir, "3.txt");
    let list = dir.path().join("inputs.list");
    fs::write(&list, format!("\n{}/*.txt\n", dir.path().display())).unwrap();

    let files = locate_files(&[], &[list], None, Some("*/2.txt")).unwrap();
    assert_eq!(files, vec![second, third]);
}

#[test]
fn test_locate_files_nothing_found() {
    let dir = TempDir::new().unwrap();
    let glob = format!("{}/*.tsv", dir.path().display());
    assert!(matches!(
        locate_files(&[glob], &[], None, None),
        Err(Error::Config(_))
    ));
}
