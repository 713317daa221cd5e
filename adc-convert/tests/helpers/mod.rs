//! Shared fixtures for adc-convert integration tests

#![allow(dead_code)]

pub mod audio_generator;

use std::fs;
use std::path::{Path, PathBuf};

use adc_common::{AudioRecord, Result};
use adc_convert::pipeline::Reader;
use adc_convert::Session;

/// Write a text file, creating parent directories
pub fn write_text(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Run a reader to completion, keeping skip sentinels
pub fn read_all(reader: &mut dyn Reader) -> Result<Vec<Option<AudioRecord>>> {
    let mut session = Session::default();
    reader.initialize(&session)?;
    let mut items = Vec::new();
    while !reader.has_finished() {
        items.extend(reader.read(&mut session)?);
    }
    reader.finalize()?;
    Ok(items)
}

/// Only the records, sentinels dropped
pub fn records(items: Vec<Option<AudioRecord>>) -> Vec<AudioRecord> {
    items.into_iter().flatten().collect()
}
