//! Annotation removal

use adc_common::{AudioRecord, Result};

use crate::pipeline::Filter;
use crate::session::Session;

/// Emits each record without its annotation
#[derive(Debug, Default)]
pub struct StripAnnotations;

impl Filter for StripAnnotations {
    fn name(&self) -> &'static str {
        "strip-annotations"
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        Ok(vec![record.to_builder().clear_annotation().build()?])
    }
}
