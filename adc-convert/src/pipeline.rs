//! Pipeline stages and driver
//!
//! A pipeline is one reader, zero or more filters and an optional writer.
//! Records flow through in input order, one at a time; batch writers get
//! everything once the reader is exhausted.

use adc_common::{AudioRecord, Result};

use crate::session::Session;

/// Produces records from input files
pub trait Reader {
    fn name(&self) -> &'static str;

    /// Resolve inputs; fails if there is nothing to read
    fn initialize(&mut self, session: &Session) -> Result<()>;

    /// Read the next input. `None` entries mark skipped items (e.g. missing
    /// audio) and are dropped by the driver.
    fn read(&mut self, session: &mut Session) -> Result<Vec<Option<AudioRecord>>>;

    fn has_finished(&self) -> bool;

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Transforms one record into zero or more records
pub trait Filter {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        Ok(())
    }

    fn process(&mut self, record: AudioRecord, session: &Session) -> Result<Vec<AudioRecord>>;

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writer that persists records as they arrive
pub trait StreamWriter {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        Ok(())
    }

    fn write_stream(&mut self, record: &AudioRecord, session: &Session) -> Result<()>;

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writer that persists all records in one go
pub trait BatchWriter {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        Ok(())
    }

    fn write_batch(&mut self, records: &[AudioRecord], session: &Session) -> Result<()>;

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Either writer flavour
pub enum Writer {
    Stream(Box<dyn StreamWriter>),
    Batch(Box<dyn BatchWriter>),
}

impl Writer {
    pub fn name(&self) -> &'static str {
        match self {
            Writer::Stream(w) => w.name(),
            Writer::Batch(w) => w.name(),
        }
    }

    fn initialize(&mut self, session: &Session) -> Result<()> {
        match self {
            Writer::Stream(w) => w.initialize(session),
            Writer::Batch(w) => w.initialize(session),
        }
    }

    fn finalize(&mut self) -> Result<()> {
        match self {
            Writer::Stream(w) => w.finalize(),
            Writer::Batch(w) => w.finalize(),
        }
    }
}

/// Counters reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub inputs: usize,
    pub skipped: usize,
    pub records_read: usize,
    pub records_written: usize,
}

/// Reader → filters → writer
pub struct Pipeline {
    reader: Box<dyn Reader>,
    filters: Vec<Box<dyn Filter>>,
    writer: Option<Writer>,
}

impl Pipeline {
    pub fn new(reader: Box<dyn Reader>) -> Self {
        Self {
            reader,
            filters: Vec::new(),
            writer: None,
        }
    }

    pub fn with_filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_writer(mut self, writer: Writer) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Stage names in execution order
    pub fn describe(&self) -> Vec<&'static str> {
        let mut names = vec![self.reader.name()];
        names.extend(self.filters.iter().map(|f| f.name()));
        if let Some(w) = &self.writer {
            names.push(w.name());
        }
        names
    }

    /// Run the pipeline to completion.
    ///
    /// Any stage error aborts the run; stages already initialized are not
    /// finalized in that case.
    pub fn execute(&mut self, session: &mut Session) -> Result<PipelineStats> {
        tracing::info!(stages = ?self.describe(), "Executing pipeline");

        self.reader.initialize(session)?;
        for filter in self.filters.iter_mut() {
            filter.initialize(session)?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.initialize(session)?;
        }

        let mut stats = PipelineStats::default();
        let mut batch: Vec<AudioRecord> = Vec::new();

        while !self.reader.has_finished() {
            let items = self.reader.read(session)?;
            stats.inputs += 1;

            for item in items {
                let Some(record) = item else {
                    stats.skipped += 1;
                    continue;
                };
                stats.records_read += 1;

                let mut records = vec![record];
                for filter in self.filters.iter_mut() {
                    let mut next = Vec::with_capacity(records.len());
                    for record in records {
                        next.extend(filter.process(record, session)?);
                    }
                    records = next;
                }

                match self.writer.as_mut() {
                    Some(Writer::Stream(writer)) => {
                        for record in &records {
                            writer.write_stream(record, session)?;
                            stats.records_written += 1;
                        }
                    }
                    Some(Writer::Batch(_)) => batch.extend(records),
                    None => {}
                }
            }
        }

        if let Some(Writer::Batch(writer)) = self.writer.as_mut() {
            writer.write_batch(&batch, session)?;
            stats.records_written += batch.len();
        }

        self.reader.finalize()?;
        for filter in self.filters.iter_mut() {
            filter.finalize()?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.finalize()?;
        }

        tracing::info!(
            inputs = stats.inputs,
            skipped = stats.skipped,
            read = stats.records_read,
            written = stats.records_written,
            "Pipeline finished"
        );
        Ok(stats)
    }
}
