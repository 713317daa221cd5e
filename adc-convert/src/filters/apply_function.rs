//! Applies a named record function (`module:function`)

use adc_common::function::{resolve_function_reference, RecordFunction};
use adc_common::{AudioRecord, Error, Result};
use clap::Args;

use crate::pipeline::Filter;
use crate::session::Session;

/// Options for `apply-function`
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyFunctionOptions {
    /// The function to apply, format 'module_name:function_name'
    #[arg(short = 'f', long = "function")]
    pub function: String,
}

pub struct ApplyFunction {
    options: ApplyFunctionOptions,
    function: Option<RecordFunction>,
}

impl ApplyFunction {
    pub fn new(options: ApplyFunctionOptions) -> Self {
        Self {
            options,
            function: None,
        }
    }
}

impl Filter for ApplyFunction {
    fn name(&self) -> &'static str {
        "apply-function"
    }

    fn initialize(&mut self, _session: &Session) -> Result<()> {
        self.function = Some(resolve_function_reference(&self.options.function)?);
        Ok(())
    }

    fn process(&mut self, record: AudioRecord, _session: &Session) -> Result<Vec<AudioRecord>> {
        let function = self
            .function
            .ok_or_else(|| Error::NotInitialized("Filter apply-function not initialized".to_string()))?;
        Ok(vec![function(&record)?])
    }
}
