//! adc-convert - audio dataset conversion pipeline
//!
//! Usage: `adc-convert [-l LEVEL] [-c CONFIG] READER [opts] [FILTER [opts]]... [WRITER [opts]]`

use std::path::PathBuf;

use adc_common::config::{AdcConfig, ENV_LOGLEVEL};
use adc_convert::cli::{list_plugins, parse_pipeline, Invocation};
use adc_convert::Session;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for adc-convert
#[derive(Parser, Debug)]
#[command(name = "adc-convert")]
#[command(about = "Converts audio datasets from one format into another")]
#[command(version)]
struct Args {
    /// Logging level: error, warn, info, debug or trace (overrides ADC_LOGLEVEL and the config file)
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<String>,

    /// Configuration file (overrides ADC_CONFIG)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// List the available readers, filters and writers
    #[arg(long = "list")]
    list: bool,

    /// The pipeline: READER [opts] [FILTER [opts]]... [WRITER [opts]].
    /// Precede an option value that equals a plugin name with '--'
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pipeline: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        print!("{}", list_plugins());
        return Ok(());
    }

    let config = AdcConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    let level = config
        .log_level(args.log_level.as_deref())
        .with_context(|| format!("Invalid log level (check --log-level, {})", ENV_LOGLEVEL))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "adc_convert={level},adc_common={level}"
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting adc-convert v{}", env!("CARGO_PKG_VERSION"));

    let mut pipeline = match parse_pipeline(&args.pipeline).context("Invalid pipeline")? {
        Invocation::Run(pipeline) => pipeline,
        Invocation::Help(text) => {
            print!("{}", text);
            return Ok(());
        }
    };

    let mut session = Session::new(config);
    let stats = pipeline.execute(&mut session).context("Pipeline failed")?;
    info!(
        "Done: {} input(s), {} record(s) read, {} skipped, {} written",
        stats.inputs, stats.records_read, stats.skipped, stats.records_written
    );
    Ok(())
}
