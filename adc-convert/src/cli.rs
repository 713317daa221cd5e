//! Command-line pipeline assembly
//!
//! A pipeline is given as `READER [opts] [FILTER [opts]]... [WRITER [opts]]`.
//! The argument list is cut into one segment per plugin name; each segment's
//! options are parsed with the plugin's own clap option struct. An option
//! value that equals a plugin name must be preceded by `--`, e.g.
//! `to-txt-sp -o -- resample`.

use std::fmt;

use adc_common::{DataType, Error, Result};
use clap::error::ErrorKind;
use clap::{Args, Command, FromArgMatches};

use crate::filters::{
    ApplyFunction, ApplyFunctionOptions, AttachMetadata, AttachMetadataOptions, ConvertToMono, ConvertToWav,
    PitchShift, PitchShiftOptions, Resample, ResampleOptions, StripAnnotations, TimeStretch, TimeStretchOptions,
    TrimSilence, TrimSilenceOptions,
};
use crate::pipeline::{Filter, Pipeline, Reader, Writer};
use crate::readers::{
    AdamsClassificationOptions, AdamsReader, AdamsSpeechOptions, CommonVoiceReader, CommonVoiceReaderOptions,
    FestVoxReader, FestVoxReaderOptions, HfAudioFolderReader, HfAudioFolderReaderOptions, TxtReader,
    TxtReaderOptions,
};
use crate::writers::{
    AudioInfoOptions, AudioInfoWriter, CommonVoiceWriter, CommonVoiceWriterOptions, FestVoxWriter,
    FestVoxWriterOptions, MetadataWriter, MetadataWriterOptions, PiperWriter, PiperWriterOptions, TxtWriter,
    TxtWriterOptions,
};

/// Pipeline stage a plugin occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Reader,
    Filter,
    Writer,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Reader => f.write_str("reader"),
            PluginKind::Filter => f.write_str("filter"),
            PluginKind::Writer => f.write_str("writer"),
        }
    }
}

/// Registry entry
#[derive(Debug, Clone, Copy)]
pub struct PluginInfo {
    pub name: &'static str,
    pub kind: PluginKind,
    pub description: &'static str,
}

const fn plugin(name: &'static str, kind: PluginKind, description: &'static str) -> PluginInfo {
    PluginInfo {
        name,
        kind,
        description,
    }
}

/// All available plugins
pub static PLUGINS: &[PluginInfo] = &[
    plugin(
        "from-adams-ac",
        PluginKind::Reader,
        "Loads the audio classification data from ADAMS report files.",
    ),
    plugin(
        "from-adams-sp",
        PluginKind::Reader,
        "Loads the speech data from ADAMS report files.",
    ),
    plugin(
        "from-commonvoice-sp",
        PluginKind::Reader,
        "Loads the speech data in Common Voice format (.tsv).",
    ),
    plugin(
        "from-festvox-sp",
        PluginKind::Reader,
        "Loads the speech data in FestVox format.",
    ),
    plugin(
        "from-hf-audiofolder-sp",
        PluginKind::Reader,
        "Loads the speech data in Hugging Face AudioFolder format (metadata.csv).",
    ),
    plugin(
        "from-txt-ac",
        PluginKind::Reader,
        "Loads the audio classification data from .txt files next to the audio files.",
    ),
    plugin(
        "from-txt-sp",
        PluginKind::Reader,
        "Loads the transcripts from .txt files next to the audio files.",
    ),
    plugin(
        "apply-function",
        PluginKind::Filter,
        "Applies a registered record function ('module:function').",
    ),
    plugin(
        "attach-metadata",
        PluginKind::Filter,
        "Loads meta-data from JSON files named after the audio and attaches it to the records.",
    ),
    plugin(
        "convert-to-mono",
        PluginKind::Filter,
        "Mixes multi-channel audio down to mono.",
    ),
    plugin("convert-to-wav", PluginKind::Filter, "Converts the audio to WAV."),
    plugin(
        "pitch-shift",
        PluginKind::Filter,
        "Shifts the pitch by a number of (fractional) steps drawn from a range.",
    ),
    plugin(
        "resample",
        PluginKind::Filter,
        "Resamples the audio to the specified sample rate.",
    ),
    plugin(
        "strip-annotations",
        PluginKind::Filter,
        "Removes the annotations from the records.",
    ),
    plugin(
        "time-stretch",
        PluginKind::Filter,
        "Stretches the audio by a rate drawn from a range without changing the pitch.",
    ),
    plugin(
        "trim-silence",
        PluginKind::Filter,
        "Trims leading and trailing silence from the audio.",
    ),
    plugin(
        "to-audioinfo",
        PluginKind::Writer,
        "Outputs information about the audio files (text, CSV or JSON).",
    ),
    plugin(
        "to-commonvoice-sp",
        PluginKind::Writer,
        "Saves the speech data in Common Voice format (.tsv).",
    ),
    plugin(
        "to-festvox-sp",
        PluginKind::Writer,
        "Saves the speech data in FestVox format.",
    ),
    plugin(
        "to-metadata",
        PluginKind::Writer,
        "Saves the meta-data of each record as a JSON file named after the audio.",
    ),
    plugin(
        "to-piper-sp",
        PluginKind::Writer,
        "Saves the speech data in Piper format (metadata.csv).",
    ),
    plugin(
        "to-txt-sp",
        PluginKind::Writer,
        "Saves the speech data as audio files with .txt transcripts.",
    ),
];

/// Look up a plugin by name
pub fn find_plugin(name: &str) -> Option<&'static PluginInfo> {
    PLUGINS.iter().find(|p| p.name == name)
}

/// Human-readable registry listing, grouped by kind
pub fn list_plugins() -> String {
    let mut out = String::new();
    for kind in [PluginKind::Reader, PluginKind::Filter, PluginKind::Writer] {
        out.push_str(&format!("{}s:\n", kind));
        for p in PLUGINS.iter().filter(|p| p.kind == kind) {
            out.push_str(&format!("  {:<24}{}\n", p.name, p.description));
        }
    }
    out
}

/// Result of parsing a pipeline command line
pub enum Invocation {
    Run(Pipeline),
    /// Help or version text requested for a plugin
    Help(String),
}

/// Instantiated plugin
enum Plugin {
    Reader(Box<dyn Reader>),
    Filter(Box<dyn Filter>),
    Writer(Writer),
}

#[derive(Args, Debug, Clone, Default)]
struct NoOptions {}

/// Marker making the following token a plain option value
pub const ESCAPE: &str = "--";

/// Cut `args` at plugin names; the first token must be a plugin name.
///
/// A token following [`ESCAPE`] is never treated as a plugin name; the
/// marker itself is dropped.
pub fn split_segments(args: &[String]) -> Result<Vec<(&'static PluginInfo, Vec<String>)>> {
    let mut segments: Vec<(&'static PluginInfo, Vec<String>)> = Vec::new();
    let mut escaped = false;
    for arg in args {
        if !escaped && arg == ESCAPE {
            escaped = true;
            continue;
        }
        let plugin = if escaped { None } else { find_plugin(arg) };
        escaped = false;
        match plugin {
            Some(info) => segments.push((info, Vec::new())),
            None => match segments.last_mut() {
                Some((_, options)) => options.push(arg.clone()),
                None => return Err(Error::Config(format!("Unknown plugin: {}", arg))),
            },
        }
    }
    if escaped {
        return Err(Error::Config(format!("Missing value after '{}'", ESCAPE)));
    }
    Ok(segments)
}

/// Check the reader → filters → writer ordering
fn validate_order(segments: &[(&'static PluginInfo, Vec<String>)]) -> Result<()> {
    let Some((first, _)) = segments.first() else {
        return Err(Error::Config("No pipeline components supplied".to_string()));
    };
    if first.kind != PluginKind::Reader {
        return Err(Error::Config(format!(
            "Pipeline must start with a reader, got {}: {}",
            first.kind, first.name
        )));
    }
    for (i, (info, _)) in segments.iter().enumerate().skip(1) {
        match info.kind {
            PluginKind::Reader => {
                return Err(Error::Config(format!("Only one reader allowed, found another: {}", info.name)))
            }
            PluginKind::Writer if i != segments.len() - 1 => {
                return Err(Error::Config(format!(
                    "Writer must be the last component: {}",
                    info.name
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Parse a pipeline command line into an executable pipeline
pub fn parse_pipeline(args: &[String]) -> Result<Invocation> {
    let segments = split_segments(args)?;
    validate_order(&segments)?;

    let mut plugins = Vec::with_capacity(segments.len());
    for (info, options) in &segments {
        match build_plugin(info, options) {
            Ok(plugin) => plugins.push(plugin),
            Err(ParseFailure::Help(text)) => return Ok(Invocation::Help(text)),
            Err(ParseFailure::Error(e)) => return Err(e),
        }
    }

    let mut plugins = plugins.into_iter();
    let Some(Plugin::Reader(reader)) = plugins.next() else {
        return Err(Error::Config("No reader supplied".to_string()));
    };
    let mut pipeline = Pipeline::new(reader);
    for plugin in plugins {
        pipeline = match plugin {
            Plugin::Filter(filter) => pipeline.with_filter(filter),
            Plugin::Writer(writer) => pipeline.with_writer(writer),
            Plugin::Reader(_) => return Err(Error::Config("Only one reader allowed".to_string())),
        };
    }
    Ok(Invocation::Run(pipeline))
}

enum ParseFailure {
    Help(String),
    Error(Error),
}

impl From<Error> for ParseFailure {
    fn from(e: Error) -> Self {
        ParseFailure::Error(e)
    }
}

/// Parse one plugin's options with its clap option struct
fn parse_options<T: Args + FromArgMatches>(info: &PluginInfo, args: &[String]) -> std::result::Result<T, ParseFailure> {
    let command = T::augment_args(
        Command::new(info.name)
            .about(info.description)
            .no_binary_name(true),
    );
    let matches = command.try_get_matches_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ParseFailure::Help(e.render().to_string()),
        _ => ParseFailure::Error(Error::Config(e.render().to_string())),
    })?;
    T::from_arg_matches(&matches).map_err(|e| ParseFailure::Error(Error::Config(e.to_string())))
}

fn build_plugin(info: &PluginInfo, args: &[String]) -> std::result::Result<Plugin, ParseFailure> {
    let plugin = match info.name {
        "from-adams-ac" => Plugin::Reader(Box::new(AdamsReader::classification(parse_options::<
            AdamsClassificationOptions,
        >(info, args)?))),
        "from-adams-sp" => Plugin::Reader(Box::new(AdamsReader::speech(parse_options::<AdamsSpeechOptions>(
            info, args,
        )?))),
        "from-commonvoice-sp" => Plugin::Reader(Box::new(CommonVoiceReader::new(parse_options::<
            CommonVoiceReaderOptions,
        >(info, args)?))),
        "from-festvox-sp" => Plugin::Reader(Box::new(FestVoxReader::new(parse_options::<FestVoxReaderOptions>(
            info, args,
        )?))),
        "from-hf-audiofolder-sp" => Plugin::Reader(Box::new(HfAudioFolderReader::new(parse_options::<
            HfAudioFolderReaderOptions,
        >(info, args)?))),
        "from-txt-ac" => Plugin::Reader(Box::new(TxtReader::new(
            DataType::Classification,
            parse_options::<TxtReaderOptions>(info, args)?,
        ))),
        "from-txt-sp" => Plugin::Reader(Box::new(TxtReader::new(
            DataType::Speech,
            parse_options::<TxtReaderOptions>(info, args)?,
        ))),
        "apply-function" => Plugin::Filter(Box::new(ApplyFunction::new(parse_options::<ApplyFunctionOptions>(
            info, args,
        )?))),
        "attach-metadata" => Plugin::Filter(Box::new(AttachMetadata::new(parse_options::<
            AttachMetadataOptions,
        >(info, args)?))),
        "convert-to-mono" => {
            parse_options::<NoOptions>(info, args)?;
            Plugin::Filter(Box::new(ConvertToMono))
        }
        "convert-to-wav" => {
            parse_options::<NoOptions>(info, args)?;
            Plugin::Filter(Box::new(ConvertToWav))
        }
        "pitch-shift" => Plugin::Filter(Box::new(PitchShift::filter(parse_options::<PitchShiftOptions>(
            info, args,
        )?))),
        "resample" => Plugin::Filter(Box::new(Resample::new(parse_options::<ResampleOptions>(info, args)?))),
        "strip-annotations" => {
            parse_options::<NoOptions>(info, args)?;
            Plugin::Filter(Box::new(StripAnnotations))
        }
        "time-stretch" => Plugin::Filter(Box::new(TimeStretch::filter(parse_options::<TimeStretchOptions>(
            info, args,
        )?))),
        "trim-silence" => Plugin::Filter(Box::new(TrimSilence::new(parse_options::<TrimSilenceOptions>(
            info, args,
        )?))),
        "to-audioinfo" => Plugin::Writer(Writer::Batch(Box::new(AudioInfoWriter::new(parse_options::<
            AudioInfoOptions,
        >(info, args)?)))),
        "to-commonvoice-sp" => Plugin::Writer(Writer::Batch(Box::new(CommonVoiceWriter::new(parse_options::<
            CommonVoiceWriterOptions,
        >(info, args)?)))),
        "to-festvox-sp" => Plugin::Writer(Writer::Batch(Box::new(FestVoxWriter::new(parse_options::<
            FestVoxWriterOptions,
        >(info, args)?)))),
        "to-metadata" => Plugin::Writer(Writer::Stream(Box::new(MetadataWriter::new(parse_options::<
            MetadataWriterOptions,
        >(info, args)?)))),
        "to-piper-sp" => Plugin::Writer(Writer::Batch(Box::new(PiperWriter::new(parse_options::<
            PiperWriterOptions,
        >(info, args)?)))),
        "to-txt-sp" => Plugin::Writer(Writer::Stream(Box::new(TxtWriter::new(parse_options::<TxtWriterOptions>(
            info, args,
        )?)))),
        other => return Err(Error::Config(format!("Unknown plugin: {}", other)).into()),
    };
    Ok(plugin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_every_registered_plugin_builds() {
        for info in PLUGINS {
            let options = match info.kind {
                PluginKind::Reader => args("-i in"),
                _ => Vec::new(),
            };
            let options = match info.name {
                "from-adams-ac" => args("-i in -c class"),
                "from-adams-sp" => args("-i in -t transcript"),
                "apply-function" => args("-f adc.functions:identity"),
                "attach-metadata" => args("-d meta"),
                "to-commonvoice-sp" | "to-festvox-sp" | "to-metadata" | "to-piper-sp" | "to-txt-sp" => {
                    args("-o out")
                }
                _ => options,
            };
            assert!(
                build_plugin(info, &options).is_ok(),
                "Failed to build {} with {:?}",
                info.name,
                options
            );
        }
    }

    #[test]
    fn test_segments_split_at_plugin_names() {
        let segments = split_segments(&args("from-txt-sp -i a b resample -s 16000 to-txt-sp -o out")).unwrap();
        let names: Vec<&str> = segments.iter().map(|(i, _)| i.name).collect();
        assert_eq!(names, ["from-txt-sp", "resample", "to-txt-sp"]);
        assert_eq!(segments[0].1, args("-i a b"));
        assert_eq!(segments[2].1, args("-o out"));
    }

    #[test]
    fn test_escaped_value_matching_plugin_name() {
        let segments = split_segments(&args("from-txt-sp -i x to-txt-sp -o -- resample")).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].1, args("-o resample"));

        let Ok(Invocation::Run(pipeline)) = parse_pipeline(&args("from-txt-sp -i x to-txt-sp -o -- resample")) else {
            panic!("Expected pipeline");
        };
        assert_eq!(pipeline.describe(), ["from-txt-sp", "to-txt-sp"]);

        assert!(matches!(
            parse_pipeline(&args("from-txt-sp -i x to-txt-sp -o resample")),
            Err(Error::Config(_))
        ));
        assert!(matches!(split_segments(&args("from-txt-sp -i --")), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_leading_token() {
        assert!(matches!(split_segments(&args("nope -i x")), Err(Error::Config(_))));
    }

    #[test]
    fn test_order_validation() {
        let err = |line: &str| match parse_pipeline(&args(line)) {
            Err(Error::Config(msg)) => msg,
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected error for: {}", line),
        };
        assert!(err("").contains("No pipeline components"));
        assert!(err("resample from-txt-sp -i x").contains("must start with a reader"));
        assert!(err("from-txt-sp -i x from-txt-ac -i y").contains("Only one reader"));
        assert!(err("from-txt-sp -i x to-txt-sp -o o resample").contains("Writer must be the last"));
    }

    #[test]
    fn test_bad_option_is_config_error() {
        assert!(matches!(
            parse_pipeline(&args("from-txt-sp -i x --no_such_flag")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_plugin_help() {
        match parse_pipeline(&args("from-txt-sp --help")) {
            Ok(Invocation::Help(text)) => assert!(text.contains("--speaker_suffix")),
            _ => panic!("Expected help text"),
        }
    }

    #[test]
    fn test_pipeline_description() {
        let Ok(Invocation::Run(pipeline)) =
            parse_pipeline(&args("from-commonvoice-sp -i x.tsv convert-to-wav to-piper-sp -o out"))
        else {
            panic!("Expected pipeline");
        };
        assert_eq!(
            pipeline.describe(),
            ["from-commonvoice-sp", "convert-to-wav", "to-piper-sp"]
        );
    }

    #[test]
    fn test_listing_mentions_all_plugins() {
        let listing = list_plugins();
        for info in PLUGINS {
            assert!(listing.contains(info.name));
        }
    }
}
