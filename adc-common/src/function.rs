//! Function references
//!
//! Configuration can name a record transform as `module:function`. Modules
//! are namespaces in a [`FunctionRegistry`]; the built-in registry provides
//! the `adc.functions` module.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::{AudioFormat, AudioRecord, Error, Result};

/// A record transform that can be referenced by name
pub type RecordFunction = fn(&AudioRecord) -> Result<AudioRecord>;

/// Module holding the built-in functions
pub const BUILTIN_MODULE: &str = "adc.functions";

/// Entry in a module namespace
#[derive(Clone, Copy)]
pub enum Symbol {
    Function(RecordFunction),
    /// Named value that is not callable
    Constant(&'static str),
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Function(_) => f.write_str("Function"),
            Symbol::Constant(value) => write!(f, "Constant({:?})", value),
        }
    }
}

/// Namespaced table of record functions
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    modules: BTreeMap<String, BTreeMap<String, Symbol>>,
}

static BUILTIN: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::builtin);

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `adc.functions` module
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(BUILTIN_MODULE, "identity", Symbol::Function(identity));
        registry.register(
            BUILTIN_MODULE,
            "lowercase_annotation",
            Symbol::Function(lowercase_annotation),
        );
        registry.register(
            BUILTIN_MODULE,
            "uppercase_annotation",
            Symbol::Function(uppercase_annotation),
        );
        registry.register(BUILTIN_MODULE, "normalize_peak", Symbol::Function(normalize_peak));
        registry.register(
            BUILTIN_MODULE,
            "VERSION",
            Symbol::Constant(env!("CARGO_PKG_VERSION")),
        );
        registry
    }

    pub fn register(&mut self, module: &str, name: &str, symbol: Symbol) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(name.to_string(), symbol);
    }

    /// All `module:function` references that resolve to functions
    pub fn function_names(&self) -> Vec<String> {
        self.modules
            .iter()
            .flat_map(|(module, symbols)| {
                symbols
                    .iter()
                    .filter(|(_, s)| matches!(s, Symbol::Function(_)))
                    .map(move |(name, _)| format!("{}:{}", module, name))
            })
            .collect()
    }

    /// Resolve a `module:function` reference
    pub fn resolve(&self, reference: &str) -> Result<RecordFunction> {
        let (module_name, func_name) = match reference.split_once(':') {
            Some((m, f)) if !m.is_empty() && !f.is_empty() && !f.contains(':') => (m, f),
            _ => {
                return Err(Error::Config(format!(
                    "Expected format 'module_name:function_name' but got: {}",
                    reference
                )))
            }
        };

        let module = self
            .modules
            .get(module_name)
            .ok_or_else(|| Error::Config(format!("Failed to import module: {}", module_name)))?;

        match module.get(func_name) {
            Some(Symbol::Function(f)) => Ok(*f),
            Some(Symbol::Constant(_)) => {
                Err(Error::Config(format!("Not an actual function: {}", reference)))
            }
            None => Err(Error::Config(format!(
                "Function '{}' not found in module '{}'!",
                func_name, module_name
            ))),
        }
    }
}

/// Resolve a reference against the built-in registry
pub fn resolve_function_reference(reference: &str) -> Result<RecordFunction> {
    BUILTIN.resolve(reference)
}

/// The built-in registry
pub fn builtin_registry() -> &'static FunctionRegistry {
    &BUILTIN
}

fn identity(record: &AudioRecord) -> Result<AudioRecord> {
    Ok(record.clone())
}

fn lowercase_annotation(record: &AudioRecord) -> Result<AudioRecord> {
    match record.annotation() {
        Some(a) => record.to_builder().annotation(a.to_lowercase()).build(),
        None => Ok(record.clone()),
    }
}

fn uppercase_annotation(record: &AudioRecord) -> Result<AudioRecord> {
    match record.annotation() {
        Some(a) => record.to_builder().annotation(a.to_uppercase()).build(),
        None => Ok(record.clone()),
    }
}

/// Scale the audio so its absolute peak is 1.0; output is WAV
fn normalize_peak(record: &AudioRecord) -> Result<AudioRecord> {
    let decoded = record
        .decoded()
        .ok_or_else(|| Error::Decode(format!("Cannot decode {}", record.audio_name())))?;
    let peak = decoded
        .samples
        .channels()
        .iter()
        .flatten()
        .fold(0.0_f32, |acc, s| acc.max(s.abs()));
    if peak == 0.0 {
        return Ok(record.clone());
    }
    let gain = 1.0 / peak;
    let samples = decoded
        .samples
        .map_channels(|ch| ch.iter().map(|s| s * gain).collect());
    record
        .to_builder()
        .audio_name(AudioFormat::Wav.rename(record.audio_name()))
        .format(AudioFormat::Wav)
        .samples(samples, decoded.sample_rate)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DataType;

    fn record() -> AudioRecord {
        AudioRecord::builder(DataType::Speech)
            .audio_name("a.wav")
            .annotation("Hello World")
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_builtin() {
        let f = resolve_function_reference("adc.functions:lowercase_annotation").unwrap();
        assert_eq!(f(&record()).unwrap().annotation(), Some("hello world"));
    }

    #[test]
    fn test_bad_format() {
        for reference in ["nocolon", "a:b:c", ":f", "m:"] {
            match resolve_function_reference(reference) {
                Err(Error::Config(msg)) => assert!(msg.contains("Expected format")),
                other => panic!("Expected config error for {}, got {:?}", reference, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_unknown_module_and_function() {
        let err = resolve_function_reference("nope:identity").map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("Failed to import module"));

        let err = resolve_function_reference("adc.functions:nope").map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("not found in module"));
    }

    #[test]
    fn test_constant_is_not_a_function() {
        let err = resolve_function_reference("adc.functions:VERSION").map(|_| ()).unwrap_err();
        assert!(err.to_string().contains("Not an actual function"));
    }

    #[test]
    fn test_function_names_excludes_constants() {
        let names = builtin_registry().function_names();
        assert!(names.contains(&"adc.functions:identity".to_string()));
        assert!(!names.iter().any(|n| n.ends_with("VERSION")));
    }
}
