//! ADAMS report files
//!
//! A report is a Java properties file. Every field `name` may be accompanied
//! by a `name\tDataType` entry declaring its type (`N`umeric, `B`oolean,
//! `S`tring or `U`nknown); undeclared fields are treated as strings.

use std::collections::BTreeMap;
use std::path::Path;

use adc_common::{Error, Metadata, Result};
use serde_json::{Number, Value};

/// Suffix of the keys that carry a field's data type
pub const DATATYPE_SUFFIX: &str = "\tDataType";

/// Declared type of a report field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Numeric,
    Boolean,
    String,
    Unknown,
}

impl FieldType {
    fn from_code(code: &str) -> Self {
        match code.trim() {
            "N" => FieldType::Numeric,
            "B" => FieldType::Boolean,
            "S" => FieldType::String,
            _ => FieldType::Unknown,
        }
    }
}

/// Parsed report: field values plus declared types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    values: BTreeMap<String, String>,
    types: BTreeMap<String, FieldType>,
}

impl Report {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::InvalidInput(format!("Failed to parse report {}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut report = Report::default();
        for (key, value) in parse_properties(content)? {
            match key.strip_suffix(DATATYPE_SUFFIX) {
                Some(field) => {
                    report.types.insert(field.to_string(), FieldType::from_code(&value));
                }
                None => {
                    report.values.insert(key, value);
                }
            }
        }
        Ok(report)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field names, sorted
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn has_value(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn field_type(&self, field: &str) -> FieldType {
        self.types.get(field).copied().unwrap_or(FieldType::String)
    }

    pub fn string_value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Value converted according to the declared type. Values that do not
    /// parse as their declared type are kept as strings.
    pub fn value(&self, field: &str) -> Option<Value> {
        let raw = self.values.get(field)?;
        let typed = match self.field_type(field) {
            FieldType::Numeric => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            FieldType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            FieldType::String | FieldType::Unknown => None,
        };
        Some(typed.unwrap_or_else(|| Value::String(raw.clone())))
    }

    /// All fields as typed metadata; `None` for an empty report
    pub fn to_metadata(&self) -> Option<Metadata> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.fields()
                .filter_map(|f| self.value(f).map(|v| (f.to_string(), v)))
                .collect(),
        )
    }
}

/// Parse Java properties syntax into key/value pairs, in file order
fn parse_properties(content: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut lines = content.lines();

    while let Some(first) = lines.next() {
        let trimmed = first.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        // Join continuation lines (odd number of trailing backslashes)
        let mut logical = String::from(trimmed);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        pairs.push((unescape(key)?, unescape(value)?));
    }

    Ok(pairs)
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split at the first unescaped separator (`=`, `:` or whitespace)
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .map(|r| r.trim_start_matches([' ', '\t', '\x0c']))
        .unwrap_or(rest);
    (key, rest)
}

fn unescape(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| Error::InvalidInput(format!("Malformed \\uXXXX encoding: \\u{}", hex)))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
