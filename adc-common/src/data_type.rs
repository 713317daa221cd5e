//! Annotation data types
//!
//! Each record carries exactly one data type, identified on the command line
//! by a short code. The set is closed; adding a variant means adding a code,
//! an exchange key and an annotation check here.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::{Error, Result};

/// Short code for audio classification data
pub const DATATYPE_CLASSIFICATION: &str = "cl";

/// Short code for speech data
pub const DATATYPE_SPEECH: &str = "sp";

/// All data type codes, in registry order
pub const DATATYPES: [&str; 2] = [DATATYPE_CLASSIFICATION, DATATYPE_SPEECH];

/// Concrete record variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Annotation is a single category label
    Classification,
    /// Annotation is a free-form transcript
    Speech,
}

impl DataType {
    /// Look up a data type by its short code
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            DATATYPE_CLASSIFICATION => Ok(DataType::Classification),
            DATATYPE_SPEECH => Ok(DataType::Speech),
            _ => Err(Error::UnknownDataType(code.to_string())),
        }
    }

    /// Short code of this data type
    pub fn code(&self) -> &'static str {
        match self {
            DataType::Classification => DATATYPE_CLASSIFICATION,
            DataType::Speech => DATATYPE_SPEECH,
        }
    }

    /// Key used when exporting the annotation as a dictionary
    pub fn annotation_key(&self) -> &'static str {
        match self {
            DataType::Classification => "label",
            DataType::Speech => "transcript",
        }
    }

    /// Validate an untyped annotation value and turn it into text.
    ///
    /// Classification labels must be strings. Transcripts accept any scalar,
    /// which is converted to its textual form. `null` means "no annotation".
    pub fn validate_annotation(&self, value: &Value) -> Result<Option<String>> {
        match (self, value) {
            (_, Value::Null) => Ok(None),
            (_, Value::String(s)) => Ok(Some(s.clone())),
            (DataType::Speech, Value::Number(n)) => Ok(Some(n.to_string())),
            (DataType::Speech, Value::Bool(b)) => Ok(Some(b.to_string())),
            (_, other) => Err(Error::InvalidAnnotationType(format!(
                "{} annotation cannot be {}",
                self,
                json_type_name(other)
            ))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Classification => f.write_str("AudioClassificationData"),
            DataType::Speech => f.write_str("SpeechData"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_codes() {
        assert_eq!(DataType::from_code("cl").unwrap(), DataType::Classification);
        assert_eq!(DataType::from_code("sp").unwrap(), DataType::Speech);
        for code in DATATYPES {
            assert_eq!(DataType::from_code(code).unwrap().code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_error() {
        match DataType::from_code("od") {
            Err(Error::UnknownDataType(code)) => assert_eq!(code, "od"),
            other => panic!("Expected UnknownDataType, got {:?}", other),
        }
    }

    #[test]
    fn test_classification_requires_string() {
        let dt = DataType::Classification;
        assert_eq!(dt.validate_annotation(&json!("dog")).unwrap(), Some("dog".to_string()));
        assert!(matches!(
            dt.validate_annotation(&json!(42)),
            Err(Error::InvalidAnnotationType(_))
        ));
        assert!(dt.validate_annotation(&json!(true)).is_err());
    }

    #[test]
    fn test_speech_accepts_scalars() {
        let dt = DataType::Speech;
        assert_eq!(dt.validate_annotation(&json!("hi")).unwrap(), Some("hi".to_string()));
        assert_eq!(dt.validate_annotation(&json!(3)).unwrap(), Some("3".to_string()));
        assert_eq!(dt.validate_annotation(&Value::Null).unwrap(), None);
        assert!(dt.validate_annotation(&json!(["a"])).is_err());
    }

    #[test]
    fn test_annotation_keys() {
        assert_eq!(DataType::Classification.annotation_key(), "label");
        assert_eq!(DataType::Speech.annotation_key(), "transcript");
    }
}
