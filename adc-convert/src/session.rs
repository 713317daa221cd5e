//! Session shared by reader, filters and writer
//!
//! Holds the resolved configuration and the input currently being read, and
//! expands path placeholders against both.

use std::path::{Path, PathBuf};

use adc_common::config::AdcConfig;

/// Placeholders understood by [`Session::expand_placeholders`]
pub const PLACEHOLDERS: [(&str, &str); 9] = [
    ("{HOME}", "the user's home directory"),
    ("{CWD}", "the current working directory"),
    ("{TMP}", "the temp directory"),
    ("{INPUT_PATH}", "the directory part of the current input, i.e., /some/where of input /some/where/file.txt"),
    ("{INPUT_NAMEEXT}", "the name (incl extension) of the current input, i.e., file.txt of input /some/where/file.txt"),
    ("{INPUT_NAMENOEXT}", "the name (excl extension) of the current input, i.e., file of input /some/where/file.txt"),
    ("{INPUT_EXT}", "the extension of the current input (incl dot), i.e., .txt of input /some/where/file.txt"),
    ("{INPUT_PARENT_PATH}", "the parent directory of the current input directory, i.e., /some of input /some/where/file.txt"),
    ("{INPUT_PARENT_NAME}", "the name of the parent directory of the current input, i.e., where of input /some/where/file.txt"),
];

/// State carried through one pipeline run
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: AdcConfig,
    current_input: Option<PathBuf>,
}

impl Session {
    pub fn new(config: AdcConfig) -> Self {
        Self {
            config,
            current_input: None,
        }
    }

    pub fn current_input(&self) -> Option<&Path> {
        self.current_input.as_deref()
    }

    pub fn set_current_input(&mut self, path: impl Into<PathBuf>) {
        self.current_input = Some(path.into());
    }

    /// Replace all known placeholders in `template`.
    ///
    /// Input placeholders are left untouched while no input has been read.
    pub fn expand_placeholders(&self, template: &str) -> String {
        if !template.contains('{') {
            return template.to_string();
        }

        let mut result = template.to_string();
        if let Some(home) = dirs::home_dir() {
            result = result.replace("{HOME}", &home.to_string_lossy());
        }
        if let Ok(cwd) = std::env::current_dir() {
            result = result.replace("{CWD}", &cwd.to_string_lossy());
        }
        result = result.replace("{TMP}", &std::env::temp_dir().to_string_lossy());

        if let Some(input) = &self.current_input {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let (stem, ext) = adc_common::format::split_extension(&name);
            let parent = input.parent().unwrap_or_else(|| Path::new(""));
            let grandparent = parent.parent().unwrap_or_else(|| Path::new(""));
            let parent_name = parent
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            result = result
                .replace("{INPUT_PATH}", &parent.to_string_lossy())
                .replace("{INPUT_NAMEEXT}", &name)
                .replace("{INPUT_NAMENOEXT}", stem)
                .replace("{INPUT_EXT}", ext)
                .replace("{INPUT_PARENT_PATH}", &grandparent.to_string_lossy())
                .replace("{INPUT_PARENT_NAME}", &parent_name);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_placeholders() {
        let mut session = Session::default();
        session.set_current_input("/some/where/file.txt");

        assert_eq!(session.expand_placeholders("{INPUT_PATH}/out"), "/some/where/out");
        assert_eq!(session.expand_placeholders("{INPUT_NAMEEXT}"), "file.txt");
        assert_eq!(session.expand_placeholders("{INPUT_NAMENOEXT}-x"), "file-x");
        assert_eq!(session.expand_placeholders("{INPUT_EXT}"), ".txt");
        assert_eq!(session.expand_placeholders("{INPUT_PARENT_PATH}"), "/some");
        assert_eq!(session.expand_placeholders("{INPUT_PARENT_NAME}"), "where");
    }

    #[test]
    fn test_no_input_leaves_input_placeholders() {
        let session = Session::default();
        assert_eq!(session.expand_placeholders("{INPUT_PATH}/x"), "{INPUT_PATH}/x");
        assert_eq!(session.expand_placeholders("/plain/path"), "/plain/path");
    }

    #[test]
    fn test_tmp_placeholder() {
        let session = Session::default();
        let expanded = session.expand_placeholders("{TMP}/out");
        assert!(!expanded.contains("{TMP}"));
        assert!(expanded.ends_with("/out"));
    }
}
