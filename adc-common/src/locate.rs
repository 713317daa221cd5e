//! File location helpers
//!
//! Companion-file lookup (annotation file → audio file next to it) and
//! resolution of reader input globs into a concrete, ordered file list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Extensions tried by [`locate_audio`], in order
pub const AUDIO_EXTENSIONS: [&str; 4] = [".mp3", ".MP3", ".wav", ".WAV"];

/// Remove `suffix` from the end of `path` if present. Empty suffix is ignored.
pub fn strip_suffix<'a>(path: &'a str, suffix: Option<&str>) -> &'a str {
    match suffix {
        Some(s) if !s.is_empty() => path.strip_suffix(s).unwrap_or(path),
        _ => path,
    }
}

/// Locate the files associated with `path` by swapping its extension.
///
/// With `rel_path`, the file name is looked up in that directory relative to
/// the directory of `path`. `suffix` (which may include an extension) is
/// stripped from the name before the extension is replaced. Each candidate in
/// `extensions` that exists is returned, in the order given.
pub fn locate_file(
    path: &Path,
    extensions: &[&str],
    rel_path: Option<&str>,
    suffix: Option<&str>,
) -> Vec<PathBuf> {
    let path = match (rel_path, path.file_name()) {
        (Some(rel), Some(name)) => path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(rel)
            .join(name),
        _ => path.to_path_buf(),
    };

    let full = path.to_string_lossy();
    let stripped = strip_suffix(&full, suffix);
    let noext = crate::format::split_extension(stripped).0;

    extensions
        .iter()
        .map(|ext| PathBuf::from(format!("{}{}", noext, ext)))
        .filter(|candidate| candidate.exists())
        .collect()
}

/// Locate the audio file (MP3 or WAV, either case) belonging to `path`
pub fn locate_audio(path: &Path, rel_path: Option<&str>, suffix: Option<&str>) -> Option<PathBuf> {
    locate_file(path, &AUDIO_EXTENSIONS, rel_path, suffix)
        .into_iter()
        .next()
}

/// Resolve reader inputs into the list of files to process.
///
/// Each input is a glob; a directory gets `default_glob` appended. Each list
/// file holds one glob per line. Matches are sorted per glob and
/// de-duplicated, keeping argument order across globs. With `resume_from`,
/// files before the first match of that glob are dropped.
pub fn locate_files(
    inputs: &[String],
    input_lists: &[PathBuf],
    default_glob: Option<&str>,
    resume_from: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let mut patterns: Vec<String> = Vec::new();
    for input in inputs {
        patterns.push(expand_directory(input, default_glob));
    }
    for list in input_lists {
        let content = std::fs::read_to_string(list).map_err(|e| {
            Error::Config(format!("Cannot read input list {}: {}", list.display(), e))
        })?;
        patterns.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| expand_directory(l, default_glob)),
        );
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in &patterns {
        let paths = glob::glob(pattern)
            .map_err(|e| Error::Config(format!("Invalid glob '{}': {}", pattern, e)))?;
        let mut matched: Vec<PathBuf> = paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable path");
                    None
                }
            })
            .filter(|p| p.is_file())
            .collect();
        matched.sort();
        tracing::debug!(pattern = %pattern, count = matched.len(), "Resolved input glob");
        for path in matched {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    if let Some(resume) = resume_from {
        let matcher = glob::Pattern::new(resume)
            .map_err(|e| Error::Config(format!("Invalid resume glob '{}': {}", resume, e)))?;
        let start = files
            .iter()
            .position(|p| matcher.matches_path(p))
            .ok_or_else(|| Error::Config(format!("No input file matches resume_from: {}", resume)))?;
        tracing::info!(skipped = start, "Resuming from {}", files[start].display());
        files.drain(..start);
    }

    if files.is_empty() {
        return Err(Error::Config(format!(
            "Failed to locate any files using: {}",
            patterns.join(", ")
        )));
    }

    Ok(files)
}

fn expand_directory(input: &str, default_glob: Option<&str>) -> String {
    match default_glob {
        Some(glob) if Path::new(input).is_dir() => Path::new(input).join(glob).to_string_lossy().into_owned(),
        _ => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("a-spk.txt", Some("-spk.txt")), "a");
        assert_eq!(strip_suffix("a.txt", Some("-spk.txt")), "a.txt");
        assert_eq!(strip_suffix("a.txt", Some("")), "a.txt");
        assert_eq!(strip_suffix("a.txt", None), "a.txt");
    }

    #[test]
    fn test_locate_file_missing_returns_empty() {
        let found = locate_file(Path::new("/nonexistent/dir/x.txt"), &[".wav"], None, None);
        assert!(found.is_empty());
    }

    #[test]
    fn test_locate_files_empty_is_config_error() {
        let result = locate_files(&["/nonexistent/**/*.tsv".to_string()], &[], None, None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
