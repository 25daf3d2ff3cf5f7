//! Recording file names.
//!
//! Default names follow `{directory}_{date}_{time}.cast`, where `directory`
//! is the sanitized name of the working directory. Titles shown in headers
//! are derived back from a file's stem.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use deunicode::deunicode;

/// Extension used for recordings.
pub const EXTENSION: &str = "cast";

/// Name used when sanitization leaves nothing.
const FALLBACK_NAME: &str = "recording";

/// Longest directory component kept in a generated name.
const DIRECTORY_MAX_LENGTH: usize = 50;

/// Longest file name most filesystems accept.
const MAX_FILENAME_LENGTH: usize = 255;

const DATE_FORMAT: &str = "%y%m%d";
const TIME_FORMAT: &str = "%H%M%S";

/// Characters that are invalid in file names on common filesystems.
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Windows device names that cannot be used as file names.
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Errors from file name handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("Filename too long: {length} characters (max {max})")]
    TooLong { length: usize, max: usize },
}

/// Make a string safe to use as (part of) a file name.
///
/// Unicode is transliterated to ASCII, whitespace runs become a single
/// hyphen, invalid characters are dropped, edges are trimmed of dots and
/// hyphens, and Windows device names get a `_` prefix. An empty result
/// becomes `recording`.
pub fn sanitize(input: &str) -> String {
    let ascii = deunicode(input);

    let mut result = String::with_capacity(ascii.len());
    let mut last_was_hyphen = false;

    for c in ascii.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_was_hyphen {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            last_was_hyphen = false;
        } else if INVALID_CHARS.contains(&c) {
            continue;
        }
        // anything else left after transliteration is dropped
    }

    let trimmed = result.trim_matches(|c| c == '.' || c == '-');
    let named = prefix_reserved(trimmed);

    if named.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        named
    }
}

fn prefix_reserved(name: &str) -> String {
    let base = name.split('.').next().unwrap_or(name).to_uppercase();
    if WINDOWS_RESERVED.contains(&base.as_str()) {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}

/// Ensure `name` ends in `.cast`.
pub fn with_extension(name: &str) -> String {
    if name.ends_with(".cast") {
        name.to_string()
    } else {
        format!("{}.{}", name, EXTENSION)
    }
}

/// Reject names longer than filesystems allow.
pub fn validate_length(filename: &str) -> Result<(), FilenameError> {
    if filename.len() > MAX_FILENAME_LENGTH {
        Err(FilenameError::TooLong {
            length: filename.len(),
            max: MAX_FILENAME_LENGTH,
        })
    } else {
        Ok(())
    }
}

/// File name for a recording started in `directory` at `now`.
pub fn generate(directory: &str, now: DateTime<Local>) -> Result<String, FilenameError> {
    let dir: String = sanitize(directory)
        .chars()
        .take(DIRECTORY_MAX_LENGTH)
        .collect();
    let filename = format!(
        "{}_{}_{}.{}",
        dir,
        now.format(DATE_FORMAT),
        now.format(TIME_FORMAT),
        EXTENSION
    );

    validate_length(&filename)?;
    Ok(filename)
}

/// Default output path inside `cwd`, named after that directory.
pub fn default_recording_path(cwd: &Path) -> Result<PathBuf, FilenameError> {
    let directory = cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(cwd.join(generate(&directory, Local::now())?))
}

/// Human-readable title from a recording path (`my-demo.cast` → `my demo`).
pub fn title_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let title = stem.replace(['-', '_'], " ");
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
