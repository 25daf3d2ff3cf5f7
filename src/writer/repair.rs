//! Repair pass for recordings that may have been cut off mid-write.
//!
//! The header line must parse. Every frame line that does not decode is
//! dropped, every line that does is kept byte-for-byte, and the header's
//! `duration` is set from the latest retained timestamp. Running the pass on
//! its own output changes nothing.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::asciicast::util::round_micros;
use crate::asciicast::{Frame, Header, FORMAT_VERSION};

/// Errors that stop a repair before anything is rewritten.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("Failed to access recording {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Recording has no header line")]
    MissingHeader,

    #[error("Recording header is not valid JSON: {0}")]
    InvalidHeader(#[source] serde_json::Error),

    #[error("Only version 2 recordings can be repaired (got version {0})")]
    UnsupportedVersion(u8),
}

/// Outcome of a repair pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairReport {
    /// Frame lines kept
    pub kept_frames: usize,
    /// Non-empty lines dropped because they did not decode
    pub dropped_lines: usize,
    /// Duration written to the header (seconds)
    pub duration: f64,
    /// Whether the content changed
    pub rewritten: bool,
}

/// Repair recording text, returning the repaired text and a report.
pub fn repair_str(content: &str) -> Result<(String, RepairReport), RepairError> {
    let mut lines = content.lines();

    let header_line = lines
        .by_ref()
        .find(|line| !line.trim().is_empty())
        .ok_or(RepairError::MissingHeader)?;
    let mut header = Header::from_json(header_line).map_err(RepairError::InvalidHeader)?;
    if header.version != FORMAT_VERSION {
        return Err(RepairError::UnsupportedVersion(header.version));
    }

    let mut kept = Vec::new();
    let mut dropped_lines = 0;
    let mut last_time = 0.0_f64;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match Frame::from_json(line) {
            Ok(frame) => {
                last_time = last_time.max(frame.last_time());
                kept.push(line);
            }
            Err(err) => {
                debug!(error = %err, "dropping undecodable line");
                dropped_lines += 1;
            }
        }
    }

    let duration = round_micros(last_time);
    header.duration = Some(duration);
    let header_json = header.to_json().map_err(RepairError::InvalidHeader)?;

    let mut repaired = String::with_capacity(content.len() + 32);
    repaired.push_str(&header_json);
    repaired.push('\n');
    for line in &kept {
        repaired.push_str(line);
        repaired.push('\n');
    }

    let report = RepairReport {
        kept_frames: kept.len(),
        dropped_lines,
        duration,
        rewritten: repaired != content,
    };

    Ok((repaired, report))
}

/// Repair a recording file in place.
///
/// The file is only replaced (via a sibling temp file and rename) when its
/// content changes. On error the original file is left untouched.
pub fn repair_file<P: AsRef<Path>>(path: P) -> Result<RepairReport, RepairError> {
    let path = path.as_ref();
    let io_err = |source| RepairError::Io {
        path: path.to_path_buf(),
        source,
    };

    // A cut-off write can split a multi-byte character; decode lossily so
    // the damage stays confined to the line that gets dropped
    let bytes = fs::read(path).map_err(io_err)?;
    let content = String::from_utf8_lossy(&bytes);

    let (repaired, report) = repair_str(&content)?;

    if report.rewritten {
        replace_contents(path, repaired.as_bytes()).map_err(io_err)?;
        if report.dropped_lines > 0 {
            warn!(
                path = %path.display(),
                dropped = report.dropped_lines,
                "dropped damaged lines from recording"
            );
        }
        info!(
            path = %path.display(),
            frames = report.kept_frames,
            duration = report.duration,
            "repaired recording"
        );
    } else {
        debug!(path = %path.display(), "recording already valid");
    }

    Ok(report)
}

fn replace_contents(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".repair");
    let temp_path = path.with_file_name(temp_name);

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
