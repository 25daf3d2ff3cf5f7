//! Export a recording as command/output pairs.
//!
//! Frames are expanded in order and classified one chunk at a time. A chunk
//! is a command when it is a single newline-terminated line, or when it looks
//! like a prompt followed by input. Everything after a command, up to the
//! next one, is its output. If nothing classifies as a command, the whole
//! text is split into its first line and the rest.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::asciicast::Recording;

/// A command line and the output it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub cmd: String,
    pub out: String,
}

static PROMPT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn prompt_pattern() -> &'static Regex {
    PROMPT_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\r\n]*[$#>]\s+[^$#>]+$").expect("Invalid prompt regex")
    })
}

/// Whether a chunk of output reads as a typed command.
pub fn is_command_chunk(text: &str) -> bool {
    let trimmed = text.trim_end_matches(['\r', '\n']);

    let single_line = text.ends_with('\n')
        && text.matches('\n').count() <= 1
        && text.matches('\r').count() <= 1
        && !trimmed.is_empty()
        && !trimmed.contains(['\r', '\n']);

    single_line || prompt_pattern().is_match(trimmed)
}

/// Split expanded output into command/output pairs.
///
/// A command with no output is not reported.
pub fn extract_commands(recording: &Recording) -> Vec<CommandOutput> {
    let chunks = expanded_chunks(recording);

    let mut commands = Vec::new();
    let mut current: Option<String> = None;
    let mut output = String::new();

    for chunk in &chunks {
        if is_command_chunk(chunk) {
            if let Some(cmd) = current.take() {
                if !output.is_empty() {
                    commands.push(CommandOutput {
                        cmd,
                        out: std::mem::take(&mut output),
                    });
                }
            }
            output.clear();
            current = Some(chunk.trim_end_matches(['\r', '\n']).to_string());
        } else {
            output.push_str(chunk);
        }
    }

    if let Some(cmd) = current {
        if !output.is_empty() {
            commands.push(CommandOutput { cmd, out: output });
        }
    }

    if commands.is_empty() {
        commands.extend(first_line_split(&chunks.concat()));
    }

    commands
}

/// Fallback: first non-empty line is the command, the other non-empty lines the output.
fn first_line_split(text: &str) -> Option<CommandOutput> {
    let mut lines = text.split('\n').map(|line| line.trim_end_matches('\r'));

    let cmd = lines.next().filter(|line| !line.is_empty())?.to_string();
    let out: String = lines
        .filter(|line| !line.is_empty())
        .map(|line| format!("{}\n", line))
        .collect();

    if out.is_empty() {
        None
    } else {
        Some(CommandOutput { cmd, out })
    }
}

fn expanded_chunks(recording: &Recording) -> Vec<String> {
    recording
        .frames
        .iter()
        .filter_map(|frame| match frame.output_bytes() {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                warn!(time = frame.time, error = %err, "skipping undecodable block");
                None
            }
        })
        .collect()
}

/// `<name>.json` next to a `.cast` input, otherwise the input path plus `.json`.
pub fn default_output_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == "cast") {
        input.with_extension("json")
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".json");
        PathBuf::from(name)
    }
}

/// Result of exporting one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub commands: usize,
}

/// Export `input` to JSON at `output` (or the default path).
pub fn export_file(input: &Path, output: Option<&Path>) -> Result<ExportSummary> {
    let recording = Recording::load(input)?;
    let commands = extract_commands(&recording);

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    let json = serde_json::to_string(&commands).context("Failed to serialize commands")?;
    fs::write(&output, json).with_context(|| format!("Failed to write file: {:?}", output))?;

    Ok(ExportSummary {
        output,
        commands: commands.len(),
    })
}
