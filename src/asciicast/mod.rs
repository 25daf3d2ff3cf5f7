//! Recording file format: header line followed by one frame per line.
//!
//! Line 1 is a JSON header object. Every following line is a frame in either
//! the positional or keyed encoding (see [`frame`]). Readers are tolerant:
//! frame lines that fail to decode are skipped and counted rather than
//! aborting the whole load.

mod error;
mod frame;
pub mod payload;
pub mod util;

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub use error::{FrameError, PayloadError};
pub use frame::{Encoding, Frame, FrameKind};

/// Format version written to and accepted from headers.
pub const FORMAT_VERSION: u8 = 2;

/// Recording header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub version: u8,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvInfo>,
    /// Fields written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Header {
    /// Create a header for a terminal of the given size, stamped with the current time.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            width,
            height,
            timestamp: chrono::Utc::now().timestamp(),
            duration: None,
            command: None,
            title: None,
            env: None,
            extra: Map::new(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_env(mut self, env: EnvInfo) -> Self {
        self.env = Some(env);
        self
    }

    /// Serialize to a single JSON line (without trailing newline).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}

/// Environment information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvInfo {
    #[serde(rename = "TERM", skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(rename = "SHELL", skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvInfo {
    /// Capture `TERM` and `SHELL` from the process environment.
    pub fn from_env() -> Self {
        Self {
            term: std::env::var("TERM").ok().filter(|v| !v.is_empty()),
            shell: std::env::var("SHELL").ok().filter(|v| !v.is_empty()),
            extra: Map::new(),
        }
    }
}

/// Complete recording: header plus ordered frames.
#[derive(Debug, Clone)]
pub struct Recording {
    pub header: Header,
    pub frames: Vec<Frame>,
    /// Frame lines that could not be decoded while loading
    pub skipped_lines: usize,
}

impl Recording {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            frames: Vec::new(),
            skipped_lines: 0,
        }
    }

    /// Load a recording from a path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            fs::File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
        let reader = BufReader::new(file);

        Self::parse_reader(reader).with_context(|| format!("Failed to load recording {:?}", path))
    }

    /// Parse a recording from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines().enumerate();

        // First non-empty line is the header
        let header_line = loop {
            let (_, line) = lines.next().context("File is empty")?;
            let line = line.context("Failed to read header line")?;
            if !line.trim().is_empty() {
                break line;
            }
        };

        let header = Header::from_json(&header_line).context("Failed to parse header")?;

        if header.version != FORMAT_VERSION {
            bail!(
                "Only version {} recordings are supported (got version {})",
                FORMAT_VERSION,
                header.version
            );
        }

        let mut frames = Vec::new();
        let mut skipped_lines = 0;
        for (index, line_result) in lines {
            let line_num = index + 1;
            let line = line_result.with_context(|| format!("Failed to read line {}", line_num))?;

            if line.trim().is_empty() {
                continue;
            }

            match Frame::from_json(&line) {
                Ok(frame) => frames.push(frame),
                Err(err) => {
                    warn!(line = line_num, error = %err, "skipping undecodable frame");
                    skipped_lines += 1;
                }
            }
        }

        Ok(Recording {
            header,
            frames,
            skipped_lines,
        })
    }

    /// Parse from a string
    pub fn parse_str(content: &str) -> Result<Self> {
        Self::parse_reader(BufReader::new(content.as_bytes()))
    }

    /// Write the recording to a path
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file =
            fs::File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;

        self.write_to(&mut file)
    }

    /// Write the recording to a writer, each frame in its canonical encoding
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let header_json = self.header.to_json().context("Failed to serialize header")?;
        writeln!(writer, "{}", header_json)?;

        for frame in &self.frames {
            writeln!(writer, "{}", frame.to_json())?;
        }

        Ok(())
    }

    /// Convert to string
    pub fn to_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Recording length in seconds.
    ///
    /// Uses the header duration when present, otherwise the latest frame timestamp.
    pub fn duration(&self) -> f64 {
        self.header
            .duration
            .unwrap_or_else(|| self.frames.iter().map(Frame::last_time).fold(0.0, f64::max))
    }

    /// Collect counts and sizes for display.
    pub fn summary(&self) -> RecordingSummary {
        let mut summary = RecordingSummary {
            duration: self.duration(),
            skipped_lines: self.skipped_lines,
            ..RecordingSummary::default()
        };

        for frame in &self.frames {
            match frame.kind {
                FrameKind::Output => {
                    summary.raw_frames += 1;
                    summary.raw_bytes += frame.data.len();
                }
                FrameKind::Compressed => {
                    summary.compressed_blocks += 1;
                    summary.compressed_bytes += frame.data.len();
                    match payload::decode(&frame.data) {
                        Ok(bytes) => summary.expanded_bytes += bytes.len(),
                        Err(_) => summary.undecodable_blocks += 1,
                    }
                }
            }
        }

        summary
    }
}

/// Frame counts and payload sizes of a recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSummary {
    pub duration: f64,
    pub raw_frames: usize,
    pub compressed_blocks: usize,
    /// Bytes of raw output text
    pub raw_bytes: usize,
    /// Bytes of base64 payload stored for compressed blocks
    pub compressed_bytes: usize,
    /// Bytes of output the compressed blocks expand to
    pub expanded_bytes: usize,
    pub undecodable_blocks: usize,
    pub skipped_lines: usize,
}
