//! Frame records and their two wire encodings.
//!
//! Raw output frames are written positionally (`[time, "o", data]`).
//! Compressed blocks are written as keyed objects
//! (`{"a": time, "b": "z", "c": data, "d": end_time}`). The decoder accepts
//! either shape for any kind, dispatching on the first significant character.

use serde_json::{json, Map, Value};

use super::error::{FrameError, PayloadError};
use super::payload;

/// Frame type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Uncompressed terminal output
    Output, // "o"
    /// Coalesced, compressed span of output
    Compressed, // "z"
}

impl FrameKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "o" => Some(FrameKind::Output),
            "z" => Some(FrameKind::Compressed),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            FrameKind::Output => "o",
            FrameKind::Compressed => "z",
        }
    }
}

/// Wire encoding of a frame line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `[time, kind, data]`
    Positional,
    /// `{"a": time, "b": kind, "c": data, "d": end_time}`
    Keyed,
}

/// A single recorded event.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Seconds since recording start
    pub time: f64,
    /// Frame type
    pub kind: FrameKind,
    /// Output text, or the base64 payload of a compressed block
    pub data: String,
    /// Timestamp of the last frame folded into a compressed block
    pub end_time: Option<f64>,
}

impl Frame {
    pub fn output(time: f64, data: impl Into<String>) -> Self {
        Self {
            time,
            kind: FrameKind::Output,
            data: data.into(),
            end_time: None,
        }
    }

    /// Build a compressed block from an already encoded payload.
    pub fn compressed(time: f64, end_time: f64, payload: impl Into<String>) -> Self {
        Self {
            time,
            kind: FrameKind::Compressed,
            data: payload.into(),
            end_time: Some(end_time.max(time)),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.kind == FrameKind::Compressed
    }

    /// Latest timestamp covered by this frame.
    pub fn last_time(&self) -> f64 {
        self.end_time.unwrap_or(self.time)
    }

    /// Bytes this frame contributes to the terminal when replayed.
    ///
    /// Raw frames borrow their text; compressed blocks are expanded.
    pub fn output_bytes(&self) -> Result<std::borrow::Cow<'_, [u8]>, PayloadError> {
        match self.kind {
            FrameKind::Output => Ok(std::borrow::Cow::Borrowed(self.data.as_bytes())),
            FrameKind::Compressed => payload::decode(&self.data).map(std::borrow::Cow::Owned),
        }
    }

    /// The encoding the writer uses for this frame's kind.
    pub fn canonical_encoding(&self) -> Encoding {
        match self.kind {
            FrameKind::Output => Encoding::Positional,
            FrameKind::Compressed => Encoding::Keyed,
        }
    }

    /// Convert frame to its canonical JSON line (without trailing newline).
    pub fn to_json(&self) -> String {
        self.to_json_with(self.canonical_encoding())
    }

    /// Encode with an explicit wire encoding.
    ///
    /// The positional form has no slot for `end_time`, so a compressed block
    /// encoded positionally loses its span end.
    pub fn to_json_with(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::Positional => json!([self.time, self.kind.to_code(), self.data]).to_string(),
            Encoding::Keyed => {
                let mut map = Map::new();
                map.insert("a".into(), json!(self.time));
                map.insert("b".into(), json!(self.kind.to_code()));
                map.insert("c".into(), json!(self.data));
                if let (FrameKind::Compressed, Some(end)) = (self.kind, self.end_time) {
                    map.insert("d".into(), json!(end));
                }
                Value::Object(map).to_string()
            }
        }
    }

    /// Parse a frame from a JSON line in either encoding.
    pub fn from_json(line: &str) -> Result<Self, FrameError> {
        let trimmed = line.trim_start();
        match trimmed.chars().next() {
            Some('{') => Self::from_keyed(serde_json::from_str(trimmed)?),
            Some('[') => Self::from_positional(serde_json::from_str(trimmed)?),
            _ => Err(FrameError::UnrecognizedShape),
        }
    }

    fn from_positional(value: Value) -> Result<Self, FrameError> {
        let arr = value.as_array().ok_or(FrameError::UnrecognizedShape)?;

        if arr.len() < 3 {
            return Err(FrameError::TooFewElements(arr.len()));
        }

        let time = number(&arr[0], "time")?;
        let kind = kind(&arr[1])?;
        let data = string(&arr[2], "data")?;

        Ok(Frame {
            time,
            kind,
            data,
            end_time: None,
        })
    }

    fn from_keyed(value: Value) -> Result<Self, FrameError> {
        let map = value.as_object().ok_or(FrameError::UnrecognizedShape)?;

        let time = number(map.get("a").ok_or(FrameError::MissingField("a"))?, "a")?;
        let kind = kind(map.get("b").ok_or(FrameError::MissingField("b"))?)?;
        let data = string(map.get("c").ok_or(FrameError::MissingField("c"))?, "c")?;

        let end_time = match (kind, map.get("d")) {
            (FrameKind::Compressed, Some(d)) => Some(number(d, "d")?),
            _ => None,
        };

        if let Some(end_time) = end_time {
            if end_time < time {
                return Err(FrameError::EndBeforeStart { time, end_time });
            }
        }

        Ok(Frame {
            time,
            kind,
            data,
            end_time,
        })
    }
}

fn number(value: &Value, field: &'static str) -> Result<f64, FrameError> {
    value.as_f64().ok_or(FrameError::InvalidField {
        field,
        expected: "number",
    })
}

fn string(value: &Value, field: &'static str) -> Result<String, FrameError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(FrameError::InvalidField {
            field,
            expected: "string",
        })
}

fn kind(value: &Value) -> Result<FrameKind, FrameError> {
    let code = value.as_str().ok_or(FrameError::InvalidField {
        field: "kind",
        expected: "string",
    })?;
    FrameKind::from_code(code).ok_or_else(|| FrameError::UnknownKind(code.to_string()))
}
