//! Frame and payload decoding errors.

/// Errors produced while decoding a single frame line.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Invalid frame JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Frame must be a JSON array or object")]
    UnrecognizedShape,

    #[error("Frame array must have at least 3 elements (got {0})")]
    TooFewElements(usize),

    #[error("Frame is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Frame field '{field}' must be a {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Unknown frame type: {0}")]
    UnknownKind(String),

    #[error("Frame end time {end_time} precedes start time {time}")]
    EndBeforeStart { time: f64, end_time: f64 },
}

/// Errors produced while compressing or expanding a compressed-block payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to compress payload: {0}")]
    Compress(#[source] std::io::Error),

    #[error("Failed to decompress payload: {0}")]
    Decompress(#[source] std::io::Error),
}
