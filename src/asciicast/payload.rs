//! Compressed-block payload encoding.
//!
//! A compressed block stores the concatenated output of several frames as
//! gzip data, base64-encoded so it can live inside a JSON string.

use std::io::{Read, Write};

use base64::{engine::general_purpose, Engine as _};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::error::PayloadError;

/// Compress raw bytes with gzip. Returns the binary compressed stream.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).map_err(PayloadError::Compress)?;
    encoder.finish().map_err(PayloadError::Compress)
}

/// Encode already-compressed bytes as text.
pub fn to_text(compressed: &[u8]) -> String {
    general_purpose::STANDARD.encode(compressed)
}

/// Compress and text-encode in one step.
pub fn encode(data: &[u8]) -> Result<String, PayloadError> {
    compress(data).map(|compressed| to_text(&compressed))
}

/// Reverse of [`encode`]: base64-decode, then gunzip.
pub fn decode(text: &str) -> Result<Vec<u8>, PayloadError> {
    let compressed = general_purpose::STANDARD.decode(text.trim())?;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut out = Vec::with_capacity(compressed.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(PayloadError::Decompress)?;
    Ok(out)
}
