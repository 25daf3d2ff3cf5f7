//! Compress-or-raw decision for a single group.

use tracing::{debug, warn};

use crate::asciicast::{payload, Frame, FrameKind};

/// Size up to which the loosest ratio threshold applies (bytes)
const SMALL_INPUT: usize = 1024;

/// Size up to which the middle ratio threshold applies (bytes)
const MEDIUM_INPUT: usize = 8192;

/// Ratio (`compressed / original`) a group must beat to be stored compressed.
///
/// Larger inputs are held to a stricter bar.
pub fn compression_threshold(original_size: usize) -> f64 {
    if original_size > MEDIUM_INPUT {
        0.85
    } else if original_size > SMALL_INPUT {
        0.90
    } else {
        0.95
    }
}

/// Why a group ended up in its final representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Fewer frames than the minimum group size
    TooSmall,
    /// Group contains frames that are not raw output
    NotRaw,
    /// Stored as one compressed block
    Compressed { original: usize, compressed: usize },
    /// Compression did not beat the threshold
    Rejected { ratio: f64, threshold: f64 },
    /// Compressor failed; frames kept raw
    Failed,
}

/// Frames to write for one group, plus the decision that produced them.
#[derive(Debug, Clone)]
pub struct EncodedGroup {
    pub frames: Vec<Frame>,
    pub decision: Decision,
}

impl EncodedGroup {
    fn raw(group: &[Frame], decision: Decision) -> Self {
        Self {
            frames: group.to_vec(),
            decision,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.decision, Decision::Compressed { .. })
    }
}

/// Encode a group as a single compressed block when that is worthwhile.
///
/// Never fails: every error path degrades to writing the group's frames raw.
pub fn encode_group(group: &[Frame], min_group_size: usize) -> EncodedGroup {
    if group.len() < min_group_size || group.is_empty() {
        return EncodedGroup::raw(group, Decision::TooSmall);
    }

    if group.iter().any(|f| f.kind != FrameKind::Output) {
        return EncodedGroup::raw(group, Decision::NotRaw);
    }

    let original: Vec<u8> = group
        .iter()
        .flat_map(|f| f.data.as_bytes())
        .copied()
        .collect();

    if original.is_empty() {
        return EncodedGroup::raw(
            group,
            Decision::Rejected {
                ratio: 1.0,
                threshold: compression_threshold(0),
            },
        );
    }

    let compressed = match payload::compress(&original) {
        Ok(compressed) => compressed,
        Err(err) => {
            warn!(error = %err, frames = group.len(), "compression failed, writing raw frames");
            return EncodedGroup::raw(group, Decision::Failed);
        }
    };

    let ratio = compressed.len() as f64 / original.len() as f64;
    let threshold = compression_threshold(original.len());

    if ratio >= threshold {
        debug!(ratio, threshold, frames = group.len(), "compression not worthwhile");
        return EncodedGroup::raw(group, Decision::Rejected { ratio, threshold });
    }

    let first = &group[0];
    let last = &group[group.len() - 1];

    EncodedGroup {
        frames: vec![Frame::compressed(
            first.time,
            last.time,
            payload::to_text(&compressed),
        )],
        decision: Decision::Compressed {
            original: original.len(),
            compressed: compressed.len(),
        },
    }
}
