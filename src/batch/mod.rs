//! Online batching of raw output frames.
//!
//! The writer buffers frames and, on flush, hands them to this module:
//!
//! - [`grouping`] - splits the buffer into runs of similar, closely spaced
//!   frames and greedily merges small runs
//! - [`compress`] - decides per group whether one compressed block beats the
//!   raw frames
//!
//! Both halves are single-pass and allocation-light so they can run inside the
//! capture write path.

pub mod compress;
pub mod grouping;

pub use compress::{compression_threshold, encode_group, Decision, EncodedGroup};
pub use grouping::{content_similarity, partition};

use crate::config::CompressionConfig;

/// Size limits used by grouping and by the writer's flush triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchLimits {
    /// Groups below this size are never compressed
    pub min_group_size: usize,
    /// Pending frames that force a flush
    pub max_batch_size: usize,
    /// Largest group the greedy merge may build from several runs
    pub merge_limit: usize,
    /// Pending payload bytes that allow an early flush
    pub data_threshold: usize,
    /// Recording time a batch may span before it is flushed (seconds)
    pub batch_window: f64,
}

impl BatchLimits {
    /// Target group size after clamping the ratio knob.
    pub fn target_group_size(ratio: usize, min: usize, max: usize) -> usize {
        ratio.clamp(min, max)
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self::from(&CompressionConfig::default())
    }
}

impl From<&CompressionConfig> for BatchLimits {
    fn from(config: &CompressionConfig) -> Self {
        let min_group_size = config.min_group_size.max(1);
        let max_batch_size = config.max_batch_size.max(min_group_size);
        let target = Self::target_group_size(config.ratio, min_group_size, max_batch_size);

        Self {
            min_group_size,
            max_batch_size,
            merge_limit: (target * 2).min(max_batch_size),
            data_threshold: config.data_threshold,
            batch_window: if config.batch_window > 0.0 {
                config.batch_window
            } else {
                CompressionConfig::default().batch_window
            },
        }
    }
}
