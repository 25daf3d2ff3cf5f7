//! Similarity-based grouping of buffered frames.
//!
//! **Algorithm** (one pass over the buffer, then one pass over the runs):
//! 1. Start a run at the first frame
//! 2. Extend the run while the gap to the previous frame is under
//!    [`MAX_GAP`] seconds and the payload prefixes are more than
//!    [`SIMILARITY_THRESHOLD`] alike
//! 3. Greedily merge adjacent runs while the merged size fits
//!    `merge_limit`; a run that does not fit is emitted alone if it is at
//!    least `min_group_size` long, otherwise it seeds the next merge
//!
//! Groups are returned as sub-slices of the input, in order, covering every
//! frame exactly once.

use std::ops::Range;

use super::BatchLimits;
use crate::asciicast::Frame;

/// Bytes compared at the start of each payload
pub const SIMILARITY_PREFIX: usize = 32;

/// Similarity two frames must exceed to share a run
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Time gap (seconds) at which a run always breaks
pub const MAX_GAP: f64 = 1.0;

/// Fraction of equal bytes at equal offsets over the shared prefix.
///
/// Returns 0.0 when either side is empty.
pub fn content_similarity(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len().min(b.len()).min(SIMILARITY_PREFIX);
    if len == 0 {
        return 0.0;
    }

    let same = a[..len]
        .iter()
        .zip(&b[..len])
        .filter(|(x, y)| x == y)
        .count();

    same as f64 / len as f64
}

/// Whether `next` continues the run that `prev` belongs to.
pub fn belongs_together(prev: &Frame, next: &Frame) -> bool {
    next.time - prev.time < MAX_GAP
        && content_similarity(prev.data.as_bytes(), next.data.as_bytes()) > SIMILARITY_THRESHOLD
}

/// Split frames into maximal runs of similar, closely spaced frames.
pub fn split_runs(frames: &[Frame]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    if frames.is_empty() {
        return runs;
    }

    let mut start = 0;
    for i in 1..frames.len() {
        if !belongs_together(&frames[i - 1], &frames[i]) {
            runs.push(start..i);
            start = i;
        }
    }
    runs.push(start..frames.len());

    runs
}

/// Greedily merge adjacent runs within the configured limits.
pub fn merge_runs(runs: Vec<Range<usize>>, limits: &BatchLimits) -> Vec<Range<usize>> {
    if runs.len() <= 1 {
        return runs;
    }

    let mut merged = Vec::with_capacity(runs.len());
    let mut current: Option<Range<usize>> = None;

    for run in runs {
        let current_len = current.as_ref().map_or(0, |r| r.len());

        if current_len + run.len() <= limits.merge_limit {
            // Runs are adjacent, so merging only moves the end
            current = Some(match current {
                Some(r) => r.start..run.end,
                None => run,
            });
            continue;
        }

        if let Some(r) = current.take() {
            merged.push(r);
        }

        if run.len() >= limits.min_group_size {
            merged.push(run);
        } else {
            current = Some(run);
        }
    }

    if let Some(r) = current {
        merged.push(r);
    }

    merged
}

/// Partition a flush buffer into compression candidates.
pub fn partition<'a>(frames: &'a [Frame], limits: &BatchLimits) -> Vec<&'a [Frame]> {
    merge_runs(split_runs(frames), limits)
        .into_iter()
        .map(|range| &frames[range])
        .collect()
}
