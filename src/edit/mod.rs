//! Timeline edits on loaded recordings.
//!
//! Each edit remaps frame times (block end times included) with a monotone
//! function, so frame order and block spans stay consistent. When the header
//! carries a duration it is recomputed from the edited frames.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::asciicast::util::round_micros;
use crate::asciicast::{Frame, Recording};

/// Invalid edit parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("Invalid time range: end ({end}) must be after start ({start})")]
    InvalidRange { start: f64, end: f64 },

    #[error("Speed factor must be a positive number (got {0})")]
    InvalidFactor(f64),

    #[error("Invalid quantization range '{0}': expected MIN or MIN,MAX with 0 <= MIN < MAX")]
    InvalidQuantizeRange(String),

    #[error("Quantization ranges {0} and {1} overlap")]
    OverlappingRanges(QuantizeRange, QuantizeRange),

    #[error("At least one quantization range is required")]
    NoRanges,
}

/// Outcome of an edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditReport {
    /// Frames left in the recording
    pub frames: usize,
    pub frames_removed: usize,
    /// Latest frame time after the edit (seconds)
    pub duration: f64,
}

/// Remove every frame starting within `[start, end]` and pull later frames
/// back by the length of the cut.
pub fn cut(recording: &mut Recording, start: f64, end: f64) -> Result<EditReport, EditError> {
    check_range(start, end)?;

    let before = recording.frames.len();
    recording
        .frames
        .retain(|frame| frame.time < start || frame.time > end);

    let removed = end - start;
    retime(recording, |t| {
        if t < start {
            t
        } else if t <= end {
            start
        } else {
            t - removed
        }
    });

    let report = finish(recording, before);
    debug!(start, end, removed = report.frames_removed, "cut recording");
    Ok(report)
}

/// Multiply every delay inside `[start, end]` by `factor`.
///
/// A factor below 1 plays that stretch faster. Frames after the range move
/// by the time gained or lost. `end` of `None` runs to the end of the
/// recording.
pub fn speed(
    recording: &mut Recording,
    factor: f64,
    start: f64,
    end: Option<f64>,
) -> Result<EditReport, EditError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(EditError::InvalidFactor(factor));
    }
    let end = end.unwrap_or(f64::INFINITY);
    if end.is_finite() {
        check_range(start, end)?;
    } else if !start.is_finite() || start < 0.0 {
        return Err(EditError::InvalidRange { start, end });
    }

    let before = recording.frames.len();
    retime(recording, |t| {
        if t < start {
            t
        } else if t <= end {
            start + (t - start) * factor
        } else {
            t + (end - start) * (factor - 1.0)
        }
    });

    let report = finish(recording, before);
    debug!(factor, start, end, "changed recording speed");
    Ok(report)
}

/// Replace every delay that falls in a range with that range's minimum.
///
/// Delays are measured between consecutive points of the timeline: the
/// start of the recording, each frame time and each block end time.
pub fn quantize(recording: &mut Recording, ranges: &[QuantizeRange]) -> Result<EditReport, EditError> {
    check_ranges(ranges)?;

    let mut last_old = 0.0_f64;
    let mut last_new = 0.0_f64;
    let mut step = |t: f64| {
        let gap = (t - last_old).max(0.0);
        let gap = ranges
            .iter()
            .find(|range| range.contains(gap))
            .map_or(gap, |range| range.min);
        last_old = last_old.max(t);
        last_new += gap;
        last_new
    };

    for frame in &mut recording.frames {
        frame.time = step(frame.time);
        if let Some(end_time) = frame.end_time {
            frame.end_time = Some(step(end_time));
        }
    }

    let before = recording.frames.len();
    let report = finish(recording, before);
    debug!(ranges = ranges.len(), duration = report.duration, "quantized recording");
    Ok(report)
}

/// A delay range for [`quantize`]: `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeRange {
    pub min: f64,
    pub max: f64,
}

impl QuantizeRange {
    pub fn new(min: f64, max: f64) -> Result<Self, EditError> {
        let range = Self { min, max };
        if min.is_finite() && min >= 0.0 && !max.is_nan() && max > min {
            Ok(range)
        } else {
            Err(EditError::InvalidQuantizeRange(range.to_string()))
        }
    }

    /// Range with no upper bound.
    pub fn at_least(min: f64) -> Result<Self, EditError> {
        Self::new(min, f64::INFINITY)
    }

    pub fn contains(&self, delay: f64) -> bool {
        delay >= self.min && delay < self.max
    }
}

impl fmt::Display for QuantizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max.is_infinite() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{},{}", self.min, self.max)
        }
    }
}

impl FromStr for QuantizeRange {
    type Err = EditError;

    /// Parse `MIN` or `MIN,MAX` (seconds).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EditError::InvalidQuantizeRange(s.to_string());
        let number = |part: &str| part.trim().parse::<f64>().map_err(|_| invalid());

        let (min, max) = match s.split_once(',') {
            Some((min, max)) => (number(min)?, number(max)?),
            None => (number(s)?, f64::INFINITY),
        };
        Self::new(min, max).map_err(|_| invalid())
    }
}

fn check_range(start: f64, end: f64) -> Result<(), EditError> {
    if start.is_finite() && end.is_finite() && start >= 0.0 && end > start {
        Ok(())
    } else {
        Err(EditError::InvalidRange { start, end })
    }
}

fn check_ranges(ranges: &[QuantizeRange]) -> Result<(), EditError> {
    if ranges.is_empty() {
        return Err(EditError::NoRanges);
    }

    let mut sorted = ranges.to_vec();
    sorted.sort_by(|a, b| a.min.total_cmp(&b.min));
    for pair in sorted.windows(2) {
        if pair[0].max > pair[1].min {
            return Err(EditError::OverlappingRanges(pair[0], pair[1]));
        }
    }
    Ok(())
}

fn retime(recording: &mut Recording, map: impl Fn(f64) -> f64) {
    for frame in &mut recording.frames {
        frame.time = map(frame.time);
        frame.end_time = frame.end_time.map(&map);
    }
}

fn finish(recording: &mut Recording, frames_before: usize) -> EditReport {
    let duration = round_micros(
        recording
            .frames
            .iter()
            .map(Frame::last_time)
            .fold(0.0, f64::max),
    );
    if recording.header.duration.is_some() {
        recording.header.duration = Some(duration);
    }

    EditReport {
        frames: recording.frames.len(),
        frames_removed: frames_before - recording.frames.len(),
        duration,
    }
}
