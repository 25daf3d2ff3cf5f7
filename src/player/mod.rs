//! Sequential playback of a recording to an output sink.
//!
//! Each frame waits for its recorded gap (capped, then scaled by speed) minus
//! the time spent handling the previous frame, so cumulative wall time tracks
//! the recording instead of drifting later with every frame. Compressed
//! blocks are expanded and written in one go at their start time.

pub mod timing;

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

pub use timing::{RecordingSleeper, Sleeper, ThreadSleeper};

use crate::asciicast::Recording;
use crate::config::PlaybackConfig;

/// Playback settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackOptions {
    /// Speed multiplier (2.0 = twice as fast)
    pub speed: f64,
    /// Longest recorded gap honoured between two frames (seconds)
    pub max_wait: Option<f64>,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}

impl PlaybackOptions {
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            speed: config.speed,
            max_wait: config.max_wait,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<f64>) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// Outcome of a playback run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackReport {
    pub frames_played: usize,
    /// Compressed blocks that failed to decode
    pub frames_skipped: usize,
    pub bytes_written: usize,
    /// Playback ended early because the stop flag was set
    pub stopped: bool,
}

/// Replays recordings.
pub struct Player<S: Sleeper = ThreadSleeper> {
    options: PlaybackOptions,
    sleeper: S,
    stop: Option<Arc<AtomicBool>>,
}

impl Player<ThreadSleeper> {
    pub fn new(options: PlaybackOptions) -> Self {
        Self {
            options,
            sleeper: ThreadSleeper,
            stop: None,
        }
    }
}

impl<S: Sleeper> Player<S> {
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> Player<T> {
        Player {
            options: self.options,
            sleeper,
            stop: self.stop,
        }
    }

    /// Stop before the next frame once `flag` is set.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn options(&self) -> &PlaybackOptions {
        &self.options
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Play every frame of `recording` into `out`.
    ///
    /// Write errors end playback; undecodable blocks are skipped.
    pub fn play<W: Write>(&mut self, recording: &Recording, out: &mut W) -> io::Result<PlaybackReport> {
        let mut report = PlaybackReport::default();
        let mut overhead = Duration::ZERO;
        let frames = &recording.frames;

        for (i, frame) in frames.iter().enumerate() {
            if self.stop_requested() {
                report.stopped = true;
                break;
            }

            if i > 0 {
                let delay = timing::frame_delay(
                    frames[i - 1].time,
                    frame.time,
                    self.options.speed,
                    self.options.max_wait,
                );
                self.sleeper
                    .sleep(timing::compensate(delay, overhead), self.stop.as_deref());

                if self.stop_requested() {
                    report.stopped = true;
                    break;
                }
            }

            let started = Instant::now();

            match frame.output_bytes() {
                Ok(bytes) => {
                    out.write_all(&bytes)?;
                    out.flush()?;
                    report.frames_played += 1;
                    report.bytes_written += bytes.len();
                }
                Err(err) => {
                    warn!(index = i, time = frame.time, error = %err, "skipping undecodable block");
                    report.frames_skipped += 1;
                }
            }

            overhead = started.elapsed();
        }

        debug!(
            played = report.frames_played,
            skipped = report.frames_skipped,
            stopped = report.stopped,
            "playback finished"
        );

        Ok(report)
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }
}
