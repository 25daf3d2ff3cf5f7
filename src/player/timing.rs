//! Per-frame delay computation for playback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::asciicast::util::secs_to_duration;

/// Longest uninterrupted sleep while a stop flag is being watched
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Blocks the player between frames.
pub trait Sleeper {
    /// Wait for `duration`, returning early once `stop` is raised.
    fn sleep(&mut self, duration: Duration, stop: Option<&AtomicBool>);
}

/// Sleeps the current thread in short slices so a stop request is noticed
/// within [`STOP_POLL_INTERVAL`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration, stop: Option<&AtomicBool>) {
        let Some(stop) = stop else {
            if !duration.is_zero() {
                thread::sleep(duration);
            }
            return;
        };

        let deadline = Instant::now() + duration;
        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            thread::sleep(remaining.min(STOP_POLL_INTERVAL));
        }
    }
}

/// Records requested sleeps instead of blocking.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    pub requests: Vec<Duration>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration, _stop: Option<&AtomicBool>) {
        self.requests.push(duration);
    }
}

/// Speed multiplier to use; anything non-positive or non-finite means 1.0.
pub fn effective_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    }
}

/// Wait between two frames at the given speed.
///
/// The recorded gap is clamped at zero, capped at `max_wait` (when positive)
/// and then scaled by `speed`.
pub fn frame_delay(prev_time: f64, time: f64, speed: f64, max_wait: Option<f64>) -> Duration {
    let mut gap = (time - prev_time).max(0.0);
    if let Some(cap) = max_wait.filter(|cap| *cap > 0.0) {
        gap = gap.min(cap);
    }

    secs_to_duration(gap / effective_speed(speed))
}

/// Subtract time already spent on the previous frame, never going below zero.
pub fn compensate(delay: Duration, overhead: Duration) -> Duration {
    delay.saturating_sub(overhead)
}
