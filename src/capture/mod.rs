//! Capture stream: raw terminal writes in, timestamped frames out.
//!
//! Every write becomes one output frame stamped with the cumulative elapsed
//! time. Idle gaps are capped at `max_wait` so replay never stalls on a
//! paused user, and same-tick writes are pushed forward by a fixed step.
//!
//! The stream holds back the most recent frame until the next write arrives.
//! That one-frame lookahead lets [`CaptureStream::close`] drop a trailing
//! `exit` echo before it ever reaches the sink, while an interrupted or
//! dropped stream still forwards it.

pub mod clock;

use std::convert::Infallible;
use std::io;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

pub use clock::{Clock, ManualClock, SystemClock};

use crate::asciicast::util::secs_to_duration;
use crate::asciicast::Frame;

/// Shell echo of the command that ended the session
pub const EXIT_ECHO: &str = "exit\r\n";

/// Step used when two writes land on the same clock tick
pub const MIN_STEP: Duration = Duration::from_millis(500);

/// Idle-gap cap used when none (or a non-positive one) is configured
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(1);

/// Receiver of captured frames.
pub trait FrameSink {
    type Error: std::fmt::Display;

    fn accept(&mut self, frame: Frame) -> Result<(), Self::Error>;
}

impl FrameSink for Vec<Frame> {
    type Error = Infallible;

    fn accept(&mut self, frame: Frame) -> Result<(), Self::Error> {
        self.push(frame);
        Ok(())
    }
}

/// Converts writes from a terminal byte source into frames.
pub struct CaptureStream<S: FrameSink, C: Clock = SystemClock> {
    sink: S,
    clock: C,
    max_wait: Duration,
    elapsed: Duration,
    last_write: Instant,
    held: Option<Frame>,
    utf8_carry: Vec<u8>,
    frames_forwarded: usize,
    trimmed_exit: bool,
    closed: bool,
}

impl<S: FrameSink> CaptureStream<S, SystemClock> {
    /// Create a stream timed by the system clock. `max_wait` is in seconds.
    pub fn new(sink: S, max_wait: f64) -> Self {
        Self::with_clock(sink, max_wait, SystemClock)
    }
}

impl<S: FrameSink, C: Clock> CaptureStream<S, C> {
    pub fn with_clock(sink: S, max_wait: f64, clock: C) -> Self {
        // Non-finite or non-positive falls back to the default; huge values saturate
        let cap = secs_to_duration(max_wait);
        let max_wait = if cap.is_zero() { DEFAULT_MAX_WAIT } else { cap };
        let last_write = clock.now();

        Self {
            sink,
            clock,
            max_wait,
            elapsed: Duration::ZERO,
            last_write,
            held: None,
            utf8_carry: Vec::new(),
            frames_forwarded: 0,
            trimmed_exit: false,
            closed: false,
        }
    }

    /// Record one write from the byte source.
    ///
    /// Bytes of a UTF-8 sequence split across writes are carried over to the
    /// next write. Writes after close are ignored.
    pub fn capture(&mut self, bytes: &[u8]) -> Result<(), S::Error> {
        if self.closed {
            debug!(len = bytes.len(), "ignoring write to closed capture stream");
            return Ok(());
        }

        let text = self.take_text(bytes);
        if text.is_empty() {
            return Ok(());
        }

        let time = self.increment_elapsed().as_secs_f64();
        if let Some(previous) = self.held.replace(Frame::output(time, text)) {
            self.forward(previous)?;
        }

        Ok(())
    }

    /// End the stream normally, dropping a trailing `exit` echo.
    ///
    /// Returns the total recorded duration.
    pub fn close(&mut self) -> Result<Duration, S::Error> {
        self.finish(true)
    }

    /// End the stream because of an interrupt; every frame is kept.
    pub fn interrupt(&mut self) -> Result<Duration, S::Error> {
        self.finish(false)
    }

    /// Cumulative recorded time so far.
    pub fn duration(&self) -> Duration {
        self.elapsed
    }

    /// Frames handed to the sink so far.
    pub fn frames_forwarded(&self) -> usize {
        self.frames_forwarded
    }

    /// Whether close dropped a trailing `exit` echo.
    pub fn trimmed_exit(&self) -> bool {
        self.trimmed_exit
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn finish(&mut self, trim_exit: bool) -> Result<Duration, S::Error> {
        if self.closed {
            return Ok(self.elapsed);
        }
        self.closed = true;
        self.increment_elapsed();

        if !self.utf8_carry.is_empty() {
            let rest = String::from_utf8_lossy(&self.utf8_carry).into_owned();
            self.utf8_carry.clear();
            match self.held.as_mut() {
                Some(frame) => frame.data.push_str(&rest),
                None => self.held = Some(Frame::output(self.elapsed.as_secs_f64(), rest)),
            }
        }

        if let Some(last) = self.held.take() {
            if trim_exit && last.data == EXIT_ECHO {
                debug!("dropping trailing exit echo");
                self.trimmed_exit = true;
            } else {
                self.forward(last)?;
            }
        }

        Ok(self.elapsed)
    }

    fn forward(&mut self, frame: Frame) -> Result<(), S::Error> {
        self.sink.accept(frame)?;
        self.frames_forwarded += 1;
        Ok(())
    }

    fn increment_elapsed(&mut self) -> Duration {
        let now = self.clock.now();
        let mut delta = now.saturating_duration_since(self.last_write);

        if delta > self.max_wait {
            delta = self.max_wait;
        }
        if delta.is_zero() {
            delta = MIN_STEP;
        }

        self.elapsed += delta;
        self.last_write = now;
        self.elapsed
    }

    fn take_text(&mut self, bytes: &[u8]) -> String {
        self.utf8_carry.extend_from_slice(bytes);
        let complete = self.utf8_carry.len() - incomplete_suffix_len(&self.utf8_carry);
        let text = String::from_utf8_lossy(&self.utf8_carry[..complete]).into_owned();
        self.utf8_carry.drain(..complete);
        text
    }
}

impl<S: FrameSink, C: Clock> Drop for CaptureStream<S, C> {
    fn drop(&mut self) {
        // Keep whatever was captured; the sink finalizes itself on drop
        if let Err(err) = self.finish(false) {
            warn!(error = %err, "failed to forward pending frame on drop");
        }
    }
}

impl<S, C> io::Write for CaptureStream<S, C>
where
    S: FrameSink,
    S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    C: Clock,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.capture(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Length of an unfinished UTF-8 sequence at the end of `bytes`.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 == 0x80 {
            // continuation byte, keep looking for the lead byte
            continue;
        }
        let needed = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if needed > back { back } else { 0 };
    }
    0
}
