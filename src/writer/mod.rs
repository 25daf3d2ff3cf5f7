//! Crash-resilient streaming writer.
//!
//! The header is written and synced before any frame, so a parseable file
//! exists from the first moment of a recording. Output frames are buffered
//! and flushed through grouping and compression; each flush lands in the file
//! as one write. Storage sync runs on an interval rather than per frame.
//!
//! Every way out of the `Recording` state (an explicit [`StreamWriter::close`],
//! a failed push, or dropping the writer) flushes what is pending, syncs,
//! releases the file and runs the [`repair`] pass over it.

pub mod repair;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::asciicast::{Frame, FrameKind, Header};
use crate::batch::{self, BatchLimits};
use crate::capture::{Clock, FrameSink, SystemClock};
use crate::config::Config;

pub use repair::{repair_file, repair_str, RepairError, RepairReport};

/// Writer errors.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("Failed to {op} {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize header: {0}")]
    Header(#[source] serde_json::Error),

    #[error("Recording is already closed")]
    Closed,

    #[error(transparent)]
    Repair(#[from] RepairError),
}

/// Writer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Batch and compress output frames; when off every frame is written as it arrives
    pub compression: bool,
    pub limits: BatchLimits,
    /// Minimum wall-clock time between storage syncs
    pub sync_interval: Duration,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl WriterOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            compression: config.compression.enabled,
            limits: BatchLimits::from(&config.compression),
            sync_interval: Duration::from_millis(config.recording.sync_interval_ms),
        }
    }
}

/// Counters collected while writing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriterSummary {
    pub frames_received: usize,
    /// Frame lines written, blocks included
    pub lines_written: usize,
    pub compressed_blocks: usize,
    /// Frames folded into compressed blocks
    pub frames_compressed: usize,
    pub bytes_written: u64,
    pub syncs: usize,
    /// Outcome of the repair pass run at close
    pub repair: Option<RepairReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Recording,
    Closed,
}

/// Streams frames to a recording file.
pub struct StreamWriter {
    path: PathBuf,
    file: Option<File>,
    options: WriterOptions,
    batch: Vec<Frame>,
    batch_bytes: usize,
    clock: Box<dyn Clock>,
    last_sync: Instant,
    state: State,
    summary: WriterSummary,
}

impl StreamWriter {
    /// Create the file and durably write the header.
    ///
    /// Any `duration` on the header is dropped; the repair pass at close
    /// fills it in.
    pub fn create<P: AsRef<Path>>(
        path: P,
        header: &Header,
        options: WriterOptions,
    ) -> Result<Self, WriterError> {
        let path = path.as_ref().to_path_buf();

        let header = Header {
            duration: None,
            ..header.clone()
        };
        let mut line = header.to_json().map_err(WriterError::Header)?;
        line.push('\n');

        let mut file = File::create(&path).map_err(|source| WriterError::Io {
            op: "create",
            path: path.clone(),
            source,
        })?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|source| WriterError::Io {
                op: "write header to",
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), compression = options.compression, "recording started");

        Ok(Self {
            path,
            file: Some(file),
            options,
            batch: Vec::new(),
            batch_bytes: 0,
            clock: Box::new(SystemClock),
            last_sync: Instant::now(),
            state: State::Recording,
            summary: WriterSummary {
                bytes_written: line.len() as u64,
                syncs: 1,
                ..WriterSummary::default()
            },
        })
    }

    /// Measure the sync interval against `clock`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.last_sync = clock.now();
        self.clock = Box::new(clock);
        self
    }

    /// Accept one frame.
    ///
    /// A write failure closes and repairs the file before the error is
    /// returned, so the recording up to that point is kept.
    pub fn push(&mut self, frame: Frame) -> Result<(), WriterError> {
        if self.state == State::Closed {
            return Err(WriterError::Closed);
        }

        if let Err(err) = self.append(frame) {
            warn!(path = %self.path.display(), error = %err, "write failed, finalizing recording");
            if let Err(close_err) = self.close() {
                warn!(error = %close_err, "finalizing after write failure also failed");
            }
            return Err(err);
        }

        Ok(())
    }

    /// Flush, sync, release the file and repair it.
    ///
    /// Calling close again returns the same summary.
    pub fn close(&mut self) -> Result<WriterSummary, WriterError> {
        if self.state == State::Closed {
            return Ok(self.summary.clone());
        }

        let flushed = self.flush_batch();
        let synced = self.sync();
        self.file = None;
        self.state = State::Closed;

        let repaired = repair::repair_file(&self.path);
        flushed?;
        synced?;
        self.summary.repair = Some(repaired?);

        debug!(
            path = %self.path.display(),
            frames = self.summary.frames_received,
            lines = self.summary.lines_written,
            blocks = self.summary.compressed_blocks,
            "recording closed"
        );

        Ok(self.summary.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn summary(&self) -> &WriterSummary {
        &self.summary
    }

    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Frames buffered but not yet written.
    pub fn pending_frames(&self) -> usize {
        self.batch.len()
    }

    fn append(&mut self, frame: Frame) -> Result<(), WriterError> {
        self.summary.frames_received += 1;

        if !self.options.compression {
            self.write_frames(std::slice::from_ref(&frame))?;
        } else if frame.kind != FrameKind::Output {
            // Only raw output is batched; anything else keeps its place in order
            self.flush_batch()?;
            self.write_frames(std::slice::from_ref(&frame))?;
        } else {
            if self.should_flush_before(&frame) {
                self.flush_batch()?;
            }

            self.batch_bytes += frame.data.len();
            self.batch.push(frame);

            if self.batch.len() >= self.options.limits.max_batch_size {
                self.flush_batch()?;
            }
        }

        self.sync_if_due();
        Ok(())
    }

    fn should_flush_before(&self, incoming: &Frame) -> bool {
        let limits = &self.options.limits;
        let Some(first) = self.batch.first() else {
            return false;
        };
        if self.batch.len() < limits.min_group_size {
            return false;
        }

        incoming.time - first.time > limits.batch_window || self.batch_bytes > limits.data_threshold
    }

    /// Run the pending batch through grouping and compression and write it.
    ///
    /// A batch below the minimum group size is written uncompressed.
    fn flush_batch(&mut self) -> Result<(), WriterError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let pending = std::mem::take(&mut self.batch);
        self.batch_bytes = 0;
        let limits = self.options.limits;

        let mut out = Vec::with_capacity(pending.len());
        for group in batch::partition(&pending, &limits) {
            let encoded = batch::encode_group(group, limits.min_group_size);
            if encoded.is_compressed() {
                self.summary.compressed_blocks += 1;
                self.summary.frames_compressed += group.len();
            }
            out.extend(encoded.frames);
        }

        debug!(
            frames = pending.len(),
            lines = out.len(),
            "flushed batch"
        );
        self.write_frames(&out)
    }

    fn write_frames(&mut self, frames: &[Frame]) -> Result<(), WriterError> {
        let mut buf = String::new();
        for frame in frames {
            buf.push_str(&frame.to_json());
            buf.push('\n');
        }

        let file = self.file.as_mut().ok_or(WriterError::Closed)?;
        file.write_all(buf.as_bytes())
            .map_err(|source| WriterError::Io {
                op: "write to",
                path: self.path.clone(),
                source,
            })?;

        self.summary.lines_written += frames.len();
        self.summary.bytes_written += buf.len() as u64;
        Ok(())
    }

    fn sync_if_due(&mut self) {
        let since = self.clock.now().saturating_duration_since(self.last_sync);
        if since < self.options.sync_interval {
            return;
        }
        if let Err(err) = self.sync() {
            warn!(error = %err, "periodic sync failed");
        }
    }

    fn sync(&mut self) -> Result<(), WriterError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        file.sync_data().map_err(|source| WriterError::Io {
            op: "sync",
            path: self.path.clone(),
            source,
        })?;
        self.last_sync = self.clock.now();
        self.summary.syncs += 1;
        Ok(())
    }
}

impl FrameSink for StreamWriter {
    type Error = WriterError;

    fn accept(&mut self, frame: Frame) -> Result<(), Self::Error> {
        self.push(frame)
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        if self.state == State::Recording {
            if let Err(err) = self.close() {
                warn!(path = %self.path.display(), error = %err, "failed to finalize recording on drop");
            }
        }
    }
}
