//! Recording session orchestration.
//!
//! A byte source is read on the calling thread. Each chunk is handed to the
//! capture stream, which feeds the streaming writer; both live behind one
//! mutex that the interrupt listener also takes when it finalizes the file.
//! Reads happen outside the lock.

pub mod interrupt;

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use interrupt::InterruptListener;

use crate::asciicast::Header;
use crate::capture::{CaptureStream, Clock, SystemClock};
use crate::config::Config;
use crate::writer::{StreamWriter, WriterOptions, WriterSummary};

/// Exit status used when a recording is ended by a termination request
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

const READ_BUFFER_SIZE: usize = 8192;

type Session<C> = Arc<Mutex<CaptureStream<StreamWriter, C>>>;

/// What a finished recording produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub path: PathBuf,
    /// Recorded (idle-capped) duration
    pub duration: Duration,
    /// Frames handed to the writer
    pub frames: usize,
    /// Whether a trailing `exit` echo was dropped
    pub trimmed_exit: bool,
    pub writer: WriterSummary,
}

/// Records a byte source into a recording file.
pub struct Recorder {
    config: Config,
    handle_interrupts: bool,
}

impl Recorder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handle_interrupts: true,
        }
    }

    /// Whether to finalize the file and exit when the process is asked to terminate.
    pub fn handle_interrupts(mut self, enabled: bool) -> Self {
        self.handle_interrupts = enabled;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Record until `source` reaches end of input.
    pub fn record<R: Read>(&self, source: R, path: &Path, header: &Header) -> Result<RecordSummary> {
        self.record_with_clock(source, path, header, SystemClock)
    }

    /// Record with an explicit time source.
    pub fn record_with_clock<R, C>(
        &self,
        mut source: R,
        path: &Path,
        header: &Header,
        clock: C,
    ) -> Result<RecordSummary>
    where
        R: Read,
        C: Clock + Clone + 'static,
    {
        let writer = StreamWriter::create(path, header, WriterOptions::from_config(&self.config))
            .with_context(|| format!("Failed to start recording: {:?}", path))?
            .with_clock(clock.clone());
        let session: Session<C> = Arc::new(Mutex::new(CaptureStream::with_clock(
            writer,
            self.config.recording.max_wait,
            clock,
        )));

        // Declared after the session so it is dropped (and joined) first
        let mut listener = if self.handle_interrupts {
            Some(spawn_listener(&session).context("Failed to install interrupt handler")?)
        } else {
            None
        };

        info!(path = %path.display(), "recording started");

        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("Failed to read terminal output while recording {:?}", path)
                    });
                }
            };

            lock(&session)
                .capture(&buf[..n])
                .with_context(|| format!("Failed to write recording {:?}", path))?;
        }

        if let Some(listener) = listener.as_mut() {
            listener.cancel();
        }

        let mut session = lock(&session);
        let duration = session
            .close()
            .with_context(|| format!("Failed to write recording {:?}", path))?;
        let writer = session
            .sink_mut()
            .close()
            .with_context(|| format!("Failed to finalize recording {:?}", path))?;

        info!(
            path = %path.display(),
            frames = session.frames_forwarded(),
            duration = duration.as_secs_f64(),
            "recording finished"
        );

        Ok(RecordSummary {
            path: path.to_path_buf(),
            duration,
            frames: session.frames_forwarded(),
            trimmed_exit: session.trimmed_exit(),
            writer,
        })
    }
}

fn lock<C: Clock>(session: &Session<C>) -> MutexGuard<'_, CaptureStream<StreamWriter, C>> {
    // A panic mid-write must not stop the file from being finalized
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn spawn_listener<C: Clock + 'static>(session: &Session<C>) -> std::io::Result<InterruptListener> {
    let session = Arc::clone(session);

    InterruptListener::spawn(move || {
        let mut session = lock(&session);
        if let Err(err) = session.interrupt() {
            warn!(error = %err, "failed to write final frame");
        }
        let path = session.sink().path().to_path_buf();
        match session.sink_mut().close() {
            Ok(summary) => info!(
                path = %path.display(),
                lines = summary.lines_written,
                "recording interrupted, file finalized"
            ),
            Err(err) => warn!(path = %path.display(), error = %err, "failed to finalize interrupted recording"),
        }
        eprintln!("Recording interrupted, saved to {}", path.display());
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}
