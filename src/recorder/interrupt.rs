//! Listener for process termination requests during a recording.
//!
//! On unix the listener owns a `signal-hook` iterator on a dedicated thread
//! watching SIGINT, SIGTERM and SIGHUP. Elsewhere it falls back to a
//! `ctrlc` handler. Either way the callback runs at most once, and a
//! cancelled listener never runs it.

use std::io;

/// Runs a callback when the process is asked to terminate.
///
/// Dropping the listener cancels it.
pub struct InterruptListener {
    inner: imp::Listener,
}

impl InterruptListener {
    pub fn spawn<F>(on_interrupt: F) -> io::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        Ok(Self {
            inner: imp::Listener::spawn(on_interrupt)?,
        })
    }

    /// Stop listening.
    ///
    /// If the callback already started, this waits for it to finish.
    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}

impl Drop for InterruptListener {
    fn drop(&mut self) {
        self.inner.cancel();
    }
}

#[cfg(unix)]
mod imp {
    use std::io;
    use std::thread::{self, JoinHandle};

    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::{Handle, Signals};
    use tracing::debug;

    pub struct Listener {
        handle: Handle,
        thread: Option<JoinHandle<()>>,
    }

    impl Listener {
        pub fn spawn<F>(on_interrupt: F) -> io::Result<Self>
        where
            F: FnOnce() + Send + 'static,
        {
            let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
            let handle = signals.handle();

            let thread = thread::Builder::new()
                .name("acast-interrupt".into())
                .spawn(move || {
                    // The iterator ends once the handle is closed
                    if let Some(signal) = signals.forever().next() {
                        debug!(signal, "termination requested");
                        on_interrupt();
                    }
                })?;

            Ok(Self {
                handle,
                thread: Some(thread),
            })
        }

        pub fn cancel(&mut self) {
            self.handle.close();
            if let Some(thread) = self.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    use tracing::debug;

    pub struct Listener {
        armed: Arc<AtomicBool>,
    }

    impl Listener {
        pub fn spawn<F>(on_interrupt: F) -> io::Result<Self>
        where
            F: FnOnce() + Send + 'static,
        {
            let armed = Arc::new(AtomicBool::new(true));
            let handler_armed = Arc::clone(&armed);
            let callback = Mutex::new(Some(on_interrupt));

            ctrlc::set_handler(move || {
                if !handler_armed.load(Ordering::SeqCst) {
                    return;
                }
                let pending = callback
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                if let Some(on_interrupt) = pending {
                    debug!("termination requested");
                    on_interrupt();
                }
            })
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

            Ok(Self { armed })
        }

        pub fn cancel(&mut self) {
            self.armed.store(false, Ordering::SeqCst);
        }
    }
}
