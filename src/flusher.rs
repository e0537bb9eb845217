//! Periodic background flushing
use std::io::Write;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::{BufferedWriter, Error};

/// Callback invoked from the flusher thread when a periodic flush fails.
/// It runs synchronously within the loop: a slow handler delays next ticks.
pub type ErrorHandler = Box<dyn FnMut(Error) + Send + 'static>;

/// Handle on a running flush loop
pub(crate) struct Flusher {
    stop: SyncSender<()>,
    handle: JoinHandle<()>,
}

impl Flusher {
    /// Requests termination and waits for the loop to exit.
    /// Returns false if the loop had panicked.
    pub(crate) fn stop(self) -> bool {
        // queued even while the loop is busy flushing
        let _ = self.stop.try_send(());
        if self.handle.thread().id() == thread::current().id() {
            // dropped from within the loop itself, which exits on next wake up
            return true;
        }
        if self.handle.join().is_err() {
            warn!("flusher thread panicked");
            return false;
        }
        true
    }
}

/*
 * Loop body. Holds a weak reference only,
 * so a running flusher never keeps its writer alive.
 */
fn run<W: Write>(
    writer: Weak<BufferedWriter<W>>,
    interval: Duration,
    stop: Receiver<()>,
    mut on_error: Option<ErrorHandler>,
) {
    let mut deadline = Instant::now().checked_add(interval);
    loop {
        let signal = match deadline {
            Some(deadline) => stop.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            // interval too large to ever tick: only wait for stop
            None => stop.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match signal {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        // ticks missed by a slow flush are dropped, not replayed
        let now = Instant::now();
        deadline = deadline
            .and_then(|deadline| deadline.checked_add(interval))
            .filter(|deadline| *deadline > now)
            .or_else(|| now.checked_add(interval));
        let Some(writer) = writer.upgrade() else {
            break;
        };
        if let Err(e) = writer.flush() {
            match on_error.as_mut() {
                Some(handler) => handler(e),
                None => warn!("periodic flush failed: {}", e),
            }
        }
    }
    debug!("flusher loop exited");
}

impl<W: Write + Send + 'static> BufferedWriter<W> {
    /// Spawns a background thread flushing this writer every `interval`.
    ///
    /// Failed flushes are reported to `on_error` if provided, logged otherwise.
    /// At most one flusher runs per writer: starting a second one fails with
    /// [`Error::AlreadyRunning`] until [`Self::stop`] is called.
    pub fn start_flusher(
        self: &Arc<Self>,
        interval: Duration,
        on_error: Option<ErrorHandler>,
    ) -> Result<(), Error> {
        if interval.is_zero() {
            return Err(Error::InvalidInterval);
        }
        let mut slot = self.flusher.lock();
        if slot.is_some() {
            return Err(Error::AlreadyRunning);
        }
        let (tx, rx) = mpsc::sync_channel(1);
        let writer = Arc::downgrade(self);
        let handle = thread::Builder::new()
            .name("bufwriter-flusher".to_string())
            .spawn(move || run(writer, interval, rx, on_error))
            .map_err(Error::FlusherSpawn)?;
        *slot = Some(Flusher { stop: tx, handle });
        info!(?interval, "periodic flusher started");
        Ok(())
    }
}

impl<W: Write> BufferedWriter<W> {
    /// Stops the periodic flusher, if any. Blocks until the loop has exited:
    /// no periodic flush happens once this returns.
    pub fn stop(&self) {
        let flusher = self.flusher.lock().take();
        if let Some(flusher) = flusher {
            flusher.stop();
            info!("periodic flusher stopped");
        }
    }

    /// True while a periodic flusher is attached to this writer
    pub fn is_flusher_running(&self) -> bool {
        self.flusher.lock().is_some()
    }
}
