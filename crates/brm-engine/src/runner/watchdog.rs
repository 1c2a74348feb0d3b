//! Interrupts a running SQLite statement once a deadline passes.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rusqlite::InterruptHandle;

/// Armed for one statement. Dropping the sender from `disarm` wakes the
/// thread early; otherwise it calls `interrupt()` at the deadline.
pub struct Watchdog {
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<bool>>,
}

impl Watchdog {
    pub fn arm(interrupt: InterruptHandle, timeout: Duration) -> Self {
        let (cancel, rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || match rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                interrupt.interrupt();
                true
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        });
        Self {
            cancel: Some(cancel),
            handle: Some(handle),
        }
    }

    /// Stop the watchdog. Returns whether it fired.
    pub fn disarm(mut self) -> bool {
        self.stop()
    }

    fn stop(&mut self) -> bool {
        drop(self.cancel.take());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
