//! Background worker and the device open/close lock.

use super::core::{deliver, Core};
use crate::errors::CameraError;
use crate::hal::{HardwareEvent, HardwareSink};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Binary lock held from issuing a device open until it completes, and
/// while the device is being closed.
#[derive(Debug, Default)]
pub struct OpenCloseLock {
    held: Mutex<bool>,
    cond: Condvar,
}

impl OpenCloseLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `timeout` for the lock. Returns false on timeout.
    pub fn try_acquire_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut held = match self.held.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        while *held {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            held = match self.cond.wait_timeout(held, deadline - now) {
                Ok((g, _)) => g,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        *held = true;
        true
    }

    /// Releasing an unheld lock is a no-op.
    pub fn release(&self) {
        let mut held = match self.held.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *held = false;
        self.cond.notify_one();
    }

    pub fn is_held(&self) -> bool {
        match self.held.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// The thread that runs every hardware callback against the core.
pub(crate) struct Worker {
    sink: HardwareSink,
    shutdown: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(core: Arc<Mutex<Core>>) -> Result<Self, CameraError> {
        let (tx, rx) = unbounded();
        let (shutdown, shutdown_rx) = bounded(1);

        let thread = thread::Builder::new()
            .name("crabshot-camera-worker".to_string())
            .spawn(move || run(core, rx, shutdown_rx))
            .map_err(|e| CameraError::camera(format!("Failed to start camera worker: {}", e)))?;

        log::debug!("Camera worker started");
        Ok(Self {
            sink: HardwareSink::new(tx),
            shutdown,
            thread: Some(thread),
        })
    }

    pub fn sink(&self) -> HardwareSink {
        self.sink.clone()
    }

    /// Stops the thread and waits for it. Events still queued are dropped,
    /// closing any handle they carry.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.shutdown.try_send(());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Camera worker panicked");
            } else {
                log::debug!("Camera worker stopped");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(core: Arc<Mutex<Core>>, events: Receiver<HardwareEvent>, shutdown: Receiver<()>) {
    loop {
        select! {
            recv(shutdown) -> _ => break,
            recv(events) -> event => match event {
                Ok(event) => deliver(&core, event),
                Err(_) => break,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_times_out_while_held() {
        let lock = OpenCloseLock::new();
        assert!(lock.try_acquire_for(Duration::from_millis(10)));
        assert!(lock.is_held());
        assert!(!lock.try_acquire_for(Duration::from_millis(20)));
        lock.release();
        assert!(lock.try_acquire_for(Duration::from_millis(10)));
    }

    #[test]
    fn test_release_wakes_waiter() {
        let lock = Arc::new(OpenCloseLock::new());
        assert!(lock.try_acquire_for(Duration::from_millis(10)));

        let other = lock.clone();
        let waiter = thread::spawn(move || other.try_acquire_for(Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(20));
        lock.release();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_release_when_free_is_noop() {
        let lock = OpenCloseLock::new();
        lock.release();
        assert!(!lock.is_held());
    }
}
