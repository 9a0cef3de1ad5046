//! Waiting on controller events in tests.

use crate::errors::ErrorKind;
use crate::events::{CameraEvent, EventChannel};
use std::time::{Duration, Instant};

/// Pulls events off an [`EventChannel`] and remembers every one it saw.
#[derive(Debug, Default)]
pub struct EventWatcher {
    seen: Vec<CameraEvent>,
}

impl EventWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives until an event matches `predicate` or `timeout` elapses.
    /// Events received on the way are recorded.
    pub fn wait_for(
        &mut self,
        events: &EventChannel,
        timeout: Duration,
        predicate: impl Fn(&CameraEvent) -> bool,
    ) -> Option<CameraEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let event = events.recv_timeout(remaining)?;
            self.seen.push(event.clone());
            if predicate(&event) {
                return Some(event);
            }
        }
    }

    /// Waits for an event equal to `expected`.
    pub fn expect(&mut self, events: &EventChannel, expected: &CameraEvent, timeout: Duration) -> bool {
        self.wait_for(events, timeout, |e| e == expected).is_some()
    }

    /// Records everything that arrives within `window`.
    pub fn collect_for(&mut self, events: &EventChannel, window: Duration) -> &[CameraEvent] {
        let start = self.seen.len();
        let deadline = Instant::now() + window;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match events.recv_timeout(remaining) {
                Some(event) => self.seen.push(event),
                None => break,
            }
        }
        &self.seen[start..]
    }

    pub fn seen(&self) -> &[CameraEvent] {
        &self.seen
    }

    pub fn count(&self, predicate: impl Fn(&CameraEvent) -> bool) -> usize {
        self.seen.iter().filter(|e| predicate(e)).count()
    }

    pub fn errors(&self) -> Vec<ErrorKind> {
        self.seen.iter().filter_map(|e| e.error_kind()).collect()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
