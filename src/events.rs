//! Ordered, lossless delivery of controller events to a single consumer.
//!
//! The worker thread and the public operations push through an
//! [`EventEmitter`]; the consuming context drains the [`EventChannel`],
//! either by polling or by dispatching to its one registered listener.

use crate::errors::{CameraError, ErrorKind};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Event delivered to the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CameraEvent {
    DeviceConfigured,
    PreviewStarted,
    PreviewStopped,
    ZoomChanged { zoom: f32 },
    StartRecording,
    PauseRecording,
    ResumeRecording,
    FinishRecording { path: PathBuf },
    ShotFinished { path: PathBuf },
    Error { kind: ErrorKind, message: String },
    FocusStarted { x: f32, y: f32 },
    FocusFinished { success: bool },
}

impl CameraEvent {
    pub fn error(error: &CameraError) -> Self {
        CameraEvent::Error {
            kind: error.kind(),
            message: error.message().to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CameraEvent::Error { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            CameraEvent::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Receiver of controller events.
pub trait EventListener: Send {
    fn on_event(&mut self, event: CameraEvent);
}

impl<F> EventListener for F
where
    F: FnMut(CameraEvent) + Send,
{
    fn on_event(&mut self, event: CameraEvent) {
        self(event)
    }
}

/// Producer side; cheap to clone, one per thread that emits.
#[derive(Clone)]
pub struct EventEmitter {
    tx: Sender<CameraEvent>,
}

impl EventEmitter {
    pub fn emit(&self, event: CameraEvent) {
        log::debug!("emit {:?}", event);
        // The receiver lives as long as the controller; a send can only
        // fail during teardown, when nobody is left to observe it.
        if self.tx.send(event).is_err() {
            log::warn!("Event dropped: channel closed");
        }
    }

    pub fn emit_error(&self, error: &CameraError) {
        log::error!("{}", error);
        self.emit(CameraEvent::error(error));
    }
}

/// Consumer side of the controller's event stream.
pub struct EventChannel {
    tx: Sender<CameraEvent>,
    rx: Receiver<CameraEvent>,
    listener: Option<Box<dyn EventListener>>,
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            listener: None,
        }
    }

    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            tx: self.tx.clone(),
        }
    }

    /// Installs `listener`, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl EventListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Delivers every queued event to the listener, in order, on the
    /// calling thread. Events stay queued while no listener is set.
    /// Returns the number of events delivered.
    pub fn dispatch_pending(&mut self) -> usize {
        let Some(mut listener) = self.listener.take() else {
            return 0;
        };
        let mut delivered = 0;
        while let Ok(event) = self.rx.try_recv() {
            listener.on_event(event);
            delivered += 1;
        }
        self.listener = Some(listener);
        delivered
    }

    pub fn try_recv(&self) -> Option<CameraEvent> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<CameraEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains every queued event without a listener.
    pub fn drain(&self) -> Vec<CameraEvent> {
        self.rx.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
