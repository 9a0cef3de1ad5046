//! Owning handles for an opened device and a configured session.
//!
//! Closing consumes the handle. A handle dropped while still open (for
//! example an event that arrives after its worker has gone) closes the
//! underlying resource itself, so nothing is leaked on any path.

use super::request::{CaptureRequest, OutputTarget, SessionGeneration};
use super::{CameraDevice, CaptureSession, HardwareSink};
use crate::errors::CameraError;
use std::fmt;

pub struct DeviceHandle {
    id: String,
    device: Option<Box<dyn CameraDevice>>,
}

impl DeviceHandle {
    pub fn new(id: impl Into<String>, device: Box<dyn CameraDevice>) -> Self {
        Self {
            id: id.into(),
            device: Some(device),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Requests a session over `outputs`; completion is posted to `sink`.
    pub fn create_session(
        &mut self,
        outputs: Vec<OutputTarget>,
        generation: SessionGeneration,
        sink: HardwareSink,
    ) -> Result<(), CameraError> {
        match self.device.as_mut() {
            Some(device) => device.create_session(outputs, generation, sink),
            None => Err(CameraError::camera("Camera device already closed")),
        }
    }

    pub fn close(mut self) {
        if let Some(mut device) = self.device.take() {
            log::debug!("Closing camera device {}", self.id);
            device.close();
        }
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        if let Some(mut device) = self.device.take() {
            log::warn!("Camera device {} dropped while open, closing", self.id);
            device.close();
        }
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("id", &self.id)
            .field("open", &self.device.is_some())
            .finish()
    }
}

pub struct SessionHandle {
    generation: SessionGeneration,
    session: Option<Box<dyn CaptureSession>>,
}

impl SessionHandle {
    pub fn new(generation: SessionGeneration, session: Box<dyn CaptureSession>) -> Self {
        Self {
            generation,
            session: Some(session),
        }
    }

    pub fn generation(&self) -> SessionGeneration {
        self.generation
    }

    fn live(&mut self) -> Result<&mut Box<dyn CaptureSession>, CameraError> {
        self.session
            .as_mut()
            .ok_or_else(|| CameraError::camera("Capture session already closed"))
    }

    pub fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.live()?.set_repeating_request(request)
    }

    pub fn stop_repeating(&mut self) -> Result<(), CameraError> {
        self.live()?.stop_repeating()
    }

    pub fn capture(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.live()?.capture(request)
    }

    pub fn close(mut self) {
        if let Some(mut session) = self.session.take() {
            log::debug!("Closing capture session {}", self.generation);
            session.close();
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            log::warn!("Capture session {} dropped while open, closing", self.generation);
            session.close();
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("generation", &self.generation)
            .field("open", &self.session.is_some())
            .finish()
    }
}
