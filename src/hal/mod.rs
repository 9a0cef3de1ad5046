//! Asynchronous camera hardware abstraction.
//!
//! Calls submit work and return at once; outcomes are posted later as
//! [`HardwareEvent`]s through the [`HardwareSink`] handed to the call.

pub mod characteristics;
pub mod handle;
pub mod request;

pub use characteristics::{CameraCharacteristics, HardwareLevel, LensFacing};
pub use handle::{DeviceHandle, SessionHandle};
pub use request::{
    AeMode, AePrecaptureTrigger, AeState, AfMode, AfState, AfTrigger, CaptureRequest,
    CaptureResult, ControlMode, FlashMode, MeteringRectangle, OutputTarget, RequestId,
    RequestTemplate, SessionGeneration, SurfaceId, METERING_WEIGHT_MAX,
};

use crate::errors::CameraError;
use crate::recording::RecordingConfig;
use crate::types::Size;
use bytes::Bytes;
use crossbeam_channel::Sender;

/// Everything the hardware reports back.
#[derive(Debug)]
pub enum HardwareEvent {
    DeviceOpened(DeviceHandle),
    DeviceDisconnected,
    DeviceError(i32),
    SessionConfigured {
        generation: SessionGeneration,
        session: SessionHandle,
    },
    SessionConfigureFailed {
        generation: SessionGeneration,
    },
    CaptureProgressed(CaptureResult),
    CaptureCompleted(CaptureResult),
    CaptureFailed {
        generation: SessionGeneration,
        request_id: RequestId,
    },
    /// A still frame from the still reader.
    ImageAvailable {
        generation: SessionGeneration,
        data: Bytes,
    },
}

/// Where hardware posts its events. Posting never blocks.
#[derive(Debug, Clone)]
pub struct HardwareSink {
    tx: Sender<HardwareEvent>,
}

impl HardwareSink {
    pub fn new(tx: Sender<HardwareEvent>) -> Self {
        Self { tx }
    }

    /// Returns false when the receiving worker is gone; the event (and any
    /// handle it carries) is dropped, which closes the handle.
    pub fn post(&self, event: HardwareEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Hardware event after worker exit: {:?}", e.0);
                false
            }
        }
    }
}

/// Entry point to the camera stack.
pub trait CameraBackend: Send + Sync {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError>;

    fn characteristics(&self, id: &str) -> Result<CameraCharacteristics, CameraError>;

    /// Starts opening `id`. Completion is posted as `DeviceOpened`,
    /// `DeviceDisconnected` or `DeviceError`.
    fn open_device(&self, id: &str, sink: HardwareSink) -> Result<(), CameraError>;

    fn create_encoder(&self) -> Result<Box<dyn MediaEncoder>, CameraError>;

    /// Whether an encoder can pause mid-recording.
    fn supports_recording_pause(&self) -> bool;
}

pub trait CameraDevice: Send {
    /// Starts configuring a session. Completion is posted as
    /// `SessionConfigured` or `SessionConfigureFailed` for `generation`;
    /// the session posts its capture results to `sink`.
    fn create_session(
        &mut self,
        outputs: Vec<OutputTarget>,
        generation: SessionGeneration,
        sink: HardwareSink,
    ) -> Result<(), CameraError>;

    fn close(&mut self);
}

pub trait CaptureSession: Send {
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    fn stop_repeating(&mut self) -> Result<(), CameraError>;

    fn capture(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    fn close(&mut self);
}

/// Video encoder with an input surface the camera renders into.
pub trait MediaEncoder: Send {
    /// Applies `config` and prepares the encoder.
    fn configure(&mut self, config: &RecordingConfig) -> Result<(), CameraError>;

    fn input_surface(&self) -> Result<SurfaceId, CameraError>;

    fn start(&mut self) -> Result<(), CameraError>;

    fn pause(&mut self) -> Result<(), CameraError>;

    fn resume(&mut self) -> Result<(), CameraError>;

    fn stop(&mut self) -> Result<(), CameraError>;

    fn reset(&mut self);

    fn release(&mut self);
}

/// The preview widget bound at initialization.
pub trait PreviewTarget: Send + Sync {
    fn is_available(&self) -> bool;

    fn view_size(&self) -> Size;

    fn set_buffer_size(&self, size: Size);

    fn set_aspect_ratio(&self, width: u32, height: u32);
}
