//! Deterministic in-process camera stack.
//!
//! [`SimulatedBackend`] answers every HAL call the way a well-behaved
//! camera2-class device would, with switches to inject the failures the
//! controller has to survive. Responses are posted straight to the
//! controller's worker, or held back until [`SimulatedBackend::deliver_pending`]
//! when automatic delivery is turned off.

use crate::errors::CameraError;
use crate::hal::{
    AeState, AfMode, AfState, AfTrigger, AePrecaptureTrigger, CameraBackend,
    CameraCharacteristics, CameraDevice, CaptureRequest, CaptureResult, CaptureSession,
    DeviceHandle, HardwareEvent, HardwareLevel, HardwareSink, LensFacing, MediaEncoder,
    OutputTarget, PreviewTarget, RequestId, RequestTemplate, SessionGeneration, SessionHandle,
    SurfaceId,
};
use crate::recording::RecordingConfig;
use crate::types::{Rect, Size};
use bytes::Bytes;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Smallest byte sequence a JPEG reader recognizes: SOI, a JFIF APP0 stub
/// and EOI.
pub const SIMULATED_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0xFF,
    0xD9,
];

/// Rear camera of a typical phone: 12MP 4:3 sensor mounted at 90 degrees,
/// full auto focus, flash and 8x digital zoom.
pub fn back_camera() -> CameraCharacteristics {
    CameraCharacteristics {
        facing: LensFacing::Back,
        hardware_level: HardwareLevel::Full,
        sensor_orientation: 90,
        active_array: Rect::from_size(4000, 3000),
        preview_sizes: vec![
            Size::new(1920, 1080),
            Size::new(1440, 1080),
            Size::new(1280, 720),
            Size::new(960, 720),
            Size::new(640, 480),
        ],
        jpeg_sizes: vec![
            Size::new(4000, 3000),
            Size::new(4000, 2250),
            Size::new(1280, 960),
        ],
        video_sizes: vec![
            Size::new(3840, 2160),
            Size::new(1920, 1080),
            Size::new(1280, 720),
            Size::new(640, 480),
        ],
        af_modes: vec![
            AfMode::Off,
            AfMode::Auto,
            AfMode::ContinuousPicture,
            AfMode::ContinuousVideo,
        ],
        flash_available: true,
        max_digital_zoom: 8.0,
        max_af_regions: 1,
    }
}

/// Selfie camera: fixed focus, no flash, sensor mounted at 270 degrees.
pub fn front_camera() -> CameraCharacteristics {
    CameraCharacteristics {
        facing: LensFacing::Front,
        hardware_level: HardwareLevel::Limited,
        sensor_orientation: 270,
        active_array: Rect::from_size(3264, 2448),
        preview_sizes: vec![
            Size::new(1920, 1080),
            Size::new(1440, 1080),
            Size::new(640, 480),
        ],
        jpeg_sizes: vec![Size::new(3264, 2448), Size::new(3264, 1836)],
        video_sizes: vec![Size::new(1920, 1080), Size::new(640, 480)],
        af_modes: vec![AfMode::Off],
        flash_available: false,
        max_digital_zoom: 4.0,
        max_af_regions: 0,
    }
}

/// Rear camera without auto focus or flash.
pub fn fixed_focus_camera() -> CameraCharacteristics {
    CameraCharacteristics {
        af_modes: vec![AfMode::Off],
        flash_available: false,
        max_af_regions: 0,
        ..back_camera()
    }
}

/// Rear camera at the legacy hardware level; never selected.
pub fn legacy_camera() -> CameraCharacteristics {
    CameraCharacteristics {
        hardware_level: HardwareLevel::Legacy,
        ..back_camera()
    }
}

/// Counters of hardware calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedStats {
    pub open_calls: usize,
    pub device_closes: usize,
    pub sessions_created: usize,
    pub session_closes: usize,
    pub stills_captured: usize,
    pub encoders_created: usize,
}

/// A request as the session received it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedRequest {
    pub generation: SessionGeneration,
    pub repeating: bool,
    pub request: CaptureRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderCall {
    Configure,
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
    Release,
}

/// One 3A report posted as the result of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedFrame {
    pub af_state: Option<AfState>,
    pub ae_state: Option<AeState>,
    /// Posted as `CaptureProgressed` instead of `CaptureCompleted`.
    pub partial: bool,
}

impl SimulatedFrame {
    pub const fn total(af_state: Option<AfState>, ae_state: Option<AeState>) -> Self {
        Self {
            af_state,
            ae_state,
            partial: false,
        }
    }

    pub const fn partial(af_state: Option<AfState>, ae_state: Option<AeState>) -> Self {
        Self {
            af_state,
            ae_state,
            partial: true,
        }
    }

    fn event(self, generation: SessionGeneration, request_id: RequestId) -> HardwareEvent {
        let result = CaptureResult {
            generation,
            request_id,
            af_state: self.af_state,
            ae_state: self.ae_state,
        };
        if self.partial {
            HardwareEvent::CaptureProgressed(result)
        } else {
            HardwareEvent::CaptureCompleted(result)
        }
    }
}

/// Where results of the installed repeating request go.
#[derive(Debug, Clone)]
struct RepeatingStream {
    sink: HardwareSink,
    generation: SessionGeneration,
    request_id: RequestId,
}

#[derive(Debug, Default)]
struct Switches {
    open_error: Option<i32>,
    fail_configure: bool,
    reject_repeating: bool,
    fail_stills: bool,
    fail_focus: bool,
    fail_encoder_prepare: bool,
    pause_supported: bool,
    manual_delivery: bool,
    trigger_response: Option<SimulatedFrame>,
}

#[derive(Debug, Default)]
struct SimState {
    cameras: Vec<(String, CameraCharacteristics)>,
    switches: Switches,
    /// AE states reported by successive focus-lock results.
    ae_script: VecDeque<AeState>,
    stats: SimulatedStats,
    requests: Vec<SubmittedRequest>,
    session_outputs: Vec<Vec<OutputTarget>>,
    encoder_calls: Vec<EncoderCall>,
    last_recording: Option<RecordingConfig>,
    pending: Vec<(HardwareSink, HardwareEvent)>,
    device_sink: Option<HardwareSink>,
    repeating: Option<RepeatingStream>,
    next_surface: u64,
}

type Shared = Arc<Mutex<SimState>>;

fn lock(shared: &Shared) -> MutexGuard<'_, SimState> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Posts `events` now, or parks them when delivery is manual.
///
/// Posting happens outside the state lock: an event rejected by a stopped
/// worker is dropped, and dropping a handle closes it through this state.
fn dispatch(shared: &Shared, sink: &HardwareSink, events: Vec<HardwareEvent>) {
    {
        let mut state = lock(shared);
        if state.switches.manual_delivery {
            state
                .pending
                .extend(events.into_iter().map(|e| (sink.clone(), e)));
            return;
        }
    }
    for event in events {
        sink.post(event);
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    shared: Shared,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::empty()
    }
}

impl SimulatedBackend {
    /// A backend with no cameras.
    pub fn empty() -> Self {
        let state = SimState {
            switches: Switches {
                pause_supported: true,
                ..Switches::default()
            },
            ..SimState::default()
        };
        Self {
            shared: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_camera(self, id: impl Into<String>, characteristics: CameraCharacteristics) -> Self {
        lock(&self.shared).cameras.push((id.into(), characteristics));
        self
    }

    /// Back camera "0" and front camera "1".
    pub fn phone() -> Self {
        Self::empty()
            .with_camera("0", back_camera())
            .with_camera("1", front_camera())
    }

    pub fn back_only() -> Self {
        Self::empty().with_camera("0", back_camera())
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        lock(&self.shared)
    }

    // ---- failure switches ----

    /// Makes every open report `DeviceError(code)`.
    pub fn set_open_error(&self, code: Option<i32>) {
        self.state().switches.open_error = code;
    }

    pub fn set_fail_configure(&self, fail: bool) {
        self.state().switches.fail_configure = fail;
    }

    pub fn set_reject_repeating(&self, reject: bool) {
        self.state().switches.reject_repeating = reject;
    }

    /// Still-capture requests report `CaptureFailed`.
    pub fn set_fail_stills(&self, fail: bool) {
        self.state().switches.fail_stills = fail;
    }

    /// Requests carrying an AF start trigger report `CaptureFailed`.
    pub fn set_fail_focus(&self, fail: bool) {
        self.state().switches.fail_focus = fail;
    }

    pub fn set_fail_encoder_prepare(&self, fail: bool) {
        self.state().switches.fail_encoder_prepare = fail;
    }

    pub fn set_pause_supported(&self, supported: bool) {
        self.state().switches.pause_supported = supported;
    }

    /// AE states reported with the next focus-lock results, in order.
    /// `Converged` once the script runs out.
    pub fn set_ae_sequence(&self, states: impl IntoIterator<Item = AeState>) {
        self.state().ae_script = states.into_iter().collect();
    }

    /// Results of AF and precapture trigger requests report exactly
    /// `frame` instead of an immediate lock. `None` restores the default.
    pub fn set_trigger_response(&self, frame: Option<SimulatedFrame>) {
        self.state().switches.trigger_response = frame;
    }

    // ---- delivery ----

    /// Posts `frames` as results of the repeating request currently
    /// installed. Returns how many were posted, zero when none is running.
    pub fn stream_frames(&self, frames: impl IntoIterator<Item = SimulatedFrame>) -> usize {
        let stream = self.state().repeating.clone();
        let Some(stream) = stream else {
            return 0;
        };
        let events: Vec<HardwareEvent> = frames
            .into_iter()
            .map(|frame| frame.event(stream.generation, stream.request_id))
            .collect();
        let count = events.len();
        dispatch(&self.shared, &stream.sink, events);
        count
    }

    /// With automatic delivery off, responses queue until `deliver_pending`.
    pub fn set_auto_deliver(&self, auto: bool) {
        self.state().switches.manual_delivery = !auto;
    }

    pub fn pending_events(&self) -> usize {
        self.state().pending.len()
    }

    /// Posts every held response in order. Returns how many were posted.
    pub fn deliver_pending(&self) -> usize {
        let pending = std::mem::take(&mut self.state().pending);
        let count = pending.len();
        for (sink, event) in pending {
            sink.post(event);
        }
        count
    }

    /// Reports the most recently opened device as disconnected.
    pub fn disconnect(&self) -> bool {
        self.post_device_event(HardwareEvent::DeviceDisconnected)
    }

    /// Reports a fatal error on the most recently opened device.
    pub fn device_error(&self, code: i32) -> bool {
        self.post_device_event(HardwareEvent::DeviceError(code))
    }

    fn post_device_event(&self, event: HardwareEvent) -> bool {
        let sink = self.state().device_sink.clone();
        match sink {
            Some(sink) => sink.post(event),
            None => false,
        }
    }

    // ---- observation ----

    pub fn stats(&self) -> SimulatedStats {
        self.state().stats
    }

    pub fn requests(&self) -> Vec<SubmittedRequest> {
        self.state().requests.clone()
    }

    pub fn last_repeating(&self) -> Option<CaptureRequest> {
        self.state()
            .requests
            .iter()
            .rev()
            .find(|r| r.repeating)
            .map(|r| r.request.clone())
    }

    /// One-shot requests in submission order.
    pub fn captures(&self) -> Vec<CaptureRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| !r.repeating)
            .map(|r| r.request.clone())
            .collect()
    }

    /// Output sets of every session requested, in order.
    pub fn session_outputs(&self) -> Vec<Vec<OutputTarget>> {
        self.state().session_outputs.clone()
    }

    pub fn encoder_calls(&self) -> Vec<EncoderCall> {
        self.state().encoder_calls.clone()
    }

    pub fn last_recording_config(&self) -> Option<RecordingConfig> {
        self.state().last_recording.clone()
    }
}

impl CameraBackend for SimulatedBackend {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        Ok(self.state().cameras.iter().map(|(id, _)| id.clone()).collect())
    }

    fn characteristics(&self, id: &str) -> Result<CameraCharacteristics, CameraError> {
        self.state()
            .cameras
            .iter()
            .find(|(camera, _)| camera == id)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| CameraError::camera(format!("Unknown camera {}", id)))
    }

    fn open_device(&self, id: &str, sink: HardwareSink) -> Result<(), CameraError> {
        let event = {
            let mut state = self.state();
            state.stats.open_calls += 1;
            if !state.cameras.iter().any(|(camera, _)| camera == id) {
                return Err(CameraError::camera(format!("Unknown camera {}", id)));
            }
            state.device_sink = Some(sink.clone());
            match state.switches.open_error {
                Some(code) => HardwareEvent::DeviceError(code),
                None => HardwareEvent::DeviceOpened(DeviceHandle::new(
                    id,
                    Box::new(SimulatedDevice {
                        shared: self.shared.clone(),
                        closed: false,
                    }),
                )),
            }
        };
        dispatch(&self.shared, &sink, vec![event]);
        Ok(())
    }

    fn create_encoder(&self) -> Result<Box<dyn MediaEncoder>, CameraError> {
        self.state().stats.encoders_created += 1;
        Ok(Box::new(SimulatedEncoder {
            shared: self.shared.clone(),
            surface: None,
            output: None,
        }))
    }

    fn supports_recording_pause(&self) -> bool {
        self.state().switches.pause_supported
    }
}

struct SimulatedDevice {
    shared: Shared,
    closed: bool,
}

impl CameraDevice for SimulatedDevice {
    fn create_session(
        &mut self,
        outputs: Vec<OutputTarget>,
        generation: SessionGeneration,
        sink: HardwareSink,
    ) -> Result<(), CameraError> {
        if self.closed {
            return Err(CameraError::camera("Device closed"));
        }
        let event = {
            let mut state = lock(&self.shared);
            state.stats.sessions_created += 1;
            state.session_outputs.push(outputs);
            if state.switches.fail_configure {
                HardwareEvent::SessionConfigureFailed { generation }
            } else {
                let session = SimulatedSession {
                    shared: self.shared.clone(),
                    generation,
                    sink: sink.clone(),
                    closed: false,
                };
                HardwareEvent::SessionConfigured {
                    generation,
                    session: SessionHandle::new(generation, Box::new(session)),
                }
            }
        };
        dispatch(&self.shared, &sink, vec![event]);
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            lock(&self.shared).stats.device_closes += 1;
        }
    }
}

struct SimulatedSession {
    shared: Shared,
    generation: SessionGeneration,
    sink: HardwareSink,
    closed: bool,
}

impl SimulatedSession {
    fn result(&self, request: &CaptureRequest, af: Option<AfState>, ae: Option<AeState>) -> CaptureResult {
        CaptureResult {
            generation: self.generation,
            request_id: request.id,
            af_state: af,
            ae_state: ae,
        }
    }

    fn stop_stream(&self, state: &mut SimState) {
        if state
            .repeating
            .as_ref()
            .is_some_and(|r| r.generation == self.generation)
        {
            state.repeating = None;
        }
    }

    fn ensure_open(&self) -> Result<(), CameraError> {
        if self.closed {
            return Err(CameraError::camera("Session closed"));
        }
        Ok(())
    }
}

impl CaptureSession for SimulatedSession {
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.ensure_open()?;
        let mut state = lock(&self.shared);
        if state.switches.reject_repeating {
            return Err(CameraError::camera("Repeating request rejected"));
        }
        state.requests.push(SubmittedRequest {
            generation: self.generation,
            repeating: true,
            request: request.clone(),
        });
        state.repeating = Some(RepeatingStream {
            sink: self.sink.clone(),
            generation: self.generation,
            request_id: request.id,
        });
        Ok(())
    }

    fn stop_repeating(&mut self) -> Result<(), CameraError> {
        self.ensure_open()?;
        self.stop_stream(&mut lock(&self.shared));
        Ok(())
    }

    fn capture(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.ensure_open()?;
        let failed = HardwareEvent::CaptureFailed {
            generation: self.generation,
            request_id: request.id,
        };
        let events = {
            let mut state = lock(&self.shared);
            state.requests.push(SubmittedRequest {
                generation: self.generation,
                repeating: false,
                request: request.clone(),
            });

            if request.template == RequestTemplate::StillCapture {
                if state.switches.fail_stills {
                    vec![failed]
                } else {
                    state.stats.stills_captured += 1;
                    vec![
                        HardwareEvent::ImageAvailable {
                            generation: self.generation,
                            data: Bytes::from_static(SIMULATED_JPEG),
                        },
                        HardwareEvent::CaptureCompleted(self.result(
                            request,
                            Some(AfState::FocusedLocked),
                            Some(AeState::Converged),
                        )),
                    ]
                }
            } else if request.af_trigger == Some(AfTrigger::Start) {
                if state.switches.fail_focus {
                    vec![failed]
                } else if let Some(frame) = state.switches.trigger_response {
                    vec![frame.event(self.generation, request.id)]
                } else {
                    let ae = state.ae_script.pop_front().unwrap_or(AeState::Converged);
                    vec![HardwareEvent::CaptureCompleted(self.result(
                        request,
                        Some(AfState::FocusedLocked),
                        Some(ae),
                    ))]
                }
            } else if request.ae_precapture_trigger == Some(AePrecaptureTrigger::Start) {
                if let Some(frame) = state.switches.trigger_response {
                    vec![frame.event(self.generation, request.id)]
                } else {
                    vec![
                        HardwareEvent::CaptureProgressed(self.result(
                            request,
                            None,
                            Some(AeState::Precapture),
                        )),
                        HardwareEvent::CaptureCompleted(self.result(
                            request,
                            Some(AfState::FocusedLocked),
                            Some(AeState::Converged),
                        )),
                    ]
                }
            } else {
                vec![HardwareEvent::CaptureCompleted(self.result(
                    request,
                    Some(AfState::Inactive),
                    Some(AeState::Converged),
                ))]
            }
        };
        dispatch(&self.shared, &self.sink, events);
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let mut state = lock(&self.shared);
            state.stats.session_closes += 1;
            self.stop_stream(&mut state);
        }
    }
}

struct SimulatedEncoder {
    shared: Shared,
    surface: Option<SurfaceId>,
    output: Option<PathBuf>,
}

impl SimulatedEncoder {
    fn record(&self, call: EncoderCall) {
        lock(&self.shared).encoder_calls.push(call);
    }
}

impl MediaEncoder for SimulatedEncoder {
    fn configure(&mut self, config: &RecordingConfig) -> Result<(), CameraError> {
        let mut state = lock(&self.shared);
        state.encoder_calls.push(EncoderCall::Configure);
        if state.switches.fail_encoder_prepare {
            return Err(CameraError::camera("Encoder prepare failed"));
        }
        state.next_surface += 1;
        self.surface = Some(SurfaceId(state.next_surface));
        self.output = config.output_path.clone();
        state.last_recording = Some(config.clone());
        Ok(())
    }

    fn input_surface(&self) -> Result<SurfaceId, CameraError> {
        self.surface
            .ok_or_else(|| CameraError::illegal_state("Encoder not configured"))
    }

    fn start(&mut self) -> Result<(), CameraError> {
        self.record(EncoderCall::Start);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), CameraError> {
        self.record(EncoderCall::Pause);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CameraError> {
        self.record(EncoderCall::Resume);
        Ok(())
    }

    /// Writes a placeholder clip to the configured output.
    fn stop(&mut self) -> Result<(), CameraError> {
        self.record(EncoderCall::Stop);
        if let Some(path) = &self.output {
            std::fs::write(path, b"simulated clip")?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.record(EncoderCall::Reset);
        self.surface = None;
    }

    fn release(&mut self) {
        self.record(EncoderCall::Release);
    }
}

/// Preview widget stand-in that remembers what the controller set on it.
#[derive(Debug)]
pub struct SimulatedPreview {
    view: Size,
    available: AtomicBool,
    buffer_size: Mutex<Option<Size>>,
    aspect: Mutex<Option<(u32, u32)>>,
}

impl SimulatedPreview {
    pub fn new(view_width: u32, view_height: u32) -> Self {
        Self {
            view: Size::new(view_width, view_height),
            available: AtomicBool::new(true),
            buffer_size: Mutex::new(None),
            aspect: Mutex::new(None),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn buffer_size(&self) -> Option<Size> {
        self.buffer_size.lock().ok().and_then(|g| *g)
    }

    pub fn aspect_ratio(&self) -> Option<(u32, u32)> {
        self.aspect.lock().ok().and_then(|g| *g)
    }
}

impl PreviewTarget for SimulatedPreview {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn view_size(&self) -> Size {
        self.view
    }

    fn set_buffer_size(&self, size: Size) {
        if let Ok(mut g) = self.buffer_size.lock() {
            *g = Some(size);
        }
    }

    fn set_aspect_ratio(&self, width: u32, height: u32) {
        if let Ok(mut g) = self.aspect.lock() {
            *g = Some((width, height));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_phone_lists_both_cameras() {
        let backend = SimulatedBackend::phone();
        assert_eq!(backend.camera_ids().unwrap(), vec!["0", "1"]);
        assert_eq!(backend.characteristics("1").unwrap().facing, LensFacing::Front);
        assert!(backend.characteristics("7").is_err());
    }

    #[test]
    fn test_open_posts_device() {
        let backend = SimulatedBackend::back_only();
        let (tx, rx) = unbounded();
        backend.open_device("0", HardwareSink::new(tx)).unwrap();
        match rx.try_recv().unwrap() {
            HardwareEvent::DeviceOpened(handle) => {
                assert_eq!(handle.id(), "0");
                handle.close();
            }
            other => panic!("unexpected {:?}", other),
        }
        let stats = backend.stats();
        assert_eq!(stats.open_calls, 1);
        assert_eq!(stats.device_closes, 1);
    }

    #[test]
    fn test_manual_delivery_holds_events() {
        let backend = SimulatedBackend::back_only();
        backend.set_auto_deliver(false);
        let (tx, rx) = unbounded();
        backend.open_device("0", HardwareSink::new(tx)).unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(backend.pending_events(), 1);
        assert_eq!(backend.deliver_pending(), 1);
        assert!(matches!(rx.try_recv(), Ok(HardwareEvent::DeviceOpened(_))));
    }

    #[test]
    fn test_rejected_event_closes_device() {
        let backend = SimulatedBackend::back_only();
        let (tx, rx) = unbounded();
        drop(rx);
        backend.open_device("0", HardwareSink::new(tx)).unwrap();
        assert_eq!(backend.stats().device_closes, 1);
    }

    #[test]
    fn test_open_error_switch() {
        let backend = SimulatedBackend::back_only();
        backend.set_open_error(Some(4));
        let (tx, rx) = unbounded();
        backend.open_device("0", HardwareSink::new(tx)).unwrap();
        assert!(matches!(rx.try_recv(), Ok(HardwareEvent::DeviceError(4))));
    }

    fn open_session(backend: &SimulatedBackend) -> (SessionHandle, crossbeam_channel::Receiver<HardwareEvent>) {
        let (tx, rx) = unbounded();
        backend.open_device("0", HardwareSink::new(tx.clone())).unwrap();
        let mut device = match rx.try_recv().unwrap() {
            HardwareEvent::DeviceOpened(handle) => handle,
            other => panic!("unexpected {:?}", other),
        };
        device
            .create_session(vec![OutputTarget::Preview], SessionGeneration(1), HardwareSink::new(tx))
            .unwrap();
        let session = match rx.try_recv().unwrap() {
            HardwareEvent::SessionConfigured { session, .. } => session,
            other => panic!("unexpected {:?}", other),
        };
        device.close();
        (session, rx)
    }

    #[test]
    fn test_frames_follow_repeating_request() {
        let backend = SimulatedBackend::back_only();
        let (mut session, rx) = open_session(&backend);
        let frame = SimulatedFrame::partial(Some(AfState::ActiveScan), None);
        assert_eq!(backend.stream_frames([frame]), 0);

        let request = CaptureRequest::new(RequestId(7), RequestTemplate::Preview);
        session.set_repeating_request(&request).unwrap();
        let last = SimulatedFrame::total(Some(AfState::FocusedLocked), Some(AeState::Converged));
        assert_eq!(backend.stream_frames([frame, last]), 2);
        match rx.try_recv().unwrap() {
            HardwareEvent::CaptureProgressed(result) => {
                assert_eq!(result.request_id, RequestId(7));
                assert_eq!(result.af_state, Some(AfState::ActiveScan));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            rx.try_recv(),
            Ok(HardwareEvent::CaptureCompleted(result)) if result.ae_state == Some(AeState::Converged)
        ));

        session.stop_repeating().unwrap();
        assert_eq!(backend.stream_frames([last]), 0);
        session.close();
    }

    #[test]
    fn test_trigger_response_replaces_lock() {
        let backend = SimulatedBackend::back_only();
        let (mut session, rx) = open_session(&backend);
        backend.set_trigger_response(Some(SimulatedFrame::total(
            Some(AfState::ActiveScan),
            Some(AeState::Searching),
        )));

        let mut request = CaptureRequest::new(RequestId(3), RequestTemplate::Preview);
        request.af_trigger = Some(AfTrigger::Start);
        session.capture(&request).unwrap();
        match rx.try_recv().unwrap() {
            HardwareEvent::CaptureCompleted(result) => {
                assert_eq!(result.af_state, Some(AfState::ActiveScan));
                assert_eq!(result.ae_state, Some(AeState::Searching));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(rx.try_recv().is_err());
        session.close();
    }

    #[test]
    fn test_presets() {
        assert!(back_camera().supports_auto_focus());
        assert!(!front_camera().supports_auto_focus());
        assert!(!fixed_focus_camera().flash_available);
        assert!(legacy_camera().is_legacy());
    }
}
