//! Controller state shared by the public operations and the worker.
//!
//! Every mutation happens under the single `Mutex<Core>`; the worker takes
//! it per hardware event, so transitions are evaluated strictly in arrival
//! order. Still frames are the exception: the file write happens between
//! two short holds.

use super::state::{
    PendingRequestToken, PreviewState, RecordingState, StillCaptureState, StillShot,
};
use super::worker::OpenCloseLock;
use crate::config::CrabShotConfig;
use crate::errors::CameraError;
use crate::events::{CameraEvent, EventEmitter};
use crate::geometry::{clamp_zoom, crop_rect, jpeg_orientation, zoom_eq_within};
use crate::hal::{
    AeMode, AfMode, CameraBackend, CameraCharacteristics, CaptureRequest, CaptureResult, ControlMode,
    DeviceHandle, FlashMode, HardwareEvent, HardwareSink, LensFacing, MeteringRectangle,
    OutputTarget, PreviewTarget, RequestId, RequestTemplate, SessionGeneration, SessionHandle,
};
use crate::permissions::{PermissionChecker, REQUIRED_PERMISSIONS};
use crate::recording::RecordingSession;
use crate::sizes::SizeNegotiator;
use crate::storage::{write_frame, GalleryNotifier, PathProvider};
use crate::types::{
    AspectRatio, CaptureParameters, Facing, Flash, Mode, PreviewParams, Rotation, Size,
    StreamConfiguration,
};
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) fn lock_core(core: &Mutex<Core>) -> MutexGuard<'_, Core> {
    match core.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Controller state lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Runs one hardware event against the core. Still frames are written to
/// disk with the lock released.
pub(crate) fn deliver(core: &Mutex<Core>, event: HardwareEvent) {
    match event {
        HardwareEvent::ImageAvailable { generation, data } => {
            let claimed = lock_core(core).claim_still_frame(generation, data.len());
            if let Some((id, path)) = claimed {
                let written = write_frame(&path, &data);
                lock_core(core).on_still_written(id, written);
            }
        }
        event => lock_core(core).handle_hardware_event(event),
    }
}

/// External collaborators injected at construction.
pub(crate) struct Collaborators {
    pub backend: Arc<dyn CameraBackend>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub paths: Arc<dyn PathProvider>,
    pub gallery: Arc<dyn GalleryNotifier>,
}

/// The camera chosen for the current preview run.
pub(crate) struct ActiveCamera {
    pub id: String,
    pub characteristics: CameraCharacteristics,
    pub sizes: SizeNegotiator,
}

/// Tap-to-focus request in flight.
#[derive(Debug)]
pub(crate) struct PendingFocus {
    pub token: PendingRequestToken,
    pub regions: Vec<MeteringRectangle>,
}

pub(crate) struct Core {
    pub(super) hw: Collaborators,
    pub(super) config: CrabShotConfig,
    pub(super) events: EventEmitter,
    pub(super) open_lock: Arc<OpenCloseLock>,
    pub(super) preview: Option<Arc<dyn PreviewTarget>>,
    /// Sink of the running worker.
    pub(super) sink: Option<HardwareSink>,

    pub(super) params: CaptureParameters,
    pub(super) requested_ratio: AspectRatio,
    pub(super) requested_image_size: Option<Size>,
    pub(super) requested_video_size: Option<Size>,
    pub(super) rotation: Rotation,

    pub(super) camera: Option<ActiveCamera>,
    pub(super) streams: Option<StreamConfiguration>,
    pub(super) device: Option<DeviceHandle>,
    pub(super) session: Option<SessionHandle>,
    /// Generation of the most recently requested session.
    pub(super) generation: SessionGeneration,
    next_request: u64,
    pub(super) repeating: Option<CaptureRequest>,

    pub(super) preview_state: PreviewState,
    pub(super) still_state: StillCaptureState,
    /// Failures of requests at or after this abort the still in progress.
    pub(super) still_floor: RequestId,
    pub(super) still_shot: Option<StillShot>,
    pub(super) focus: Option<PendingFocus>,
    pub(super) recording_state: RecordingState,
    pub(super) recording: Option<RecordingSession>,
}

impl Core {
    pub fn new(
        hw: Collaborators,
        config: CrabShotConfig,
        events: EventEmitter,
        open_lock: Arc<OpenCloseLock>,
    ) -> Self {
        let params = CaptureParameters {
            mode: config.camera.default_mode,
            facing: config.camera.default_facing,
            flash: config.camera.default_flash,
            auto_focus: config.camera.auto_focus,
            zoom: 1.0,
        };
        let requested_ratio = config.camera.default_aspect_ratio;
        Self {
            hw,
            config,
            events,
            open_lock,
            preview: None,
            sink: None,
            params,
            requested_ratio,
            requested_image_size: None,
            requested_video_size: None,
            rotation: Rotation::Deg0,
            camera: None,
            streams: None,
            device: None,
            session: None,
            generation: SessionGeneration(0),
            next_request: 0,
            repeating: None,
            preview_state: PreviewState::Stopped,
            still_state: StillCaptureState::Idle,
            still_floor: RequestId(0),
            still_shot: None,
            focus: None,
            recording_state: RecordingState::NotRecording,
            recording: None,
        }
    }

    pub(super) fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    pub(super) fn set_still_state(&mut self, next: StillCaptureState) {
        if self.still_state != next {
            debug_assert!(self.still_state.can_transition_to(next));
            log::debug!("Still capture: {:?} -> {:?}", self.still_state, next);
            self.still_state = next;
        }
    }

    pub(super) fn set_recording_state(&mut self, next: RecordingState) {
        if self.recording_state != next {
            debug_assert!(self.recording_state.can_transition_to(next));
            log::debug!("Recording: {:?} -> {:?}", self.recording_state, next);
            self.recording_state = next;
        }
    }

    pub(super) fn session_mut(&mut self) -> Result<&mut SessionHandle, CameraError> {
        self.session
            .as_mut()
            .ok_or_else(|| CameraError::camera("No active capture session"))
    }

    fn characteristics(&self) -> Option<&CameraCharacteristics> {
        self.camera.as_ref().map(|c| &c.characteristics)
    }

    pub(super) fn max_zoom(&self) -> f32 {
        self.characteristics().map_or(1.0, |c| c.max_zoom())
    }

    /// Orientation applied to stills and recordings, and the rotation
    /// between the sensor and the preview view.
    pub(super) fn output_orientation(&self) -> u32 {
        let sensor = self
            .characteristics()
            .map_or(90, |c| c.sensor_orientation);
        jpeg_orientation(sensor, self.rotation)
    }

    pub(super) fn check_permissions(&self) -> Result<(), CameraError> {
        let missing = self.hw.permissions.missing(&REQUIRED_PERMISSIONS);
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = missing.iter().map(|p| p.to_string()).collect();
        Err(CameraError::permission(format!(
            "Missing permissions: {}",
            names.join(", ")
        )))
    }

    /// Folds `params` into the current settings; absent fields are kept.
    pub(super) fn merge_params(&mut self, params: PreviewParams) {
        if let Some(mode) = params.mode {
            self.params.mode = mode;
        }
        if let Some(facing) = params.facing {
            self.change_facing(facing);
        }
        if let Some(flash) = params.flash {
            self.params.flash = flash;
        }
        if let Some(auto_focus) = params.auto_focus {
            self.params.auto_focus = auto_focus;
        }
        if let Some(zoom) = params.zoom {
            if zoom.is_nan() {
                log::warn!("Ignoring NaN zoom in preview parameters");
            } else {
                self.params.zoom = zoom.max(1.0);
            }
        }
        if let Some(ratio) = params.aspect_ratio {
            self.requested_ratio = ratio;
        }
        if params.image_size.is_some() {
            self.requested_image_size = params.image_size;
        }
        if params.video_size.is_some() {
            self.requested_video_size = params.video_size;
        }
    }

    /// Switches facing, forgetting sizes picked for the old camera. The
    /// aspect-ratio preference is kept.
    pub(super) fn change_facing(&mut self, facing: Facing) -> bool {
        if self.params.facing == facing {
            return false;
        }
        self.params.facing = facing;
        self.requested_image_size = None;
        self.requested_video_size = None;
        self.camera = None;
        self.streams = None;
        true
    }

    // ---- preview start ----

    fn select_camera(&mut self) -> Result<ActiveCamera, CameraError> {
        let ids = self.hw.backend.camera_ids()?;
        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            let characteristics = self.hw.backend.characteristics(&id)?;
            if characteristics.is_legacy() {
                log::info!("Skipping legacy camera {}", id);
                continue;
            }
            candidates.push((id, characteristics));
        }
        if candidates.is_empty() {
            return Err(CameraError::camera("No camera available"));
        }

        let wanted = LensFacing::from(self.params.facing);
        let matching = candidates.iter().position(|(_, c)| c.facing == wanted);
        let (id, characteristics) = match matching {
            Some(index) => candidates.swap_remove(index),
            None => {
                let (id, characteristics) = candidates.swap_remove(0);
                let actual = characteristics.facing.as_facing();
                log::warn!(
                    "No {:?} camera, falling back to camera {} ({:?})",
                    self.params.facing,
                    id,
                    characteristics.facing
                );
                self.params.facing = actual;
                (id, characteristics)
            }
        };

        let sizes = SizeNegotiator::new(
            &characteristics.preview_sizes,
            &characteristics.jpeg_sizes,
            &characteristics.video_sizes,
            self.config.camera.max_video_height,
        );
        Ok(ActiveCamera {
            id,
            characteristics,
            sizes,
        })
    }

    /// Picks the camera and stream sizes for the next preview run and
    /// announces `DeviceConfigured`. Returns the id to open.
    pub(super) fn configure_camera(&mut self) -> Result<String, CameraError> {
        let camera = self.select_camera()?;
        let characteristics = &camera.characteristics;

        if self.params.auto_focus && !characteristics.supports_auto_focus() {
            log::info!("Camera {} has fixed focus, disabling auto focus", camera.id);
            self.params.auto_focus = false;
        }
        if self.params.flash != Flash::Off && !characteristics.flash_available {
            log::warn!("Camera {} has no flash, flash turned off", camera.id);
            self.params.flash = Flash::Off;
        }
        self.params.zoom = clamp_zoom(self.params.zoom, characteristics.max_zoom());

        let requested_size = match self.params.mode {
            Mode::Image => self.requested_image_size,
            Mode::Video => self.requested_video_size,
        };
        let streams = camera
            .sizes
            .negotiate(self.requested_ratio, self.params.mode, requested_size)?;

        let preview = self
            .preview
            .as_ref()
            .ok_or_else(|| CameraError::camera("No preview target bound"))?;
        if !preview.is_available() {
            return Err(CameraError::camera("Preview surface is not available"));
        }
        preview.set_buffer_size(streams.preview_size);
        preview.set_aspect_ratio(streams.preview_size.width, streams.preview_size.height);

        log::info!(
            "Camera {} configured: {:?} preview {} ratio {}",
            camera.id,
            self.params.mode,
            streams.preview_size,
            streams.aspect_ratio
        );
        let id = camera.id.clone();
        self.camera = Some(camera);
        self.streams = Some(streams);
        self.events.emit(CameraEvent::DeviceConfigured);
        self.preview_state = PreviewState::Starting;
        Ok(id)
    }

    pub(super) fn open_camera(&mut self, id: &str) -> Result<(), CameraError> {
        let sink = self
            .sink
            .clone()
            .ok_or_else(|| CameraError::camera("Camera worker not running"))?;
        log::debug!("Opening camera {}", id);
        self.hw.backend.open_device(id, sink)
    }

    /// Requests the session used outside recording: preview plus still
    /// reader in image mode, preview only in video mode.
    pub(super) fn create_preview_session(&mut self) -> Result<(), CameraError> {
        let outputs = match self.params.mode {
            Mode::Image => vec![OutputTarget::Preview, OutputTarget::StillReader],
            Mode::Video => vec![OutputTarget::Preview],
        };
        self.create_session(outputs)
    }

    pub(super) fn create_session(&mut self, outputs: Vec<OutputTarget>) -> Result<(), CameraError> {
        let sink = self
            .sink
            .clone()
            .ok_or_else(|| CameraError::camera("Camera worker not running"))?;
        self.generation = self.generation.next();
        let generation = self.generation;
        let device = self
            .device
            .as_mut()
            .ok_or_else(|| CameraError::camera("Camera device not open"))?;
        log::debug!("Creating session {} with {:?}", generation, outputs);
        device.create_session(outputs, generation, sink)
    }

    pub(super) fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
        self.repeating = None;
    }

    // ---- requests ----

    /// Builds the repeating request from the current parameters. While a
    /// recording session is up it targets the encoder as well.
    pub(super) fn build_repeating_request(&mut self) -> CaptureRequest {
        let id = self.next_request_id();
        let encoder_surface = match self.recording_state {
            RecordingState::Preparing | RecordingState::Recording | RecordingState::Paused => {
                self.recording.as_ref().and_then(|r| r.surface())
            }
            _ => None,
        };

        let template = if encoder_surface.is_some() {
            RequestTemplate::Record
        } else {
            RequestTemplate::Preview
        };
        let mut request = CaptureRequest::new(id, template).with_target(OutputTarget::Preview);
        if let Some(surface) = encoder_surface {
            request.add_target(OutputTarget::EncoderInput(surface));
        }
        self.apply_controls(&mut request);
        request
    }

    fn apply_controls(&self, request: &mut CaptureRequest) {
        let video = self.params.mode == Mode::Video;
        if video {
            request.control_mode = Some(ControlMode::Auto);
        }
        request.af_mode = Some(match (self.params.auto_focus, video) {
            (false, _) => AfMode::Off,
            (true, false) => AfMode::ContinuousPicture,
            (true, true) => AfMode::ContinuousVideo,
        });
        apply_flash(request, self.params.flash);
        if let Some(characteristics) = self.characteristics() {
            request.crop_region = Some(crop_rect(characteristics.active_array, self.params.zoom));
        }
    }

    /// Builds and installs a fresh repeating request.
    pub(super) fn submit_repeating(&mut self) -> Result<(), CameraError> {
        let request = self.build_repeating_request();
        self.session_mut()?.set_repeating_request(&request)?;
        self.repeating = Some(request);
        Ok(())
    }

    /// Resubmits the repeating request after a control change. Deferred
    /// while a session is being replaced or a one-shot sequence owns the
    /// stream; the next rebuild picks the change up.
    fn refresh_repeating(&mut self) -> Result<(), CameraError> {
        let stream_busy = !self.still_state.is_idle()
            || self.focus.is_some()
            || matches!(
                self.recording_state,
                RecordingState::Preparing | RecordingState::Finishing
            );
        if self.session.is_none() || stream_busy {
            return Ok(());
        }
        self.submit_repeating()
    }

    /// Changes one repeating-request control, rolling back if the hardware
    /// rejects the new request.
    fn apply_control<T: Copy + PartialEq>(
        &mut self,
        get: fn(&CaptureParameters) -> T,
        set: fn(&mut CaptureParameters, T),
        value: T,
    ) -> Result<bool, CameraError> {
        let previous = get(&self.params);
        if previous == value {
            return Ok(false);
        }
        set(&mut self.params, value);
        if let Err(e) = self.refresh_repeating() {
            set(&mut self.params, previous);
            if let Err(restore) = self.refresh_repeating() {
                log::error!("Failed to restore previous repeating request: {}", restore);
            }
            return Err(e);
        }
        Ok(true)
    }

    pub(super) fn set_flash(&mut self, flash: Flash) -> Result<(), CameraError> {
        if let Some(characteristics) = self.characteristics() {
            if flash != Flash::Off && !characteristics.flash_available {
                return Err(CameraError::invalid_parameter(format!(
                    "Flash {:?} is not supported by this camera",
                    flash
                )));
            }
        }
        self.apply_control(|p| p.flash, |p, v| p.flash = v, flash)?;
        Ok(())
    }

    pub(super) fn set_auto_focus(&mut self, auto_focus: bool) -> Result<(), CameraError> {
        if let Some(characteristics) = self.characteristics() {
            if auto_focus && !characteristics.supports_auto_focus() {
                return Err(CameraError::invalid_parameter(
                    "Auto focus is not supported by this camera",
                ));
            }
        }
        self.apply_control(|p| p.auto_focus, |p, v| p.auto_focus = v, auto_focus)?;
        Ok(())
    }

    pub(super) fn set_zoom(&mut self, zoom: f32) -> Result<(), CameraError> {
        if zoom.is_nan() {
            return Err(CameraError::invalid_parameter("Zoom must be a number"));
        }
        let zoom = if self.camera.is_some() {
            clamp_zoom(zoom, self.max_zoom())
        } else {
            zoom.max(1.0)
        };
        if zoom_eq_within(zoom, self.params.zoom, self.config.advanced.zoom_epsilon) {
            return Ok(());
        }
        if self.apply_control(|p| p.zoom, |p, v| p.zoom = v, zoom)? {
            log::debug!("Zoom set to {:.3}", zoom);
            self.events.emit(CameraEvent::ZoomChanged { zoom });
        }
        Ok(())
    }

    // ---- topology changes; `Ok(true)` means a running preview must restart ----

    pub(super) fn set_mode(&mut self, mode: Mode) -> Result<bool, CameraError> {
        if self.recording_state != RecordingState::NotRecording {
            return Err(CameraError::illegal_state(
                "Cannot change mode while recording",
            ));
        }
        if self.params.mode == mode {
            return Ok(false);
        }
        self.params.mode = mode;
        Ok(true)
    }

    pub(super) fn set_facing(&mut self, facing: Facing) -> Result<bool, CameraError> {
        if self.recording_state != RecordingState::NotRecording {
            return Err(CameraError::illegal_state(
                "Cannot switch camera while recording",
            ));
        }
        Ok(self.change_facing(facing))
    }

    pub(super) fn set_output_size(&mut self, mode: Mode, size: Size) -> Result<bool, CameraError> {
        if size.width == 0 || size.height == 0 {
            return Err(CameraError::invalid_parameter(format!(
                "Invalid size {}",
                size
            )));
        }
        if self.recording_state != RecordingState::NotRecording {
            return Err(CameraError::illegal_state(
                "Cannot change size while recording",
            ));
        }
        if let Some(camera) = &self.camera {
            if !camera.sizes.output_sizes(mode).contains(&size) {
                return Err(CameraError::invalid_parameter(format!(
                    "Unsupported {:?} size {}",
                    mode, size
                )));
            }
        }

        let current = self.streams.and_then(|s| s.output_size(mode));
        let requested = match mode {
            Mode::Image => &mut self.requested_image_size,
            Mode::Video => &mut self.requested_video_size,
        };
        if *requested == Some(size) && current == Some(size) {
            return Ok(false);
        }
        *requested = Some(size);
        self.requested_ratio = size.aspect_ratio();
        Ok(mode == self.params.mode)
    }

    pub(super) fn set_aspect_ratio(&mut self, ratio: AspectRatio) -> Result<bool, CameraError> {
        let stopped = self.preview_state == PreviewState::Stopped;
        if !stopped && self.recording_state != RecordingState::NotRecording {
            return Err(CameraError::illegal_state(
                "Cannot change aspect ratio while recording",
            ));
        }
        // Before any camera has been seen there is nothing to check against.
        if self.camera.is_some() && !self.supported_aspect_ratios().contains(&ratio) {
            return Err(CameraError::invalid_parameter(format!(
                "Unsupported aspect ratio {}",
                ratio
            )));
        }
        if stopped {
            if self.requested_ratio != ratio {
                self.requested_ratio = ratio;
                self.requested_image_size = None;
                self.requested_video_size = None;
            }
            return Ok(false);
        }
        if self.streams.map(|s| s.aspect_ratio) == Some(ratio) {
            return Ok(false);
        }
        self.requested_ratio = ratio;
        self.requested_image_size = None;
        self.requested_video_size = None;
        Ok(true)
    }

    pub(super) fn supported_aspect_ratios(&self) -> Vec<AspectRatio> {
        self.camera
            .as_ref()
            .map(|c| c.sizes.supported_aspect_ratios(self.params.mode))
            .unwrap_or_default()
    }

    // ---- teardown ----

    /// Closes the session and the device and resets every state machine.
    /// Returns the preview state before the call.
    pub(super) fn teardown(&mut self) -> PreviewState {
        let previous = self.preview_state;
        self.still_shot = None;
        self.still_state = StillCaptureState::Idle;
        self.focus = None;
        if let Some(recording) = self.recording.take() {
            log::warn!("Releasing encoder during teardown ({:?})", self.recording_state);
            recording.release();
        }
        self.recording_state = RecordingState::NotRecording;
        self.close_session();
        if let Some(device) = self.device.take() {
            device.close();
        }
        self.preview_state = PreviewState::Stopped;
        previous
    }

    /// Reports `error` and stops everything.
    pub(super) fn fail(&mut self, error: CameraError) {
        self.events.emit_error(&error);
        self.teardown();
    }

    // ---- hardware events (worker thread) ----

    pub(crate) fn handle_hardware_event(&mut self, event: HardwareEvent) {
        match event {
            HardwareEvent::DeviceOpened(handle) => self.on_device_opened(handle),
            HardwareEvent::DeviceDisconnected => self.on_device_disconnected(),
            HardwareEvent::DeviceError(code) => self.on_device_error(code),
            HardwareEvent::SessionConfigured {
                generation,
                session,
            } => self.on_session_configured(generation, session),
            HardwareEvent::SessionConfigureFailed { generation } => {
                self.on_session_configure_failed(generation)
            }
            HardwareEvent::CaptureProgressed(result) => self.on_capture_result(result, false),
            HardwareEvent::CaptureCompleted(result) => self.on_capture_result(result, true),
            HardwareEvent::CaptureFailed {
                generation,
                request_id,
            } => self.on_capture_failed(generation, request_id),
            HardwareEvent::ImageAvailable { generation, data } => {
                if let Some((id, path)) = self.claim_still_frame(generation, data.len()) {
                    let written = write_frame(&path, &data);
                    self.on_still_written(id, written);
                }
            }
        }
    }

    pub(super) fn is_current(&self, generation: SessionGeneration) -> bool {
        self.session.as_ref().map(|s| s.generation()) == Some(generation)
    }

    fn on_device_opened(&mut self, handle: DeviceHandle) {
        self.open_lock.release();
        if self.preview_state != PreviewState::Starting || self.device.is_some() {
            log::warn!("Camera {} opened after stop, closing", handle.id());
            handle.close();
            return;
        }
        log::info!("Camera {} opened", handle.id());
        self.device = Some(handle);
        if let Err(e) = self.create_preview_session() {
            self.fail(e);
        }
    }

    fn on_device_disconnected(&mut self) {
        self.open_lock.release();
        log::warn!("Camera disconnected");
        if self.teardown() != PreviewState::Stopped {
            self.events.emit(CameraEvent::PreviewStopped);
        }
    }

    fn on_device_error(&mut self, code: i32) {
        self.open_lock.release();
        if self.preview_state == PreviewState::Stopped && self.device.is_none() {
            log::warn!("Ignoring device error {} after stop", code);
            return;
        }
        self.fail(CameraError::camera(format!("Camera device error {}", code)));
    }

    fn on_session_configured(&mut self, generation: SessionGeneration, session: SessionHandle) {
        if generation != self.generation || self.device.is_none() {
            log::debug!("Discarding stale session {}", generation);
            session.close();
            return;
        }
        if let Some(old) = self.session.replace(session) {
            old.close();
        }

        if self.recording_state == RecordingState::Preparing {
            self.on_recording_session_configured();
            return;
        }

        match self.submit_repeating() {
            Ok(()) => {
                if self.preview_state == PreviewState::Starting {
                    self.preview_state = PreviewState::Active;
                    log::info!("Preview started");
                    self.events.emit(CameraEvent::PreviewStarted);
                }
            }
            Err(e) => self.fail(e),
        }
    }

    fn on_session_configure_failed(&mut self, generation: SessionGeneration) {
        if generation != self.generation {
            log::debug!("Ignoring configure failure of stale session {}", generation);
            return;
        }
        self.fail(CameraError::camera("Failed to configure capture session"));
    }

    fn on_capture_result(&mut self, result: CaptureResult, total: bool) {
        if !self.is_current(result.generation) {
            return;
        }
        if total
            && self
                .focus
                .as_ref()
                .is_some_and(|f| f.token.matches(result.request_id))
        {
            self.on_focus_finished(true);
        }
        self.process_still_result(&result, total);
    }

    fn on_capture_failed(&mut self, generation: SessionGeneration, request_id: RequestId) {
        if !self.is_current(generation) {
            return;
        }
        if self
            .focus
            .as_ref()
            .is_some_and(|f| f.token.matches(request_id))
        {
            log::warn!("Focus request {} failed", request_id);
            self.on_focus_finished(false);
            return;
        }
        let still_request = self
            .still_shot
            .as_ref()
            .is_some_and(|s| s.token.matches(request_id))
            || (!self.still_state.is_idle() && request_id >= self.still_floor);
        if still_request {
            self.abort_still(CameraError::camera(format!(
                "Still capture request {} failed",
                request_id
            )));
        }
    }
}

/// Maps the flash policy onto auto-exposure and flash controls.
pub(crate) fn apply_flash(request: &mut CaptureRequest, flash: Flash) {
    let (ae_mode, flash_mode) = match flash {
        Flash::Off => (AeMode::On, FlashMode::Off),
        Flash::On => (AeMode::OnAlwaysFlash, FlashMode::Off),
        Flash::Torch => (AeMode::On, FlashMode::Torch),
        Flash::Auto => (AeMode::OnAutoFlash, FlashMode::Off),
        Flash::RedEye => (AeMode::OnAutoFlashRedEye, FlashMode::Off),
    };
    request.ae_mode = Some(ae_mode);
    request.flash_mode = Some(flash_mode);
}
