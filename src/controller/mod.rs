//! Camera session controller.
//!
//! [`CaptureSessionController`] owns the camera device, the active capture
//! session and the still-capture and recording state machines. Public
//! operations are called from one main context and never block on the
//! hardware: they submit work and return, and outcomes arrive later as
//! [`CameraEvent`]s on the controller's [`EventChannel`].
//!
//! Hardware callbacks run on a background worker created by
//! [`start_preview`](CaptureSessionController::start_preview) and joined by
//! [`stop_preview`](CaptureSessionController::stop_preview). The worker and
//! the public operations share one mutual-exclusion domain, so state
//! transitions never race.
//!
//! # Example
//! ```rust
//! use crabshot::controller::CaptureSessionController;
//! use crabshot::events::CameraEvent;
//! use crabshot::testing::{SimulatedBackend, SimulatedPreview};
//! use crabshot::types::PreviewParams;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let backend = Arc::new(SimulatedBackend::phone());
//! let mut controller = CaptureSessionController::builder(backend).build();
//! controller.initialize(Arc::new(SimulatedPreview::new(1080, 1440)));
//!
//! controller.start_preview(PreviewParams::default());
//! let mut started = false;
//! while let Some(event) = controller.events().recv_timeout(Duration::from_secs(2)) {
//!     if event == CameraEvent::PreviewStarted {
//!         started = true;
//!         break;
//!     }
//! }
//! assert!(started);
//! controller.stop_preview();
//! ```

mod core;
mod recording;
mod state;
mod still;
mod worker;

pub use state::{PendingRequestToken, PreviewState, RecordingState, RequestKind, StillCaptureState};
pub use worker::OpenCloseLock;

use self::core::{lock_core, Collaborators, Core};
use self::worker::Worker;
use crate::config::CrabShotConfig;
use crate::errors::CameraError;
use crate::events::{CameraEvent, EventChannel, EventListener};
use crate::hal::{CameraBackend, PreviewTarget};
use crate::permissions::{PermissionChecker, StaticPermissions};
use crate::recording::RecorderConfigurator;
use crate::storage::{DirectoryPathProvider, GalleryNotifier, LoggingGalleryNotifier, PathProvider};
use crate::types::{
    AspectRatio, CaptureParameters, Facing, Flash, Mode, PreviewParams, Rotation, Size,
    StreamConfiguration,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Assembles a controller and its collaborators.
pub struct ControllerBuilder {
    backend: Arc<dyn CameraBackend>,
    permissions: Option<Arc<dyn PermissionChecker>>,
    paths: Option<Arc<dyn PathProvider>>,
    gallery: Option<Arc<dyn GalleryNotifier>>,
    config: CrabShotConfig,
}

impl ControllerBuilder {
    pub fn permissions(mut self, permissions: Arc<dyn PermissionChecker>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn path_provider(mut self, paths: Arc<dyn PathProvider>) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn gallery(mut self, gallery: Arc<dyn GalleryNotifier>) -> Self {
        self.gallery = Some(gallery);
        self
    }

    pub fn config(mut self, config: CrabShotConfig) -> Self {
        self.config = config;
        self
    }

    /// Missing collaborators default to all permissions granted, files
    /// under `[storage].output_directory` and a logging gallery notifier.
    pub fn build(self) -> CaptureSessionController {
        let paths = self
            .paths
            .unwrap_or_else(|| Arc::new(DirectoryPathProvider::from_config(&self.config.storage)));
        let hw = Collaborators {
            backend: self.backend,
            permissions: self
                .permissions
                .unwrap_or_else(|| Arc::new(StaticPermissions::all_granted())),
            paths,
            gallery: self
                .gallery
                .unwrap_or_else(|| Arc::new(LoggingGalleryNotifier)),
        };

        let events = EventChannel::new();
        let open_lock = Arc::new(OpenCloseLock::new());
        let open_timeout = Duration::from_millis(self.config.advanced.open_timeout_ms);
        let core = Core::new(hw, self.config, events.emitter(), open_lock.clone());

        CaptureSessionController {
            core: Arc::new(Mutex::new(core)),
            open_lock,
            open_timeout,
            worker: None,
            events,
            initialized: false,
        }
    }
}

pub struct CaptureSessionController {
    core: Arc<Mutex<Core>>,
    open_lock: Arc<OpenCloseLock>,
    open_timeout: Duration,
    worker: Option<Worker>,
    events: EventChannel,
    initialized: bool,
}

impl CaptureSessionController {
    pub fn builder(backend: Arc<dyn CameraBackend>) -> ControllerBuilder {
        ControllerBuilder {
            backend,
            permissions: None,
            paths: None,
            gallery: None,
            config: CrabShotConfig::default(),
        }
    }

    /// Binds the preview widget. Every operation below requires it.
    pub fn initialize(&mut self, preview: Arc<dyn PreviewTarget>) {
        self.core().preview = Some(preview);
        self.initialized = true;
        log::debug!("Controller initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn assert_initialized(&self) {
        assert!(
            self.initialized,
            "CaptureSessionController used before initialize()"
        );
    }

    fn core(&self) -> MutexGuard<'_, Core> {
        lock_core(&self.core)
    }

    fn report(&self, error: CameraError) {
        self.core().events.emit_error(&error);
    }

    // ---- events ----

    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    pub fn set_listener(&mut self, listener: impl EventListener + 'static) {
        self.events.set_listener(listener);
    }

    pub fn clear_listener(&mut self) {
        self.events.clear_listener();
    }

    /// Delivers queued events to the listener on the calling thread.
    pub fn dispatch_events(&mut self) -> usize {
        self.events.dispatch_pending()
    }

    // ---- preview lifecycle ----

    /// Merges `params` into the current settings and starts the preview.
    /// No-op if a preview is already starting or running.
    pub fn start_preview(&mut self, params: PreviewParams) {
        self.assert_initialized();
        {
            let mut core = self.core();
            if core.preview_state != PreviewState::Stopped {
                log::debug!("start_preview ignored: preview is {:?}", core.preview_state);
                return;
            }
            core.merge_params(params);
            if let Err(e) = core.check_permissions() {
                core.events.emit_error(&e);
                return;
            }
        }

        // A worker left behind by a hardware failure is reaped here.
        self.shutdown_worker();
        let worker = match Worker::spawn(self.core.clone()) {
            Ok(worker) => worker,
            Err(e) => return self.report(e),
        };
        let sink = worker.sink();
        self.worker = Some(worker);

        let configured = {
            let mut core = self.core();
            core.sink = Some(sink);
            core.configure_camera()
        };
        let camera_id = match configured {
            Ok(id) => id,
            Err(e) => return self.abort_start(e),
        };

        if !self.open_lock.try_acquire_for(self.open_timeout) {
            return self.abort_start(CameraError::camera(
                "Time out waiting to lock camera opening",
            ));
        }
        let opened = self.core().open_camera(&camera_id);
        if let Err(e) = opened {
            self.open_lock.release();
            self.abort_start(e);
        }
    }

    fn abort_start(&mut self, error: CameraError) {
        {
            let mut core = self.core();
            core.events.emit_error(&error);
            core.teardown();
        }
        self.shutdown_worker();
    }

    fn shutdown_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.core().sink = None;
            worker.shutdown();
        }
    }

    /// Closes the session and the device and stops the worker. Emits
    /// `PreviewStopped` only if a preview was starting or running.
    pub fn stop_preview(&mut self) {
        self.assert_initialized();
        self.close_camera();
    }

    fn close_camera(&mut self) {
        if self.worker.is_none() && self.core().preview_state == PreviewState::Stopped {
            return;
        }

        let locked = self.open_lock.try_acquire_for(self.open_timeout);
        {
            let mut core = self.core();
            if !locked {
                core.events.emit_error(&CameraError::camera(
                    "Time out waiting to lock camera closing",
                ));
            }
            if core.teardown() != PreviewState::Stopped {
                log::info!("Preview stopped");
                core.events.emit(CameraEvent::PreviewStopped);
            }
        }
        self.open_lock.release();
        self.shutdown_worker();
    }

    /// Stop-then-start with `params` merged in. When no preview is running
    /// the parameters are only stored.
    pub fn restart_preview(&mut self, params: PreviewParams) {
        self.assert_initialized();
        let running = self.core().preview_state != PreviewState::Stopped;
        if running {
            self.stop_preview();
            self.start_preview(params);
        } else {
            self.core().merge_params(params);
        }
    }

    /// Runs a topology change; restarts a running preview when it reports
    /// that the output set changed.
    fn reconfigure(&mut self, change: impl FnOnce(&mut Core) -> Result<bool, CameraError>) {
        self.assert_initialized();
        let restart = {
            let mut core = self.core();
            match change(&mut core) {
                Ok(changed) => changed && core.preview_state != PreviewState::Stopped,
                Err(e) => {
                    core.events.emit_error(&e);
                    false
                }
            }
        };
        if restart {
            self.restart_preview(PreviewParams::default());
        }
    }

    fn update(&mut self, change: impl FnOnce(&mut Core) -> Result<(), CameraError>) {
        self.assert_initialized();
        let mut core = self.core();
        if let Err(e) = change(&mut core) {
            core.events.emit_error(&e);
        }
    }

    // ---- settings ----

    pub fn set_facing(&mut self, facing: Facing) {
        self.reconfigure(|core| core.set_facing(facing));
    }

    /// Switches between the back and front camera.
    pub fn flip(&mut self) {
        let facing = self.facing().flipped();
        self.set_facing(facing);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.reconfigure(|core| core.set_mode(mode));
    }

    /// Toggles between image and video mode.
    pub fn switch_mode(&mut self) {
        let mode = match self.mode() {
            Mode::Image => Mode::Video,
            Mode::Video => Mode::Image,
        };
        self.set_mode(mode);
    }

    pub fn set_image_size(&mut self, size: Size) {
        self.reconfigure(|core| core.set_output_size(Mode::Image, size));
    }

    pub fn set_video_size(&mut self, size: Size) {
        self.reconfigure(|core| core.set_output_size(Mode::Video, size));
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.reconfigure(|core| core.set_aspect_ratio(ratio));
    }

    pub fn set_flash(&mut self, flash: Flash) {
        self.update(|core| core.set_flash(flash));
    }

    pub fn set_auto_focus(&mut self, auto_focus: bool) {
        self.update(|core| core.set_auto_focus(auto_focus));
    }

    /// Clamps `zoom` to `[1, max_zoom]` and applies it; emits `ZoomChanged`
    /// when the value changes.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.update(|core| core.set_zoom(zoom));
    }

    /// Display rotation used for still orientation and focus mapping.
    pub fn set_display_rotation(&mut self, rotation: Rotation) {
        self.core().rotation = rotation;
    }

    // ---- capture ----

    pub fn take_picture(&mut self) {
        self.update(|core| core.take_picture());
    }

    /// Focuses on a point in preview view coordinates.
    pub fn focus_at(&mut self, x: f32, y: f32) {
        self.update(|core| core.focus_at(x, y));
    }

    /// Starts recording. `configurator` adjusts the encoder settings and may
    /// opt out of the defaults entirely.
    pub fn start_recording(&mut self, configurator: Option<Box<dyn RecorderConfigurator>>) {
        self.update(|core| core.start_recording(configurator));
    }

    pub fn pause_recording(&mut self) {
        self.update(|core| core.pause_recording());
    }

    pub fn resume_recording(&mut self) {
        self.update(|core| core.resume_recording());
    }

    pub fn finish_recording(&mut self) {
        self.update(|core| core.finish_recording());
    }

    // ---- accessors ----

    pub fn current_params(&self) -> CaptureParameters {
        self.core().params
    }

    pub fn mode(&self) -> Mode {
        self.core().params.mode
    }

    pub fn facing(&self) -> Facing {
        self.core().params.facing
    }

    pub fn flash(&self) -> Flash {
        self.core().params.flash
    }

    pub fn auto_focus(&self) -> bool {
        self.core().params.auto_focus
    }

    pub fn zoom(&self) -> f32 {
        self.core().params.zoom
    }

    /// 1.0 until a camera has been selected.
    pub fn max_zoom(&self) -> f32 {
        self.core().max_zoom()
    }

    /// The negotiated ratio, or the requested one before negotiation.
    pub fn aspect_ratio(&self) -> AspectRatio {
        let core = self.core();
        core.streams
            .map(|s| s.aspect_ratio)
            .unwrap_or(core.requested_ratio)
    }

    pub fn stream_configuration(&self) -> Option<StreamConfiguration> {
        self.core().streams
    }

    pub fn preview_size(&self) -> Option<Size> {
        self.core().streams.map(|s| s.preview_size)
    }

    pub fn image_size(&self) -> Option<Size> {
        self.core().streams.and_then(|s| s.image_size)
    }

    pub fn video_size(&self) -> Option<Size> {
        self.core().streams.and_then(|s| s.video_size)
    }

    /// Preview sizes offered for the current mode.
    pub fn supported_preview_sizes(&self) -> Vec<Size> {
        let core = self.core();
        core.camera
            .as_ref()
            .map(|c| c.sizes.preview_for_mode(core.params.mode).all().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn supported_image_sizes(&self) -> Vec<Size> {
        self.core()
            .camera
            .as_ref()
            .map(|c| c.sizes.image_sizes().all().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn supported_video_sizes(&self) -> Vec<Size> {
        self.core()
            .camera
            .as_ref()
            .map(|c| c.sizes.video_sizes().all().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn supported_aspect_ratios(&self) -> Vec<AspectRatio> {
        self.core().supported_aspect_ratios()
    }

    pub fn preview_state(&self) -> PreviewState {
        self.core().preview_state
    }

    pub fn still_capture_state(&self) -> StillCaptureState {
        self.core().still_state
    }

    pub fn recording_state(&self) -> RecordingState {
        self.core().recording_state
    }
}

impl Drop for CaptureSessionController {
    fn drop(&mut self) {
        self.close_camera();
    }
}
