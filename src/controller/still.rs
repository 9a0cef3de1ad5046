//! Still capture convergence protocol and tap-to-focus.

use super::core::{apply_flash, Core, PendingFocus};
use super::state::{PendingRequestToken, PreviewState, RequestKind, StillCaptureState, StillShot};
use crate::errors::CameraError;
use crate::events::CameraEvent;
use crate::geometry::metering_rect_with_side;
use crate::hal::{
    AeState, AfMode, AfTrigger, AePrecaptureTrigger, CaptureRequest, CaptureResult, ControlMode,
    MeteringRectangle, OutputTarget, RequestId, RequestTemplate, SessionGeneration,
    METERING_WEIGHT_MAX,
};
use crate::types::Mode;
use std::path::PathBuf;

impl Core {
    /// Copy of the installed repeating request under a fresh id.
    fn repeating_copy(&mut self) -> CaptureRequest {
        let id = self.next_request_id();
        if let Some(request) = &self.repeating {
            return request.resubmitted(id);
        }
        self.build_repeating_request()
    }

    fn ensure_preview_running(&self) -> Result<(), CameraError> {
        if self.preview_state != PreviewState::Active || self.session.is_none() {
            return Err(CameraError::illegal_state("Preview is not running"));
        }
        Ok(())
    }

    /// Starts one still capture. A call made while another capture is in
    /// progress is ignored.
    pub(super) fn take_picture(&mut self) -> Result<(), CameraError> {
        if self.params.mode != Mode::Image {
            return Err(CameraError::unsupported("Still capture requires image mode"));
        }
        self.ensure_preview_running()?;
        if !self.still_state.is_idle() {
            log::warn!(
                "take_picture ignored: capture already in progress ({:?})",
                self.still_state
            );
            return Ok(());
        }

        if self.params.auto_focus {
            self.lock_focus();
        } else {
            self.capture_still();
        }
        Ok(())
    }

    fn lock_focus(&mut self) {
        let mut request = self.repeating_copy();
        request.af_trigger = Some(AfTrigger::Start);
        self.still_floor = request.id;
        self.set_still_state(StillCaptureState::LockingFocus);

        let submitted = self.session_mut().and_then(|s| s.capture(&request));
        if let Err(e) = submitted {
            self.abort_still(e);
        }
    }

    fn run_precapture(&mut self) {
        let mut request = self.repeating_copy();
        request.af_trigger = None;
        request.ae_precapture_trigger = Some(AePrecaptureTrigger::Start);
        self.still_floor = request.id;
        self.set_still_state(StillCaptureState::WaitingPrecapture);

        let submitted = self.session_mut().and_then(|s| s.capture(&request));
        if let Err(e) = submitted {
            self.abort_still(e);
        }
    }

    fn capture_still(&mut self) {
        self.set_still_state(StillCaptureState::CapturingStill);

        let path = match self.hw.paths.next_image_path() {
            Ok(path) => path,
            Err(e) => return self.abort_still(e),
        };

        let id = self.next_request_id();
        let mut request =
            CaptureRequest::new(id, RequestTemplate::StillCapture).with_target(OutputTarget::StillReader);
        if let Some(repeating) = &self.repeating {
            request.af_mode = repeating.af_mode;
            request.crop_region = repeating.crop_region;
        }
        apply_flash(&mut request, self.params.flash);
        request.jpeg_orientation = Some(self.output_orientation());

        self.still_floor = id;
        self.still_shot = Some(StillShot::new(id, path));

        let submitted = self.session_mut().and_then(|session| {
            session.stop_repeating()?;
            session.capture(&request)
        });
        if let Err(e) = submitted {
            self.abort_still(e);
        }
    }

    /// Advances the protocol on one capture result of the current session.
    ///
    /// Any result counts until the still request is out, repeating preview
    /// frames included. Completion of the still itself is matched by
    /// request id.
    pub(super) fn process_still_result(&mut self, result: &CaptureResult, total: bool) {
        if self.still_state.is_idle() {
            return;
        }
        // Partial results without 3A state carry nothing to act on.
        if !total && result.af_state.is_none() && result.ae_state.is_none() {
            return;
        }

        match self.still_state {
            StillCaptureState::LockingFocus => match result.af_state {
                None => self.capture_still(),
                Some(af) if af.is_locked() => match result.ae_state {
                    None | Some(AeState::Converged) => self.capture_still(),
                    Some(_) => self.run_precapture(),
                },
                Some(_) => {}
            },
            StillCaptureState::WaitingPrecapture => {
                if matches!(
                    result.ae_state,
                    None | Some(AeState::Precapture) | Some(AeState::FlashRequired)
                ) {
                    self.set_still_state(StillCaptureState::WaitingNonPrecapture);
                }
            }
            StillCaptureState::WaitingNonPrecapture => {
                if result.ae_state != Some(AeState::Precapture) {
                    self.capture_still();
                }
            }
            StillCaptureState::CapturingStill => {
                let Some(shot) = self.still_shot.as_mut() else {
                    return;
                };
                if total && shot.token.matches(result.request_id) {
                    shot.completed = true;
                    self.finish_still_if_done();
                }
            }
            StillCaptureState::Idle => {}
        }
    }

    /// Hands out the destination of a still frame from `generation`, at
    /// most once per shot. The caller writes it without holding the core.
    pub(crate) fn claim_still_frame(
        &mut self,
        generation: SessionGeneration,
        len: usize,
    ) -> Option<(RequestId, PathBuf)> {
        if !self.is_current(generation) {
            log::debug!("Dropping still frame from stale session {}", generation);
            return None;
        }
        let Some(shot) = self.still_shot.as_mut() else {
            log::warn!("Unexpected still frame, dropping {} bytes", len);
            return None;
        };
        if shot.frame_claimed {
            log::warn!("Duplicate still frame for {}", shot.token);
            return None;
        }
        shot.frame_claimed = true;
        Some((shot.token.id, shot.path.clone()))
    }

    /// Records the outcome of writing the frame claimed for shot `id`.
    pub(crate) fn on_still_written(&mut self, id: RequestId, written: Result<(), CameraError>) {
        let Some(shot) = self.still_shot.as_mut().filter(|s| s.token.matches(id)) else {
            log::debug!("Still {} was abandoned while its frame was written", id);
            return;
        };
        match written {
            Ok(()) => {
                log::debug!("Wrote still to {}", shot.path.display());
                shot.image_written = true;
                self.finish_still_if_done();
            }
            Err(e) => self.abort_still(e),
        }
    }

    fn finish_still_if_done(&mut self) {
        if !self.still_shot.as_ref().is_some_and(|s| s.is_done()) {
            return;
        }
        if let Some(shot) = self.still_shot.take() {
            log::info!("Still saved to {}", shot.path.display());
            self.hw.gallery.notify(&shot.path);
            self.events.emit(CameraEvent::ShotFinished { path: shot.path });
        }
        self.unlock_focus();
    }

    /// Reports a failed capture and returns to preview.
    pub(super) fn abort_still(&mut self, error: CameraError) {
        self.events.emit_error(&error);
        self.unlock_focus();
    }

    /// Cancels the AF trigger and reinstates the repeating request.
    fn unlock_focus(&mut self) {
        self.still_shot = None;
        self.set_still_state(StillCaptureState::Idle);
        if self.session.is_none() {
            return;
        }

        if self.params.auto_focus {
            let mut cancel = self.repeating_copy();
            cancel.af_trigger = Some(AfTrigger::Cancel);
            if let Err(e) = self.session_mut().and_then(|s| s.capture(&cancel)) {
                log::warn!("Failed to cancel focus trigger: {}", e);
            }
        }
        if let Err(e) = self.submit_repeating() {
            self.events.emit_error(&e);
        }
    }

    // ---- tap to focus ----

    /// Meters and focuses on the view point `(x, y)`. Ignored while a
    /// previous focus or a still capture is in flight.
    pub(super) fn focus_at(&mut self, x: f32, y: f32) -> Result<(), CameraError> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(CameraError::invalid_parameter("Focus point must be finite"));
        }
        self.ensure_preview_running()?;
        let Some(camera) = self.camera.as_ref() else {
            return Err(CameraError::illegal_state("No camera selected"));
        };
        if !camera.characteristics.supports_auto_focus() {
            return Err(CameraError::unsupported("Camera has no auto focus"));
        }
        if let Some(pending) = &self.focus {
            log::debug!("focus_at ignored: {} outstanding", pending.token);
            return Ok(());
        }
        if !self.still_state.is_idle() {
            log::debug!("focus_at ignored: still capture in progress");
            return Ok(());
        }

        let view = self
            .preview
            .as_ref()
            .map(|p| p.view_size())
            .ok_or_else(|| CameraError::illegal_state("No preview target bound"))?;
        let active_array = camera.characteristics.active_array;
        let max_regions = camera.characteristics.max_af_regions;
        let rect = metering_rect_with_side(
            active_array,
            self.output_orientation(),
            view.width,
            view.height,
            x,
            y,
            self.config.advanced.focus_area_size,
        );
        let regions = if max_regions >= 1 {
            vec![MeteringRectangle {
                rect,
                weight: METERING_WEIGHT_MAX - 1,
            }]
        } else {
            Vec::new()
        };
        log::debug!("Focus at ({}, {}) -> {:?}", x, y, rect);

        if let Err(e) = self.submit_focus(&regions) {
            self.focus = None;
            if let Err(restore) = self.submit_repeating() {
                log::error!("Failed to resume preview after focus error: {}", restore);
            }
            return Err(e);
        }
        self.events.emit(CameraEvent::FocusStarted { x, y });
        Ok(())
    }

    fn submit_focus(&mut self, regions: &[MeteringRectangle]) -> Result<(), CameraError> {
        let mut cancel = self.repeating_copy();
        cancel.af_trigger = Some(AfTrigger::Cancel);
        cancel.af_mode = Some(AfMode::Off);

        let mut request = self.repeating_copy();
        apply_focus_override(&mut request, regions);
        request.af_trigger = Some(AfTrigger::Start);

        let session = self.session_mut()?;
        session.stop_repeating()?;
        session.capture(&cancel)?;
        session.capture(&request)?;

        self.focus = Some(PendingFocus {
            token: PendingRequestToken {
                id: request.id,
                kind: RequestKind::Focus,
            },
            regions: regions.to_vec(),
        });
        Ok(())
    }

    /// Resumes preview after the focus request completes. On success the
    /// metering regions stay in the repeating request.
    pub(super) fn on_focus_finished(&mut self, success: bool) {
        let Some(pending) = self.focus.take() else {
            return;
        };
        log::debug!("Focus {} finished, success={}", pending.token, success);

        let mut request = self.build_repeating_request();
        if success {
            apply_focus_override(&mut request, &pending.regions);
        }
        request.af_trigger = None;
        match self.session_mut().and_then(|s| s.set_repeating_request(&request)) {
            Ok(()) => self.repeating = Some(request),
            Err(e) => self.events.emit_error(&e),
        }
        self.events.emit(CameraEvent::FocusFinished { success });
    }
}

fn apply_focus_override(request: &mut CaptureRequest, regions: &[MeteringRectangle]) {
    request.control_mode = Some(ControlMode::Auto);
    request.af_mode = Some(AfMode::Auto);
    request.af_regions = regions.to_vec();
}
