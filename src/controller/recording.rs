//! Recording lifecycle on top of the preview session.

use super::core::Core;
use super::state::RecordingState;
use crate::errors::CameraError;
use crate::events::CameraEvent;
use crate::hal::OutputTarget;
use crate::recording::{RecorderConfigurator, RecordingConfig, RecordingSession};
use crate::types::{Mode, Size};

impl Core {
    /// Replaces the preview-only session with one that also feeds a freshly
    /// prepared encoder. `StartRecording` follows once that session is
    /// configured and the encoder has started.
    pub(super) fn start_recording(
        &mut self,
        configurator: Option<Box<dyn RecorderConfigurator>>,
    ) -> Result<(), CameraError> {
        self.check_permissions()?;
        if self.params.mode != Mode::Video {
            return Err(CameraError::illegal_state("Recording requires video mode"));
        }
        if self.device.is_none() || self.session.is_none() {
            return Err(CameraError::camera("Camera is not ready for recording"));
        }
        let video_size = self
            .streams
            .and_then(|s| s.video_size)
            .ok_or_else(|| CameraError::camera("No preview size negotiated"))?;
        if !self.preview.as_ref().is_some_and(|p| p.is_available()) {
            return Err(CameraError::camera("Preview surface is not available"));
        }
        if self.recording_state != RecordingState::NotRecording {
            return Err(CameraError::illegal_state("Recording already in progress"));
        }

        self.close_session();
        self.set_recording_state(RecordingState::Preparing);

        if let Err(e) = self.prepare_recording(configurator, video_size) {
            self.abort_recording();
            return Err(e);
        }
        Ok(())
    }

    fn prepare_recording(
        &mut self,
        configurator: Option<Box<dyn RecorderConfigurator>>,
        video_size: Size,
    ) -> Result<(), CameraError> {
        let use_defaults = configurator
            .as_ref()
            .map_or(true, |c| c.use_default_configs());
        let mut config = if use_defaults {
            let path = self.hw.paths.next_video_path()?;
            RecordingConfig::from_defaults(&self.config.recording, video_size, path)
        } else {
            RecordingConfig::default()
        };
        if let Some(mut configurator) = configurator {
            configurator.configure(&mut config)?;
        }
        if config.orientation_hint.is_none() {
            config.orientation_hint = Some(self.output_orientation());
        }

        let mut recording = RecordingSession::new(self.hw.backend.create_encoder()?);
        let surface = match recording.prepare(&config) {
            Ok(surface) => surface,
            Err(e) => {
                recording.release();
                return Err(e);
            }
        };
        self.recording = Some(recording);
        log::info!("Recording to {:?}", config.output_path);

        self.create_session(vec![
            OutputTarget::Preview,
            OutputTarget::EncoderInput(surface),
        ])
    }

    /// Recording session is up: stream into the encoder and start it.
    pub(super) fn on_recording_session_configured(&mut self) {
        let started = self.submit_repeating().and_then(|()| {
            self.recording
                .as_mut()
                .ok_or_else(|| CameraError::illegal_state("Encoder missing"))?
                .start()
        });
        match started {
            Ok(()) => {
                self.set_recording_state(RecordingState::Recording);
                log::info!("Recording started");
                self.events.emit(CameraEvent::StartRecording);
            }
            Err(e) => {
                self.events.emit_error(&e);
                self.close_session();
                self.abort_recording();
            }
        }
    }

    /// Drops the encoder of a recording that never started and brings the
    /// preview-only session back.
    fn abort_recording(&mut self) {
        if let Some(recording) = self.recording.take() {
            recording.release();
        }
        self.set_recording_state(RecordingState::NotRecording);
        self.restore_preview_session();
    }

    fn restore_preview_session(&mut self) {
        if self.device.is_none() {
            return;
        }
        if let Err(e) = self.create_preview_session() {
            self.fail(e);
        }
    }

    pub(super) fn pause_recording(&mut self) -> Result<(), CameraError> {
        if !self.hw.backend.supports_recording_pause() {
            return Err(CameraError::unsupported(
                "Pausing a recording is not supported on this device",
            ));
        }
        if self.recording_state != RecordingState::Recording {
            return Err(CameraError::illegal_state(format!(
                "Cannot pause while {:?}",
                self.recording_state
            )));
        }
        self.active_recording()?.pause()?;
        self.set_recording_state(RecordingState::Paused);
        self.events.emit(CameraEvent::PauseRecording);
        Ok(())
    }

    pub(super) fn resume_recording(&mut self) -> Result<(), CameraError> {
        if !self.hw.backend.supports_recording_pause() {
            return Err(CameraError::unsupported(
                "Resuming a recording is not supported on this device",
            ));
        }
        if self.recording_state != RecordingState::Paused {
            return Err(CameraError::illegal_state(format!(
                "Cannot resume while {:?}",
                self.recording_state
            )));
        }
        self.active_recording()?.resume()?;
        self.set_recording_state(RecordingState::Recording);
        self.events.emit(CameraEvent::ResumeRecording);
        Ok(())
    }

    fn active_recording(&mut self) -> Result<&mut RecordingSession, CameraError> {
        self.recording
            .as_mut()
            .ok_or_else(|| CameraError::illegal_state("No recording in progress"))
    }

    /// Stops the clip and returns to the preview-only session. No-op when
    /// nothing is recording.
    pub(super) fn finish_recording(&mut self) -> Result<(), CameraError> {
        match self.recording_state {
            RecordingState::NotRecording | RecordingState::Finishing => Ok(()),
            RecordingState::Preparing => {
                log::info!("Recording cancelled before it started");
                self.close_session();
                self.abort_recording();
                Ok(())
            }
            RecordingState::Recording | RecordingState::Paused => {
                self.set_recording_state(RecordingState::Finishing);
                if let Some(session) = self.session.as_mut() {
                    if let Err(e) = session.stop_repeating() {
                        log::warn!("Failed to stop recording stream: {}", e);
                    }
                }

                let stopped = match self.recording.take() {
                    Some(mut recording) => {
                        let result = recording.stop();
                        recording.release();
                        result
                    }
                    None => Err(CameraError::illegal_state("Encoder missing")),
                };
                self.set_recording_state(RecordingState::NotRecording);
                self.close_session();

                let outcome = stopped.map(|path| {
                    log::info!("Recording saved to {}", path.display());
                    self.events.emit(CameraEvent::FinishRecording { path: path.clone() });
                    self.hw.gallery.notify(&path);
                });
                self.restore_preview_session();
                outcome
            }
        }
    }
}
