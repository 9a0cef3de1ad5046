//! Encoder lifecycle for one clip.

use super::config::RecordingConfig;
use crate::errors::CameraError;
use crate::hal::{MediaEncoder, SurfaceId};
use std::path::{Path, PathBuf};

/// One encoder and the clip it writes.
///
/// Ordering of `start`/`pause`/`resume`/`stop` is enforced by the owner;
/// only `prepare` validates its input.
pub struct RecordingSession {
    encoder: Option<Box<dyn MediaEncoder>>,
    output_path: Option<PathBuf>,
    surface: Option<SurfaceId>,
}

impl RecordingSession {
    pub fn new(encoder: Box<dyn MediaEncoder>) -> Self {
        Self {
            encoder: Some(encoder),
            output_path: None,
            surface: None,
        }
    }

    fn encoder(&mut self) -> Result<&mut Box<dyn MediaEncoder>, CameraError> {
        self.encoder
            .as_mut()
            .ok_or_else(|| CameraError::illegal_state("Encoder already released"))
    }

    /// Validates and applies `config`, returning the surface the camera
    /// must render into.
    pub fn prepare(&mut self, config: &RecordingConfig) -> Result<SurfaceId, CameraError> {
        config.validate()?;
        let encoder = self.encoder()?;
        encoder.configure(config)?;
        let surface = encoder.input_surface()?;
        self.output_path = config.output_path.clone();
        self.surface = Some(surface);
        log::debug!(
            "Encoder prepared: {:?} -> {:?}",
            config.video_size,
            self.output_path
        );
        Ok(surface)
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn start(&mut self) -> Result<(), CameraError> {
        self.encoder()?.start()
    }

    pub fn pause(&mut self) -> Result<(), CameraError> {
        self.encoder()?.pause()
    }

    pub fn resume(&mut self) -> Result<(), CameraError> {
        self.encoder()?.resume()
    }

    /// Stops encoding and hands back the finished clip's path.
    pub fn stop(&mut self) -> Result<PathBuf, CameraError> {
        self.encoder()?.stop()?;
        self.output_path
            .take()
            .ok_or_else(|| CameraError::illegal_state("Recording has no output file"))
    }

    /// Resets and releases the encoder.
    pub fn release(mut self) {
        self.release_encoder();
    }

    fn release_encoder(&mut self) {
        if let Some(mut encoder) = self.encoder.take() {
            encoder.reset();
            encoder.release();
        }
        self.surface = None;
        self.output_path = None;
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            log::warn!("Recording session dropped without release");
            self.release_encoder();
        }
    }
}
