//! Encoder configuration types

use crate::config::RecordingDefaults;
use crate::errors::CameraError;
use crate::types::Size;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    Hevc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
    Opus,
}

/// Container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mpeg4,
    Webm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    Mic,
    Camcorder,
}

/// Video frames arrive through the encoder's input surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    Surface,
}

/// Settings applied to the encoder before `prepare`.
///
/// Every field is optional so that a caller who opts out of the defaults
/// starts from a blank configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    pub audio_source: Option<AudioSource>,
    pub video_source: Option<VideoSource>,
    pub output_format: Option<OutputFormat>,
    pub output_path: Option<PathBuf>,
    /// Bits per second
    pub bitrate: Option<u32>,
    pub fps: Option<u32>,
    pub video_size: Option<Size>,
    pub video_codec: Option<VideoCodec>,
    pub audio_codec: Option<AudioCodec>,
    /// Clockwise degrees players should rotate the video by
    pub orientation_hint: Option<u32>,
}

impl RecordingConfig {
    /// The standard configuration: surface video, optional microphone
    /// audio, and the configured codec, container, bitrate and rate.
    pub fn from_defaults(defaults: &RecordingDefaults, video_size: Size, output_path: PathBuf) -> Self {
        Self {
            audio_source: defaults.record_audio.then_some(AudioSource::Mic),
            video_source: Some(VideoSource::Surface),
            output_format: Some(defaults.output_format),
            output_path: Some(output_path),
            bitrate: Some(defaults.bitrate),
            fps: Some(defaults.fps),
            video_size: Some(video_size),
            video_codec: Some(defaults.video_codec),
            audio_codec: defaults.record_audio.then_some(defaults.audio_codec),
            orientation_hint: None,
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set custom bitrate
    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_video_size(mut self, size: Size) -> Self {
        self.video_size = Some(size);
        self
    }

    pub fn without_audio(mut self) -> Self {
        self.audio_source = None;
        self.audio_codec = None;
        self
    }

    /// Checks the configuration is complete and consistent.
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.video_source.is_none() {
            return Err(CameraError::illegal_state("Video source not set"));
        }
        if self.output_format.is_none() {
            return Err(CameraError::illegal_state("Output format not set"));
        }
        if self.output_path.is_none() {
            return Err(CameraError::illegal_state("Output file not set"));
        }
        if self.video_codec.is_none() {
            return Err(CameraError::illegal_state("Video encoder not set"));
        }
        if self.audio_source.is_some() != self.audio_codec.is_some() {
            return Err(CameraError::illegal_state(
                "Audio source and audio encoder must be set together",
            ));
        }

        match self.video_size {
            Some(size) if size.width > 0 && size.height > 0 => {}
            Some(size) => {
                return Err(CameraError::invalid_parameter(format!(
                    "Invalid video size {}",
                    size
                )))
            }
            None => return Err(CameraError::illegal_state("Video size not set")),
        }
        if let Some(fps) = self.fps {
            if fps == 0 || fps > 240 {
                return Err(CameraError::invalid_parameter(format!(
                    "Invalid frame rate {}",
                    fps
                )));
            }
        }
        if self.bitrate == Some(0) {
            return Err(CameraError::invalid_parameter("Bitrate must be positive"));
        }
        if let Some(hint) = self.orientation_hint {
            if hint % 90 != 0 || hint >= 360 {
                return Err(CameraError::invalid_parameter(format!(
                    "Invalid orientation hint {}",
                    hint
                )));
            }
        }
        Ok(())
    }
}

/// Caller hook applied on top of (or instead of) the default settings.
pub trait RecorderConfigurator: Send {
    /// When false the defaults are skipped and `configure` starts from a
    /// blank configuration.
    fn use_default_configs(&self) -> bool {
        true
    }

    fn configure(&mut self, config: &mut RecordingConfig) -> Result<(), CameraError>;
}

impl<F> RecorderConfigurator for F
where
    F: FnMut(&mut RecordingConfig) -> Result<(), CameraError> + Send,
{
    fn configure(&mut self, config: &mut RecordingConfig) -> Result<(), CameraError> {
        self(config)
    }
}
