//! Video recording support
//!
//! The controller owns at most one [`RecordingSession`] at a time. Its
//! encoder is configured from [`RecordingConfig`], built from the
//! `[recording]` defaults and optionally adjusted by a caller-supplied
//! [`RecorderConfigurator`].

mod config;
mod session;

pub use config::{
    AudioCodec, AudioSource, OutputFormat, RecorderConfigurator, RecordingConfig, VideoCodec,
    VideoSource,
};
pub use session::RecordingSession;

#[cfg(test)]
mod tests;
