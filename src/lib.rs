//! CrabShot: camera session controller for preview, still capture and
//! video recording
//!
//! The controller drives an asynchronous camera stack (a device that opens
//! in the background, capture sessions configured in the background,
//! per-frame results arriving on a worker thread) and exposes a small,
//! non-blocking operation set to a UI layer. Outcomes come back as ordered
//! [`CameraEvent`]s.
//!
//! # Features
//! - Preview lifecycle with stale-callback protection
//! - Aspect-ratio-aware size negotiation across preview, still and video
//! - Still capture with focus lock and exposure precapture
//! - Tap-to-focus metering and digital zoom
//! - Video recording with pause and resume
//! - A deterministic simulated camera stack for tests and tooling
//!
//! # Usage
//! ```rust
//! use crabshot::{CaptureSessionController, PreviewParams};
//! use crabshot::testing::{SimulatedBackend, SimulatedPreview};
//! use std::sync::Arc;
//!
//! crabshot::init_logging();
//! let backend = Arc::new(SimulatedBackend::phone());
//! let mut controller = CaptureSessionController::builder(backend).build();
//! controller.initialize(Arc::new(SimulatedPreview::new(1080, 1440)));
//! controller.start_preview(PreviewParams::default());
//! controller.stop_preview();
//! ```
pub mod config;
pub mod controller;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod hal;
pub mod permissions;
pub mod recording;
pub mod sizes;
pub mod storage;
pub mod types;

// Testing utilities - simulated camera stack for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::CrabShotConfig;
pub use controller::{
    CaptureSessionController, ControllerBuilder, PreviewState, RecordingState, StillCaptureState,
};
pub use errors::{CameraError, ErrorKind};
pub use events::{CameraEvent, EventChannel, EventListener};
pub use sizes::SizeNegotiator;
pub use types::{
    AspectRatio, CaptureParameters, Facing, Flash, Mode, PreviewParams, Rect, Rotation, Size,
    StreamConfiguration,
};

/// Initialize logging for the camera system
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crabshot=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "crabshot");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        assert!(std::env::var("RUST_LOG").is_ok());
    }
}
