//! Testing utilities for CrabShot
//!
//! A simulated camera stack that behaves like a well-behaved phone camera,
//! plus helpers for waiting on controller events. Used by the crate's own
//! tests and by the `crabshot-cli` binary.

pub mod watcher;
pub mod simulated;

pub use watcher::EventWatcher;
pub use simulated::{
    back_camera, fixed_focus_camera, front_camera, legacy_camera, EncoderCall, SimulatedBackend,
    SimulatedFrame, SimulatedPreview, SimulatedStats, SubmittedRequest, SIMULATED_JPEG,
};
