//! Capture requests and per-frame results.

use crate::types::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one submitted request. Monotonic per controller; stale
/// completions are rejected by comparing ids by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// Identifier of one capture session. Each new session gets a larger value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionGeneration(pub u64);

impl SessionGeneration {
    pub fn next(self) -> SessionGeneration {
        SessionGeneration(self.0 + 1)
    }
}

impl fmt::Display for SessionGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Opaque encoder input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

/// A stream a session writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputTarget {
    Preview,
    StillReader,
    EncoderInput(SurfaceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestTemplate {
    Preview,
    Record,
    StillCapture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    Off,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AfMode {
    Off,
    Auto,
    ContinuousPicture,
    ContinuousVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfTrigger {
    Idle,
    Start,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AeMode {
    On,
    OnAlwaysFlash,
    OnAutoFlash,
    OnAutoFlashRedEye,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AePrecaptureTrigger {
    Idle,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashMode {
    Off,
    Torch,
}

/// Auto-focus state reported with a capture result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfState {
    Inactive,
    PassiveScan,
    PassiveFocused,
    PassiveUnfocused,
    ActiveScan,
    FocusedLocked,
    NotFocusedLocked,
}

impl AfState {
    pub fn is_locked(self) -> bool {
        matches!(self, AfState::FocusedLocked | AfState::NotFocusedLocked)
    }
}

/// Auto-exposure state reported with a capture result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AeState {
    Inactive,
    Searching,
    Converged,
    Locked,
    FlashRequired,
    Precapture,
}

pub const METERING_WEIGHT_MAX: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeteringRectangle {
    pub rect: Rect,
    pub weight: u32,
}

/// A capture request. Unset controls keep the device's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub id: RequestId,
    pub template: RequestTemplate,
    pub targets: Vec<OutputTarget>,
    pub control_mode: Option<ControlMode>,
    pub af_mode: Option<AfMode>,
    pub af_trigger: Option<AfTrigger>,
    pub ae_mode: Option<AeMode>,
    pub ae_precapture_trigger: Option<AePrecaptureTrigger>,
    pub flash_mode: Option<FlashMode>,
    pub af_regions: Vec<MeteringRectangle>,
    pub crop_region: Option<Rect>,
    pub jpeg_orientation: Option<u32>,
}

impl CaptureRequest {
    pub fn new(id: RequestId, template: RequestTemplate) -> Self {
        Self {
            id,
            template,
            targets: Vec::new(),
            control_mode: None,
            af_mode: None,
            af_trigger: None,
            ae_mode: None,
            ae_precapture_trigger: None,
            flash_mode: None,
            af_regions: Vec::new(),
            crop_region: None,
            jpeg_orientation: None,
        }
    }

    pub fn with_target(mut self, target: OutputTarget) -> Self {
        self.add_target(target);
        self
    }

    pub fn add_target(&mut self, target: OutputTarget) {
        if !self.targets.contains(&target) {
            self.targets.push(target);
        }
    }

    /// Same controls under a new id.
    pub fn resubmitted(&self, id: RequestId) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy
    }
}

/// Per-frame result. `Progressed` results may omit states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureResult {
    pub generation: SessionGeneration,
    pub request_id: RequestId,
    pub af_state: Option<AfState>,
    pub ae_state: Option<AeState>,
}
