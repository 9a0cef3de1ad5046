//! Controller state machines.

use crate::hal::RequestId;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PreviewState {
    #[default]
    Stopped,
    /// Device open or session configuration in flight.
    Starting,
    Active,
}

/// Still capture 3A convergence protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StillCaptureState {
    #[default]
    Idle,
    LockingFocus,
    WaitingPrecapture,
    WaitingNonPrecapture,
    CapturingStill,
}

impl StillCaptureState {
    pub fn is_idle(self) -> bool {
        self == StillCaptureState::Idle
    }

    /// Whether `next` is a legal successor of `self`. Any state may fall
    /// back to `Idle` on completion, failure or teardown.
    pub fn can_transition_to(self, next: StillCaptureState) -> bool {
        use StillCaptureState::*;
        match (self, next) {
            (_, Idle) => true,
            (Idle, LockingFocus) | (Idle, CapturingStill) => true,
            (LockingFocus, WaitingPrecapture) | (LockingFocus, CapturingStill) => true,
            (WaitingPrecapture, WaitingNonPrecapture) => true,
            (WaitingNonPrecapture, CapturingStill) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RecordingState {
    #[default]
    NotRecording,
    /// Encoder prepared, recording session being configured.
    Preparing,
    Recording,
    Paused,
    Finishing,
}

impl RecordingState {
    /// Recording or paused.
    pub fn is_capturing(self) -> bool {
        matches!(self, RecordingState::Recording | RecordingState::Paused)
    }

    pub fn can_transition_to(self, next: RecordingState) -> bool {
        use RecordingState::*;
        match (self, next) {
            (NotRecording, Preparing) => true,
            (Preparing, Recording) | (Preparing, NotRecording) => true,
            (Recording, Paused) | (Paused, Recording) => true,
            (Recording, Finishing) | (Paused, Finishing) => true,
            // Hardware failure while capturing
            (Recording, NotRecording) | (Paused, NotRecording) => true,
            (Finishing, NotRecording) => true,
            _ => false,
        }
    }
}

/// What a one-shot request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Still,
    Focus,
}

/// Tag of an outstanding one-shot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequestToken {
    pub id: RequestId,
    pub kind: RequestKind,
}

impl PendingRequestToken {
    pub fn matches(&self, id: RequestId) -> bool {
        self.id == id
    }
}

impl fmt::Display for PendingRequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.id)
    }
}

/// The still frame in flight. Finished once both the image and the
/// capture completion have arrived.
#[derive(Debug)]
pub(crate) struct StillShot {
    pub token: PendingRequestToken,
    pub path: PathBuf,
    /// Set once a frame has been handed out for writing.
    pub frame_claimed: bool,
    pub image_written: bool,
    pub completed: bool,
}

impl StillShot {
    pub fn new(id: RequestId, path: PathBuf) -> Self {
        Self {
            token: PendingRequestToken {
                id,
                kind: RequestKind::Still,
            },
            path,
            frame_claimed: false,
            image_written: false,
            completed: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.image_written && self.completed
    }
}
