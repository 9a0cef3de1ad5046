use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy surfaced through `CameraEvent::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("Camera error: {0}")]
    Camera(String),
    #[error("Permission error: {0}")]
    Permission(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Illegal state: {0}")]
    IllegalState(String),
}

/// Stable tag for each `CameraError` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Camera,
    Permission,
    InvalidParameter,
    UnsupportedOperation,
    Storage,
    IllegalState,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Camera => "camera",
            ErrorKind::Permission => "permission",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::UnsupportedOperation => "unsupported_operation",
            ErrorKind::Storage => "storage",
            ErrorKind::IllegalState => "illegal_state",
        };
        write!(f, "{}", s)
    }
}

impl CameraError {
    pub fn camera(message: impl Into<String>) -> Self {
        Self::Camera(message.into())
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CameraError::Camera(_) => ErrorKind::Camera,
            CameraError::Permission(_) => ErrorKind::Permission,
            CameraError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            CameraError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            CameraError::Storage(_) => ErrorKind::Storage,
            CameraError::IllegalState(_) => ErrorKind::IllegalState,
        }
    }

    /// The message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            CameraError::Camera(m)
            | CameraError::Permission(m)
            | CameraError::InvalidParameter(m)
            | CameraError::UnsupportedOperation(m)
            | CameraError::Storage(m)
            | CameraError::IllegalState(m) => m,
        }
    }
}

impl From<std::io::Error> for CameraError {
    fn from(e: std::io::Error) -> Self {
        CameraError::Storage(e.to_string())
    }
}
