#[cfg(test)]
mod error_tests {
    use crabshot::errors::{CameraError, ErrorKind};
    use crabshot::events::CameraEvent;
    use std::error::Error;

    #[test]
    fn test_camera_error_display() {
        let error = CameraError::camera("Failed to open camera (error 3)");
        assert_eq!(
            error.to_string(),
            "Camera error: Failed to open camera (error 3)"
        );
    }

    #[test]
    fn test_camera_error_debug_format() {
        let error = CameraError::permission("Camera permission not granted");
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Permission"));
        assert!(debug_str.contains("Camera permission not granted"));
    }

    #[test]
    fn test_camera_error_implements_error_trait() {
        let error = CameraError::illegal_state("Preview is not active");
        let _error_trait: &dyn Error = &error;
        assert!(error.source().is_none());
    }

    #[test]
    fn test_all_error_variants() {
        let errors = vec![
            (CameraError::camera("a"), ErrorKind::Camera, "camera"),
            (CameraError::permission("b"), ErrorKind::Permission, "permission"),
            (
                CameraError::invalid_parameter("c"),
                ErrorKind::InvalidParameter,
                "invalid_parameter",
            ),
            (
                CameraError::unsupported("d"),
                ErrorKind::UnsupportedOperation,
                "unsupported_operation",
            ),
            (CameraError::storage("e"), ErrorKind::Storage, "storage"),
            (
                CameraError::illegal_state("f"),
                ErrorKind::IllegalState,
                "illegal_state",
            ),
        ];

        for (error, kind, tag) in errors {
            assert_eq!(error.kind(), kind);
            assert_eq!(kind.to_string(), tag);
            assert_eq!(error.message().len(), 1);
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_error_clone_and_eq() {
        let error = CameraError::storage("disk full");
        assert_eq!(error.clone(), error);
        assert_ne!(error, CameraError::camera("disk full"));
    }

    #[test]
    fn test_error_event_round_trips_message() {
        let error = CameraError::unsupported("Flash is not available");
        let event = CameraEvent::error(&error);
        assert!(event.is_error());
        assert_eq!(
            event,
            CameraEvent::Error {
                kind: ErrorKind::UnsupportedOperation,
                message: "Flash is not available".to_string(),
            }
        );
    }

    #[test]
    fn test_non_error_events_have_no_kind() {
        assert_eq!(CameraEvent::PreviewStarted.error_kind(), None);
        assert!(!CameraEvent::FocusFinished { success: false }.is_error());
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UnsupportedOperation).unwrap();
        assert_eq!(json, "\"unsupported_operation\"");
        let kind: ErrorKind = serde_json::from_str("\"illegal_state\"").unwrap();
        assert_eq!(kind, ErrorKind::IllegalState);
    }
}
