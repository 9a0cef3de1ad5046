//! Tests for the recording module

#[cfg(test)]
mod recording_tests {
    use crate::config::CrabShotConfig;
    use crate::errors::{CameraError, ErrorKind};
    use crate::hal::CameraBackend;
    use crate::recording::{
        AudioSource, RecorderConfigurator, RecordingConfig, RecordingSession, VideoCodec,
    };
    use crate::testing::{EncoderCall, SimulatedBackend};
    use crate::types::Size;

    fn defaults(path: &std::path::Path) -> RecordingConfig {
        let config = CrabShotConfig::default();
        RecordingConfig::from_defaults(&config.recording, Size::new(1920, 1080), path.to_path_buf())
    }

    #[test]
    fn test_from_defaults() {
        let config = defaults(std::path::Path::new("clip.mp4"));
        assert_eq!(config.bitrate, Some(10_000_000));
        assert_eq!(config.fps, Some(30));
        assert_eq!(config.video_codec, Some(VideoCodec::H264));
        assert_eq!(config.audio_source, Some(AudioSource::Mic));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_config_is_incomplete() {
        let err = RecordingConfig::default().validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalState);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = defaults(std::path::Path::new("clip.mp4"));
        let err = base.clone().with_fps(0).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err = base.with_video_size(Size::new(0, 1080)).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_without_audio_stays_valid() {
        let config = defaults(std::path::Path::new("clip.mp4")).without_audio();
        assert!(config.audio_codec.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_closure_configurator() {
        let mut configurator = |config: &mut RecordingConfig| {
            config.bitrate = Some(2_000_000);
            Ok::<(), CameraError>(())
        };
        assert!(configurator.use_default_configs());

        let mut config = defaults(std::path::Path::new("clip.mp4"));
        configurator.configure(&mut config).unwrap();
        assert_eq!(config.bitrate, Some(2_000_000));
    }

    #[test]
    fn test_session_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        let backend = SimulatedBackend::back_only();

        let mut session = RecordingSession::new(backend.create_encoder().unwrap());
        let surface = session.prepare(&defaults(&path)).unwrap();
        assert_eq!(session.surface(), Some(surface));
        assert_eq!(session.output_path(), Some(path.as_path()));

        session.start().unwrap();
        session.pause().unwrap();
        session.resume().unwrap();
        let written = session.stop().unwrap();
        assert_eq!(written, path);
        assert!(path.exists());
        session.release();

        assert_eq!(
            backend.encoder_calls(),
            vec![
                EncoderCall::Configure,
                EncoderCall::Start,
                EncoderCall::Pause,
                EncoderCall::Resume,
                EncoderCall::Stop,
                EncoderCall::Reset,
                EncoderCall::Release,
            ]
        );
    }

    #[test]
    fn test_prepare_rejects_invalid_config() {
        let backend = SimulatedBackend::back_only();
        let mut session = RecordingSession::new(backend.create_encoder().unwrap());
        assert!(session.prepare(&RecordingConfig::default()).is_err());
        assert!(backend.encoder_calls().is_empty());
    }

    #[test]
    fn test_drop_releases_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SimulatedBackend::back_only();
        {
            let mut session = RecordingSession::new(backend.create_encoder().unwrap());
            session.prepare(&defaults(&dir.path().join("a.mp4"))).unwrap();
        }
        let calls = backend.encoder_calls();
        assert_eq!(calls.last(), Some(&EncoderCall::Release));
    }
}
