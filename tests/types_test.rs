//! Tests for CrabShot core types
//!
//! Ensures the value types exchanged with the UI layer behave consistently.

use crabshot::types::{
    AspectRatio, CaptureParameters, Facing, Flash, Mode, PreviewParams, Rect, Rotation, Size,
    StreamConfiguration,
};

#[cfg(test)]
mod size_tests {
    use super::*;

    #[test]
    fn test_size_display() {
        assert_eq!(Size::new(1920, 1080).to_string(), "1920x1080");
    }

    #[test]
    fn test_size_aspect_ratio_reduced() {
        assert_eq!(Size::new(1920, 1080).aspect_ratio(), AspectRatio::of(16, 9));
        assert_eq!(Size::new(1440, 1080).aspect_ratio(), AspectRatio::of(4, 3));
    }

    #[test]
    fn test_size_landscape() {
        assert_eq!(Size::new(1080, 1920).landscape(), Size::new(1920, 1080));
        assert_eq!(Size::new(1920, 1080).landscape(), Size::new(1920, 1080));
    }

    #[test]
    fn test_size_area() {
        assert_eq!(Size::new(4000, 3000).area(), 12_000_000);
    }
}

#[cfg(test)]
mod aspect_ratio_tests {
    use super::*;

    #[test]
    fn test_matches_only_exact_ratio() {
        let ratio = AspectRatio::of(4, 3);
        assert!(ratio.matches(&Size::new(640, 480)));
        assert!(!ratio.matches(&Size::new(640, 481)));
        assert!(!ratio.matches(&Size::new(0, 0)));
    }

    #[test]
    fn test_inverse() {
        assert_eq!(AspectRatio::of(16, 9).inverse(), AspectRatio::of(9, 16));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("4x3".parse::<AspectRatio>().is_err());
        assert!("0:3".parse::<AspectRatio>().is_err());
        assert!("a:b".parse::<AspectRatio>().is_err());
        assert_eq!(" 8 : 6 ".parse::<AspectRatio>().unwrap(), AspectRatio::of(4, 3));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&AspectRatio::of(32, 18)).unwrap();
        assert_eq!(json, "\"16:9\"");
        let ratio: AspectRatio = serde_json::from_str("\"1:1\"").unwrap();
        assert_eq!(ratio, AspectRatio::of(1, 1));
        assert!(serde_json::from_str::<AspectRatio>("\"wide\"").is_err());
    }

    #[test]
    fn test_sorted_by_value() {
        let mut ratios = vec![
            AspectRatio::of(16, 9),
            AspectRatio::of(1, 1),
            AspectRatio::of(4, 3),
        ];
        ratios.sort();
        assert_eq!(
            ratios,
            vec![
                AspectRatio::of(1, 1),
                AspectRatio::of(4, 3),
                AspectRatio::of(16, 9),
            ]
        );
    }
}

#[cfg(test)]
mod rect_tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let rect = Rect::new(10, 20, 110, 70);
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 50);
        assert!(!rect.is_empty());
        assert!(Rect::new(5, 5, 5, 9).is_empty());
    }

    #[test]
    fn test_rect_containment() {
        let outer = Rect::from_size(4000, 3000);
        assert!(outer.contains(&Rect::new(0, 0, 4000, 3000)));
        assert!(outer.contains(&Rect::new(100, 100, 400, 400)));
        assert!(!outer.contains(&Rect::new(3900, 0, 4100, 100)));
    }
}

#[cfg(test)]
mod parameter_tests {
    use super::*;

    #[test]
    fn test_capture_parameter_defaults() {
        let params = CaptureParameters::default();
        assert_eq!(params.mode, Mode::Image);
        assert_eq!(params.facing, Facing::Back);
        assert_eq!(params.flash, Flash::Off);
        assert!(params.auto_focus);
        assert_eq!(params.zoom, 1.0);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&Flash::RedEye).unwrap(), "\"red_eye\"");
        assert_eq!(serde_json::to_string(&Mode::Video).unwrap(), "\"video\"");
        assert_eq!(serde_json::to_string(&Facing::Front).unwrap(), "\"front\"");
    }

    #[test]
    fn test_facing_flipped() {
        assert_eq!(Facing::Back.flipped(), Facing::Front);
        assert_eq!(Facing::Front.flipped().flipped(), Facing::Front);
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::Deg270.degrees(), 270);
    }

    #[test]
    fn test_preview_params_builder_and_merge() {
        let base = PreviewParams::default()
            .with_mode(Mode::Video)
            .with_zoom(2.0);
        let update = PreviewParams::default()
            .with_facing(Facing::Front)
            .with_zoom(3.0);
        let merged = base.merge(update);
        assert_eq!(merged.mode, Some(Mode::Video));
        assert_eq!(merged.facing, Some(Facing::Front));
        assert_eq!(merged.zoom, Some(3.0));
        assert_eq!(merged.flash, None);
    }

    #[test]
    fn test_stream_configuration_output_size() {
        let streams = StreamConfiguration {
            preview_size: Size::new(1440, 1080),
            image_size: Some(Size::new(4000, 3000)),
            video_size: None,
            aspect_ratio: AspectRatio::of(4, 3),
        };
        assert_eq!(streams.output_size(Mode::Image), Some(Size::new(4000, 3000)));
        assert_eq!(streams.output_size(Mode::Video), None);
    }
}
