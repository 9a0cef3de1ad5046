//! Property-Based Tests for CrabShot geometry and size negotiation
//!
//! These tests verify the contracts of the pure computations the controller
//! relies on, using proptest for input generation and shrinking.
//!
//! Run with: cargo test --test geometry_props

use crabshot::geometry::{clamp_zoom, crop_rect, jpeg_orientation, metering_rect};
use crabshot::sizes::{negotiate, SizeNegotiator};
use crabshot::types::{AspectRatio, Mode, Rect, Rotation, Size};
use proptest::prelude::*;

/// Resolutions commonly reported by phone sensors.
const POOL: &[Size] = &[
    Size::new(4000, 3000),
    Size::new(4000, 2250),
    Size::new(3840, 2160),
    Size::new(3264, 2448),
    Size::new(1920, 1080),
    Size::new(1600, 1200),
    Size::new(1440, 1080),
    Size::new(1280, 960),
    Size::new(1280, 720),
    Size::new(1080, 1080),
    Size::new(960, 720),
    Size::new(800, 600),
    Size::new(720, 720),
    Size::new(640, 480),
    Size::new(352, 288),
    Size::new(320, 240),
];

const RATIOS: &[(u32, u32)] = &[(4, 3), (16, 9), (1, 1), (11, 9), (3, 2), (21, 9)];

fn sizes() -> impl Strategy<Value = Vec<Size>> {
    prop::sample::subsequence(POOL.to_vec(), 1..POOL.len())
}

fn ratio() -> impl Strategy<Value = AspectRatio> {
    prop::sample::select(RATIOS.to_vec()).prop_map(|(x, y)| AspectRatio::of(x, y))
}

fn mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Image), Just(Mode::Video)]
}

fn rotation() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        Just(Rotation::Deg0),
        Just(Rotation::Deg90),
        Just(Rotation::Deg180),
        Just(Rotation::Deg270),
    ]
}

fn active_array() -> impl Strategy<Value = Rect> {
    (0i32..64, 0i32..64, 640u32..8000, 480u32..6000)
        .prop_map(|(left, top, w, h)| Rect::new(left, top, left + w as i32, top + h as i32))
}

// ═══════════════════════════════════════════════════════════════════════════
// SIZE NEGOTIATION
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// INVARIANT: Negotiation is deterministic and picks from the candidates
    #[test]
    fn negotiation_is_deterministic(
        preview in sizes(),
        image in sizes(),
        video in sizes(),
        requested in ratio(),
        mode in mode(),
    ) {
        let first = negotiate(&preview, &image, &video, requested, mode).unwrap();
        let second = negotiate(&preview, &image, &video, requested, mode).unwrap();
        prop_assert_eq!(first, second);

        prop_assert!(preview.contains(&first.preview_size));
        let output = first.output_size(mode).unwrap();
        let candidates = match mode {
            Mode::Image => &image,
            Mode::Video => &video,
        };
        prop_assert!(candidates.contains(&output));
    }

    /// INVARIANT: The negotiated ratio is one the camera offers for the mode
    #[test]
    fn negotiated_ratio_is_supported(
        preview in sizes(),
        image in sizes(),
        video in sizes(),
        requested in ratio(),
        mode in mode(),
    ) {
        let negotiator = SizeNegotiator::new(&preview, &image, &video, u32::MAX);
        let supported = negotiator.supported_aspect_ratios(mode);
        let config = negotiator.negotiate(requested, mode, None).unwrap();

        prop_assert!(supported.contains(&config.aspect_ratio),
            "{} not in {:?}", config.aspect_ratio, supported);
        if supported.contains(&requested) {
            prop_assert_eq!(config.aspect_ratio, requested);
        }
    }

    /// INVARIANT: Video sizes above the height cap are never chosen
    #[test]
    fn video_height_cap_respected(
        preview in sizes(),
        video in sizes(),
        requested in ratio(),
    ) {
        prop_assume!(video.iter().any(|s| s.height <= 1080));
        let negotiator = SizeNegotiator::new(&preview, &[], &video, 1080);
        let config = negotiator.negotiate(requested, Mode::Video, None).unwrap();
        prop_assert!(config.video_size.unwrap().height <= 1080);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ZOOM
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// INVARIANT: Unit zoom crops nothing
    #[test]
    fn unit_zoom_is_identity(array in active_array()) {
        prop_assert_eq!(crop_rect(array, 1.0), array);
    }

    /// INVARIANT: More zoom never grows the crop, which stays inside the
    /// array
    #[test]
    fn crop_shrinks_monotonically(
        array in active_array(),
        zoom in 1.0f32..8.0,
        delta in 0.05f32..4.0,
    ) {
        let wide = crop_rect(array, zoom);
        let tight = crop_rect(array, zoom + delta);
        prop_assert!(array.contains(&wide));
        prop_assert!(wide.contains(&tight));
        prop_assert!(tight.width() <= wide.width());
        prop_assert!(tight.height() <= wide.height());
        prop_assert!(!tight.is_empty());
    }

    /// INVARIANT: Clamped zoom is within [1, max]
    #[test]
    fn clamp_stays_in_range(zoom in -10.0f32..100.0, max in 0.0f32..16.0) {
        let clamped = clamp_zoom(zoom, max);
        prop_assert!(clamped >= 1.0);
        prop_assert!(clamped <= max.max(1.0));
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FOCUS AND ORIENTATION
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// INVARIANT: Metering rectangles never leave the active array
    #[test]
    fn metering_rect_is_contained(
        array in active_array(),
        rotation in rotation(),
        sensor in prop_oneof![Just(90u32), Just(270u32)],
        view_w in 1u32..4000,
        view_h in 1u32..4000,
        fx in 0.0f32..=1.0,
        fy in 0.0f32..=1.0,
    ) {
        let orientation = jpeg_orientation(sensor, rotation);
        let rect = metering_rect(
            array,
            orientation,
            view_w,
            view_h,
            fx * view_w as f32,
            fy * view_h as f32,
        );
        prop_assert!(array.contains(&rect), "{:?} outside {:?}", rect, array);
        prop_assert!(!rect.is_empty());
    }

    /// INVARIANT: Output orientation is a quarter turn
    #[test]
    fn orientation_is_quarter_turn(sensor in 0u32..360, rotation in rotation()) {
        let degrees = jpeg_orientation(sensor, rotation);
        prop_assert!(degrees < 360 && degrees % 90 == 0);
    }
}
